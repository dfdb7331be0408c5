use std::{env, fs, process};

use tracing_subscriber::EnvFilter;
use ultrascan::one_d::code128::{self, CodeSet};
use ultrascan::one_d::ean13::synthesize_row;
use ultrascan::prelude::*;
use ultrascan::still::scan_image;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut path: Option<String> = None;
    let mut synth: Option<String> = None;
    let mut synth128: Option<String> = None;
    let mut config = ScannerConfig::default();

    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--rows" => {
                if let Some(v) = args.next() {
                    config.decode.scan_rows = v.parse().unwrap_or(config.decode.scan_rows);
                }
            }
            "--synth" => synth = args.next(),
            "--synth128" => synth128 = args.next(),
            "--verify-check-digit" => config.verify_check_digit = true,
            "--help" | "-h" => {
                print_help();
                return;
            }
            other => {
                if path.is_none() {
                    path = Some(other.to_string());
                } else {
                    eprintln!("Лишний аргумент: {other}");
                    print_help();
                    process::exit(2);
                }
            }
        }
    }

    let source = match (path, synth, synth128) {
        (Some(p), None, None) => match fs::read(&p) {
            Ok(bytes) => ImageSource::Encoded(bytes),
            Err(e) => {
                eprintln!("Не удалось прочитать {p}: {e}");
                process::exit(1);
            }
        },
        (None, Some(code), None) => match synthesize_row(&code, 2) {
            Some(row) => ImageSource::Frame(LumaImage::from_row(&row, 48)),
            None => {
                eprintln!("--synth ждёт 12 или 13 цифр, получено {code:?}");
                process::exit(2);
            }
        },
        (None, None, Some(text)) => match code128::synthesize_row(&text, CodeSet::B, 2) {
            Some(row) => ImageSource::Frame(LumaImage::from_row(&row, 48)),
            None => {
                eprintln!("--synth128 ждёт ASCII-текст, получено {text:?}");
                process::exit(2);
            }
        },
        _ => {
            print_help();
            process::exit(2);
        }
    };

    let host = PgmImageHost::default();
    match scan_image(source, &host, None, &config).await {
        Ok(result) => println!("{}: {}", result.format, result.barcode),
        Err(err) => {
            eprintln!("{} ({:?})", err, err.kind());
            process::exit(1);
        }
    }
}

fn print_help() {
    eprintln!(
        r#"Использование:
  cargo run --bin scan_image -- <path.pgm> [--rows <N>] [--verify-check-digit]
  cargo run --bin scan_image -- --synth <12|13 цифр>
  cargo run --bin scan_image -- --synth128 <текст, Code 128 набор B>

Требуется PGM P5 (8-бит, maxval=255). Логи: RUST_LOG=ultrascan=debug.
Примеры:
  cargo run --bin scan_image -- ./test.pgm
  cargo run --bin scan_image -- --synth 036000291452
  cargo run --bin scan_image -- --synth128 4006381333931
"#
    );
}
