// src/image.rs
//
// Градации серого: заимствованный вид (GrayImage) и владельческий (LumaImage).
// Кадры с камеры приходят в RGBA — конвертируем в яркость один раз на кадр.

use thiserror::Error;

/// Простое представление градаций серого.
/// Буфер `data` — построчно (row-major), 8 бит на пиксель.
#[derive(Clone, Copy, Debug)]
pub struct GrayImage<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> GrayImage<'a> {
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Буфер вмещает `width * height` пикселей; только такие кадры можно резать на строки.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.width
            .checked_mul(self.height)
            .is_some_and(|n| self.data.len() >= n)
    }
}

/// Владельческая картинка: то, что отдаёт видеосинк и что хранит пайплайн.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumaImage {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl LumaImage {
    #[inline]
    pub fn as_gray(&self) -> GrayImage<'_> {
        GrayImage {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        self.as_gray().row(y)
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.as_gray().is_consistent()
    }

    /// Размножить одну строку на `height` строк (синтетика для 1D-кодов).
    pub fn from_row(row: &[u8], height: usize) -> Self {
        let mut data = Vec::with_capacity(row.len() * height);
        for _ in 0..height {
            data.extend_from_slice(row);
        }
        Self {
            data,
            width: row.len(),
            height,
        }
    }

    /// RGBA8 → яркость (BT.601, целочисленно).
    /// Возвращает `None`, если длина буфера не совпадает с размерами.
    pub fn from_rgba(rgba: &[u8], width: usize, height: usize) -> Option<Self> {
        if rgba.len() != width.checked_mul(height)?.checked_mul(4)? {
            return None;
        }
        let data = rgba
            .chunks_exact(4)
            .map(|px| {
                let (r, g, b) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
                ((r * 299 + g * 587 + b * 114 + 500) / 1000) as u8
            })
            .collect();
        Some(Self { data, width, height })
    }

    /// Разобрать бинарный PGM (P5, maxval=255).
    pub fn from_pgm(buf: &[u8]) -> Result<Self, PgmError> {
        let mut pos = 0usize;
        let magic = next_token(buf, &mut pos).ok_or(PgmError::Truncated("magic"))?;
        if magic != b"P5" {
            return Err(PgmError::Magic);
        }
        let width = parse_header_number(buf, &mut pos, "width")?;
        let height = parse_header_number(buf, &mut pos, "height")?;
        let maxval = parse_header_number(buf, &mut pos, "maxval")?;
        if maxval != 255 {
            return Err(PgmError::MaxVal(maxval));
        }
        // ровно один пробельный символ отделяет заголовок от данных
        if pos < buf.len() && buf[pos].is_ascii_whitespace() {
            pos += 1;
        }

        if width == 0 || height == 0 {
            return Err(PgmError::Empty);
        }
        let expected = width
            .checked_mul(height)
            .ok_or(PgmError::TooLarge { width, height })?;
        let data = &buf[pos..];
        if data.len() != expected {
            return Err(PgmError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: data.to_vec(),
            width,
            height,
        })
    }

    /// Записать в PGM (P5). Обратная операция к [`LumaImage::from_pgm`].
    pub fn to_pgm(&self) -> Vec<u8> {
        let mut out = format!("P5\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.extend_from_slice(&self.data);
        out
    }
}

/// Позволяем делать `.into()` из GrayImage в LumaImage (копия буфера).
impl<'a> From<GrayImage<'a>> for LumaImage {
    #[inline]
    fn from(g: GrayImage<'a>) -> Self {
        Self {
            data: g.data.to_vec(),
            width: g.width,
            height: g.height,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PgmError {
    #[error("PGM: must be P5")]
    Magic,
    #[error("PGM: no {0}")]
    Truncated(&'static str),
    #[error("PGM: bad {0}")]
    BadNumber(&'static str),
    #[error("PGM: must be maxval=255, got {0}")]
    MaxVal(usize),
    #[error("PGM: zero-sized image")]
    Empty,
    #[error("PGM: {width}x{height} does not fit in memory")]
    TooLarge { width: usize, height: usize },
    #[error("PGM: data size mismatch (expected {expected} bytes, got {actual})")]
    SizeMismatch { expected: usize, actual: usize },
}

fn parse_header_number(
    buf: &[u8],
    pos: &mut usize,
    what: &'static str,
) -> Result<usize, PgmError> {
    let tok = next_token(buf, pos).ok_or(PgmError::Truncated(what))?;
    std::str::from_utf8(tok)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(PgmError::BadNumber(what))
}

/// Следующий токен заголовка; комментарии `#...` до конца строки пропускаются.
fn next_token<'a>(buf: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    while *pos < buf.len() {
        match buf[*pos] {
            b'#' => {
                while *pos < buf.len() && buf[*pos] != b'\n' {
                    *pos += 1;
                }
            }
            c if c.is_ascii_whitespace() => *pos += 1,
            _ => break,
        }
    }
    if *pos >= buf.len() {
        return None;
    }
    let start = *pos;
    while *pos < buf.len() && !buf[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    Some(&buf[start..*pos])
}
