pub mod constraints;
pub mod device;
pub mod session;

pub use constraints::{FacingMode, MediaConstraints, Requirement};
pub use device::{CaptureError, MediaDevices, MediaStream, TrackCapabilities, VideoSink, VideoTrack};
pub use session::CameraManager;
