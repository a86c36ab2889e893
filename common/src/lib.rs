//! Shared infrastructure for the kappa workspace: 2-D pixel buffers,
//! bit-packed masks, config file formats, logging setup and row-parallel
//! iteration helpers.

pub mod bit_buffer2;
pub mod buffer2;
pub mod file_format;
pub mod log_setup;
pub mod parallel;

pub use bit_buffer2::BitBuffer2;
pub use buffer2::Buffer2;
pub use file_format::{FileExtensionError, SerdeFormat, SerdeFormatError};
