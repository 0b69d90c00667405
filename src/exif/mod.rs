//! Metadata extraction through the external `exiftool` program.
//!
//! This module provides two entry points:
//!
//! - [`decode`] — Stream image bytes into `exiftool` over stdin
//! - [`decode_file_at_path`] — Point `exiftool` at a file on disk
//!
//! Both run one `exiftool -c %.15f ...` process per call and hand its text
//! report to [`parse_report`], which fills an [`Exif`] record. Use a
//! [`Decoder`] directly when the executable is not on `PATH`.

mod error;
mod invoker;
mod parser;

pub use error::DecodeError;
pub use invoker::{decode, decode_file_at_path, Decoder, DEFAULT_EXECUTABLE, GPS_PRECISION_FMT};
pub use parser::{parse_report, Exif, Gps};
