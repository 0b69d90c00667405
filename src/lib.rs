//! # exiftool-decode
//!
//! Read capture time, lens/exposure settings, and GPS coordinates from images
//! by running [`exiftool`](https://exiftool.org) and parsing its report.
//!
//! `exiftool` must be installed and on `PATH` (or configured explicitly via
//! [`exif::Decoder::with_executable`]). This crate does not decode EXIF itself.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exiftool_decode::exif::{decode, decode_file_at_path};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Let exiftool open the file itself
//!     let exif = decode_file_at_path("photo.jpg").await?;
//!     println!("Taken: {}", exif.date_time_original);
//!     println!("GPS: {}, {}", exif.gps.latitude, exif.gps.longitude);
//!
//!     // Or stream bytes from anything implementing AsyncRead
//!     let file = tokio::fs::File::open("photo.jpg").await?;
//!     let exif = decode(file).await?;
//!     println!("Lens: {}", exif.lens_model);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Extracted Fields
//!
//! | Report label         | Field                      |
//! |----------------------|----------------------------|
//! | `Date/Time Original` | `date_time_original`       |
//! | `Lens Model`         | `lens_model`               |
//! | `Lens ID`            | `lens_id`                  |
//! | `Shutter Speed`      | `shutter_speed`            |
//! | `Aperture`           | `aperture`                 |
//! | `ISO`                | `iso`                      |
//! | `Focal Length`       | `focal_length`             |
//! | `GPS Latitude`       | `gps.latitude` (signed)    |
//! | `GPS Longitude`      | `gps.longitude` (signed)   |
//!
//! ## Modules
//!
//! - [`exif`] — Process invocation and report parsing
//! - [`config`] — Configuration types and loading/saving
//! - [`pipeline`] — Image collection and per-file decoding

pub mod config;
pub mod exif;
pub mod pipeline;

#[cfg(all(test, unix))]
mod testutil;
