use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::exif::{Decoder, Exif};

/// Image extensions picked up when walking directories.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "tif", "tiff", "gif",
    // HEIC/HEIF/AVIF
    "heic", "heif", "avif",
    // RAW formats
    "cr3", "cr2", "dng", "nef", "arw", "raf", "orf", "rw2", "pef", "srw",
];

/// The result of decoding a single image.
///
/// Exactly one of `exif` and `error` is set.
///
/// # Example
///
/// ```rust,no_run
/// # use exiftool_decode::exif::Decoder;
/// # use exiftool_decode::pipeline::decode_image;
/// # async fn example() {
/// let result = decode_image("photo.jpg".as_ref(), &Decoder::new()).await;
///
/// match (&result.exif, &result.error) {
///     (Some(exif), _) => println!("Taken: {}", exif.date_time_original),
///     (_, Some(err)) => eprintln!("Failed: {err}"),
///     _ => unreachable!(),
/// }
/// # }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct DecodeResult {
    /// Source path, or `-` for standard input.
    pub path: PathBuf,
    pub exif: Option<Exif>,
    pub error: Option<String>,
}

impl DecodeResult {
    fn new(path: PathBuf, result: Result<Exif, crate::exif::DecodeError>) -> Self {
        match result {
            Ok(exif) => Self {
                path,
                exif: Some(exif),
                error: None,
            },
            Err(e) => Self {
                path,
                exif: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Expand the given paths into the list of files to hand to `exiftool`.
///
/// A file named explicitly is kept whatever its extension, since `exiftool`
/// reads far more formats than the walk filter knows about. Directories are
/// walked recursively (following symlinks, sorted by name) and contribute only
/// files with a known image extension. A file reached twice is listed once.
///
/// # Example
///
/// ```rust,no_run
/// use exiftool_decode::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[PathBuf::from("scan.pdf"), PathBuf::from("./photos/")]);
/// println!("Decoding {} file(s)", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = Vec::new();
    let mut push = |p: PathBuf| {
        if !images.contains(&p) {
            images.push(p);
        }
    };

    for path in paths {
        if path.is_file() {
            push(path.clone());
            continue;
        }
        if !path.is_dir() {
            log::warn!("Path does not exist: {}", path.display());
            continue;
        }

        let walk = WalkDir::new(path).follow_links(true).sort_by_file_name();
        for entry in walk {
            match entry {
                Ok(entry) if entry.file_type().is_file() && has_image_extension(entry.path()) => {
                    push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => log::debug!("Skipping unreadable entry under {}: {e}", path.display()),
            }
        }
    }

    images
}

/// Whether a directory entry looks like an image `exiftool` should see.
fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Decode one image file by path. Failures are captured in the result.
pub async fn decode_image(path: &Path, decoder: &Decoder) -> DecodeResult {
    let result = decoder.decode_file_at_path(path).await;
    DecodeResult::new(path.to_path_buf(), result)
}

/// Decode an image streamed on this process's standard input.
pub async fn decode_stdin(decoder: &Decoder) -> DecodeResult {
    let result = decoder.decode(tokio::io::stdin()).await;
    DecodeResult::new(PathBuf::from("-"), result)
}

/// Decode every image in `images`, one `exiftool` run at a time.
pub async fn decode_images(images: &[PathBuf], decoder: &Decoder) -> Vec<DecodeResult> {
    let total = images.len();
    let mut results = Vec::with_capacity(total);

    for (i, image_path) in images.iter().enumerate() {
        log::info!("[{}/{}] Decoding: {}", i + 1, total, image_path.display());

        let result = decode_image(image_path, decoder).await;
        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        }
        results.push(result);
    }

    results
}
