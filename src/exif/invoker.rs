use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{ChildStderr, ChildStdout, Command};

use super::error::DecodeError;
use super::parser::{parse_report, Exif};

/// Program name looked up on `PATH` when no executable is configured.
pub const DEFAULT_EXECUTABLE: &str = "exiftool";

/// Coordinate format passed to `exiftool -c`; prints GPS values as unsigned
/// decimal degrees with a hemisphere letter, e.g. `40.758896000000000 N`.
pub const GPS_PRECISION_FMT: &str = "%.15f";

/// `exiftool` reads the image from stdin when given `-` as the file name.
const STDIN_SOURCE: &str = "-";

/// Runs `exiftool` and parses its report.
///
/// Each call spawns one process; a `Decoder` holds no process state, so it
/// can be cloned freely and used from concurrent tasks.
///
/// # Example
///
/// ```rust,no_run
/// use exiftool_decode::exif::Decoder;
///
/// # async fn example() -> Result<(), exiftool_decode::exif::DecodeError> {
/// let decoder = Decoder::with_executable("/opt/exiftool/exiftool");
///
/// let exif = decoder.decode_file_at_path("photo.jpg").await?;
/// println!("Taken: {}", exif.date_time_original);
///
/// let file = tokio::fs::File::open("photo.jpg").await?;
/// let same = decoder.decode(file).await?;
/// assert_eq!(exif, same);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    executable: PathBuf,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Decoder using `exiftool` from `PATH`.
    pub fn new() -> Self {
        Self::with_executable(DEFAULT_EXECUTABLE)
    }

    /// Decoder using a specific executable.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Stream an image into `exiftool` over stdin and parse the report.
    ///
    /// The input is copied into the child's stdin on one task while another
    /// task drains stdout and stderr, so neither pipe can fill up and stall
    /// the other. stdin is closed as soon as the copy ends, successfully or
    /// not, which is how `exiftool` sees end-of-input.
    ///
    /// Fails if the process cannot be started or exits unsuccessfully; no
    /// partial record is returned.
    pub async fn decode<R>(&self, mut input: R) -> Result<Exif, DecodeError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let mut child = self
            .command(OsStr::new(STDIN_SOURCE))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        let mut stdin = child.stdin.take().ok_or(DecodeError::Pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(DecodeError::Pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(DecodeError::Pipe("stderr"))?;

        log::debug!("Spawned {} reading from stdin", self.executable.display());

        // Owns stdin; the pipe closes when this task returns.
        tokio::spawn(async move {
            match tokio::io::copy(&mut input, &mut stdin).await {
                Ok(n) => log::debug!("Wrote {n} bytes to exiftool stdin"),
                Err(e) => log::warn!("Copying image into exiftool stdin failed: {e}"),
            }
        });

        let reader = tokio::spawn(drain(stdout, stderr));

        // Only wait on the process once its output has been fully read.
        let (out, err) = reader.await??;
        let status = child.wait().await?;

        finish(status, out, err)
    }

    /// Run `exiftool` on a file path and parse the report.
    ///
    /// Fails with `exiftool`'s own diagnostic when the file is missing,
    /// unreadable, or not a format it understands.
    pub async fn decode_file_at_path(&self, path: impl AsRef<Path>) -> Result<Exif, DecodeError> {
        let path = path.as_ref();
        log::debug!("Running {} on {}", self.executable.display(), path.display());

        let child = self
            .command(path.as_os_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;
        let output = child.wait_with_output().await?;

        finish(output.status, output.stdout, output.stderr)
    }

    fn command(&self, source: &OsStr) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("-c")
            .arg(GPS_PRECISION_FMT)
            .arg(source)
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> DecodeError {
        DecodeError::Spawn {
            program: self.executable.display().to_string(),
            source,
        }
    }
}

/// Stream an image into `exiftool` (from `PATH`) and parse the report.
///
/// Shorthand for [`Decoder::new`] followed by [`Decoder::decode`].
pub async fn decode<R>(input: R) -> Result<Exif, DecodeError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    Decoder::new().decode(input).await
}

/// Run `exiftool` (from `PATH`) on a file and parse the report.
///
/// Shorthand for [`Decoder::new`] followed by [`Decoder::decode_file_at_path`].
pub async fn decode_file_at_path(path: impl AsRef<Path>) -> Result<Exif, DecodeError> {
    Decoder::new().decode_file_at_path(path).await
}

async fn drain(mut stdout: ChildStdout, mut stderr: ChildStderr) -> std::io::Result<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    let mut err = Vec::new();
    tokio::try_join!(stdout.read_to_end(&mut out), stderr.read_to_end(&mut err))?;
    Ok((out, err))
}

fn finish(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> Result<Exif, DecodeError> {
    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
        log::debug!("exiftool failed ({status}): {stderr}");
        return Err(DecodeError::Exit { status, stderr });
    }

    log::debug!("exiftool report: {} bytes", stdout.len());
    Ok(parse_report(&stdout))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testutil::{fake_exiftool, FAKE_PAYLOAD};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn decoder() -> Decoder {
        Decoder::with_executable(fake_exiftool())
    }

    fn expected_exif() -> Exif {
        let mut exif = Exif {
            date_time_original: "2019:06:01 14:02:11".to_string(),
            lens_model: "EF50mm f/1.8 STM".to_string(),
            iso: "100".to_string(),
            ..Default::default()
        };
        exif.gps.latitude = 40.758896;
        exif.gps.longitude = -73.98513;
        exif
    }

    // ── Decoder::decode ──────────────────────────────────────────────

    #[tokio::test]
    async fn decode_stream() {
        let exif = decoder().decode(Cursor::new(FAKE_PAYLOAD.to_vec())).await.unwrap();
        assert_eq!(exif, expected_exif());
    }

    #[tokio::test]
    async fn decode_large_stream() {
        // Well past a pipe buffer, so the copy has to overlap with the child.
        let mut payload = FAKE_PAYLOAD.to_vec();
        payload.resize(4 * 1024 * 1024, b'x');

        let exif = decoder().decode(Cursor::new(payload)).await.unwrap();
        assert_eq!(exif, expected_exif());
    }

    #[tokio::test]
    async fn decode_stream_nonzero_exit() {
        let err = decoder()
            .decode(Cursor::new(b"not an image".to_vec()))
            .await
            .unwrap_err();
        match err {
            DecodeError::Exit { status, stderr } => {
                assert_eq!(status.code(), Some(1));
                assert_eq!(stderr, "Error: File format error");
            }
            other => panic!("expected Exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn decode_empty_stream_fails() {
        let err = decoder().decode(Cursor::new(Vec::new())).await.unwrap_err();
        assert!(matches!(err, DecodeError::Exit { .. }));
    }

    #[tokio::test]
    async fn decode_missing_executable() {
        // Serialize with the fixture setup before spawning anything.
        fake_exiftool();

        let err = Decoder::with_executable("/nonexistent/exiftool")
            .decode(Cursor::new(FAKE_PAYLOAD.to_vec()))
            .await
            .unwrap_err();
        match err {
            DecodeError::Spawn { program, .. } => assert_eq!(program, "/nonexistent/exiftool"),
            other => panic!("expected Spawn, got {other:?}"),
        }
    }

    // ── Decoder::decode_file_at_path ─────────────────────────────────

    #[tokio::test]
    async fn decode_path() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("photo.jpg");
        std::fs::write(&image, FAKE_PAYLOAD).unwrap();

        let exif = decoder().decode_file_at_path(&image).await.unwrap();
        assert_eq!(exif, expected_exif());
    }

    #[tokio::test]
    async fn decode_path_matches_stream() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("photo.jpg");
        std::fs::write(&image, FAKE_PAYLOAD).unwrap();

        let decoder = decoder();
        let from_path = decoder.decode_file_at_path(&image).await.unwrap();
        let file = tokio::fs::File::open(&image).await.unwrap();
        let from_stream = decoder.decode(file).await.unwrap();
        assert_eq!(from_path, from_stream);
    }

    #[tokio::test]
    async fn decode_path_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("broken.jpg");
        std::fs::write(&image, b"garbage").unwrap();

        let err = decoder().decode_file_at_path(&image).await.unwrap_err();
        assert!(matches!(err, DecodeError::Exit { .. }));
    }

    #[tokio::test]
    async fn decode_path_missing_file() {
        let err = decoder()
            .decode_file_at_path(Path::new("/nonexistent/photo.jpg"))
            .await
            .unwrap_err();
        match err {
            DecodeError::Exit { stderr, .. } => {
                assert_eq!(stderr, "Error: File not found - /nonexistent/photo.jpg");
            }
            other => panic!("expected Exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn decode_path_missing_executable() {
        fake_exiftool();

        let err = Decoder::with_executable("/nonexistent/exiftool")
            .decode_file_at_path("/nonexistent/photo.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::Spawn { .. }), "got {err:?}");
    }

    // ── concurrency ──────────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn decode_calls_are_independent() {
        let decoder = decoder();
        let mut handles = Vec::new();
        for i in 0..8 {
            let decoder = decoder.clone();
            handles.push(tokio::spawn(async move {
                let payload = if i % 2 == 0 { FAKE_PAYLOAD.to_vec() } else { b"bad".to_vec() };
                decoder.decode(Cursor::new(payload)).await
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.unwrap();
            if i % 2 == 0 {
                assert_eq!(result.unwrap(), expected_exif());
            } else {
                assert!(result.is_err());
            }
        }
    }
}
