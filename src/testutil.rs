//! Stand-in `exiftool` for tests that spawn a real process.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Bytes the fake tool accepts as a valid image.
pub(crate) const FAKE_PAYLOAD: &[u8] = b"FAKEJPEG sample image payload";

const SCRIPT: &str = r#"#!/bin/sh
if [ "$1" != "-c" ] || [ "$2" != "%.15f" ]; then
    echo "Error: unexpected arguments $*" >&2
    exit 2
fi
if [ "$3" = "-" ]; then
    payload=$(cat)
else
    payload=$(cat "$3" 2>/dev/null) || { echo "Error: File not found - $3" >&2; exit 1; }
fi
case "$payload" in
    FAKEJPEG*)
        echo "ExifTool Version Number         : 12.76"
        echo "Date/Time Original              : 2019:06:01 14:02:11"
        echo "Lens Model                      : EF50mm f/1.8 STM"
        echo "ISO                             : 100"
        echo "GPS Latitude Ref                : North"
        echo "GPS Latitude                    : 40.758896000000000 N"
        echo "GPS Longitude Ref               : West"
        echo "GPS Longitude                   : 73.985130000000000 W"
        ;;
    *)
        echo "Error: File format error" >&2
        exit 1
        ;;
esac
"#;

static FAKE: OnceLock<(TempDir, PathBuf)> = OnceLock::new();

/// Path to an executable script mimicking `exiftool -c %.15f <src>`.
///
/// Written once per test binary. Every test that spawns a process goes
/// through here first, so no fork can inherit the script's write handle
/// (which would make exec fail with ETXTBSY).
pub(crate) fn fake_exiftool() -> &'static Path {
    let (_, path) = FAKE.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exiftool");
        std::fs::write(&path, SCRIPT).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        (dir, path)
    });
    path
}
