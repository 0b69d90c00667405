use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Metadata read from an `exiftool` report.
///
/// Every field keeps its default when the report has no matching line.
/// String values are copied verbatim, so `date_time_original` is whatever
/// `exiftool` printed (e.g. `"2019:06:01 14:02:11"`), not a parsed timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exif {
    pub date_time_original: String,
    pub lens_model: String,
    pub lens_id: String,
    pub shutter_speed: String,
    pub aperture: String,
    pub iso: String,
    pub focal_length: String,
    pub gps: Gps,
}

/// Signed decimal coordinates.
///
/// `0.0` means either "not present in the report" or "present but
/// unparseable"; there is no way to tell those apart from a real position on
/// the equator or the prime meridian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Gps {
    pub latitude: f64,
    pub longitude: f64,
}

/// Label/value separator used by the human-readable report.
const SEPARATOR: &str = ": ";

/// A label pattern and the field it fills.
struct Rule {
    pattern: Regex,
    apply: fn(&mut Exif, &str),
}

fn rule(pattern: &str, apply: fn(&mut Exif, &str)) -> Rule {
    Rule {
        pattern: Regex::new(&format!("(?i){pattern}")).expect("label pattern must compile"),
        apply,
    }
}

// Checked in order; the first match owns the line. Matching ignores case and
// is unanchored, so "ISO" also fires on labels like "Comparison Mode" that
// merely contain the letters "iso".
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule("Date/Time Original", |e, v| e.date_time_original = v.to_string()),
        rule("Lens Model", |e, v| e.lens_model = v.to_string()),
        rule("Lens ID", |e, v| e.lens_id = v.to_string()),
        rule("Shutter Speed", |e, v| e.shutter_speed = v.to_string()),
        rule("Aperture", |e, v| e.aperture = v.to_string()),
        rule("ISO", |e, v| e.iso = v.to_string()),
        rule("Focal Length", |e, v| e.focal_length = v.to_string()),
        // exiftool pads labels to a fixed width, so "GPS Latitude Ref" and
        // friends are excluded by requiring one or more spaces, and nothing
        // else, after the name.
        rule("GPS Latitude +$", |e, v| {
            apply_coordinate(&mut e.gps.latitude, v)
        }),
        rule("GPS Longitude +$", |e, v| {
            apply_coordinate(&mut e.gps.longitude, v)
        }),
    ]
});

/// Parse the text report printed by `exiftool` into an [`Exif`] record.
///
/// Never fails: lines without a `": "` separator or with an unknown label are
/// skipped, and a coordinate whose magnitude is not a number leaves that
/// coordinate untouched. When a label occurs more than once the last
/// occurrence wins.
///
/// ```rust
/// use exiftool_decode::exif::parse_report;
///
/// let report = b"Date/Time Original              : 2019:06:01 14:02:11\n\
///                GPS Latitude                    : 40.758896 N\n\
///                GPS Longitude                   : 73.985130 W\n";
/// let exif = parse_report(report);
/// assert_eq!(exif.date_time_original, "2019:06:01 14:02:11");
/// assert_eq!(exif.gps.latitude, 40.758896);
/// assert_eq!(exif.gps.longitude, -73.985130);
/// ```
pub fn parse_report(out: &[u8]) -> Exif {
    let text = String::from_utf8_lossy(out);
    let mut exif = Exif::default();

    for line in text.lines() {
        let Some((label, value)) = line.split_once(SEPARATOR) else {
            continue;
        };

        if let Some(rule) = RULES.iter().find(|r| r.pattern.is_match(label)) {
            (rule.apply)(&mut exif, value);
        }
    }

    exif
}

fn apply_coordinate(slot: &mut f64, value: &str) {
    match coordinate_from_str(value) {
        Some(v) => *slot = v,
        None => log::debug!("Ignoring unparseable coordinate {value:?}"),
    }
}

/// Convert `"<magnitude> <hemisphere>"` to a signed degree value.
///
/// Tokens after the hemisphere letter are ignored. A missing hemisphere
/// counts as positive.
fn coordinate_from_str(coord: &str) -> Option<f64> {
    let mut parts = coord.split(' ');
    let magnitude: f64 = parts.next()?.parse().ok()?;
    let hemisphere = parts.next().unwrap_or_default();

    match hemisphere {
        "W" | "S" => Some(-magnitude),
        _ => Some(magnitude),
    }
}
