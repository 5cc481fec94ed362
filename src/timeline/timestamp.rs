//! Image timestamp resolution
//!
//! Capture time is encoded in each image filename as `HH-MM-SS[-mmm].ext`.
//! Highlights reference images by index into the batch's filename list.

use std::path::Path;

/// Resolve a highlight's image index against the batch filename list.
///
/// Producers disagree on whether `image_index_in_sequence` is 0- or 1-based,
/// so both readings are accepted: the 0-based reading wins whenever it is in
/// bounds, and the 1-based reading only applies to `index == len`. Negative
/// indices and indices beyond both bounds are unresolvable.
pub fn resolve_filename(filenames: &[String], index: i64) -> Option<&str> {
    let idx = usize::try_from(index).ok()?;

    if idx < filenames.len() {
        return Some(filenames[idx].as_str());
    }

    if idx >= 1 && idx <= filenames.len() {
        return Some(filenames[idx - 1].as_str());
    }

    None
}

/// Parse a capture filename into seconds since midnight.
///
/// Accepts `HH-MM-SS` or `HH-MM-SS-mmm` stems with any extension. Every part
/// must be ASCII digits; minutes and seconds must be below 60 and milliseconds
/// below 1000. Returns `None` for anything else.
pub fn parse_filename_seconds(filename: &str) -> Option<f64> {
    let stem = Path::new(filename).file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('-').collect();

    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let hours = parse_component(parts[0])?;
    let minutes = parse_component(parts[1])?;
    let seconds = parse_component(parts[2])?;
    let millis = match parts.get(3) {
        Some(part) => parse_component(part)?,
        None => 0,
    };

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return None;
    }

    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0)
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
