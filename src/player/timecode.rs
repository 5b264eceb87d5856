//! Conversions between seconds, frame indices and milliseconds.
//!
//! Every function here is total: a missing, zero, negative or non-finite frame
//! rate falls back to [`DEFAULT_FPS`], and negative or non-finite times clamp
//! to zero.

use crate::constants::DEFAULT_FPS;

// Absorbs float error so that `frame_of(seconds_of(n))` lands back on `n`.
const FRAME_EPSILON: f64 = 1e-6;

/// Drops a rate that [`normalize_fps`] would replace.
pub fn known_fps(fps: Option<f64>) -> Option<f64> {
    fps.filter(|fps| fps.is_finite() && *fps > 0.0)
}

/// Frame rate to use for a possibly absent or bogus value.
pub fn normalize_fps(fps: Option<f64>) -> f64 {
    resolve_fps(fps, DEFAULT_FPS)
}

/// Like [`normalize_fps`], but falls back to a configured rate first.
pub fn resolve_fps(fps: Option<f64>, fallback: f64) -> f64 {
    known_fps(fps)
        .or_else(|| known_fps(Some(fallback)))
        .unwrap_or(DEFAULT_FPS)
}

fn sanitize_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// `floor(seconds * fps)`, except that a product less than 1e-6 below a whole
/// number counts as that frame. At 25 fps that is a window of 40ns before each
/// frame boundary.
pub fn frame_of(seconds: f64, fps: f64) -> u64 {
    let fps = normalize_fps(Some(fps));
    (sanitize_seconds(seconds) * fps + FRAME_EPSILON).floor() as u64
}

/// `frame / fps`
pub fn seconds_of(frame: u64, fps: f64) -> f64 {
    frame as f64 / normalize_fps(Some(fps))
}

/// `round(seconds * 1000)`
pub fn ms_of(seconds: f64) -> u64 {
    (sanitize_seconds(seconds) * 1000.0).round() as u64
}

/// `mm:ss`, or `h:mm:ss` from one hour up.
pub fn format_clock(seconds: f64) -> String {
    let total = sanitize_seconds(seconds).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
