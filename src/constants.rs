// Playback policy defaults. All of these are overridable through `[playback]`
// and `[buffering]` in config.toml.

// === Frame math ===
pub const DEFAULT_FPS: f64 = 25.0;

// === Seek settling ===
// A seek that lands within this window is treated as already complete.
pub const SETTLE_TOLERANCE_SECS: f64 = 0.05;
// Drift allowed while enforcing the target after playback starts.
pub const DRIFT_TOLERANCE_SECS: f64 = 0.25;
pub const MAX_RESEEK_ATTEMPTS: u32 = 4;

// === Hover preview ===
// Decoded preview frames further than this from the request are dropped.
pub const PREVIEW_TOLERANCE_SECS: f64 = 0.5;
pub const HOVER_DEBOUNCE_MS: u64 = 60;

// === Streaming recovery ===
pub const MAX_NETWORK_RESTARTS: u32 = 3;
pub const MAX_MEDIA_RECOVERIES: u32 = 2;

// === Media endpoints ===
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_MANIFEST_NAME: &str = "playlist.m3u8";
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

// === Result cards ===
pub const TRANSCRIPT_SNIPPET_CHARS: usize = 120;
