// Review client for a video retrieval backend: search, frame-accurate
// review modal and evaluation submits.

pub mod api;
pub mod config;
pub mod constants;
pub mod models;
pub mod player;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use utils::{AppError, AppResult};
