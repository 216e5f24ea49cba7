//! Logging utilities
//!
//! This module provides standardized logging functions for report stages.

use std::time::Duration;

/// Initialise `env_logger` with an `info` default filter.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(cfg!(test))
        .try_init();
}

/// Log a stage start with consistent format
pub fn log_stage_start(stage: &str, items: usize) {
    log::info!("{stage}: processing {items} items");
}

/// Log a stage completion with consistent format
///
/// # Arguments
/// * `stage` - Description of the stage
/// * `items` - Number of items produced
/// * `elapsed` - Optional elapsed time
pub fn log_stage_complete(stage: &str, items: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!("{stage}: produced {items} items in {duration:?}");
    } else {
        log::info!("{stage}: produced {items} items");
    }
}
