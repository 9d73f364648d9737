// Library surface shared by the binary and the headless integration tests.
pub mod alarm;
pub mod app;
pub mod app_dirs;
pub mod audio;
pub mod coin;
pub mod config;
pub mod countdown;
pub mod flow;
pub mod hour_picker;
pub mod layout;
pub mod runtime;
pub mod schedule;
pub mod shuffle;
pub mod ui;

/// How often the event loop wakes up to poll widget timers
pub const TICK_RATE_MS: u64 = 100;
