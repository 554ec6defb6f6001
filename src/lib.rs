//! Keeps track of which applications you use, stores the activity as JSON and reminds you to take
//! breaks. Tracking runs as a small single-threaded loop that can be left in the background.
//!

pub mod cli;
pub mod daemon;
pub mod fs;
pub mod reminders;
pub mod settings;
pub mod utils;
pub mod window_api;
