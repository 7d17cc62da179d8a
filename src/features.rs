//! Feature modules - lyrics timing logic separated from the front end
//!
//! Each feature module contains the core logic for a specific functionality.

pub mod lyrics;
pub mod settings;

pub use settings::Settings;
