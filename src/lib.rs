pub mod catalog;
pub mod clients;
pub mod error;
pub mod issue;
pub mod labels;
pub mod report;

mod app;
pub mod commands;
pub mod config;

// Re-export App and Config from modules
pub use app::App;
pub use config::Config;
pub use error::LabelError;
pub use labels::LabelUpdater;

// Disable colors for all tests to get clean output
#[cfg(test)]
#[ctor::ctor]
fn init_tests() {
    colored::control::set_override(false);
}
