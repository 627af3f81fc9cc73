//! One module per CLI subcommand, each adding a `cmd_*` method to [`crate::App`].

pub mod add;
pub mod garden;
pub mod init;
pub mod labels;
pub mod remove;
pub mod replace;
