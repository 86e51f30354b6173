// bitrate-cli/src/lib.rs
//
// Library portion of the bitrate-calc CLI application.
// Contains argument definitions, logging setup and output formatting.

pub mod cli;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::Cli;
pub use output::render_report;
