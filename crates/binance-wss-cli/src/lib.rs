/*
[INPUT]:  Public API exports for binance-wss-cli crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod cli;
pub mod driver;
pub mod output;
pub mod settings;

// Re-export main types for convenience
pub use cli::Cli;
pub use driver::{DriverError, SessionOutcome, StopReason, run_session};
pub use output::{EventSink, OutputFormat};
pub use settings::Settings;
