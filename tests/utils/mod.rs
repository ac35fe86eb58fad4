pub mod actions;
pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::RoundAssertion;
#[allow(unused_imports)]
pub use setup::{init_tracing, TestSetup, TestSetupBuilder};
