// Round progression for knockout brackets and the knockout stage of grouped tournaments

// Public API - what other modules can use
pub use tracker::{Advancement, ProgressionTracker};

// Internal modules
mod rounds;
mod tracker;
