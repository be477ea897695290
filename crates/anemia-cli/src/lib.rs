//! CLI library components for the anemia dashboard.

pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod types;
