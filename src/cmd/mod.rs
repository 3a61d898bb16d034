//! Command-line entry points.

pub mod analyze;
pub mod extract;
pub mod schema;
