//! CLI command implementations.

pub mod history;
pub mod holidays;
pub mod validate;
