//! Command implementations

pub mod optimize;
pub mod rules;
