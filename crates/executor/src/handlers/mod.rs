//! Command handlers, one module per area

pub mod devices;
pub mod jobs;
pub mod queries;
