//! Crowd-verified road hazard reporting with community voting and reputation.

pub mod config;
pub mod error;
pub mod geo;
pub mod store;
pub mod telemetry;
pub mod workflows;
