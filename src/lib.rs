//! Back-office service that registers employees for partner companies and
//! provisions a login identity for each record in a single guarded pipeline.

pub mod config;
pub mod error;
pub mod infra;
pub mod telemetry;
pub mod workflows;
