//! Shared request/record types.

mod profile;
mod telemetry;

pub use profile::*;
pub use telemetry::*;
