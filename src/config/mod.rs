//! Service Configuration Module
//!
//! Loads the coaching relay configuration from TOML, then applies environment
//! overrides for deployment secrets and connection strings.
//!
//! ## Loading Order
//!
//! 1. `COACH_CONFIG` environment variable (path to TOML file)
//! 2. `coach_config.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! Environment overrides (`REDIS_URL`, `OPENROUTER_API_KEY`, ...) are applied on
//! top of whichever source won. The config is passed explicitly into the
//! application state; there is no global instance.

mod coach_config;
pub mod defaults;
pub mod validation;

pub use coach_config::*;
