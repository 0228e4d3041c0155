//! Configuration structures and loading for the scan-log converter.
//!
//! Configuration loads hierarchically: a base file, an environment-specific
//! overrides file, and `APP_`-prefixed environment variables, in that order.

pub mod environment;
pub mod load;
pub mod shared;
