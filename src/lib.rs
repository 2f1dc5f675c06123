//! Pluggable health-check probers that alert by email when a check fails.
//!
//! A [`Prober`] performs one check and knows how to raise an alert about
//! it. [`Probe`] registers a prober under a name with the hints a runner
//! needs to drive it.

pub mod alert;
pub use alert::*;
pub mod cmd;
pub mod conf;
pub mod global;
pub use global::*;
pub mod probe;
pub use probe::*;
