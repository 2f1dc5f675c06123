use std::fmt::Display;

use async_trait::async_trait;

mod client;
mod error;
pub use error::*;
mod handle;
pub use handle::*;
mod result;
pub use result::*;
pub mod http;
pub use http::HttpProber;
pub mod vars;
pub use vars::VarsProber;

use crate::alert::AlertError;

/// A single external health check.
///
/// Implementations are immutable once built, so one prober may be probed
/// from many tasks at once.
#[async_trait]
pub trait Prober: Display + Send + Sync {
    fn kind(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    async fn probe(&self) -> ProbeResult;

    async fn alert(
        &self,
        name: &str,
        desc: &str,
        badness: u32,
        records: &Records,
    ) -> Result<(), AlertError>;
}
