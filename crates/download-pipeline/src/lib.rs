mod expansion;
pub use expansion::*;

mod pipeline;
pub use pipeline::*;

mod pool;
pub use pool::*;

mod selection;
pub use selection::*;

mod store;
pub use store::*;

mod traits;
pub use traits::*;

mod types;
pub use types::*;

#[cfg(test)]
mod mocks;





pub use tokio_util::sync::CancellationToken;

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;
use uuid::Uuid;

// RequestId
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for RequestId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Uuid> for RequestId {
    fn from(value: Uuid) -> Self {
        RequestId(value)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(RequestId)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
