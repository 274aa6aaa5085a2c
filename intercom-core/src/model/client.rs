use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity the relay assigns to a connected participant. Sequential for the
/// lifetime of the relay process and never reused while it runs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
