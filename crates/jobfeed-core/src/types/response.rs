//! Response types handed back to the request layer.

use serde::{Deserialize, Serialize};

/// The single failure body returned for a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Machine-readable failure kind, e.g. `"PERSISTENCE"`.
    pub error: String,
    /// Human-readable detail.
    pub details: String,
}
