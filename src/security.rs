use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Identity/trust object decoded from a peer-supplied credential blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blessings {
    root: String,
    chain: Vec<String>,
}

impl Blessings {
    pub fn new(root: impl Into<String>, chain: Vec<String>) -> Self {
        Self {
            root: root.into(),
            chain,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }
}

/// Fatal failure decoding the peer credential at startup. Without the
/// credential no typed call can be trusted, so callers abort initialization.
#[derive(Debug, Error)]
#[error("decoding credential blob: {0}")]
pub struct BootstrapError(#[source] bincode::Error);

/// One-shot decode of a peer-supplied credential blob.
///
/// Not re-attempted on failure: the blob is handed over exactly once during
/// bootstrap, before any call is issued.
pub fn decode_blessings(blob: &[u8]) -> Result<Blessings, BootstrapError> {
    bincode::deserialize(blob).map_err(BootstrapError)
}

/// The local security principal: the set of blessing roots this process
/// trusts.
#[derive(Debug, Default)]
pub struct Principal {
    roots: Mutex<Vec<Blessings>>,
}

impl Principal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `blessings` as a trust root. Idempotent: registering the
    /// same blessings again leaves a single entry.
    pub fn add_to_roots(&self, blessings: Blessings) {
        let mut roots = match self.roots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !roots.contains(&blessings) {
            roots.push(blessings);
        }
    }

    pub fn trusts(&self, blessings: &Blessings) -> bool {
        let roots = match self.roots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        roots.contains(blessings)
    }

    /// Snapshot of the registered roots.
    pub fn roots(&self) -> Vec<Blessings> {
        let roots = match self.roots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        roots.clone()
    }
}
