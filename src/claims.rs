// 🎟️ Claims Builder - filter each source, union the addresses, flag them
// Pure core: no filesystem access until ClaimsMap::write

use crate::error::{ClaimsError, Result};
use crate::ledger::TransferRow;
use crate::rules::{AddressColumns, EligibilityRule};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Value every claimed address maps to
pub const CLAIM_FLAG: u64 = 1;

// ============================================================================
// CLAIM SOURCE
// ============================================================================

/// One loaded ledger with the rule that governs it
#[derive(Debug, Clone)]
pub struct ClaimSource {
    pub label: String,
    pub rows: Vec<TransferRow>,
    pub rule: EligibilityRule,
    pub columns: AddressColumns,
}

impl ClaimSource {
    pub fn new(label: &str, rows: Vec<TransferRow>, rule: EligibilityRule, columns: AddressColumns) -> Self {
        ClaimSource {
            label: label.to_string(),
            rows,
            rule,
            columns,
        }
    }

    /// Addresses contributed by the rows that pass this source's rule
    pub fn addresses(&self) -> BTreeSet<String> {
        let mut addresses = BTreeSet::new();
        let mut dropped = 0usize;

        for row in &self.rows {
            if !self.rule.matches(row) {
                dropped += 1;
                continue;
            }
            for address in self.columns.extract(row) {
                addresses.insert(address.to_string());
            }
        }

        debug!(
            source = %self.label,
            rows = self.rows.len(),
            dropped,
            addresses = addresses.len(),
            "filtered source"
        );
        addresses
    }
}

// ============================================================================
// CLAIMS MAP
// ============================================================================

/// Address → 1. Keys are kept sorted so the serialized file is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimsMap {
    claims: BTreeMap<String, u64>,
}

impl ClaimsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_addresses<I>(addresses: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        ClaimsMap {
            claims: addresses.into_iter().map(|a| (a, CLAIM_FLAG)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.claims.contains_key(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.claims.keys().map(|k| k.as_str())
    }

    /// View as a balance map (every amount is the claim flag)
    pub fn balances(&self) -> &BTreeMap<String, u64> {
        &self.claims
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write to `path`, replacing it only once the new content is complete.
    /// Returns the SHA-256 of the bytes written.
    pub fn write(&self, path: &Path) -> Result<String> {
        let json = self.to_json()?;
        replace_file(path, json.as_bytes())?;

        let digest = format!("{:x}", Sha256::digest(json.as_bytes()));
        info!(path = %path.display(), claims = self.len(), sha256 = %digest, "wrote claims");
        Ok(digest)
    }

    /// Read a previously written claims file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ClaimsError::MissingInput {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Write `bytes` to a sibling temp file, then rename it over `path`
pub(crate) fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ClaimsError::Io(e.error))?;
    Ok(())
}

// ============================================================================
// BUILDER
// ============================================================================

/// Union every source's qualifying addresses into one claims map
pub fn build_claims(sources: &[ClaimSource]) -> ClaimsMap {
    let mut claim_set = BTreeSet::new();

    for source in sources {
        claim_set.extend(source.addresses());
    }

    info!(sources = sources.len(), claims = claim_set.len(), "built claims");
    ClaimsMap::from_addresses(claim_set)
}

// ============================================================================
// TESTS
// ============================================================================
