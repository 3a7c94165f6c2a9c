// ⚙️ Campaign configuration - which ledgers feed a drop, under which rule
// Fixed at compile time; the binary always runs Campaign::active()

use crate::claims::{build_claims, ClaimSource, ClaimsMap};
use crate::error::Result;
use crate::ledger::{load_ledger, SourceKind};
use crate::rules::{AddressColumns, EligibilityRule};
use std::path::Path;
use tracing::info;

/// Directory (relative to the working directory) holding the explorer exports
pub const INPUT_DIR: &str = "data";

/// Output of the claims run
pub const CLAIMS_FILE: &str = "claims.json";

/// Output of the distribution run
pub const MERKLE_FILE: &str = "merkle.json";

/// Hoodie token transfers exported on 2021-03-13
pub const HOODIE_TRANSFERS_FILE: &str = "3.13.21.csv";
/// First friend-drop contract transactions export
pub const FRIEND_DROP_FILE: &str = "friend-drop.csv";
/// Second friend-drop contract transactions export
pub const FRIEND_DROP_SECOND_FILE: &str = "friend-drop-2.csv";

// ============================================================================
// SOURCE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub label: &'static str,
    /// File name under INPUT_DIR
    pub file: &'static str,
    pub kind: SourceKind,
    pub rule: EligibilityRule,
    pub columns: AddressColumns,
}

impl SourceConfig {
    /// Token ledger: 0 < Quantity <= 69, sender and recipient
    pub fn token_drop(label: &'static str, file: &'static str) -> Self {
        SourceConfig {
            label,
            file,
            kind: SourceKind::TokenTransfers,
            rule: EligibilityRule::token_drop(),
            columns: AddressColumns::FromAndTo,
        }
    }

    /// Native ledger into the drop contract: paid and not reverted, sender only
    pub fn contract_payment(label: &'static str, file: &'static str) -> Self {
        SourceConfig {
            label,
            file,
            kind: SourceKind::NativeTransfers,
            rule: EligibilityRule::Successful,
            columns: AddressColumns::FromOnly,
        }
    }

    /// Load the ledger and attach its rule
    pub fn load(&self, base_dir: &Path) -> Result<ClaimSource> {
        let path = base_dir.join(INPUT_DIR).join(self.file);
        let rows = load_ledger(self.kind, &path)?;
        info!(source = self.label, kind = self.kind.code(), rows = rows.len(), "loaded ledger");
        Ok(ClaimSource::new(self.label, rows, self.rule, self.columns))
    }
}

// ============================================================================
// CAMPAIGN
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub name: &'static str,
    pub sources: Vec<SourceConfig>,
}

impl Campaign {
    pub fn hoodie() -> Self {
        Campaign {
            name: "hoodie",
            sources: vec![SourceConfig::token_drop("hoodie-transfers", HOODIE_TRANSFERS_FILE)],
        }
    }

    pub fn friend_drop() -> Self {
        Campaign {
            name: "friend-drop",
            sources: vec![
                SourceConfig::token_drop("hoodie-transfers", HOODIE_TRANSFERS_FILE),
                SourceConfig::contract_payment("friend-drop", FRIEND_DROP_FILE),
            ],
        }
    }

    pub fn friend_drop_extended() -> Self {
        let mut campaign = Self::friend_drop();
        campaign.name = "friend-drop-extended";
        campaign
            .sources
            .push(SourceConfig::contract_payment("friend-drop-2", FRIEND_DROP_SECOND_FILE));
        campaign
    }

    /// The configuration the binary runs
    pub fn active() -> Self {
        Self::friend_drop_extended()
    }
}

/// Load every source of a campaign, then build the claims map.
/// Fails on the first unreadable source; nothing is written here.
pub fn run_campaign(campaign: &Campaign, base_dir: &Path) -> Result<ClaimsMap> {
    let sources = campaign
        .sources
        .iter()
        .map(|config| config.load(base_dir))
        .collect::<Result<Vec<_>>>()?;

    Ok(build_claims(&sources))
}

/// Run a campaign and write its claims to `out_path`.
/// Returns the claims and the SHA-256 of the written file. `out_path` is
/// untouched unless every source loaded.
pub fn write_campaign_claims(campaign: &Campaign, base_dir: &Path, out_path: &Path) -> Result<(ClaimsMap, String)> {
    let claims = run_campaign(campaign, base_dir)?;
    let digest = claims.write(out_path)?;
    Ok((claims, digest))
}

// ============================================================================
// TESTS
// ============================================================================
