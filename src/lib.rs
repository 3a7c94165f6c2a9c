// Claims Builder - Core Library
// Ledger exports → eligible addresses → claims.json → merkle.json

pub mod address;
pub mod campaign;
pub mod claims;
pub mod distribution;
pub mod error;
pub mod ledger;
pub mod merkle;
pub mod rules;

// Re-export commonly used types
pub use address::Address;
pub use campaign::{
    run_campaign, write_campaign_claims, Campaign, SourceConfig,
    CLAIMS_FILE, INPUT_DIR, MERKLE_FILE,
};
pub use claims::{build_claims, ClaimSource, ClaimsMap, CLAIM_FLAG};
pub use distribution::{parse_balance_map, ClaimEntry, DistributorInfo};
pub use error::{ClaimsError, Result};
pub use ledger::{
    get_parser, load_ledger, read_ledger,
    LedgerParser, SourceKind, TransferRow,
    NativeTransferRecord, TokenTransferRecord,
};
pub use merkle::{BalanceTree, MerkleTree};
pub use rules::{AddressColumns, EligibilityRule, MAX_CLAIM_QUANTITY, REVERTED_ERR_CODE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
