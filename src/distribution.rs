// 📦 Distribution - balance map → Merkle distributor payload (merkle.json)

use crate::address::Address;
use crate::claims::replace_file;
use crate::error::{ClaimsError, Result};
use crate::merkle::{to_hex, BalanceTree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub index: u64,
    /// Minimal even-length hex, e.g. "0x01"
    pub amount: String,
    pub proof: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorInfo {
    pub merkle_root: String,
    pub token_total: String,
    /// Keyed by checksummed address
    pub claims: BTreeMap<String, ClaimEntry>,
}

impl DistributorInfo {
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        replace_file(path, json.as_bytes())?;
        info!(path = %path.display(), claims = self.claims.len(), root = %self.merkle_root, "wrote distribution");
        Ok(())
    }
}

/// Hex quantity the way the distributor frontend expects it: "0x" + even number of digits
pub fn hex_quantity(value: u128) -> String {
    let digits = format!("{:x}", value);
    if digits.len() % 2 == 1 {
        format!("0x0{}", digits)
    } else {
        format!("0x{}", digits)
    }
}

/// Build the distributor payload. Accounts are indexed in checksummed-string order.
pub fn parse_balance_map(balances: &BTreeMap<String, u64>) -> Result<DistributorInfo> {
    let mut by_address: HashMap<Address, u64> = HashMap::new();

    for (raw, amount) in balances {
        let address: Address = raw.parse()?;
        if *amount == 0 {
            return Err(ClaimsError::InvalidAmount(raw.clone()));
        }
        if by_address.insert(address, *amount).is_some() {
            return Err(ClaimsError::DuplicateAddress(address.to_checksum()));
        }
    }

    let mut sorted: Vec<(String, Address, u64)> = by_address
        .into_iter()
        .map(|(address, amount)| (address.to_checksum(), address, amount))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let entries: Vec<(Address, u64)> = sorted.iter().map(|(_, address, amount)| (*address, *amount)).collect();
    let tree = BalanceTree::new(&entries);

    let mut claims = BTreeMap::new();
    let mut token_total: u128 = 0;
    for (index, (checksum, address, amount)) in sorted.iter().enumerate() {
        let proof = tree
            .proof(index as u64, address, *amount)
            .ok_or_else(|| ClaimsError::InvalidAddress(format!("{} has no leaf in the balance tree", checksum)))?;

        claims.insert(
            checksum.clone(),
            ClaimEntry {
                index: index as u64,
                amount: hex_quantity(*amount as u128),
                proof: proof.iter().map(to_hex).collect(),
            },
        );
        token_total += *amount as u128;
    }

    Ok(DistributorInfo {
        merkle_root: tree.hex_root(),
        token_total: hex_quantity(token_total),
        claims,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::Hash;
    use std::fs;

    const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const BOB: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const CAROL: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

    fn balances(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries.iter().map(|(a, n)| (a.to_string(), *n)).collect()
    }

    fn decode_hash(s: &str) -> Hash {
        let mut out = [0u8; 32];
        hex::decode_to_slice(&s[2..], &mut out).unwrap();
        out
    }

    #[test]
    fn test_hex_quantity() {
        assert_eq!(hex_quantity(0), "0x00");
        assert_eq!(hex_quantity(1), "0x01");
        assert_eq!(hex_quantity(255), "0xff");
        assert_eq!(hex_quantity(300), "0x012c");
    }

    #[test]
    fn test_claims_are_checksummed_and_sorted() {
        let info = parse_balance_map(&balances(&[
            (CAROL.to_lowercase().as_str(), 1),
            (ALICE.to_lowercase().as_str(), 1),
            (BOB.to_lowercase().as_str(), 1),
        ]))
        .unwrap();

        assert_eq!(info.token_total, "0x03");
        // "0x5a" < "0xdb" < "0xfB" as strings
        assert_eq!(info.claims[ALICE].index, 0);
        assert_eq!(info.claims[CAROL].index, 1);
        assert_eq!(info.claims[BOB].index, 2);
        assert_eq!(info.claims[ALICE].amount, "0x01");
    }

    #[test]
    fn test_every_claim_verifies() {
        let info = parse_balance_map(&balances(&[(ALICE, 1), (BOB, 5), (CAROL, 300)])).unwrap();
        let root = decode_hash(&info.merkle_root);

        for (account, claim) in &info.claims {
            let address: Address = account.parse().unwrap();
            let amount = u64::from_str_radix(&claim.amount[2..], 16).unwrap();
            let proof: Vec<Hash> = claim.proof.iter().map(|p| decode_hash(p)).collect();

            assert!(BalanceTree::verify_proof(claim.index, &address, amount, &proof, &root));
        }
        assert_eq!(info.token_total, hex_quantity(306));
    }

    #[test]
    fn test_duplicate_after_normalization() {
        let err = parse_balance_map(&balances(&[(ALICE, 1), (ALICE.to_lowercase().as_str(), 1)])).unwrap_err();
        assert!(matches!(err, ClaimsError::DuplicateAddress(ref a) if a == ALICE));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            parse_balance_map(&balances(&[("not-an-address", 1)])),
            Err(ClaimsError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_balance_map(&balances(&[(ALICE, 0)])),
            Err(ClaimsError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_payload_json_shape() {
        let info = parse_balance_map(&balances(&[(ALICE, 1)])).unwrap();
        let value = serde_json::to_value(&info).unwrap();

        assert!(value.get("merkleRoot").is_some());
        assert_eq!(value["tokenTotal"], "0x01");
        assert_eq!(value["claims"][ALICE]["index"], 0);
        assert_eq!(value["claims"][ALICE]["proof"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_write_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merkle.json");
        let info = parse_balance_map(&balances(&[(ALICE, 1), (BOB, 1)])).unwrap();

        info.write(&path).unwrap();
        let loaded: DistributorInfo = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, info);
    }
}
