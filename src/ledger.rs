// 📒 Ledger Reader - block explorer CSV exports
// Typed decode for token-transfer and native-transfer ledgers

use crate::error::{ClaimsError, Result};
use csv::{ReaderBuilder, StringRecord};
use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceKind - Which explorer export a file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Token transfer export (`Quantity` column)
    TokenTransfers,
    /// Native currency transactions export (`Value_IN(ETH)` column)
    NativeTransfers,
}

impl SourceKind {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SourceKind::TokenTransfers => "Token transfers",
            SourceKind::NativeTransfers => "Native transfers",
        }
    }

    /// Short code for internal use
    pub fn code(&self) -> &str {
        match self {
            SourceKind::TokenTransfers => "token",
            SourceKind::NativeTransfers => "native",
        }
    }

    /// Columns that must be present in the header row
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            SourceKind::TokenTransfers => &["From", "To", "Quantity"],
            SourceKind::NativeTransfers => &["From", "To", "Value_IN(ETH)", "ErrCode"],
        }
    }
}

/// TransferRow - normalized row the eligibility rules run against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRow {
    pub from: String,
    pub to: String,
    /// `Quantity` for token ledgers, `Value_IN(ETH)` for native ledgers.
    /// None when the export left the cell blank.
    pub amount: Option<f64>,
    /// Empty when the transaction succeeded
    pub err_code: String,
}

impl TransferRow {
    pub fn new(from: &str, to: &str, amount: f64) -> Self {
        TransferRow {
            from: from.to_string(),
            to: to.to_string(),
            amount: Some(amount),
            err_code: String::new(),
        }
    }

    /// Row whose amount cell was blank
    pub fn without_amount(from: &str, to: &str) -> Self {
        TransferRow {
            amount: None,
            ..TransferRow::new(from, to, 0.0)
        }
    }

    /// Builder pattern: add an error label
    pub fn with_err_code(mut self, err_code: &str) -> Self {
        self.err_code = err_code.to_string();
        self
    }
}

// ============================================================================
// TYPED RECORDS (one per export schema)
// ============================================================================

/// Token transfer export row. Extra columns (Txhash, DateTime, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenTransferRecord {
    #[serde(rename = "From")]
    pub from: String,

    #[serde(rename = "To")]
    pub to: String,

    #[serde(rename = "Quantity", deserialize_with = "deserialize_amount")]
    pub quantity: Option<f64>,
}

/// Native currency export row.
#[derive(Debug, Clone, Deserialize)]
pub struct NativeTransferRecord {
    #[serde(rename = "From")]
    pub from: String,

    #[serde(rename = "To")]
    pub to: String,

    #[serde(rename = "Value_IN(ETH)", deserialize_with = "deserialize_amount")]
    pub value_in: Option<f64>,

    #[serde(rename = "ErrCode", default)]
    pub err_code: String,
}

/// A typed export row that can be normalized into a TransferRow
pub trait LedgerRecord: DeserializeOwned {
    const KIND: SourceKind;

    fn into_row(self) -> TransferRow;
}

impl LedgerRecord for TokenTransferRecord {
    const KIND: SourceKind = SourceKind::TokenTransfers;

    fn into_row(self) -> TransferRow {
        TransferRow {
            from: self.from,
            to: self.to,
            amount: self.quantity,
            err_code: String::new(),
        }
    }
}

impl LedgerRecord for NativeTransferRecord {
    const KIND: SourceKind = SourceKind::NativeTransfers;

    fn into_row(self) -> TransferRow {
        TransferRow {
            from: self.from,
            to: self.to,
            amount: self.value_in,
            err_code: self.err_code,
        }
    }
}

// Explorer exports format large token quantities as "1,000.5".
// A blank cell is no amount; no rule accepts it.
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|_| DeError::custom(format!("invalid amount '{}'", raw)))
}

// ============================================================================
// PARSERS
// ============================================================================

/// LedgerParser - one implementation per export schema
pub trait LedgerParser {
    /// Get the source kind this parser handles
    fn source_kind(&self) -> SourceKind;

    /// Parse rows from any reader. `label` names the source in errors.
    fn parse_reader(&self, label: &str, reader: &mut dyn Read) -> Result<Vec<TransferRow>>;

    /// Parse a ledger file from disk
    fn parse(&self, file_path: &Path) -> Result<Vec<TransferRow>> {
        let mut file = File::open(file_path).map_err(|e| ClaimsError::MissingInput {
            path: file_path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.parse_reader(&file_path.display().to_string(), &mut file)
    }
}

/// Token transfer ledger parser
pub struct TokenLedgerParser;

impl LedgerParser for TokenLedgerParser {
    fn source_kind(&self) -> SourceKind {
        SourceKind::TokenTransfers
    }

    fn parse_reader(&self, label: &str, reader: &mut dyn Read) -> Result<Vec<TransferRow>> {
        decode_records::<TokenTransferRecord>(label, reader)
    }
}

/// Native currency ledger parser
pub struct NativeLedgerParser;

impl LedgerParser for NativeLedgerParser {
    fn source_kind(&self) -> SourceKind {
        SourceKind::NativeTransfers
    }

    fn parse_reader(&self, label: &str, reader: &mut dyn Read) -> Result<Vec<TransferRow>> {
        decode_records::<NativeTransferRecord>(label, reader)
    }
}

/// Get the parser for a source kind
pub fn get_parser(kind: SourceKind) -> Box<dyn LedgerParser> {
    match kind {
        SourceKind::TokenTransfers => Box::new(TokenLedgerParser),
        SourceKind::NativeTransfers => Box::new(NativeLedgerParser),
    }
}

/// Load a ledger file of the given kind
pub fn load_ledger(kind: SourceKind, path: &Path) -> Result<Vec<TransferRow>> {
    get_parser(kind).parse(path)
}

/// Decode a ledger of the given kind from an in-memory or streamed reader
pub fn read_ledger(kind: SourceKind, label: &str, reader: &mut dyn Read) -> Result<Vec<TransferRow>> {
    get_parser(kind).parse_reader(label, reader)
}

fn decode_records<T: LedgerRecord>(label: &str, reader: &mut dyn Read) -> Result<Vec<TransferRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ClaimsError::Parse {
            source_name: label.to_string(),
            line: 1,
            reason: e.to_string(),
        })?
        .clone();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ClaimsError::MissingInput {
            path: label.to_string(),
            reason: "no header row".to_string(),
        });
    }

    // Some exports start with a UTF-8 BOM glued to the first header
    let headers: StringRecord = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();

    for column in T::KIND.required_columns() {
        if !headers.iter().any(|h| h == *column) {
            return Err(ClaimsError::Schema {
                source_name: label.to_string(),
                column: column.to_string(),
            });
        }
    }
    rdr.set_headers(headers);

    let mut rows = Vec::new();
    for (index, result) in rdr.deserialize::<T>().enumerate() {
        let record = result.map_err(|e| ClaimsError::Parse {
            source_name: label.to_string(),
            line: e
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(index + 2), // +2: 1-indexed + header row
            reason: e.to_string(),
        })?;
        rows.push(record.into_row());
    }

    debug!(source = label, kind = T::KIND.code(), rows = rows.len(), "decoded ledger");
    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOKEN_CSV: &str = "\"Txhash\",\"UnixTimestamp\",\"DateTime\",\"From\",\"To\",\"Quantity\",\"Method\"\n\
        \"0x01\",\"1615680000\",\"2021-03-14 00:00:00\",\"0xaaa\",\"0xbbb\",\"10\",\"Transfer\"\n\
        \"0x02\",\"1615680001\",\"2021-03-14 00:00:01\",\"0xccc\",\"0xddd\",\"1,070\",\"Transfer\"\n";

    const NATIVE_CSV: &str = "Txhash,Blockno,From,To,Value_IN(ETH),Value_OUT(ETH),Status,ErrCode\n\
        0x01,100,0xaaa,0xcontract,0.05,0,,\n\
        0x02,101,0xbbb,0xcontract,0.05,0,Error(0),Reverted\n";

    #[test]
    fn test_source_kind_names() {
        assert_eq!(SourceKind::TokenTransfers.name(), "Token transfers");
        assert_eq!(SourceKind::NativeTransfers.name(), "Native transfers");
        assert_eq!(SourceKind::TokenTransfers.code(), "token");
        assert_eq!(SourceKind::NativeTransfers.code(), "native");
    }

    #[test]
    fn test_get_parser_kinds() {
        assert_eq!(get_parser(SourceKind::TokenTransfers).source_kind(), SourceKind::TokenTransfers);
        assert_eq!(get_parser(SourceKind::NativeTransfers).source_kind(), SourceKind::NativeTransfers);
    }

    #[test]
    fn test_token_ledger_parse() {
        let rows = read_ledger(SourceKind::TokenTransfers, "token", &mut TOKEN_CSV.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], TransferRow::new("0xaaa", "0xbbb", 10.0));
        // Thousands separator stripped
        assert_eq!(rows[1].amount, Some(1070.0));
        assert_eq!(rows[1].err_code, "");
    }

    #[test]
    fn test_native_ledger_parse() {
        let rows = read_ledger(SourceKind::NativeTransfers, "native", &mut NATIVE_CSV.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].from, "0xaaa");
        assert_eq!(rows[0].amount, Some(0.05));
        assert_eq!(rows[0].err_code, "");
        assert_eq!(rows[1].err_code, "Reverted");
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = "From,To,Value\n0xaaa,0xbbb,1\n";
        let err = read_ledger(SourceKind::TokenTransfers, "token", &mut csv.as_bytes()).unwrap_err();

        match err {
            ClaimsError::Schema { source_name, column } => {
                assert_eq!(source_name, "token");
                assert_eq!(column, "Quantity");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_checked_before_rows() {
        // Header-only file still fails when a column is missing
        let csv = "From,To,Value_IN(ETH)\n";
        let err = read_ledger(SourceKind::NativeTransfers, "native", &mut csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ClaimsError::Schema { ref column, .. } if column == "ErrCode"));
    }

    #[test]
    fn test_bad_amount_is_parse_error() {
        let csv = "From,To,Quantity\n0xaaa,0xbbb,1\n0xccc,0xddd,lots\n";
        let err = read_ledger(SourceKind::TokenTransfers, "token", &mut csv.as_bytes()).unwrap_err();

        match err {
            ClaimsError::Parse { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("lots"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_amount_decodes_as_none() {
        let csv = "From,To,Quantity\n0xa,0xb,\n0xc,0xd,5\n0xe,0xf,  \n";
        let rows = read_ledger(SourceKind::TokenTransfers, "token", &mut csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], TransferRow::without_amount("0xa", "0xb"));
        assert_eq!(rows[1], TransferRow::new("0xc", "0xd", 5.0));
        assert_eq!(rows[2].amount, None);
    }

    #[test]
    fn test_blank_native_value_decodes_as_none() {
        let csv = "From,To,Value_IN(ETH),ErrCode\n0xa,0xdrop,,\n";
        let rows = read_ledger(SourceKind::NativeTransfers, "native", &mut csv.as_bytes()).unwrap();
        assert_eq!(rows[0].amount, None);
    }

    #[test]
    fn test_empty_file_is_missing_input() {
        let err = read_ledger(SourceKind::TokenTransfers, "token", &mut "".as_bytes()).unwrap_err();

        match err {
            ClaimsError::MissingInput { path, reason } => {
                assert_eq!(path, "token");
                assert_eq!(reason, "no header row");
            }
            other => panic!("expected missing input, got {:?}", other),
        }
    }

    #[test]
    fn test_bom_header_accepted() {
        let csv = "\u{feff}From,To,Quantity\n0xaaa,0xbbb,5\n";
        let rows = read_ledger(SourceKind::TokenTransfers, "token", &mut csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].from, "0xaaa");
    }

    #[test]
    fn test_load_ledger_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TOKEN_CSV.as_bytes()).unwrap();

        let rows = load_ledger(SourceKind::TokenTransfers, file.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_load_ledger_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        let err = load_ledger(SourceKind::TokenTransfers, &path).unwrap_err();
        assert!(matches!(err, ClaimsError::MissingInput { .. }));
    }
}
