//! Normalized transfer history types.

use serde::Serialize;

use crate::error::SyncResult;
use crate::indexer::types::{parse_block_number, parse_quantity, RawTransfer};
use crate::indexer::TransferCategory;
use crate::portfolio::units::format_units_exact;
use crate::session::WalletAddress;

/// Direction of a transfer relative to the reference wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// One historical asset movement, normalized for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRecord {
    pub unique_id: String,
    /// Integer value parsed from the gateway's hex block number.
    pub block_number: u64,
    pub block_hex: String,
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub asset: Option<String>,
    pub category: TransferCategory,
    /// Raw integer value as a decimal string, when the gateway carried one.
    pub raw_value: Option<String>,
    pub decimals: u8,
    /// Exact decimal rendering of the value.
    pub value: String,
    pub direction: Direction,
}

impl TransferRecord {
    /// Normalize a raw gateway transfer against a reference wallet.
    pub fn from_raw(raw: RawTransfer, wallet: &WalletAddress) -> SyncResult<Self> {
        let block_number = parse_block_number(&raw.block_num)?;

        let decimals = match raw.raw_contract.decimal.as_deref() {
            Some(d) => {
                let q = parse_quantity(d)?;
                q.try_into().unwrap_or(u8::MAX)
            }
            None => 18,
        };

        let (raw_value, value) = match raw.raw_contract.value.as_deref() {
            Some(v) => {
                let q = parse_quantity(v)?;
                (Some(q.to_string()), format_units_exact(q, decimals))
            }
            None => (None, "0".to_string()),
        };

        let direction = match raw.to.as_deref() {
            Some(to) if to.eq_ignore_ascii_case(wallet.as_str()) => Direction::Incoming,
            _ => Direction::Outgoing,
        };

        Ok(Self {
            unique_id: raw.unique_id,
            block_number,
            block_hex: raw.block_num,
            hash: raw.hash,
            from: raw.from,
            to: raw.to,
            asset: raw.asset,
            category: raw.category,
            raw_value,
            decimals,
            value,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::types::RawContract;

    fn raw(unique_id: &str, block: &str, to: Option<&str>) -> RawTransfer {
        RawTransfer {
            unique_id: unique_id.to_string(),
            block_num: block.to_string(),
            hash: "0xhash".to_string(),
            from: "0xsender".to_string(),
            to: to.map(str::to_string),
            asset: Some("FTT".to_string()),
            category: TransferCategory::Erc20,
            raw_contract: RawContract {
                value: Some("0x16e360".to_string()),
                address: None,
                decimal: Some("0x6".to_string()),
            },
        }
    }

    #[test]
    fn test_direction_is_case_insensitive() {
        let wallet = WalletAddress::new("0xABCD").unwrap();
        let incoming = TransferRecord::from_raw(raw("1", "0x5", Some("0xabcd")), &wallet).unwrap();
        assert_eq!(incoming.direction, Direction::Incoming);

        let outgoing = TransferRecord::from_raw(raw("2", "0x5", Some("0xother")), &wallet).unwrap();
        assert_eq!(outgoing.direction, Direction::Outgoing);

        // Contract creations carry no recipient.
        let none = TransferRecord::from_raw(raw("3", "0x5", None), &wallet).unwrap();
        assert_eq!(none.direction, Direction::Outgoing);
    }

    #[test]
    fn test_value_normalized_exactly() {
        let wallet = WalletAddress::new("0xabcd").unwrap();
        let record = TransferRecord::from_raw(raw("1", "0x5", Some("0xabcd")), &wallet).unwrap();
        // 0x16e360 == 1500000 at 6 decimals
        assert_eq!(record.raw_value.as_deref(), Some("1500000"));
        assert_eq!(record.value, "1.5");
        assert_eq!(record.block_number, 5);
    }

    #[test]
    fn test_missing_value_defaults() {
        let wallet = WalletAddress::new("0xabcd").unwrap();
        let mut r = raw("1", "0x5", Some("0xabcd"));
        r.raw_contract = RawContract::default();
        let record = TransferRecord::from_raw(r, &wallet).unwrap();
        assert_eq!(record.raw_value, None);
        assert_eq!(record.value, "0");
        assert_eq!(record.decimals, 18);
    }
}
