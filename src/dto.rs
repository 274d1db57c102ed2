use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::Error;

/// Parent id carried by root transactions.
pub const NO_PARENT: u64 = 0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: u64,
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub tx_type: String,
    #[serde(default, deserialize_with = "deserialize_parent_id")]
    pub parent_id: u64,
}

impl Transaction {
    pub fn new(id: u64, amount: f64, tx_type: impl Into<String>, parent_id: u64) -> Self {
        Self {
            id,
            amount,
            tx_type: tx_type.into(),
            parent_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == NO_PARENT
    }
}

/// An empty `parent_id` field means the transaction is a root.
fn deserialize_parent_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(|parent| parent.unwrap_or(NO_PARENT))
}

/// One line of the output report: a stored transaction and the sum of its subtree.
#[derive(Debug, Serialize, PartialEq)]
pub struct SumRow {
    pub id: u64,
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub parent_id: u64,
    pub sum: f64,
}

impl SumRow {
    pub fn new(transaction: Transaction, sum: f64) -> Self {
        Self {
            id: transaction.id,
            amount: transaction.amount,
            tx_type: transaction.tx_type,
            parent_id: transaction.parent_id,
            sum,
        }
    }
}

/// One line of the type report: a type label and the ids carrying it.
#[derive(Debug, Serialize, PartialEq)]
pub struct TypeRow {
    #[serde(rename = "type")]
    pub tx_type: String,
    /// Space separated, ascending.
    pub ids: String,
}

impl TypeRow {
    pub fn new(tx_type: String, ids: &BTreeSet<u64>) -> Self {
        let ids = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Self { tx_type, ids }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsertStatus {
    Ok,
    Rejected,
}

/// Outcome of inserting one input row.
#[derive(Debug, Serialize, PartialEq)]
pub struct StatusRow {
    /// 1-based position of the row in the input, header excluded.
    pub row: usize,
    pub id: u64,
    pub status: InsertStatus,
    pub reason: String,
}

impl StatusRow {
    pub fn new(row: usize, id: u64, result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => Self {
                row,
                id,
                status: InsertStatus::Ok,
                reason: String::new(),
            },
            Err(err) => Self {
                row,
                id,
                status: InsertStatus::Rejected,
                reason: err.to_string(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == InsertStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_csv_row(row: &str) -> Result<Transaction, csv::Error> {
        let data_with_header = format!("id,amount,type,parent_id\n{}", row);
        let mut reader = csv::Reader::from_reader(data_with_header.as_bytes());
        reader.deserialize().next().unwrap()
    }

    #[test]
    fn test_parse_root() {
        assert_eq!(
            parse_csv_row("10,10000,cars,0").unwrap(),
            Transaction::new(10, 10000.0, "cars", 0)
        );
    }

    #[test]
    fn test_parse_child() {
        assert_eq!(
            parse_csv_row("11,15000.5,shopping,10").unwrap(),
            Transaction::new(11, 15000.5, "shopping", 10)
        );
    }

    #[test]
    fn test_parse_negative_amount() {
        assert_eq!(
            parse_csv_row("3,-12.25,refund,1").unwrap(),
            Transaction::new(3, -12.25, "refund", 1)
        );
    }

    #[test]
    fn test_empty_parent_is_root() {
        let transaction = parse_csv_row("1,5,cars,").unwrap();
        assert_eq!(transaction.parent_id, NO_PARENT);
        assert!(transaction.is_root());
    }

    #[test]
    fn test_type_row_joins_ids() {
        let row = TypeRow::new("cars".to_string(), &BTreeSet::from([12, 3, 10]));
        assert_eq!(row.ids, "3 10 12");
        assert_eq!(TypeRow::new(String::new(), &BTreeSet::new()).ids, "");
    }

    #[test]
    fn test_status_row_from_result() {
        assert_eq!(
            StatusRow::new(1, 10, Ok(())),
            StatusRow {
                row: 1,
                id: 10,
                status: InsertStatus::Ok,
                reason: String::new(),
            }
        );

        let rejected = StatusRow::new(2, 6, Err(Error::SelfParent(6)));
        assert!(!rejected.is_ok());
        assert_eq!(rejected.status, InsertStatus::Rejected);
        assert_eq!(rejected.reason, "transaction 6 cannot be its own parent");
    }

    #[test]
    fn test_empty_type() {
        assert_eq!(
            parse_csv_row("1,5,,2").unwrap(),
            Transaction::new(1, 5.0, "", 2)
        );
    }

    #[test]
    fn test_missing_optional_columns() {
        let mut reader = csv::Reader::from_reader("id,amount\n7,1.5\n".as_bytes());
        let transaction: Transaction = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(transaction, Transaction::new(7, 1.5, "", NO_PARENT));
    }

    #[test]
    fn test_parse_invalid_amount_format() {
        assert!(parse_csv_row("1,abc,cars,0").is_err());
    }

    #[test]
    fn test_parse_negative_id() {
        assert!(parse_csv_row("-1,5,cars,0").is_err());
    }

    #[test]
    fn test_parse_invalid_parent_id() {
        assert!(parse_csv_row("1,5,cars,ten").is_err());
    }

    #[test]
    fn test_max_valid_ids() {
        assert_eq!(
            parse_csv_row(&format!("{},1.0,cars,{}", u64::MAX, u64::MAX - 1)).unwrap(),
            Transaction::new(u64::MAX, 1.0, "cars", u64::MAX - 1)
        );
    }

    #[test]
    fn test_sum_row_from_transaction() {
        let row = SumRow::new(Transaction::new(11, 15000.0, "shopping", 10), 35000.0);
        assert_eq!(
            row,
            SumRow {
                id: 11,
                amount: 15000.0,
                tx_type: "shopping".to_string(),
                parent_id: 10,
                sum: 35000.0,
            }
        );
    }
}
