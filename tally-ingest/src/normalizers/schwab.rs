//! Schwab checking/brokerage CSV exports.
//!
//! Expected header:
//!   Date,Type,Check #,Description,Withdrawal (-),Deposit (+),RunningBalance
//!
//! Two columns are repurposed for the sheet layout: `Type` carries a copy of
//! the normalized date and `RunningBalance` carries the category derived from
//! the description. Both are filled after every directly mapped column is in
//! place, so source column order does not matter.

use tally_core::{CanonicalRow, Institution, NormalizationTable, RawRow};

use super::{RowNormalizer, Verdict, lacks_amount};

pub const CHECK_NUMBER_COLUMN: &str = "Check #";
pub const TYPE_COLUMN: &str = "Type";
pub const RUNNING_BALANCE_COLUMN: &str = "RunningBalance";

/// Canonical fields the derived columns read from.
pub const TIMESTAMP_FIELD: &str = "Timestamp";
pub const ITEM_FIELD: &str = "Item";

#[derive(Debug, Clone, Copy)]
enum Derived {
    /// Copy of the canonical Timestamp
    Date,
    /// Canonical Item run through the category lookup
    CategoryFromItem,
}

pub struct SchwabNormalizer;

impl RowNormalizer for SchwabNormalizer {
    fn normalize(&self, raw: &RawRow, table: &NormalizationTable) -> Verdict {
        if lacks_amount(Institution::Schwab, raw) {
            return Verdict::Dropped;
        }

        let mut out = CanonicalRow::new();
        let mut derived: Vec<(&str, Derived)> = Vec::new();

        for (key, value) in raw.iter() {
            let canonical = table.canonical_key_or_source(key);
            match key {
                CHECK_NUMBER_COLUMN => continue,
                TYPE_COLUMN => {
                    // placeholder keeps the column position
                    out.insert(canonical, "");
                    derived.push((canonical, Derived::Date));
                }
                RUNNING_BALANCE_COLUMN => {
                    out.insert(canonical, "");
                    derived.push((canonical, Derived::CategoryFromItem));
                }
                _ => out.insert(canonical, value),
            }
        }

        for (key, kind) in derived {
            let value = match kind {
                Derived::Date => out.get(TIMESTAMP_FIELD).unwrap_or("").to_string(),
                Derived::CategoryFromItem => {
                    let item = out.get(ITEM_FIELD).unwrap_or("");
                    table.categorize_or_raw(item).to_string()
                }
            };
            out.insert(key, value);
        }

        Verdict::Keep(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NormalizationTable {
        NormalizationTable::new()
            .with_header("Date", "Timestamp")
            .with_header("Type", "Type")
            .with_header("Description", "Item")
            .with_header("Withdrawal (-)", "Debit")
            .with_header("Deposit (+)", "Credit")
            .with_header("RunningBalance", "Category")
            .with_category("Grocery Store", "Food")
    }

    fn row(pairs: &[(&str, &str)]) -> CanonicalRow {
        let raw: RawRow = pairs.iter().copied().collect();
        SchwabNormalizer.normalize(&raw, &table()).into_row().unwrap()
    }

    #[test]
    fn test_type_becomes_normalized_date() {
        let out = row(&[
            ("Date", "03/04/2023"),
            ("Type", "ATM"),
            ("Description", "Cash"),
            ("Withdrawal (-)", "40.00"),
            ("Deposit (+)", ""),
        ]);
        assert_eq!(out.get("Type"), Some("03/04/2023"));
    }

    #[test]
    fn test_category_comes_from_item() {
        let out = row(&[
            ("Date", "03/04/2023"),
            ("Description", "Grocery Store"),
            ("Withdrawal (-)", "82.13"),
            ("Deposit (+)", ""),
            ("RunningBalance", "1,204.55"),
        ]);
        assert_eq!(out.get("Category"), Some("Food"));
        assert!(!out.contains_key("RunningBalance"));
    }

    #[test]
    fn test_uncategorized_item_is_copied_verbatim() {
        let out = row(&[
            ("Description", "Hardware Store"),
            ("Withdrawal (-)", "12.00"),
            ("RunningBalance", "900.00"),
        ]);
        assert_eq!(out.get("Category"), Some("Hardware Store"));
    }

    #[test]
    fn test_check_number_is_always_removed() {
        let out = row(&[("Check #", "1042"), ("Deposit (+)", "500.00")]);
        assert!(!out.contains_key("Check #"));
        assert_eq!(out.get("Credit"), Some("500.00"));
    }

    #[test]
    fn test_derivations_ignore_column_order() {
        // derived columns appear before the fields they read
        let out = row(&[
            ("RunningBalance", "1,000.00"),
            ("Type", "DEBIT"),
            ("Description", "Grocery Store"),
            ("Date", "05/06/2023"),
            ("Withdrawal (-)", "20.00"),
        ]);
        assert_eq!(out.get("Type"), Some("05/06/2023"));
        assert_eq!(out.get("Category"), Some("Food"));

        let keys: Vec<_> = out.keys().collect();
        assert_eq!(keys, vec!["Category", "Type", "Item", "Timestamp", "Debit"]);
    }

    #[test]
    fn test_type_without_timestamp_is_empty() {
        let out = row(&[("Type", "ATM"), ("Withdrawal (-)", "40.00")]);
        assert_eq!(out.get("Type"), Some(""));
    }

    #[test]
    fn test_drops_balance_only_rows() {
        let raw = RawRow::from_iter([
            ("Date", "03/04/2023"),
            ("Withdrawal (-)", ""),
            ("Deposit (+)", ""),
            ("RunningBalance", "1,204.55"),
        ]);
        assert_eq!(SchwabNormalizer.normalize(&raw, &table()), Verdict::Dropped);
    }
}
