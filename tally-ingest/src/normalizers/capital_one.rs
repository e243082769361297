//! Capital One CSV exports.
//!
//! Expected header:
//!   Transaction Date,Posted Date,Card No.,Description,Category,Debit,Credit

use tally_core::{CanonicalRow, Institution, NormalizationTable, RawRow};

use super::{RowNormalizer, Verdict, lacks_amount};

/// Source column whose values go through the category lookup.
pub const CATEGORY_COLUMN: &str = "Category";

pub struct CapitalOneNormalizer;

impl RowNormalizer for CapitalOneNormalizer {
    fn normalize(&self, raw: &RawRow, table: &NormalizationTable) -> Verdict {
        if lacks_amount(Institution::CapitalOne, raw) {
            return Verdict::Dropped;
        }

        let mut out = CanonicalRow::new();
        for (key, value) in raw.iter() {
            let value = if key == CATEGORY_COLUMN {
                table.categorize_or_raw(value)
            } else {
                value
            };
            out.insert(table.canonical_key_or_source(key), value);
        }

        Verdict::Keep(out)
    }
}
