//! Row normalizers, one per institution.

pub mod capital_one;
pub mod schwab;

use tally_core::{CanonicalRow, Institution, NormalizationTable, RawRow};

pub use capital_one::CapitalOneNormalizer;
pub use schwab::SchwabNormalizer;

/// Outcome of normalizing one raw row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Keep(CanonicalRow),
    /// Not a transaction (no amount in either monetary column).
    Dropped,
}

#[cfg(test)]
impl Verdict {
    pub fn into_row(self) -> Option<CanonicalRow> {
        match self {
            Verdict::Keep(row) => Some(row),
            Verdict::Dropped => None,
        }
    }
}

/// Turns one source row into a canonical row. Never fails: unknown columns
/// and values pass through unchanged.
pub trait RowNormalizer {
    fn normalize(&self, raw: &RawRow, table: &NormalizationTable) -> Verdict;
}

pub fn normalizer_for(institution: Institution) -> &'static dyn RowNormalizer {
    match institution {
        Institution::CapitalOne => &CapitalOneNormalizer,
        Institution::Schwab => &SchwabNormalizer,
    }
}

pub fn normalize(institution: Institution, raw: &RawRow, table: &NormalizationTable) -> Verdict {
    normalizer_for(institution).normalize(raw, table)
}

/// True when both monetary columns of `institution` are empty or missing.
pub(crate) fn lacks_amount(institution: Institution, raw: &RawRow) -> bool {
    institution
        .monetary_columns()
        .iter()
        .all(|col| raw.value_or_empty(col).trim().is_empty())
}
