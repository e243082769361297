//! Destination for finished row collections.

use std::future::Future;

use crate::error::SinkError;
use crate::row::RowCollection;

/// A remote tabular store that accepts appended rows.
pub trait Sink {
    /// Append every row of `rows`. Implementations do not retry.
    fn append(&self, rows: &RowCollection) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Lay rows out under an existing sheet header.
///
/// Cells follow `header` order; a column the row lacks becomes an empty cell
/// and row keys missing from `header` are left out.
pub fn align_to_header<S: AsRef<str>>(header: &[S], rows: &RowCollection) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            header
                .iter()
                .map(|h| row.get(h.as_ref()).unwrap_or("").to_string())
                .collect()
        })
        .collect()
}
