//! tally-core: row model, normalization tables and the sink contract shared by
//! the ingest pipeline and the CLI.

pub mod error;
pub mod institution;
pub mod row;
pub mod sink;
pub mod table;

pub use error::{ConfigError, RowParseError, SinkError};
pub use institution::Institution;
pub use row::{CanonicalRow, RawRow, RowCollection};
pub use sink::{Sink, align_to_header};
pub use table::NormalizationTable;
