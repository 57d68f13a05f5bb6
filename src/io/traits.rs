/// Reader and writer traits for tabular file formats
use std::path::Path;

use crate::error::TableResult;
use crate::params::LooseParams;
use crate::table::Table;

/// Loads a whole file into one table.
///
/// Implementations consume the options they understand from `params` and
/// call [`LooseParams::finish`] so that leftovers are reported.
pub trait TableReader {
    /// Short format name used in logs and error messages
    fn name(&self) -> &'static str;

    fn read(&self, path: &Path, params: LooseParams) -> TableResult<Table>;
}

/// Writes one table to a file, replacing any previous content.
pub trait TableWriter {
    /// Short format name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Consume and check the options up front, before any table arrives.
    fn validate(&self, params: &LooseParams) -> TableResult<()>;

    fn write(&self, table: &Table, path: &Path, params: LooseParams) -> TableResult<()>;
}
