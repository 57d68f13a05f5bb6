use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::TableError;
use crate::params::LooseParams;
use crate::pipeline::{Stage, StageContext, StageItems, source_stage};

/// Load `filename` with the reader registered for its extension.
///
/// `params` is a loose parameter string forwarded to the reader.
pub fn read(filename: PathBuf, params: String, ctx: &StageContext) -> Box<dyn Stage> {
    let formats = ctx.formats();
    source_stage("read", move || {
        if !filename.exists() {
            return Err(TableError::FileNotFound(filename).into());
        }
        let reader = formats.reader_for(&filename)?;
        let params = LooseParams::parse(&params)?;
        debug!("Reading {} as {} with '{}'", filename.display(), reader.name(), params);

        let table = reader.read(&filename, params)?;
        info!(
            "Read {} rows x {} columns from {}",
            table.n_rows(),
            table.n_cols(),
            filename.display()
        );
        Ok(Box::new(std::iter::once(Ok(table))) as StageItems)
    })
}
