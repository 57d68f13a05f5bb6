use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::Result;
use crate::params::LooseParams;
use crate::pipeline::{Stage, StageContext, StageItems, transform_stage};
use crate::table::Table;

/// Write every table to `filename` and pass it on.
///
/// The writer and its options are checked when the stage starts. Each
/// table replaces the file's previous content.
pub fn to(filename: PathBuf, params: String, ctx: &StageContext) -> Box<dyn Stage> {
    let formats = ctx.formats();
    transform_stage("to", move |input| {
        let writer = formats.writer_for(&filename)?;
        let params = LooseParams::parse(&params)?;
        writer.validate(&params)?;
        debug!("Writing to {} as {} with '{}'", filename.display(), writer.name(), params);

        Ok(Box::new(input.map(move |table| -> Result<Table> {
            writer.write(&table, &filename, params.clone())?;
            info!("Wrote {} rows to {}", table.n_rows(), filename.display());
            Ok(table)
        })) as StageItems)
    })
}
