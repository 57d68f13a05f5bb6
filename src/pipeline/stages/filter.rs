use tracing::debug;

use crate::error::Result;
use crate::pipeline::{Stage, StageContext, StageItems, transform_stage};
use crate::query::Query;
use crate::table::Table;
use crate::table::render::render_frame;

/// Keep the rows matching `expression`, print them and pass the result on.
///
/// The expression is compiled when the stage starts, so a syntax error
/// ends the stage before any table is pulled.
pub fn filter(expression: String, ctx: &StageContext) -> Box<dyn Stage> {
    let ctx = ctx.clone();
    transform_stage("filter", move |input| {
        let query = Query::parse(&expression)?;
        debug!("Compiled filter '{}'", query);
        Ok(Box::new(input.map(move |table| -> Result<Table> {
            let before = table.n_rows();
            let filtered = query.apply(table)?;
            debug!("Filter kept {} of {} row(s)", filtered.n_rows(), before);
            ctx.emit(&render_frame(&filtered, true))?;
            Ok(filtered)
        })) as StageItems)
    })
}
