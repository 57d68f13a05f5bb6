use crate::error::Result;
use crate::pipeline::{Stage, StageContext, StageItems, transform_stage};
use crate::table::Table;
use crate::table::render::render_head;

/// Print the first `lines` rows of every table and pass it on.
pub fn head(lines: i64, ctx: &StageContext) -> Box<dyn Stage> {
    let ctx = ctx.clone();
    transform_stage("head", move |input| {
        Ok(Box::new(input.map(move |table| -> Result<Table> {
            ctx.emit(&render_head(&table, lines))?;
            Ok(table)
        })) as StageItems)
    })
}
