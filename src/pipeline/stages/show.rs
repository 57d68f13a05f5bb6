use crate::error::Result;
use crate::pipeline::{Stage, StageContext, StageItems, transform_stage};
use crate::table::Table;
use crate::table::render::{render_info, render_rows};

/// Print a structural summary of every table.
pub fn info(ctx: &StageContext) -> Box<dyn Stage> {
    let ctx = ctx.clone();
    transform_stage("info", move |input| {
        Ok(Box::new(input.map(move |table| -> Result<Table> {
            ctx.emit(&render_info(&table))?;
            Ok(table)
        })) as StageItems)
    })
}

/// Print every row of every table, without row labels.
pub fn print(ctx: &StageContext) -> Box<dyn Stage> {
    let ctx = ctx.clone();
    transform_stage("print", move |input| {
        Ok(Box::new(input.map(move |table| -> Result<Table> {
            ctx.emit(&render_rows(&table))?;
            Ok(table)
        })) as StageItems)
    })
}
