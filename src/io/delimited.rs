/// Delimited text (CSV) reader and writer
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;
use tracing::debug;

use super::options::{ReadOptions, WriteOptions};
use super::traits::{TableReader, TableWriter};
use crate::error::TableResult;
use crate::params::LooseParams;
use crate::table::Table;

const DEFAULT_SEPARATOR: u8 = b',';

pub struct CsvReader;

impl TableReader for CsvReader {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn read(&self, path: &Path, mut params: LooseParams) -> TableResult<Table> {
        let options = ReadOptions::take(&mut params)?;
        let sep = params
            .take_char(&["sep", "delimiter"])?
            .unwrap_or(DEFAULT_SEPARATOR);
        params.finish("csv reader")?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(sep)
            .from_path(path)?;

        let grid = reader
            .records()
            .map(|record| Ok(record?.iter().map(str::to_string).collect()))
            .collect::<TableResult<Vec<Vec<String>>>>()?;
        debug!("Read {} record(s) from {}", grid.len(), path.display());

        let (columns, rows) = options.layout(grid, String::clone)?;
        options.finish(Table::from_text(columns, rows)?)
    }
}

pub struct CsvWriter;

impl CsvWriter {
    fn options(&self, mut params: LooseParams) -> TableResult<(WriteOptions, u8)> {
        let options = WriteOptions::take(&mut params)?;
        let sep = params
            .take_char(&["sep", "delimiter"])?
            .unwrap_or(DEFAULT_SEPARATOR);
        params.finish("csv writer")?;
        Ok((options, sep))
    }
}

impl TableWriter for CsvWriter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn validate(&self, params: &LooseParams) -> TableResult<()> {
        self.options(params.clone()).map(|_| ())
    }

    fn write(&self, table: &Table, path: &Path, params: LooseParams) -> TableResult<()> {
        let (options, sep) = self.options(params)?;
        let na_rep = options.na_rep.clone().unwrap_or_default();
        let (header, rows) = options.project(table)?;

        let mut writer = WriterBuilder::new().delimiter(sep).from_path(path)?;
        if options.header {
            writer.write_record(&header)?;
        }
        for row in rows {
            writer.write_record(row.iter().map(|v| v.to_text(&na_rep)))?;
        }
        writer.flush()?;
        Ok(())
    }
}
