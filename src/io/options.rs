//! Options shared by every reader and writer.

use tracing::debug;

use crate::error::{ParamResult, TableError, TableResult};
use crate::params::{Header, LooseParams};
use crate::table::{Table, Value};

/// `header`, `names`, `usecols`, `skiprows` and `nrows`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    pub header: Option<Header>,
    pub names: Option<Vec<String>>,
    pub usecols: Option<Vec<String>>,
    pub skiprows: usize,
    pub nrows: Option<usize>,
}

impl ReadOptions {
    pub fn take(params: &mut LooseParams) -> ParamResult<Self> {
        Ok(Self {
            header: params.take_header()?,
            names: params.take_string_list("names")?,
            usecols: params.take_string_list("usecols")?,
            skiprows: params.take_usize("skiprows")?.unwrap_or(0),
            nrows: params.take_usize("nrows")?,
        })
    }

    /// Explicit `names` imply there is no header row unless one is given.
    pub fn effective_header(&self) -> Header {
        match (self.header, &self.names) {
            (Some(header), _) => header,
            (None, Some(_)) => Header::None,
            (None, None) => Header::Row(0),
        }
    }

    /// Split a raw grid into column names and data rows.
    ///
    /// Applies `skiprows`, the header row and `nrows`. Rows above the header
    /// row are dropped. Without a header, columns are numbered from 0.
    pub fn layout<T>(
        &self,
        grid: Vec<Vec<T>>,
        name_of: impl Fn(&T) -> String,
    ) -> TableResult<(Vec<String>, Vec<Vec<T>>)> {
        let mut rows = grid.into_iter().skip(self.skiprows);

        let header_cells = match self.effective_header() {
            Header::Row(n) => Some(
                rows.nth(n)
                    .ok_or_else(|| TableError::invalid_format("no columns to parse from file"))?,
            ),
            Header::None => None,
        };

        let data: Vec<Vec<T>> = match self.nrows {
            Some(n) => rows.take(n).collect(),
            None => rows.collect(),
        };
        let width = data.iter().map(Vec::len).max().unwrap_or(0);

        let columns = match header_cells {
            Some(cells) => {
                let mut names: Vec<String> = cells.iter().map(name_of).collect();
                while names.last().is_some_and(|n| n.is_empty()) && names.len() > width {
                    names.pop();
                }
                names.resize(names.len().max(width), String::new());
                names
            }
            None if width == 0 => {
                return Err(TableError::invalid_format("no columns to parse from file"));
            }
            None => (0..width).map(|i| i.to_string()).collect(),
        };

        debug!("Laid out {} column(s), {} data row(s)", columns.len(), data.len());
        Ok((columns, data))
    }

    /// Apply `names` and `usecols` to a freshly built table.
    pub fn finish(&self, mut table: Table) -> TableResult<Table> {
        if let Some(names) = &self.names {
            table = table.rename(names.clone())?;
        }
        if let Some(usecols) = &self.usecols {
            table = table.select(usecols)?;
        }
        Ok(table)
    }
}

/// `header`, `index`, `columns` and `na_rep`.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub header: bool,
    pub index: bool,
    pub columns: Option<Vec<String>>,
    /// Writers fall back to their own default for nulls when unset.
    pub na_rep: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            header: true,
            index: false,
            columns: None,
            na_rep: None,
        }
    }
}

impl WriteOptions {
    pub fn take(params: &mut LooseParams) -> ParamResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            header: params.take_bool("header")?.unwrap_or(defaults.header),
            index: params.take_bool("index")?.unwrap_or(defaults.index),
            columns: params.take_string_list("columns")?,
            na_rep: params.take_string("na_rep")?,
        })
    }

    /// Header cells and body rows ready to be written.
    ///
    /// With `index`, the row labels come first under an empty header cell.
    pub fn project(&self, table: &Table) -> TableResult<(Vec<String>, Vec<Vec<Value>>)> {
        let selected;
        let table = match &self.columns {
            Some(columns) => {
                selected = table.select(columns)?;
                &selected
            }
            None => table,
        };

        let mut header = Vec::with_capacity(table.n_cols() + 1);
        if self.index {
            header.push(String::new());
        }
        header.extend(table.columns().iter().cloned());

        let rows = table
            .index()
            .iter()
            .zip(table.rows())
            .map(|(label, row)| {
                let mut cells = Vec::with_capacity(header.len());
                if self.index {
                    cells.push(Value::Int(*label as i64));
                }
                cells.extend(row.iter().cloned());
                cells
            })
            .collect();

        Ok((header, rows))
    }
}
