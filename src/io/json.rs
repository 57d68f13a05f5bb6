/// JSON reader and writer
///
/// Two layouts are supported, selected with `orient`:
/// `records` is an array of row objects, `list` an object of column arrays.
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value as Json;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use super::options::{ReadOptions, WriteOptions};
use super::traits::{TableReader, TableWriter};
use crate::error::{ParamError, TableError, TableResult};
use crate::params::{Header, LooseParams};
use crate::table::{Table, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Orient {
    #[default]
    Records,
    List,
}

impl FromStr for Orient {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "records" => Ok(Orient::Records),
            "list" => Ok(Orient::List),
            other => Err(ParamError::invalid_value("orient", "'records' or 'list'", other)),
        }
    }
}

fn take_orient(params: &mut LooseParams) -> TableResult<Orient> {
    Ok(params
        .take_string("orient")?
        .map(|s| s.parse::<Orient>())
        .transpose()?
        .unwrap_or_default())
}

fn from_json(value: Json) -> Value {
    match value {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        Json::String(s) => Value::Str(s),
        nested => Value::Str(nested.to_string()),
    }
}

/// Columns in order of first appearance, rows padded with nulls.
fn from_records(records: Vec<Json>) -> TableResult<(Vec<String>, Vec<Vec<Value>>)> {
    let mut columns: IndexSet<String> = IndexSet::new();
    let mut objects = Vec::with_capacity(records.len());
    for record in records {
        match record {
            Json::Object(map) => {
                for key in map.keys() {
                    columns.insert(key.clone());
                }
                objects.push(map);
            }
            other => {
                return Err(TableError::invalid_format(format!(
                    "expected an object per record, found {other}"
                )));
            }
        }
    }

    let rows = objects
        .into_iter()
        .map(|mut map| {
            columns
                .iter()
                .map(|key| map.remove(key).map_or(Value::Null, from_json))
                .collect()
        })
        .collect();
    Ok((columns.into_iter().collect(), rows))
}

fn from_lists(lists: serde_json::Map<String, Json>) -> TableResult<(Vec<String>, Vec<Vec<Value>>)> {
    let mut columns = Vec::with_capacity(lists.len());
    let mut values: Vec<Vec<Value>> = Vec::with_capacity(lists.len());
    for (name, list) in lists {
        match list {
            Json::Array(items) => values.push(items.into_iter().map(from_json).collect()),
            other => {
                return Err(TableError::invalid_format(format!(
                    "column '{name}' is not an array: {other}"
                )));
            }
        }
        columns.push(name);
    }

    let height = values.iter().map(Vec::len).max().unwrap_or(0);
    let rows = (0..height)
        .map(|r| {
            values
                .iter()
                .map(|col| col.get(r).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Ok((columns, rows))
}

pub struct JsonReader;

impl TableReader for JsonReader {
    fn name(&self) -> &'static str {
        "json"
    }

    /// Keys name the columns, so `header` may only be `0` or `None`.
    fn read(&self, path: &Path, mut params: LooseParams) -> TableResult<Table> {
        let mut options = ReadOptions::take(&mut params)?;
        let orient = take_orient(&mut params)?;
        params.finish("json reader")?;

        if let Some(Header::Row(row @ 1..)) = options.header {
            return Err(ParamError::invalid_value("header", "0 or None for json input", row).into());
        }
        options.header = None;

        let document: Json = serde_json::from_str(&fs::read_to_string(path)?)?;
        let (columns, rows) = match (orient, document) {
            (Orient::Records, Json::Array(records)) => from_records(records)?,
            (Orient::List, Json::Object(lists)) => from_lists(lists)?,
            (orient, _) => {
                return Err(TableError::invalid_format(format!(
                    "document does not match orient '{}'",
                    match orient {
                        Orient::Records => "records",
                        Orient::List => "list",
                    }
                )));
            }
        };

        let rows: Vec<Vec<Value>> = rows.into_iter().skip(options.skiprows).collect();
        let rows = match options.nrows {
            Some(n) => rows.into_iter().take(n).collect(),
            None => rows,
        };
        options.finish(Table::new(columns, rows)?)
    }
}

pub struct JsonWriter;

impl JsonWriter {
    fn options(&self, mut params: LooseParams) -> TableResult<(WriteOptions, Orient, Option<usize>)> {
        let options = WriteOptions::take(&mut params)?;
        let orient = take_orient(&mut params)?;
        let indent = params.take_usize("indent")?;
        params.finish("json writer")?;
        Ok((options, orient, indent))
    }
}

fn to_json(value: &Value, na_rep: Option<&str>) -> Json {
    match (value, na_rep) {
        (Value::Null, Some(rep)) => Json::String(rep.to_string()),
        (Value::Float(x), _) if !x.is_finite() => Json::Null,
        (other, _) => serde_json::to_value(other).unwrap_or(Json::Null),
    }
}

fn serialize<T: Serialize>(value: &T, out: impl Write, indent: Option<usize>) -> TableResult<()> {
    match indent {
        Some(width) => {
            let indent = " ".repeat(width);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(out, formatter);
            value.serialize(&mut serializer)?;
        }
        None => serde_json::to_writer(out, value)?,
    }
    Ok(())
}

impl TableWriter for JsonWriter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn validate(&self, params: &LooseParams) -> TableResult<()> {
        self.options(params.clone()).map(|_| ())
    }

    /// `header=False` is not meaningful for keyed layouts and is ignored.
    fn write(&self, table: &Table, path: &Path, params: LooseParams) -> TableResult<()> {
        let (options, orient, indent) = self.options(params)?;
        let na_rep = options.na_rep.as_deref();
        let (header, rows) = options.project(table)?;
        let header: Vec<String> = match options.index {
            true => std::iter::once("index".to_string())
                .chain(header.into_iter().skip(1))
                .collect(),
            false => header,
        };

        let document = match orient {
            Orient::Records => Json::Array(
                rows.iter()
                    .map(|row| {
                        Json::Object(
                            header
                                .iter()
                                .zip(row)
                                .map(|(name, value)| (name.clone(), to_json(value, na_rep)))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
            Orient::List => Json::Object(
                header
                    .iter()
                    .enumerate()
                    .map(|(c, name)| {
                        let column = rows.iter().map(|row| to_json(&row[c], na_rep)).collect();
                        (name.clone(), Json::Array(column))
                    })
                    .collect(),
            ),
        };

        let mut out = BufWriter::new(File::create(path)?);
        serialize(&document, &mut out, indent)?;
        out.flush()?;
        Ok(())
    }
}
