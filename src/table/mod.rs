//! In-memory tabular datasets.
//!
//! A [`Table`] is a list of named columns and row-major values, plus the row
//! labels it was loaded with. Filtering keeps the surviving labels, the way
//! a dataframe index behaves.

pub mod render;

use serde::Serialize;
use std::fmt;

use crate::config::constants::NA_VALUES;
use crate::error::{TableError, TableResult};

/// One cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn dtype(&self) -> DType {
        match self {
            Value::Null => DType::Null,
            Value::Bool(_) => DType::Bool,
            Value::Int(_) => DType::Int,
            Value::Float(_) => DType::Float,
            Value::Str(_) => DType::Str,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Render the value for text outputs, using `na_rep` for nulls.
    pub fn to_text(&self, na_rep: &str) -> String {
        match self {
            Value::Null => na_rep.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NaN"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_nan() => write!(f, "NaN"),
            Value::Float(x) if x.is_infinite() => {
                write!(f, "{}", if *x > 0.0 { "inf" } else { "-inf" })
            }
            Value::Float(x) if x.fract() == 0.0 && x.abs() < 1e16 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Column type as reported by `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Mixed,
}

impl DType {
    /// Combined type of a column, ignoring nulls. Ints widen to floats.
    pub fn of_column<'a>(values: impl IntoIterator<Item = &'a Value>) -> DType {
        values
            .into_iter()
            .map(Value::dtype)
            .fold(DType::Null, |acc, next| match (acc, next) {
                (acc, DType::Null) => acc,
                (DType::Null, next) => next,
                (a, b) if a == b => a,
                (DType::Int, DType::Float) | (DType::Float, DType::Int) => DType::Float,
                _ => DType::Mixed,
            })
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Null => "null",
            DType::Bool => "bool",
            DType::Int => "int",
            DType::Float => "float",
            DType::Str => "str",
            DType::Mixed => "mixed",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    index: Vec<usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from typed rows. Every row must have one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> TableResult<Self> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(TableError::invalid_format(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns: normalize_columns(columns),
            index: (0..rows.len()).collect(),
            rows,
        })
    }

    /// Build a table from text cells, inferring one type per column.
    ///
    /// Short rows are padded with nulls; rows wider than the header are an error.
    pub fn from_text(columns: Vec<String>, rows: Vec<Vec<String>>) -> TableResult<Self> {
        let width = columns.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() > width) {
            return Err(TableError::invalid_format(format!(
                "row {} has {} fields, expected {}",
                i,
                row.len(),
                width
            )));
        }

        let mut cells: Vec<Vec<Option<String>>> = rows
            .into_iter()
            .map(|row| {
                let mut row: Vec<Option<String>> = row.into_iter().map(Some).collect();
                row.resize(width, None);
                row
            })
            .collect();

        let mut typed: Vec<Vec<Value>> = vec![Vec::with_capacity(width); cells.len()];
        for col in 0..width {
            let column: Vec<Option<String>> = cells.iter_mut().map(|row| row[col].take()).collect();
            for (row, value) in typed.iter_mut().zip(infer_column(column)) {
                row.push(value);
            }
        }
        Self::new(columns, typed)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Row labels, in row order.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[idx])
    }

    pub fn dtypes(&self) -> Vec<DType> {
        (0..self.n_cols())
            .map(|idx| DType::of_column(self.column(idx)))
            .collect()
    }

    /// First `n` rows, or all but the last `-n` rows when `n` is negative.
    pub fn head(&self, n: i64) -> Table {
        let len = self.n_rows();
        let keep = if n >= 0 {
            (n as usize).min(len)
        } else {
            len.saturating_sub(n.unsigned_abs() as usize)
        };
        Table {
            columns: self.columns.clone(),
            index: self.index[..keep].to_vec(),
            rows: self.rows[..keep].to_vec(),
        }
    }

    /// Keep the rows whose mask entry is `true`, with their labels.
    pub fn retain_rows(self, mask: &[bool]) -> Table {
        let (index, rows) = self
            .index
            .into_iter()
            .zip(self.rows)
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(pair, _)| pair)
            .unzip();
        Table {
            columns: self.columns,
            index,
            rows,
        }
    }

    /// Project onto the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> TableResult<Table> {
        let picks = names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| TableError::column_not_found(name.clone()))
            })
            .collect::<TableResult<Vec<_>>>()?;
        Ok(Table {
            columns: names.to_vec(),
            index: self.index.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| picks.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    /// Replace the column names. The count must match.
    pub fn rename(mut self, names: Vec<String>) -> TableResult<Table> {
        if names.len() != self.columns.len() {
            return Err(TableError::invalid_format(format!(
                "{} names given for {} columns",
                names.len(),
                self.columns.len()
            )));
        }
        self.columns = normalize_columns(names);
        Ok(self)
    }

    /// Keep at most `n` rows.
    pub fn truncate(mut self, n: usize) -> Table {
        self.rows.truncate(n);
        self.index.truncate(n);
        self
    }

    /// Turn float columns whose values are all integral into int columns.
    ///
    /// Spreadsheet cells store every number as a float.
    pub fn with_integral_floats_as_ints(mut self) -> Table {
        for col in 0..self.n_cols() {
            let integral = self.column(col).any(|v| matches!(v, Value::Float(_)))
                && self.column(col).all(|v| match v {
                    Value::Float(x) => x.fract() == 0.0 && x.abs() < 9.0e15,
                    Value::Int(_) | Value::Null => true,
                    _ => false,
                });
            if integral {
                for row in &mut self.rows {
                    if let Value::Float(x) = row[col] {
                        row[col] = Value::Int(x as i64);
                    }
                }
            }
        }
        self
    }
}

/// Give blank headers a placeholder name and suffix duplicates (`a`, `a.1`).
fn normalize_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(columns.len());
    for (i, name) in columns.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        seen.push(candidate);
    }
    seen
}

fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Infer one type for a column of text cells: int, then float, then bool,
/// then string. Missing markers become nulls.
fn infer_column(cells: Vec<Option<String>>) -> Vec<Value> {
    let present = || {
        cells
            .iter()
            .filter_map(|c| c.as_deref())
            .filter(|c| !is_na(c))
    };

    let convert = |f: &dyn Fn(&str) -> Value| -> Vec<Value> {
        cells
            .iter()
            .map(|cell| match cell.as_deref() {
                None => Value::Null,
                Some(c) if is_na(c) => Value::Null,
                Some(c) => f(c),
            })
            .collect()
    };

    if present().all(|c| c.trim().parse::<i64>().is_ok()) {
        return convert(&|c| c.trim().parse().map(Value::Int).unwrap_or(Value::Null));
    }
    if present().all(|c| c.trim().parse::<f64>().is_ok()) {
        return convert(&|c| c.trim().parse().map(Value::Float).unwrap_or(Value::Null));
    }
    if present().all(|c| parse_bool(c).is_some()) {
        return convert(&|c| parse_bool(c).map(Value::Bool).unwrap_or(Value::Null));
    }
    convert(&|c| Value::Str(c.to_string()))
}
