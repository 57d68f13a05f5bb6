//! Text renderings of a table for the console.

use std::collections::HashMap;

use super::{DType, Table};

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// Lay out a header line plus rows, columns separated by two spaces.
fn grid(headers: &[String], rows: &[Vec<String>], align: &[Align]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(&widths)
            .zip(align)
            .map(|((cell, &w), a)| match a {
                Align::Left => format!("{cell:<w$}"),
                Align::Right => format!("{cell:>w$}"),
            })
            .collect();
        parts.join("  ").trim_end().to_string()
    };

    let mut out = vec![line(headers)];
    out.extend(rows.iter().map(|r| line(r.as_slice())));
    out.join("\n")
}

fn empty(table: &Table) -> String {
    format!("Empty table\nColumns: [{}]", table.columns().join(", "))
}

/// Every row, right-aligned, optionally prefixed with the row labels.
pub fn render_frame(table: &Table, with_index: bool) -> String {
    if table.is_empty() {
        return empty(table);
    }

    let mut headers: Vec<String> = Vec::with_capacity(table.n_cols() + 1);
    if with_index {
        headers.push(String::new());
    }
    headers.extend(table.columns().iter().cloned());

    let rows: Vec<Vec<String>> = table
        .index()
        .iter()
        .zip(table.rows())
        .map(|(label, row)| {
            let mut cells = Vec::with_capacity(headers.len());
            if with_index {
                cells.push(label.to_string());
            }
            cells.extend(row.iter().map(|v| v.to_string()));
            cells
        })
        .collect();

    let mut align = vec![Align::Right; headers.len()];
    if with_index {
        align[0] = Align::Left;
    }
    grid(&headers, &rows, &align)
}

/// The first `n` rows with labels (see [`Table::head`] for negative `n`).
pub fn render_head(table: &Table, n: i64) -> String {
    render_frame(&table.head(n), true)
}

/// All rows, no labels.
pub fn render_rows(table: &Table) -> String {
    render_frame(table, false)
}

/// Structural summary: shape, per-column non-null counts and types.
pub fn render_info(table: &Table) -> String {
    let (n_rows, n_cols) = table.shape();
    let dtypes = table.dtypes();

    let headers: Vec<String> = ["#", "Column", "Non-Null", "Dtype"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut rows = vec![headers.iter().map(|h| "-".repeat(h.len())).collect::<Vec<_>>()];
    for (idx, (name, dtype)) in table.columns().iter().zip(&dtypes).enumerate() {
        let non_null = table.column(idx).filter(|v| !v.is_null()).count();
        rows.push(vec![
            idx.to_string(),
            name.clone(),
            non_null.to_string(),
            dtype.to_string(),
        ]);
    }

    let mut tally: Vec<(DType, usize)> = Vec::new();
    let mut seen: HashMap<DType, usize> = HashMap::new();
    for dtype in &dtypes {
        match seen.get(dtype) {
            Some(&slot) => tally[slot].1 += 1,
            None => {
                seen.insert(*dtype, tally.len());
                tally.push((*dtype, 1));
            }
        }
    }
    let tally = tally
        .iter()
        .map(|(dtype, count)| format!("{dtype}({count})"))
        .collect::<Vec<_>>()
        .join(", ");

    let range = match n_rows {
        0 => "0 entries".to_string(),
        n => format!("{n} entries, {} to {}", table.index()[0], table.index()[n - 1]),
    };

    format!(
        "Table: {n_rows} rows x {n_cols} columns\nIndex: {range}\n{}\ndtypes: {tally}",
        grid(
            &headers,
            &rows,
            &[Align::Right, Align::Left, Align::Left, Align::Left]
        )
    )
}
