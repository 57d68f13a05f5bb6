/// HTML table writer
use std::fs;
use std::path::Path;

use super::options::WriteOptions;
use super::traits::TableWriter;
use crate::config::constants::NA_REPR;
use crate::error::TableResult;
use crate::params::LooseParams;
use crate::table::{Table, Value};
use crate::util::escape::MarkupEscape;

pub struct HtmlWriter;

impl HtmlWriter {
    fn options(&self, mut params: LooseParams) -> TableResult<(WriteOptions, Option<String>)> {
        let options = WriteOptions::take(&mut params)?;
        let classes = params.take_string("classes")?;
        params.finish("html writer")?;
        Ok((options, classes))
    }
}

/// Render `table` as a standalone `<table>` element.
fn render(header: &[String], rows: &[Vec<Value>], options: &WriteOptions, classes: Option<&str>) -> String {
    let na_rep = options.na_rep.as_deref().unwrap_or(NA_REPR);
    let class_attr = match classes {
        Some(extra) => format!("dataframe {}", MarkupEscape::escape_attribute(extra)),
        None => "dataframe".to_string(),
    };

    let mut html = format!("<table border=\"1\" class=\"{class_attr}\">\n");
    if options.header {
        html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
        for name in header {
            html.push_str(&format!("      <th>{}</th>\n", MarkupEscape::escape_text(name)));
        }
        html.push_str("    </tr>\n  </thead>\n");
    }
    html.push_str("  <tbody>\n");
    for row in rows {
        html.push_str("    <tr>\n");
        for (c, value) in row.iter().enumerate() {
            let tag = if options.index && c == 0 { "th" } else { "td" };
            html.push_str(&format!(
                "      <{tag}>{}</{tag}>\n",
                MarkupEscape::escape_text(&value.to_text(na_rep))
            ));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}

impl TableWriter for HtmlWriter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn validate(&self, params: &LooseParams) -> TableResult<()> {
        self.options(params.clone()).map(|_| ())
    }

    fn write(&self, table: &Table, path: &Path, params: LooseParams) -> TableResult<()> {
        let (options, classes) = self.options(params)?;
        let (header, rows) = options.project(table)?;
        fs::write(path, render(&header, &rows, &options, classes.as_deref()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes_and_marks_nulls() {
        let table = Table::new(
            vec!["a<b".into()],
            vec![vec![Value::from("x & y")], vec![Value::Null]],
        )
        .unwrap();
        let options = WriteOptions::default();
        let (header, rows) = options.project(&table).unwrap();
        let html = render(&header, &rows, &options, None);

        assert!(html.starts_with("<table border=\"1\" class=\"dataframe\">"));
        assert!(html.contains("<th>a&lt;b</th>"));
        assert!(html.contains("<td>x &amp; y</td>"));
        assert!(html.contains("<td>NaN</td>"));
        assert!(html.ends_with("</table>"));
    }

    #[test]
    fn test_index_cells_are_headers() {
        let table = Table::new(vec!["a".into()], vec![vec![Value::Int(7)]]).unwrap();
        let mut params = LooseParams::parse("index=True|header=False").unwrap();
        let options = WriteOptions::take(&mut params).unwrap();
        let (header, rows) = options.project(&table).unwrap();
        let html = render(&header, &rows, &options, Some("wide"));

        assert!(html.contains("class=\"dataframe wide\""));
        assert!(!html.contains("<thead>"));
        assert!(html.contains("<th>0</th>\n      <td>7</td>"));
    }
}
