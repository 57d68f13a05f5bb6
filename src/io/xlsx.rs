/// Excel workbook reader (calamine) and writer (OOXML package over zip)
use calamine::{Data, Reader, Xlsx, open_workbook};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use super::options::{ReadOptions, WriteOptions};
use super::traits::{TableReader, TableWriter};
use crate::config::constants::DEFAULT_SHEET_NAME;
use crate::error::{ParamError, TableError, TableResult};
use crate::params::{Literal, LooseParams};
use crate::table::{Table, Value};
use crate::util::escape::MarkupEscape;

/// Sheet selection for reads: by name or by position.
#[derive(Debug, Clone, PartialEq)]
enum SheetRef {
    Name(String),
    Position(usize),
}

fn take_sheet(params: &mut LooseParams) -> TableResult<SheetRef> {
    match params.take("sheet_name") {
        None => Ok(SheetRef::Position(0)),
        Some(Literal::Str(name)) => Ok(SheetRef::Name(name)),
        Some(Literal::Int(i)) if i >= 0 => Ok(SheetRef::Position(i as usize)),
        Some(other) => Err(ParamError::invalid_value("sheet_name", "a sheet name or position", other).into()),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Int(*i),
        Data::Float(x) => Value::Float(*x),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => Value::Str(s.clone()),
        other => Value::Str(other.to_string()),
    }
}

pub struct XlsxReader;

impl TableReader for XlsxReader {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    /// The grid starts at the first used cell of the sheet.
    fn read(&self, path: &Path, mut params: LooseParams) -> TableResult<Table> {
        let options = ReadOptions::take(&mut params)?;
        let sheet = take_sheet(&mut params)?;
        params.finish("xlsx reader")?;

        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let sheet_names = workbook.sheet_names();
        let sheet_name = match sheet {
            SheetRef::Name(name) => name,
            SheetRef::Position(i) => sheet_names
                .get(i)
                .cloned()
                .ok_or_else(|| TableError::WorksheetNotFound(format!("#{i}")))?,
        };
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|_| TableError::WorksheetNotFound(sheet_name.clone()))?;
        debug!(
            "Sheet '{}' of {} spans {:?}",
            sheet_name,
            path.display(),
            range.get_size()
        );

        let grid: Vec<Vec<Value>> = range
            .rows()
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        let (columns, mut rows) = options.layout(grid, |v| v.to_text(""))?;
        for row in &mut rows {
            row.resize(columns.len(), Value::Null);
        }
        let table = Table::new(columns, rows)?.with_integral_floats_as_ints();
        options.finish(table)
    }
}

pub struct XlsxWriter;

impl XlsxWriter {
    fn options(&self, mut params: LooseParams) -> TableResult<(WriteOptions, String)> {
        let options = WriteOptions::take(&mut params)?;
        let sheet = params
            .take_string("sheet_name")?
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        params.finish("xlsx writer")?;
        Ok((options, sheet))
    }
}

impl TableWriter for XlsxWriter {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn validate(&self, params: &LooseParams) -> TableResult<()> {
        self.options(params.clone()).map(|_| ())
    }

    fn write(&self, table: &Table, path: &Path, params: LooseParams) -> TableResult<()> {
        let (options, sheet) = self.options(params)?;
        let (header, rows) = options.project(table)?;

        let mut body: Vec<Vec<Value>> = Vec::with_capacity(rows.len() + 1);
        if options.header {
            body.push(header.into_iter().map(Value::Str).collect());
        }
        body.extend(rows);

        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let zip_options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("xl/workbook.xml", workbook_xml(&sheet)),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/worksheets/sheet1.xml", sheet_xml(&body, options.na_rep.as_deref())),
        ];
        for (name, content) in parts {
            zip.start_file(name, zip_options)?;
            zip.write_all(content.as_bytes())?;
        }
        zip.finish()?;
        debug!("Wrote sheet '{}' with {} row(s)", sheet, body.len());
        Ok(())
    }
}

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

const WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"</Relationships>"#
);

fn workbook_xml(sheet: &str) -> String {
    format!(
        concat!(
            "{}",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        ),
        XML_DECL,
        MarkupEscape::escape_attribute(sheet)
    )
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letters(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

fn cell_xml(reference: &str, value: &Value, na_rep: Option<&str>) -> Option<String> {
    let inline = |text: &str| {
        format!(
            r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            MarkupEscape::escape_xml(text)
        )
    };
    match value {
        Value::Null => na_rep.map(inline),
        Value::Float(x) if !x.is_finite() => Some(inline(&value.to_string())),
        Value::Int(i) => Some(format!(r#"<c r="{reference}"><v>{i}</v></c>"#)),
        Value::Float(x) => Some(format!(r#"<c r="{reference}"><v>{x}</v></c>"#)),
        Value::Bool(b) => Some(format!(r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*b))),
        Value::Str(s) => Some(inline(s)),
    }
}

fn sheet_xml(body: &[Vec<Value>], na_rep: Option<&str>) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#);
    for (r, row) in body.iter().enumerate() {
        let row_number = r + 1;
        xml.push_str(&format!(r#"<row r="{row_number}">"#));
        for (c, value) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(c), row_number);
            if let Some(cell) = cell_xml(&reference, value, na_rep) {
                xml.push_str(&cell);
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_cells() {
        assert_eq!(
            cell_xml("B2", &Value::Bool(true), None).unwrap(),
            r#"<c r="B2" t="b"><v>1</v></c>"#
        );
        assert_eq!(cell_xml("A1", &Value::Null, None), None);
        assert!(cell_xml("A1", &Value::from("a<b"), None).unwrap().contains("a&lt;b"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let table = Table::new(
            vec!["id".into(), "name".into(), "score".into()],
            vec![
                vec![Value::Int(1), Value::from("Ann"), Value::Float(1.5)],
                vec![Value::Int(2), Value::Null, Value::Float(-3.25)],
            ],
        )
        .unwrap();

        XlsxWriter
            .write(&table, &path, LooseParams::parse("sheet_name='Data'").unwrap())
            .unwrap();
        let back = XlsxReader
            .read(&path, LooseParams::parse("sheet_name='Data'").unwrap())
            .unwrap();
        assert_eq!(back, table);

        let missing = XlsxReader.read(&path, LooseParams::parse("sheet_name=3").unwrap());
        assert!(matches!(missing, Err(TableError::WorksheetNotFound(_))));
    }
}
