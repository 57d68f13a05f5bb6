/// Registry mapping file extensions to readers and writers
use indexmap::IndexMap;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

use super::delimited::{CsvReader, CsvWriter};
use super::html::HtmlWriter;
use super::json::{JsonReader, JsonWriter};
use super::traits::{TableReader, TableWriter};
use super::xlsx::{XlsxReader, XlsxWriter};
use crate::error::{TableError, TableResult};

#[derive(Default)]
pub struct FormatRegistry {
    readers: IndexMap<String, Rc<dyn TableReader>>,
    writers: IndexMap<String, Rc<dyn TableWriter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in format.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register_reader(".csv", Rc::new(CsvReader));
        registry.register_writer(".csv", Rc::new(CsvWriter));

        registry.register_reader(".xlsx", Rc::new(XlsxReader));
        registry.register_writer(".xlsx", Rc::new(XlsxWriter));

        registry.register_reader(".json", Rc::new(JsonReader));
        registry.register_writer(".json", Rc::new(JsonWriter));

        let html: Rc<dyn TableWriter> = Rc::new(HtmlWriter);
        registry.register_writer(".html", html.clone());
        registry.register_writer(".htm", html);

        registry
    }

    /// Register a reader; `extension` includes the leading dot.
    pub fn register_reader(&mut self, extension: &str, reader: Rc<dyn TableReader>) {
        debug!("Registered {} reader for {}", reader.name(), extension);
        self.readers.insert(extension.to_lowercase(), reader);
    }

    pub fn register_writer(&mut self, extension: &str, writer: Rc<dyn TableWriter>) {
        debug!("Registered {} writer for {}", writer.name(), extension);
        self.writers.insert(extension.to_lowercase(), writer);
    }

    pub fn reader_for(&self, path: &Path) -> TableResult<Rc<dyn TableReader>> {
        let extension = extension_of(path);
        self.readers
            .get(&extension)
            .cloned()
            .ok_or_else(|| TableError::unsupported("reader", extension, path))
    }

    pub fn writer_for(&self, path: &Path) -> TableResult<Rc<dyn TableWriter>> {
        let extension = extension_of(path);
        self.writers
            .get(&extension)
            .cloned()
            .ok_or_else(|| TableError::unsupported("writer", extension, path))
    }

    pub fn reader_extensions(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().map(String::as_str)
    }

    pub fn writer_extensions(&self) -> impl Iterator<Item = &str> {
        self.writers.keys().map(String::as_str)
    }
}

/// Lowercased extension with its leading dot, or `""` when there is none.
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}
