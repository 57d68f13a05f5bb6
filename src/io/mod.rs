//! Tabular file formats.
//!
//! Readers and writers are looked up by file extension through the
//! [`FormatRegistry`]. Options arrive as loose parameters; the shared ones
//! live in [`ReadOptions`] and [`WriteOptions`].

pub mod delimited;
pub mod html;
pub mod json;
pub mod options;
pub mod registry;
pub mod traits;
pub mod xlsx;

pub use options::{ReadOptions, WriteOptions};
pub use registry::FormatRegistry;
pub use traits::{TableReader, TableWriter};
