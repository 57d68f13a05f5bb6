/// Centralized error handling for tabpipe
pub mod params;
pub mod query;
pub mod stage;
pub mod table;
pub mod tabpipe;

pub use params::{ParamError, ParamResult};
pub use query::{QueryError, QueryResult};
pub use stage::StageError;
pub use table::{TableError, TableResult};
pub use tabpipe::{Result, TabpipeError};
