pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod params;
pub mod pipeline;
pub mod query;
pub mod table;
pub mod util;
