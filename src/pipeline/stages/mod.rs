//! The chainable stages behind the command-line subcommands.

mod filter;
mod head;
mod read;
mod show;
mod to;

pub use filter::filter;
pub use head::head;
pub use read::read;
pub use show::{info, print};
pub use to::to;
