use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::constants::{DEFAULT_HEAD_LINES, PIPELINE_NAME};
use crate::pipeline::stages;
use crate::pipeline::{Pipeline, RunReport, Stage, StageContext};

/// Remainder of the command line, parsed again as the next command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub rest: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Read a csv, xlsx or json file and append it to the stream
    Read {
        /// File to read
        #[clap(short, long)]
        filename: PathBuf,
        /// Reader options as key=value pairs separated by '|'
        #[clap(short, long, default_value = "")]
        params: String,
        #[command(flatten)]
        next: Chain,
    },

    /// Print the first rows of every dataset
    Head {
        /// Rows to print; negative prints all but the last N rows
        #[clap(short, long, default_value_t = DEFAULT_HEAD_LINES, allow_negative_numbers = true)]
        lines: i64,
        #[command(flatten)]
        next: Chain,
    },

    /// Keep the rows matching an expression, and print them
    Filter {
        /// Boolean expression over column names, e.g. "age > 18 and city == 'Oslo'"
        #[clap(short, long)]
        expression: String,
        #[command(flatten)]
        next: Chain,
    },

    /// Write every dataset to a file chosen by extension
    To {
        /// Output file (.csv, .xlsx, .json, .html)
        #[clap(short, long)]
        filename: PathBuf,
        /// Writer options as key=value pairs separated by '|'
        #[clap(short, long, default_value = "")]
        params: String,
        #[command(flatten)]
        next: Chain,
    },

    /// Print a summary of columns, non-null counts and types
    Info {
        #[command(flatten)]
        next: Chain,
    },

    /// Print every row of every dataset
    Print {
        #[command(flatten)]
        next: Chain,
    },
}

impl Commands {
    fn chain_mut(&mut self) -> &mut Chain {
        match self {
            Commands::Read { next, .. }
            | Commands::Head { next, .. }
            | Commands::Filter { next, .. }
            | Commands::To { next, .. }
            | Commands::Info { next }
            | Commands::Print { next } => next,
        }
    }

    pub fn stage_name(&self) -> &'static str {
        match self {
            Commands::Read { .. } => "read",
            Commands::Head { .. } => "head",
            Commands::Filter { .. } => "filter",
            Commands::To { .. } => "to",
            Commands::Info { .. } => "info",
            Commands::Print { .. } => "print",
        }
    }

    pub fn into_stage(self, ctx: &StageContext) -> Box<dyn Stage> {
        match self {
            Commands::Read {
                filename, params, ..
            } => stages::read(filename, params, ctx),
            Commands::Head { lines, .. } => stages::head(lines, ctx),
            Commands::Filter { expression, .. } => stages::filter(expression, ctx),
            Commands::To {
                filename, params, ..
            } => stages::to(filename, params, ctx),
            Commands::Info { .. } => stages::info(ctx),
            Commands::Print { .. } => stages::print(ctx),
        }
    }
}

/// Chainable pipelines over tabular files
///
/// Commands run left to right, e.g.
/// `tabpipe read -f a.csv filter -e "x > 1" to -f out.csv`
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Exit with status 1 when any stage reports an error
    #[clap(long)]
    pub strict: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

/// One link of a chain: a command line without the binary name.
#[derive(Parser, Debug)]
#[command(name = "tabpipe", no_binary_name = true)]
struct ChainLink {
    #[command(subcommand)]
    cmd: Commands,
}

impl Cli {
    /// Every chained command, in command-line order.
    pub fn invocations(self) -> Result<Vec<Commands>, clap::Error> {
        let mut commands = Vec::new();
        let mut next = Some(self.cmd);
        while let Some(mut cmd) = next.take() {
            let rest = std::mem::take(&mut cmd.chain_mut().rest);
            if !rest.is_empty() {
                next = Some(ChainLink::try_parse_from(rest)?.cmd);
            }
            commands.push(cmd);
        }
        Ok(commands)
    }
}

pub fn build_pipeline(commands: Vec<Commands>, ctx: &StageContext) -> Pipeline {
    commands
        .into_iter()
        .fold(Pipeline::new(PIPELINE_NAME), |pipeline, cmd| {
            pipeline.add_stage(cmd.into_stage(ctx))
        })
}

/// Run the chained commands and report how it went.
pub fn chain_command(commands: Vec<Commands>, ctx: &StageContext) -> RunReport {
    debug!(
        "Chain: {}",
        commands
            .iter()
            .map(Commands::stage_name)
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    let report = build_pipeline(commands, ctx).run();
    if report.is_clean() {
        info!("Done, {} dataset(s) went through", report.drained);
    } else {
        warn!(
            "Finished with {} stage error(s), {} dataset(s) went through",
            report.errors.len(),
            report.drained
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Vec<Commands> {
        Cli::try_parse_from(args).unwrap().invocations().unwrap()
    }

    #[test]
    fn test_single_command() {
        assert_eq!(
            parse(&["tabpipe", "info"]),
            vec![Commands::Info {
                next: Chain::default()
            }]
        );
    }

    #[test]
    fn test_chain_keeps_order_and_flags() {
        let commands = parse(&[
            "tabpipe", "read", "-f", "a.csv", "-p", "sep=';'", "head", "-l", "-2", "filter",
            "-e", "x > 1", "to", "--filename", "out.json", "print",
        ]);
        let names: Vec<&str> = commands.iter().map(Commands::stage_name).collect();
        assert_eq!(names, vec!["read", "head", "filter", "to", "print"]);
        assert_eq!(
            commands[0],
            Commands::Read {
                filename: "a.csv".into(),
                params: "sep=';'".into(),
                next: Chain::default()
            }
        );
        assert!(matches!(commands[1], Commands::Head { lines: -2, .. }));
        assert!(matches!(&commands[2], Commands::Filter { expression, .. } if expression == "x > 1"));
    }

    #[test]
    fn test_defaults() {
        let commands = parse(&["tabpipe", "--strict", "read", "-f", "a.csv", "head"]);
        assert!(matches!(&commands[0], Commands::Read { params, .. } if params.is_empty()));
        assert!(matches!(commands[1], Commands::Head { lines: DEFAULT_HEAD_LINES, .. }));
    }

    #[test]
    fn test_malformed_links_are_rejected() {
        let bad_link = Cli::try_parse_from(["tabpipe", "read", "-f", "a.csv", "explode"])
            .unwrap()
            .invocations();
        assert!(bad_link.is_err());

        assert!(Cli::try_parse_from(["tabpipe", "filter"]).is_err());
        let missing_flag = Cli::try_parse_from(["tabpipe", "info", "to"])
            .unwrap()
            .invocations();
        assert!(missing_flag.is_err());
    }
}
