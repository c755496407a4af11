use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// widecol - read and write a wide-column store from the command line
#[derive(Parser, Debug)]
#[command(name = "widecol")]
#[command(version)]
#[command(about = "Scan, select and upsert rows of a wide-column store", long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults are used when the file is missing)
    #[arg(long = "config", env = "WIDECOL_CONFIG", default_value = "widecol.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a table with the given column families
    CreateTable {
        table: String,

        /// Column family to create (repeatable)
        #[arg(long = "family", required = true)]
        families: Vec<String>,

        /// Versions kept per cell (default: store.default_max_versions)
        #[arg(long = "max-versions")]
        max_versions: Option<u32>,
    },

    /// Print every row of a table
    Scan { table: String },

    /// Print the rows matching a selection
    Select(SelectArgs),

    /// Write rows from a JSON payload: {"row": {"qualifier": "value" | null}}
    Upsert {
        table: String,
        family: String,

        /// Payload file (stdin when absent)
        #[arg(long = "payload")]
        payload: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct SelectArgs {
    pub table: String,

    /// Row key to start from (inclusive)
    #[arg(long = "start-key")]
    pub start_key: Option<String>,

    /// Maximum rows to return (0 = unlimited)
    #[arg(long = "limit", default_value_t = 0, allow_negative_numbers = true)]
    pub limit: i64,

    /// Walk backwards from the start key
    #[arg(long = "reversed")]
    pub reversed: bool,

    /// Column to return, as family:qualifier or family (repeatable)
    #[arg(long = "column", value_parser = parse_column)]
    pub columns: Vec<ColumnSpec>,

    /// Only rows whose key starts with this prefix
    #[arg(long = "prefix")]
    pub prefix: Option<String>,
}

/// A `--column` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub family: String,
    pub qualifier: Option<String>,
}

fn parse_column(s: &str) -> Result<ColumnSpec, String> {
    let (family, qualifier) = match s.split_once(':') {
        Some((family, qualifier)) => (family, Some(qualifier)),
        None => (s, None),
    };
    if family.is_empty() {
        return Err(format!("missing column family in '{}'", s));
    }
    if qualifier == Some("") {
        return Err(format!("missing qualifier in '{}'", s));
    }
    Ok(ColumnSpec {
        family: family.to_string(),
        qualifier: qualifier.map(str::to_string),
    })
}
