use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "mailsift-cli", version, about = "Email deliverability filtering")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// envelope sender used by the SMTP probe
    #[arg(long, default_value = "postmaster@localhost")]
    pub sender: String,

    /// run the SMTP recipient probe stage
    #[arg(long)]
    pub probe: bool,

    /// output format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Ndjson,
}

#[derive(Subcommand)]
pub enum Commands {
    /// classify one address (syntax, MX, optional probe)
    Validate { email: String },
    /// filter a CSV, keeping rows whose addresses are all deliverable
    Filter {
        /// input CSV with 'name' and 'emails' columns
        #[arg(long)]
        input: PathBuf,

        /// filtered output path (default: filtered_<stem>.csv next to input)
        #[arg(long)]
        out: Option<PathBuf>,

        /// resume from a prior checkpoint when one exists
        #[arg(long)]
        resume: bool,

        /// rows between checkpoint writes
        #[arg(long, default_value_t = 10)]
        interval: usize,

        /// directory holding checkpoint files
        #[arg(long, default_value = ".")]
        checkpoint_dir: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
