use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum ParseFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "chatflow")]
#[command(version)]
#[command(about = "Run guided chat flows described as activity diagrams")]
#[command(long_about = "
chatflow lowers PlantUML-style activity diagrams into executable workflow
graphs and steps through them interactively.

Example usage:
  chatflow parse onboarding.puml            # Show the lowered graph
  chatflow validate onboarding.puml         # Check graph invariants
  chatflow export onboarding.puml           # Print a Mermaid flowchart
  chatflow run onboarding.puml --var name=Ada
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a diagram and print the resulting graph
    #[command(long_about = "
Parses a diagram file and prints the nodes, transitions and start points
of the lowered graph. Parsing is tolerant: unrecognised lines are skipped
and unterminated branches or loops are closed at end of input.

Examples:
  chatflow parse flow.puml
  chatflow parse flow.puml --format json
")]
    Parse {
        /// Diagram file to parse
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ParseFormat,
    },
    /// Check a diagram for structural problems
    #[command(long_about = "
Parses a diagram and checks the lowered graph:

- every transition references existing nodes
- node ids are unique
- start points reference existing nodes
- every node is reachable from the start node (warning only)

Exit codes: 0 clean, 1 warnings, 2 violations.
")]
    Validate {
        /// Diagram file to validate
        file: PathBuf,
    },
    /// Print a diagram as a Mermaid flowchart
    Export {
        /// Diagram file to export
        file: PathBuf,

        /// Node id to highlight
        #[arg(long, value_name = "NODE_ID")]
        highlight: Option<String>,
    },
    /// Step through a diagram interactively
    #[command(long_about = "
Imports a diagram and walks it from the start node. Each step prints the
current prompt, or the numbered choices when the path branches. Answer
with a choice number, a node id or a branch label; an empty line follows
the only available path. Input ends at EOF or when a node without
outgoing transitions is reached.

Built-in actions (set_variable, log, wait) are available to node notes.
With a state directory the position survives across runs.

Examples:
  chatflow run flow.puml --var name=Ada
  chatflow run flow.puml --id intake --state-dir ~/.chatflow
")]
    Run {
        /// Diagram file to run
        file: PathBuf,

        /// Workflow id (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,

        /// Initial variables in key=value form
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// Directory for persisted definitions and positions
        #[arg(long, value_name = "DIR")]
        state_dir: Option<PathBuf>,

        /// Ignore any persisted position and start over
        #[arg(long)]
        restart: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    #[allow(dead_code)]
    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(args)
    }
}
