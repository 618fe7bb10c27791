use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Turns JavaScript/TypeScript source into an attributed flow graph.
///
/// code-flow parses source text and emits `{nodes, edges}` JSON ready for an
/// interactive diagram renderer: control flow, data flow, scope navigation
/// and declaration/usage links.
#[derive(Parser, Debug)]
#[command(
    name = "code-flow",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse one or more source files and print their flow graphs as JSON.
    ///
    /// A single file prints its graph directly; multiple files print a JSON
    /// object keyed by path (files are parsed in parallel). Malformed files
    /// yield the empty graph.
    Parse {
        /// Source files to parse.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,

        /// Run the layout pass so every node carries its final position.
        #[arg(long)]
        layout: bool,

        /// Grammar dialect: "typescript" (default), "tsx" or "javascript".
        #[arg(long)]
        dialect: Option<String>,
    },

    /// Serve parse requests over stdin/stdout, one JSON object per line.
    ///
    /// Request: {"sourceText": "...", "requestId": N}. Response: {"nodes":
    /// [...], "edges": [...], "requestId": N} — empty lists on any failure.
    Serve {
        /// Grammar dialect: "typescript" (default), "tsx" or "javascript".
        #[arg(long)]
        dialect: Option<String>,
    },

    /// Watch a file and re-emit its flow graph on every (debounced) change.
    Watch {
        /// Source file to watch.
        file: PathBuf,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,

        /// Run the layout pass on each emitted graph.
        #[arg(long)]
        layout: bool,

        /// Grammar dialect: "typescript" (default), "tsx" or "javascript".
        #[arg(long)]
        dialect: Option<String>,
    },
}
