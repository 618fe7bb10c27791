mod cli;
mod config;
mod flow;
mod layout;
mod parser;
mod syntax;
mod watcher;
mod worker;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rayon::prelude::*;

use cli::{Cli, Commands};
use config::CodeFlowConfig;
use flow::FlowGraph;
use layout::LayoutOptions;
use parser::ParseOptions;
use syntax::Dialect;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CodeFlowConfig::load(Path::new("."));

    match cli.command {
        Commands::Parse {
            files,
            pretty,
            layout,
            dialect,
        } => {
            let options = config.parse_options(resolve_dialect(dialect.as_deref())?);
            let layout_options = layout.then(|| config.layout_options());
            run_parse(&files, &options, layout_options.as_ref(), pretty)
        }
        Commands::Serve { dialect } => {
            let options = config.parse_options(resolve_dialect(dialect.as_deref())?);
            worker::run(&options)
        }
        Commands::Watch {
            file,
            pretty,
            layout,
            dialect,
        } => {
            let options = config.parse_options(resolve_dialect(dialect.as_deref())?);
            let layout_options = layout.then(|| config.layout_options());
            watcher::watch_file(&file, |path| {
                match graph_for_file(path, &options, layout_options.as_ref())
                    .and_then(|graph| render(&graph, pretty))
                {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("warning: {err:#}"),
                }
            })
        }
    }
}

/// Map a `--dialect` flag to a [`Dialect`], erroring on unknown values.
fn resolve_dialect(flag: Option<&str>) -> Result<Option<Dialect>> {
    match flag {
        None => Ok(None),
        Some(s) => Dialect::from_str_loose(s).map(Some).ok_or_else(|| {
            anyhow!("unsupported dialect {s:?} (expected typescript, tsx or javascript)")
        }),
    }
}

/// Read, parse, and optionally lay out one file. Malformed source degrades to
/// the empty graph; an unreadable file is a real error.
fn graph_for_file(
    path: &Path,
    options: &ParseOptions,
    layout_options: Option<&LayoutOptions>,
) -> Result<FlowGraph> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let graph = parser::source_to_flow_or_empty(&source, options);
    Ok(match layout_options {
        Some(layout_options) => layout::layout_graph(graph, layout_options),
        None => graph,
    })
}

fn render(graph: &FlowGraph, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(graph)?
    } else {
        serde_json::to_string(graph)?
    };
    Ok(json)
}

fn run_parse(
    files: &[PathBuf],
    options: &ParseOptions,
    layout_options: Option<&LayoutOptions>,
    pretty: bool,
) -> Result<()> {
    if let [file] = files {
        let graph = graph_for_file(file, options, layout_options)?;
        println!("{}", render(&graph, pretty)?);
        return Ok(());
    }

    let graphs: Vec<(String, FlowGraph)> = files
        .par_iter()
        .map(|file| {
            let graph = graph_for_file(file, options, layout_options)?;
            Ok((file.display().to_string(), graph))
        })
        .collect::<Result<_>>()?;

    // Keyed object in input order.
    let mut map = serde_json::Map::new();
    for (path, graph) in graphs {
        map.insert(path, serde_json::to_value(graph)?);
    }
    let value = serde_json::Value::Object(map);
    let json = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{json}");
    Ok(())
}
