//! CLI argument parsing and command dispatch.
//!
//! Every command replays a command script onto a fresh graph (see
//! [`crate::script`]) and then reports on the result.
//!
//! # Commands
//!
//! - `run`: replay and report each command's outcome
//! - `dump`: replay and print the diagnostic dump
//! - `topo`: replay and print a topological order
//! - `path`: replay and print shortest distances from a source
//! - `stats`: replay and print node and edge counts
//!
//! # Example
//!
//! ```bash
//! digraph run roads.dg
//! digraph --json topo roads.dg
//! digraph path roads.dg --from depot --to harbour
//! ```

use crate::config::{ColorMode, Config};
use crate::script::{self, Replay};
use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::{Color, Colorize};
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Digraph - replay graph command scripts and query the result
///
/// Builds a directed weighted graph from a script of `node`, `edge`,
/// `del-node` and `del-edge` commands, then sorts it topologically or computes
/// shortest paths.
#[derive(Parser, Debug)]
#[command(name = "digraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Fail on the first command the graph rejects
    #[arg(long, global = true)]
    pub strict: bool,

    /// When to colour output
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorMode>,

    /// Configuration file (defaults to ./digraph.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replay a script and report each command's outcome
    Run(ScriptArgs),

    /// Replay a script and print the graph dump (always text)
    Dump(ScriptArgs),

    /// Replay a script and print a topological order
    ///
    /// Fails if the graph contains a cycle.
    Topo(ScriptArgs),

    /// Replay a script and print shortest distances from a source node
    Path(PathArgs),

    /// Replay a script and print node and edge counts
    Stats(ScriptArgs),
}

/// Arguments for commands that only need a script
#[derive(Parser, Debug, Clone)]
pub struct ScriptArgs {
    /// Path to the command script
    pub script: PathBuf,
}

/// Arguments for the `path` command
#[derive(Parser, Debug, Clone)]
pub struct PathArgs {
    /// Path to the command script
    pub script: PathBuf,

    /// Source node label
    #[arg(short, long)]
    pub from: String,

    /// Print only the path to this node
    #[arg(short, long)]
    pub to: Option<String>,
}

/// Effective settings after merging flags over the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Abort replay on the first rejection
    pub strict: bool,
    /// Emit JSON
    pub json: bool,
    /// Colour text output
    pub colors: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Colour mode: flag, then config file.
    #[must_use]
    pub fn color_mode(&self, config: &Config) -> ColorMode {
        self.color.unwrap_or(config.color)
    }

    /// Merges flags over `config`.
    #[must_use]
    pub fn settings(&self, config: &Config) -> Settings {
        Settings {
            strict: self.strict || config.strict,
            json: self.json || config.json,
            colors: self.color_mode(config).enabled(),
        }
    }

    /// Tracing filter used when `RUST_LOG` is unset: `-v` flags, then the
    /// config file, then `warn`.
    #[must_use]
    pub fn log_filter(&self, config: &Config) -> String {
        match self.verbose {
            0 => config.log.clone().unwrap_or_else(|| "warn".to_string()),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }

    /// Runs the selected command, writing its report to `out`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable or malformed scripts, on strict-mode rejections,
    /// and when the query itself fails (cycle, unknown node, no path).
    pub fn execute<W: Write>(&self, settings: &Settings, out: &mut W) -> Result<()> {
        tracing::debug!(command = ?self.command, "executing");
        match &self.command {
            Commands::Run(args) => execute_run(args, settings, out),
            Commands::Dump(args) => execute_dump(args, settings, out),
            Commands::Topo(args) => execute_topo(args, settings, out),
            Commands::Path(args) => execute_path(args, settings, out),
            Commands::Stats(args) => execute_stats(args, settings, out),
        }
    }
}

fn load(script: &Path, settings: &Settings) -> Result<Replay> {
    script::load(script, settings.strict)
        .with_context(|| format!("could not build graph from {}", script.display()))
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json}")?;
    Ok(())
}

fn paint(settings: &Settings, text: &str, color: Color) -> String {
    if settings.colors {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}

fn dim(settings: &Settings, text: &str) -> String {
    if settings.colors {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

fn execute_run<W: Write>(args: &ScriptArgs, settings: &Settings, out: &mut W) -> Result<()> {
    let replay = load(&args.script, settings)?;
    let graph = &replay.graph;

    if settings.json {
        return write_json(
            out,
            &json!({
                "outcomes": replay.outcomes,
                "nodes": graph.num_nodes(),
                "edges": graph.num_edges(),
            }),
        );
    }

    for outcome in &replay.outcomes {
        if outcome.accepted {
            writeln!(
                out,
                "{} line {}: {}",
                paint(settings, "ok  ", Color::Green),
                outcome.line,
                outcome.command
            )?;
        } else {
            let reason = outcome.reason.as_deref().unwrap_or("rejected");
            writeln!(
                out,
                "{} line {}: {} {}",
                paint(settings, "FAIL", Color::Red),
                outcome.line,
                outcome.command,
                dim(settings, &format!("({reason})"))
            )?;
        }
    }
    writeln!(
        out,
        "{} nodes, {} edges ({} rejected)",
        graph.num_nodes(),
        graph.num_edges(),
        replay.rejected().count()
    )?;
    Ok(())
}

fn execute_dump<W: Write>(args: &ScriptArgs, settings: &Settings, out: &mut W) -> Result<()> {
    let replay = load(&args.script, settings)?;
    replay.graph.write_dump(out)?;
    Ok(())
}

fn execute_topo<W: Write>(args: &ScriptArgs, settings: &Settings, out: &mut W) -> Result<()> {
    let replay = load(&args.script, settings)?;
    let order = replay
        .graph
        .topo_sort()
        .context("no topological order exists")?;

    if settings.json {
        return write_json(out, &json!({ "order": order }));
    }
    for label in &order {
        writeln!(out, "{label}")?;
    }
    Ok(())
}

fn execute_path<W: Write>(args: &PathArgs, settings: &Settings, out: &mut W) -> Result<()> {
    let replay = load(&args.script, settings)?;
    let paths = replay.graph.shortest_path(&args.from)?;

    let Some(target) = args.to.as_deref() else {
        if settings.json {
            return write_json(out, &paths);
        }
        for line in paths.lines() {
            writeln!(out, "{line}")?;
        }
        return Ok(());
    };

    if !replay.graph.contains_node(target) {
        return Err(crate::GraphError::NodeNotFound(target.to_string()).into());
    }
    let path = paths
        .path_to(target)
        .ok_or_else(|| anyhow!("no path from {} to {}", args.from, target))?;
    let distance = paths.distance(target).and_then(|d| d.finite());

    if settings.json {
        return write_json(
            out,
            &json!({
                "from": args.from,
                "to": target,
                "distance": distance,
                "path": path,
            }),
        );
    }
    let rendered = distance.map_or_else(String::new, |d| d.to_string());
    writeln!(
        out,
        "{} {}",
        path.join(" -> "),
        dim(settings, &format!("(distance {rendered})"))
    )?;
    Ok(())
}

fn execute_stats<W: Write>(args: &ScriptArgs, settings: &Settings, out: &mut W) -> Result<()> {
    let replay = load(&args.script, settings)?;
    let graph = &replay.graph;

    if settings.json {
        return write_json(
            out,
            &json!({
                "nodes": graph.num_nodes(),
                "edges": graph.num_edges(),
                "acyclic": !graph.has_cycle(),
            }),
        );
    }
    writeln!(out, "nodes: {}", graph.num_nodes())?;
    writeln!(out, "edges: {}", graph.num_edges())?;
    writeln!(out, "acyclic: {}", !graph.has_cycle())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PLAIN: Settings = Settings {
        strict: false,
        json: false,
        colors: false,
    };

    fn script_file(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.dg");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn run(args: &[&str], settings: &Settings) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("digraph").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        cli.execute(settings, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["digraph", "--strict", "--color", "never", "stats", "x"])
            .unwrap();
        let config = Config {
            json: true,
            color: ColorMode::Always,
            ..Config::default()
        };

        let settings = cli.settings(&config);

        assert!(settings.strict);
        assert!(settings.json);
        assert!(!settings.colors);
    }

    #[test]
    fn verbosity_beats_config_log_level() {
        let config = Config {
            log: Some("error".into()),
            ..Config::default()
        };
        let quiet = Cli::try_parse_from(["digraph", "stats", "x"]).unwrap();
        let loud = Cli::try_parse_from(["digraph", "-vv", "stats", "x"]).unwrap();

        assert_eq!(quiet.log_filter(&config), "error");
        assert_eq!(quiet.log_filter(&Config::default()), "warn");
        assert_eq!(loud.log_filter(&config), "debug");
    }

    #[test]
    fn run_reports_each_outcome() {
        let (_dir, path) = script_file("node 1 a\nnode 1 b\n");

        let output = run(&["run", path.to_str().unwrap()], &PLAIN).unwrap();

        assert_eq!(
            output,
            "ok   line 1: node 1 a\n\
             FAIL line 2: node 1 b (node id 1 is already in use)\n\
             1 nodes, 0 edges (1 rejected)\n"
        );
    }

    #[test]
    fn topo_prints_one_label_per_line() {
        let (_dir, path) = script_file("node 1 a\nnode 2 b\nedge 1 b a 1\n");

        let output = run(&["topo", path.to_str().unwrap()], &PLAIN).unwrap();

        assert_eq!(output, "b\na\n");
    }

    #[test]
    fn topo_fails_on_cycle() {
        let (_dir, path) = script_file("node 1 a\nnode 2 b\nedge 1 a b 3\nedge 2 b a 3\n");

        let err = run(&["topo", path.to_str().unwrap()], &PLAIN).unwrap_err();

        assert!(format!("{err:#}").contains("cycle detected"));
    }

    #[test]
    fn path_to_target_prints_route() {
        let (_dir, path) = script_file(
            "node 1 A\nnode 2 B\nnode 3 C\nedge 1 A B 1\nedge 2 B C 1\nedge 3 A C 5\n",
        );
        let script = path.to_str().unwrap();

        let all = run(&["path", script, "--from", "A"], &PLAIN).unwrap();
        let single = run(&["path", script, "--from", "A", "--to", "C"], &PLAIN).unwrap();

        assert_eq!(all, "A: 0\nB: 1\nC: 2\n");
        assert_eq!(single, "A -> B -> C (distance 2)\n");
    }

    #[test]
    fn path_to_unreachable_target_fails() {
        let (_dir, path) = script_file("node 1 a\nnode 2 b\n");

        let err = run(
            &["path", path.to_str().unwrap(), "--from", "a", "--to", "b"],
            &PLAIN,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "no path from a to b");
    }

    #[test]
    fn stats_as_json() {
        let (_dir, path) = script_file("node 1 a\nnode 2 b\nedge 1 a b 1\n");
        let settings = Settings {
            json: true,
            ..PLAIN
        };

        let output = run(&["stats", path.to_str().unwrap()], &settings).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value, json!({"nodes": 2, "edges": 1, "acyclic": true}));
    }

    #[test]
    fn strict_mode_fails_on_rejection() {
        let (_dir, path) = script_file("node 1 a\nnode 2 a\n");
        let settings = Settings {
            strict: true,
            ..PLAIN
        };

        let err = run(&["stats", path.to_str().unwrap()], &settings).unwrap_err();

        let chain = format!("{err:#}");
        assert!(chain.contains("line 2"), "{chain}");
        assert!(chain.contains("node label 'a' is already in use"), "{chain}");
    }
}
