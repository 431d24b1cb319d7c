//! Command scripts: line-oriented graph operations replayed onto a fresh graph.
//!
//! ```text
//! # comments run to end of line
//! node 1 a
//! node 2 b
//! edge 10 a b 4 road
//! edge 11 b a 1
//! del-edge b a
//! del-node b
//! ```
//!
//! Tokens are separated by whitespace, so labels cannot contain spaces or
//! `#`. Ids are read as signed integers so a negative id reaches the graph
//! and is rejected there like any other invalid operation, rather than
//! failing the parse.

use crate::domain::{EdgeId, NodeId};
use crate::error::GraphError;
use crate::Graph;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from loading or replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("failed to read script {}: {source}", .path.display())]
    Io {
        /// Script path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A line is not a valid command.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What is wrong with the line
        message: String,
    },

    /// The graph rejected a command (strict replay only).
    #[error("line {line}: `{command}` rejected")]
    Rejected {
        /// 1-based line number
        line: usize,
        /// The rejected command
        command: Command,
        /// Why the graph rejected it
        source: GraphError,
    },
}

/// A single graph operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `node <id> <label>`
    AddNode {
        /// Node id, validated by the graph
        id: i64,
        /// Node label
        label: String,
    },
    /// `edge <id> <source> <dest> <weight> [label]`
    AddEdge {
        /// Edge id, validated by the graph
        id: i64,
        /// Source label
        from: String,
        /// Destination label
        to: String,
        /// Edge weight
        weight: i64,
        /// Optional edge label
        label: Option<String>,
    },
    /// `del-node <label>`
    DelNode {
        /// Label of the node to remove
        label: String,
    },
    /// `del-edge <source> <dest>`
    DelEdge {
        /// Source label
        from: String,
        /// Destination label
        to: String,
    },
}

impl Command {
    /// Applies this command to `graph`.
    ///
    /// # Errors
    ///
    /// Returns whatever the graph operation returns, plus
    /// [`GraphError::NegativeId`] for negative ids.
    pub fn apply(&self, graph: &mut Graph) -> Result<(), GraphError> {
        match self {
            Self::AddNode { id, label } => graph.add_node(NodeId::try_from(*id)?, label.as_str()),
            Self::AddEdge {
                id,
                from,
                to,
                weight,
                label,
            } => graph.add_edge(EdgeId::try_from(*id)?, from, to, *weight, label.as_deref()),
            Self::DelNode { label } => graph.del_node(label),
            Self::DelEdge { from, to } => graph.del_edge(from, to),
        }
    }
}

/// Renders the command in script syntax.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddNode { id, label } => write!(f, "node {id} {label}"),
            Self::AddEdge {
                id,
                from,
                to,
                weight,
                label,
            } => {
                write!(f, "edge {id} {from} {to} {weight}")?;
                if let Some(label) = label {
                    write!(f, " {label}")?;
                }
                Ok(())
            }
            Self::DelNode { label } => write!(f, "del-node {label}"),
            Self::DelEdge { from, to } => write!(f, "del-edge {from} {to}"),
        }
    }
}

/// A parsed command with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based line number
    pub line: usize,
    /// The command on that line
    pub command: Command,
}

/// What happened to one statement during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// 1-based line number
    pub line: usize,
    /// The command, in script syntax
    pub command: String,
    /// Whether the graph accepted it
    pub accepted: bool,
    /// Rejection reason, if rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A graph built by replaying a script, with per-statement outcomes.
#[derive(Debug, Clone)]
pub struct Replay {
    /// The resulting graph
    pub graph: Graph,
    /// One outcome per statement, in script order
    pub outcomes: Vec<Outcome>,
}

impl Replay {
    /// Outcomes the graph rejected.
    pub fn rejected(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|outcome| !outcome.accepted)
    }
}

/// Parses a whole script.
///
/// # Errors
///
/// Returns [`ScriptError::Parse`] for the first malformed line.
pub fn parse(source: &str) -> Result<Vec<Statement>, ScriptError> {
    let mut statements = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or_default();
        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let command = parse_tokens(&tokens).map_err(|message| ScriptError::Parse { line, message })?;
        statements.push(Statement { line, command });
    }
    Ok(statements)
}

fn parse_tokens(tokens: &[&str]) -> Result<Command, String> {
    let (keyword, args) = tokens
        .split_first()
        .ok_or_else(|| "empty command".to_string())?;

    match (*keyword, args) {
        ("node", [id, label]) => Ok(Command::AddNode {
            id: parse_int("id", id)?,
            label: (*label).to_string(),
        }),
        ("edge", [id, from, to, weight, rest @ ..]) if rest.len() <= 1 => Ok(Command::AddEdge {
            id: parse_int("id", id)?,
            from: (*from).to_string(),
            to: (*to).to_string(),
            weight: parse_int("weight", weight)?,
            label: rest.first().map(|label| (*label).to_string()),
        }),
        ("del-node", [label]) => Ok(Command::DelNode {
            label: (*label).to_string(),
        }),
        ("del-edge", [from, to]) => Ok(Command::DelEdge {
            from: (*from).to_string(),
            to: (*to).to_string(),
        }),
        ("node", _) => Err("expected: node <id> <label>".to_string()),
        ("edge", _) => Err("expected: edge <id> <source> <dest> <weight> [label]".to_string()),
        ("del-node", _) => Err("expected: del-node <label>".to_string()),
        ("del-edge", _) => Err("expected: del-edge <source> <dest>".to_string()),
        (other, _) => Err(format!("unknown command '{other}'")),
    }
}

fn parse_int(what: &str, token: &str) -> Result<i64, String> {
    token
        .parse()
        .map_err(|_| format!("invalid {what} '{token}': expected an integer"))
}

/// Replays statements onto a fresh graph.
///
/// Rejected commands are recorded and logged, and replay continues. With
/// `strict`, the first rejection aborts the replay instead.
///
/// # Errors
///
/// Returns [`ScriptError::Rejected`] in strict mode.
pub fn replay(statements: &[Statement], strict: bool) -> Result<Replay, ScriptError> {
    let mut graph = Graph::new();
    let mut outcomes = Vec::with_capacity(statements.len());

    for Statement { line, command } in statements {
        let result = command.apply(&mut graph);
        if let Err(err) = &result {
            if strict {
                return Err(ScriptError::Rejected {
                    line: *line,
                    command: command.clone(),
                    source: err.clone(),
                });
            }
            warn!(line, command = %command, error = %err, "command rejected");
        }
        outcomes.push(Outcome {
            line: *line,
            command: command.to_string(),
            accepted: result.is_ok(),
            reason: result.err().map(|err| err.to_string()),
        });
    }

    debug!(
        statements = statements.len(),
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        "script replayed"
    );
    Ok(Replay { graph, outcomes })
}

/// Reads, parses and replays the script at `path`.
///
/// # Errors
///
/// Returns [`ScriptError::Io`] if the file cannot be read, otherwise as
/// [`parse`] and [`replay`].
pub fn load(path: &Path, strict: bool) -> Result<Replay, ScriptError> {
    let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let statements = parse(&source)?;
    replay(&statements, strict)
}
