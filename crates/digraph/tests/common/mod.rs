//! Common test utilities shared across integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path to the `digraph` binary built for this test run
pub fn digraph_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_digraph"))
}

/// Run the digraph binary in the specified directory.
///
/// `RUST_LOG` and `NO_COLOR` are cleared so the caller's environment does not
/// leak into the output.
pub fn run_digraph_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(digraph_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("NO_COLOR")
        .output()
        .expect("Failed to execute digraph binary")
}

/// Write a script named `name` into `dir` and return its path
pub fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write script");
    path
}

/// Stdout of a finished command, lossily decoded
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished command, lossily decoded
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
