//! Out-of-process sandbox backed by `node`.
//!
//! Each run spawns a fresh `node` process with a fixed loader script. The
//! loader reads `{ code, requireRoot, exports, marker }` from stdin, compiles
//! the code into a function over [`crate::PARAMETERS`], calls it, and prints a
//! single result line prefixed with `marker`. Anything the executed code
//! prints goes to the same stdout and is ignored.
//!
//! The marker is fresh for every run and only travels over stdin, which the
//! loader has consumed before the code starts. A result is accepted only
//! when it carries that marker and the process then exits cleanly.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Bindings, ExecutionSandbox, ModuleRecord, SandboxError, Thrown};

const LOADER: &str = include_str!("loader.js");

/// Runs started by this process, mixed into each marker.
static RUNS: AtomicU64 = AtomicU64::new(0);

/// A result-line prefix the executed code cannot predict.
fn result_marker() -> String {
    let run = RUNS.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());

    let mut halves = [0u64; 2];
    for (salt, half) in (0u64..).zip(halves.iter_mut()) {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(salt);
        hasher.write_u64(run);
        hasher.write_u32(std::process::id());
        hasher.write_u128(nanos);
        *half = hasher.finish();
    }
    format!("\u{0}bcheck-result-{:016x}{:016x}\u{0}", halves[0], halves[1])
}

/// Runs generated code in a child `node` process.
#[derive(Clone, Debug)]
pub struct NodeSandbox {
    program: PathBuf,
}

impl NodeSandbox {
    /// Use `node` from `PATH`.
    pub fn new() -> Self {
        NodeSandbox {
            program: PathBuf::from("node"),
        }
    }

    /// Use a specific node executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        NodeSandbox {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for NodeSandbox {
    fn default() -> Self {
        NodeSandbox::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    code: &'a str,
    require_root: &'a Path,
    exports: &'a Value,
    marker: &'a str,
}

#[derive(Deserialize)]
struct RawResult {
    ok: bool,
    #[serde(default)]
    exports: Value,
    #[serde(default)]
    error: Option<Thrown>,
}

impl ExecutionSandbox for NodeSandbox {
    fn run(&self, code: &str, bindings: &Bindings) -> Result<ModuleRecord, SandboxError> {
        // `createRequire` only accepts absolute paths.
        let require_root = std::fs::canonicalize(&bindings.require_root).map_err(|source| {
            SandboxError::RequireRoot {
                path: bindings.require_root.clone(),
                source,
            }
        })?;
        let marker = result_marker();

        let payload = serde_json::to_vec(&Payload {
            code,
            require_root: &require_root,
            exports: &bindings.module.exports,
            marker: &marker,
        })
        .map_err(|e| SandboxError::Protocol(format!("could not encode payload: {e}")))?;

        let spawn_error = |source| SandboxError::Spawn {
            program: self.program.display().to_string(),
            source,
        };

        let mut child = Command::new(&self.program)
            .arg("-e")
            .arg(LOADER)
            .current_dir(&require_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).map_err(spawn_error)?;
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        tracing::trace!(status = %output.status, "sandbox finished");

        let context = || {
            format!(
                "exit status {}; stderr: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )
        };

        match parse_result(&stdout, &marker) {
            Ok(_) if !output.status.success() => Err(SandboxError::Protocol(format!(
                "sandbox failed after reporting a result ({})",
                context()
            ))),
            Err(SandboxError::Protocol(message)) => {
                Err(SandboxError::Protocol(format!("{message} ({})", context())))
            }
            result => result,
        }
    }
}

/// Extract the result tagged with `marker` from the child's stdout.
fn parse_result(stdout: &str, marker: &str) -> Result<ModuleRecord, SandboxError> {
    let Some(start) = stdout.rfind(marker) else {
        return Err(SandboxError::Protocol(
            "sandbox exited without reporting a result".to_string(),
        ));
    };

    let line = stdout[start + marker.len()..].lines().next().unwrap_or("");
    let raw: RawResult = serde_json::from_str(line)
        .map_err(|e| SandboxError::Protocol(format!("malformed result line: {e}")))?;

    if raw.ok {
        Ok(ModuleRecord {
            exports: raw.exports,
        })
    } else {
        Err(SandboxError::Thrown(raw.error.unwrap_or_else(|| Thrown {
            message: "unknown error".to_string(),
            ..Thrown::default()
        })))
    }
}
