//! Sandboxed execution of generated bundles.
//!
//! Generated output is only guaranteed to be valid syntax for its target
//! format, so it never runs inside the harness process. A sandbox evaluates
//! the code as the body of a function with exactly four parameters:
//!
//! | parameter | binding |
//! |-----------|---------|
//! | `require` | module resolution rooted at [`Bindings::require_root`] |
//! | `module`  | a fresh module record, `{ exports: <initial exports> }` |
//! | `exports` | alias of `module.exports` |
//! | `assert`  | the host assertion module |
//!
//! Nothing else from the caller is visible to the executed code.

mod node;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use node::NodeSandbox;

/// Parameter names of the function the generated code becomes the body of.
pub const PARAMETERS: [&str; 4] = ["require", "module", "exports", "assert"];

/// The module record seen by executed code, and returned after execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// `module.exports`, as JSON. Functions appear as `"[Function: name]"`,
    /// `undefined` as `null` and cycles as `"[Circular]"`.
    pub exports: Value,
}

impl ModuleRecord {
    /// A record whose exports object is `{}`.
    pub fn empty() -> Self {
        ModuleRecord {
            exports: Value::Object(Map::new()),
        }
    }
}

impl Default for ModuleRecord {
    fn default() -> Self {
        ModuleRecord::empty()
    }
}

/// Values injected into the executed scope.
#[derive(Clone, Debug, PartialEq)]
pub struct Bindings {
    /// Directory `require` resolves relative module ids from. A relative
    /// path is taken relative to the harness's working directory.
    pub require_root: PathBuf,
    /// Initial module record.
    pub module: ModuleRecord,
}

impl Bindings {
    pub fn new(require_root: impl Into<PathBuf>) -> Self {
        Bindings {
            require_root: require_root.into(),
            module: ModuleRecord::empty(),
        }
    }
}

/// A value thrown by executed code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thrown {
    /// Constructor name for error objects (`Error`, `AssertionError`, ...).
    #[serde(default)]
    pub name: Option<String>,
    pub message: String,
    /// The error's `code` property, when set.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

impl std::fmt::Display for Thrown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Why a sandbox run did not complete.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The executed code threw.
    #[error("{0}")]
    Thrown(Thrown),
    /// The sandbox process could not be started.
    #[error("could not start sandbox `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The require root could not be resolved to an absolute directory.
    #[error("sandbox require root `{}` is not accessible: {source}", path.display())]
    RequireRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The sandbox ended without reporting a result, or misbehaved after
    /// reporting one.
    #[error("sandbox protocol error: {0}")]
    Protocol(String),
}

/// Executes generated code against a fixed set of bindings.
pub trait ExecutionSandbox: Send + Sync {
    /// Run `code` and return the final module record.
    fn run(&self, code: &str, bindings: &Bindings) -> Result<ModuleRecord, SandboxError>;
}
