//! Process bridges to the bundler and the post-processing transformer.
//!
//! The bundler runs as one long-lived child per build. Requests and responses
//! are single lines of JSON; `build` comes first and every `generate` is
//! answered by the same process, against the bundle it built. The child exits
//! when its stdin closes.
//!
//! The transformer is one-shot: the request is written to the child's stdin,
//! the child writes one JSON response to stdout and exits.
//!
//! ```text
//! bundler      {"op":"build","options":{..}}      → {} | {"error":{..}}
//!              {"op":"generate","output":{..}}    → {"code":..,"map":..} | {"error":{..}}
//! transformer  {"code":..}  (argv: --whitelist=a,b) → {"code":..} | {"error":{..}}
//! ```

mod bundler;
mod session;
mod transformer;

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use bc_ir::BundleError;
use serde_json::Value;

pub use bundler::{CommandBundle, CommandBundler};
pub use transformer::CommandTransformer;

/// Error code attached to bundle errors caused by the bridge itself.
pub const BRIDGE_ERROR_CODE: &str = "BCHECK_BRIDGE";

/// Post-processing applied to generated code before execution.
pub trait Transformer: Send + Sync {
    /// Transform `code` with the transforms named in `whitelist`.
    fn transform(&self, code: &str, whitelist: &[String]) -> Result<String, TransformError>;
}

/// Why a transform did not produce code.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The transformer ran and rejected the code.
    #[error("{message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },
    /// The transformer could not be run.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// A child process did not complete the protocol.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("could not run `{}`: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{}` exited with {status}: {stderr}", program.display())]
    Exit {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`{}` sent a malformed response: {message}", program.display())]
    Protocol { program: PathBuf, message: String },
}

impl From<BridgeError> for BundleError {
    #[cold]
    fn from(err: BridgeError) -> Self {
        BundleError::with_code(err.to_string(), BRIDGE_ERROR_CODE)
    }
}

/// A program plus leading arguments, as given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CommandLine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLine {
    /// Split a command line into words. Single or double quotes group words
    /// containing whitespace, and a backslash escapes the next character
    /// outside single quotes. `None` if it is empty or ends inside a quote
    /// or escape.
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let mut words = split_words(line)?.into_iter();
        let program = PathBuf::from(words.next()?);
        Some(CommandLine {
            program,
            args: words.collect(),
        })
    }

    pub(crate) fn program(&self) -> &Path {
        &self.program
    }

    /// A process builder for this command followed by `extra_args`.
    pub(crate) fn command(&self, extra_args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).args(extra_args);
        command
    }

    /// Run once with `extra_args`, sending `request` and reading one response.
    pub(crate) fn exchange(&self, extra_args: &[String], request: &Value) -> Result<Value, BridgeError> {
        let spawn_error = |source| BridgeError::Spawn {
            program: self.program.clone(),
            source,
        };
        let protocol_error = |message: String| BridgeError::Protocol {
            program: self.program.clone(),
            message,
        };

        let payload = serde_json::to_vec(request)
            .map_err(|e| protocol_error(format!("could not encode request: {e}")))?;

        let mut child = self
            .command(extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).map_err(spawn_error)?;
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(BridgeError::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| protocol_error(format!("response is not JSON: {e}")))
    }
}

fn split_words(line: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    // A quoted empty string still makes a word.
    let mut started = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some('\''), c) => word.push(c),
            (_, '\\') => {
                word.push(chars.next()?);
                started = true;
            }
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                started = true;
            }
            (None, c) if c.is_whitespace() => {
                if started {
                    words.push(std::mem::take(&mut word));
                    started = false;
                }
            }
            (None, c) => {
                word.push(c);
                started = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if started {
        words.push(word);
    }
    Some(words)
}

/// Split a response into its `error` (if any) and the rest.
fn response_error(response: &Value) -> Option<Result<BundleError, serde_json::Error>> {
    response
        .get("error")
        .filter(|e| !e.is_null())
        .map(|e| serde_json::from_value(e.clone()))
}
