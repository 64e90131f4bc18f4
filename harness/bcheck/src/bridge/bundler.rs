//! A bundler reached through a child process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bc_ir::{Bundle, BundleError, BuildRequest, Bundler, Options, Output};
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::session::Session;
use super::{response_error, BridgeError, CommandLine};

/// Starts one bundler process per build.
///
/// The process that answered `build` keeps the bundle and answers every
/// `generate` for it, so a fixture is built once however many profiles it
/// is generated for.
#[derive(Clone, Debug)]
pub struct CommandBundler {
    command: CommandLine,
}

impl CommandBundler {
    /// Parse a command line such as `node ./bundler-bridge.js`.
    pub fn parse(command_line: &str) -> Option<Self> {
        CommandLine::parse(command_line).map(|command| CommandBundler { command })
    }

    pub fn program(&self) -> &Path {
        self.command.program()
    }
}

impl Bundler for CommandBundler {
    fn build(&self, request: &BuildRequest) -> Result<Arc<dyn Bundle>, BundleError> {
        let mut session = Session::spawn(&self.command)?;
        let response = session.request(&json!({ "op": "build", "options": request.options() }))?;
        answer(self.program(), response)?;
        tracing::debug!(program = %self.program().display(), "bundler session started");

        Ok(Arc::new(CommandBundle {
            program: self.program().to_path_buf(),
            session: Mutex::new(session),
        }))
    }
}

/// A successful build, held by the bundler process that made it.
#[derive(Debug)]
pub struct CommandBundle {
    program: PathBuf,
    session: Mutex<Session>,
}

impl Bundle for CommandBundle {
    fn generate(&self, options: &Options) -> Result<Output, BundleError> {
        let response = self
            .session
            .lock()
            .request(&json!({ "op": "generate", "output": options }))?;
        let response = answer(&self.program, response)?;
        serde_json::from_value(response).map_err(|e| {
            BridgeError::Protocol {
                program: self.program.clone(),
                message: format!("malformed output: {e}"),
            }
            .into()
        })
    }
}

/// The response itself, or the bundle error it declares.
fn answer(program: &Path, response: Value) -> Result<Value, BundleError> {
    match response_error(&response) {
        Some(Ok(err)) => Err(err),
        Some(Err(e)) => Err(BridgeError::Protocol {
            program: program.to_path_buf(),
            message: format!("malformed error: {e}"),
        }
        .into()),
        None => Ok(response),
    }
}
