//! A transformer reached through a child process.

use serde_json::{json, Value};

use super::{response_error, BridgeError, CommandLine, TransformError, Transformer};

/// Pipes code through a command invoked with `--whitelist=<a,b>`.
#[derive(Clone, Debug)]
pub struct CommandTransformer {
    command: CommandLine,
}

impl CommandTransformer {
    pub fn parse(command_line: &str) -> Option<Self> {
        CommandLine::parse(command_line).map(|command| CommandTransformer { command })
    }

    fn protocol_error(&self, message: String) -> TransformError {
        BridgeError::Protocol {
            program: self.command.program().to_path_buf(),
            message,
        }
        .into()
    }
}

impl Transformer for CommandTransformer {
    fn transform(&self, code: &str, whitelist: &[String]) -> Result<String, TransformError> {
        let flag = format!("--whitelist={}", whitelist.join(","));
        let response = self.command.exchange(&[flag], &json!({ "code": code }))?;

        match response_error(&response) {
            Some(Ok(err)) => {
                return Err(TransformError::Rejected {
                    message: err.message,
                    code: err.code,
                })
            }
            Some(Err(e)) => return Err(self.protocol_error(format!("malformed error: {e}"))),
            None => {}
        }

        match response.get("code") {
            Some(Value::String(code)) => Ok(code.clone()),
            _ => Err(self.protocol_error("response has no `code` string".to_string())),
        }
    }
}
