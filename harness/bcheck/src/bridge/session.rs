//! A long-lived bridge child answering one JSON line per request line.

use std::io::{BufRead as _, BufReader, Read as _, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Stdio};
use std::thread::JoinHandle;

use serde_json::Value;

use super::{BridgeError, CommandLine};

/// A running bridge process. Requests are answered in order.
///
/// Dropping the session closes the child's stdin and then kills and reaps it.
#[derive(Debug)]
pub(crate) struct Session {
    program: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    /// Collects stderr so a chatty child never blocks on a full pipe.
    stderr: Option<JoinHandle<String>>,
}

impl Session {
    pub(crate) fn spawn(command: &CommandLine) -> Result<Self, BridgeError> {
        let mut child = command
            .command(&[])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                program: command.program().to_path_buf(),
                source,
            })?;

        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                // Keep what was read before any error.
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        Ok(Session {
            program: command.program().to_path_buf(),
            stdin: child.stdin.take(),
            stdout: child.stdout.take().map(BufReader::new),
            stderr,
            child,
        })
    }

    /// Send `request` as one line and read the one-line response.
    pub(crate) fn request(&mut self, request: &Value) -> Result<Value, BridgeError> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| self.protocol_error(format!("could not encode request: {e}")))?;
        line.push('\n');

        let sent = match self.stdin.as_mut() {
            Some(stdin) => stdin
                .write_all(line.as_bytes())
                .and_then(|()| stdin.flush())
                .is_ok(),
            None => false,
        };

        let mut response = String::new();
        let read = match (sent, self.stdout.as_mut()) {
            (true, Some(stdout)) => stdout.read_line(&mut response),
            _ => Ok(0),
        };
        let read =
            read.map_err(|e| self.protocol_error(format!("could not read response: {e}")))?;
        if read == 0 {
            return Err(self.finish());
        }

        tracing::trace!(program = %self.program.display(), bytes = read, "bridge response");
        serde_json::from_str(response.trim_end())
            .map_err(|e| self.protocol_error(format!("response is not JSON: {e}")))
    }

    /// The child stopped answering: reap it and report how it ended.
    fn finish(&mut self) -> BridgeError {
        self.stdin = None;
        self.stdout = None;

        let status = match self.child.wait() {
            Ok(status) => status,
            Err(source) => {
                return BridgeError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            }
        };
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
            .trim()
            .to_string();

        if status.success() {
            self.protocol_error(format!("exited before answering: {stderr}"))
        } else {
            BridgeError::Exit {
                program: self.program.clone(),
                status,
                stderr,
            }
        }
    }

    fn protocol_error(&self, message: String) -> BridgeError {
        BridgeError::Protocol {
            program: self.program.clone(),
            message,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stdin = None;
        // Already-exited children make both calls fail harmlessly.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
