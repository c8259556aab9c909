//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `calmirror-provider-google`) using JSON over stdin/stdout.
//!
//! Any executable that speaks the JSON protocol can be a provider. Providers
//! manage their own credentials; calmirror only forwards the calendar's
//! provider-specific parameters from the config.

use std::process::Stdio;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{CalMirrorError, CalMirrorResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("calmirror-provider-{}", self.0)
    }

    fn binary_path(&self) -> CalMirrorResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| CalMirrorError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> CalMirrorResult<C::Response> {
        let command = C::command();
        let line = encode_request(command, cmd)?;
        timeout(PROVIDER_TIMEOUT, self.exchange(command, &line))
            .await
            .map_err(|_| CalMirrorError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    /// Run the provider once: one request line in, one response document out.
    async fn exchange<R: DeserializeOwned>(&self, command: Command, line: &[u8]) -> CalMirrorResult<R> {
        let binary_path = self.binary_path()?;
        let context = format!("{} {}", self.binary_name(), command.as_str());

        let mut child = TokioCommand::new(&binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CalMirrorError::Provider(format!("{context}: could not start: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(line).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
            return Err(CalMirrorError::Provider(format!("{context}: exited with {status}")));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
            .map_err(|e| match e {
                CalMirrorError::Provider(msg) => CalMirrorError::Provider(format!("{context}: {msg}")),
                other => other,
            })
    }
}

/// Serialize a command as the newline-terminated request a provider reads.
fn encode_request<P: Serialize>(command: Command, params: P) -> CalMirrorResult<Vec<u8>> {
    let request = Request {
        command,
        params: serde_json::to_value(params)
            .map_err(|e| CalMirrorError::Serialization(e.to_string()))?,
    };
    let mut line =
        serde_json::to_vec(&request).map_err(|e| CalMirrorError::Serialization(e.to_string()))?;
    line.push(b'\n');
    Ok(line)
}

fn parse_response<R: DeserializeOwned>(raw: &str) -> CalMirrorResult<R> {
    if raw.trim().is_empty() {
        return Err(CalMirrorError::Provider("no response on stdout".into()));
    }

    let response: Response<R> = serde_json::from_str(raw)
        .map_err(|e| CalMirrorError::Provider(format!("unreadable response: {e}")))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(CalMirrorError::Provider(error)),
    }
}
