// SPDX-License-Identifier: MIT
//! `DirectHttpExecutor`: the agent-is-an-HTTP-endpoint variant of
//! [`Executor`] (spec §4.1), supplemented from
//! `original_source/src/oneshot/providers/direct_executor.py` which the
//! distillation dropped.

use crate::error::ExecuteError;
use crate::executor::{ExecutionStream, Executor, ExecutorMetadata};
use async_trait::async_trait;
use futures::StreamExt;
use oneshot_core::{RecoveryResult, TaskId, ZombieVerdict};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DirectHttpExecutorConfig {
    pub name: String,
    pub endpoint: String,
    pub bearer_token: Option<String>,
    pub request_timeout: Duration,
}

pub struct DirectHttpExecutor {
    config: DirectHttpExecutorConfig,
    client: reqwest::Client,
}

impl DirectHttpExecutor {
    pub fn new(config: DirectHttpExecutorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }
}

#[async_trait]
impl Executor for DirectHttpExecutor {
    async fn execute(&self, prompt: &str) -> Result<ExecutionStream, ExecuteError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&serde_json::json!({ "prompt": prompt }));
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExecuteError::LaunchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExecuteError::LaunchError(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        let mut byte_stream = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer = Vec::new();
            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(ExecuteError::Crashed(e.to_string()));
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);
                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line = buffer.drain(..=pos).collect::<Vec<u8>>();
                    let line = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
                    if !line.is_empty() {
                        yield Ok(line);
                    }
                }
            }
            if !buffer.is_empty() {
                yield Ok(String::from_utf8_lossy(&buffer).into_owned());
            }
        };

        Ok(ExecutionStream::new(stream))
    }

    async fn recover(&self, _task_id: &TaskId) -> RecoveryResult {
        // An HTTP endpoint leaves nothing on local disk to inspect; a
        // direct-http agent can only be forensically recovered if it
        // exposes its own status endpoint, which is out of scope here.
        RecoveryResult {
            success: false,
            recovered_activity: Vec::new(),
            verdict: Some(ZombieVerdict::Dead),
        }
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata {
            name: self.config.name.clone(),
            captures_git: false,
            supports_model_selection: false,
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
