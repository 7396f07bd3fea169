//! Supervisor for a local `llama-server` process.
//!
//! Launches llama.cpp's HTTP server with the configured weights, context
//! window, and GPU offload, then polls `GET /health` until the model has
//! loaded. The child is killed when the supervisor is dropped or shut down.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use chatguru_types::config::{ModelConfig, ServerConfig};
use chatguru_types::llm::LlmError;

/// Delay between health probes while the model loads.
const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A running `llama-server` child process.
pub struct LlamaServer {
    child: Child,
    root_url: String,
}

impl LlamaServer {
    /// Command-line arguments for `llama-server`.
    pub fn command_args(model: &ModelConfig, port: u16) -> Vec<String> {
        vec![
            "-m".to_string(),
            model.model_path.display().to_string(),
            "-c".to_string(),
            model.context_window.to_string(),
            "-ngl".to_string(),
            model.accel_layers.to_string(),
            "--host".to_string(),
            "127.0.0.1".to_string(),
            "--port".to_string(),
            port.to_string(),
        ]
    }

    /// Spawn the server and wait until it reports healthy.
    ///
    /// # Errors
    ///
    /// [`LlmError::Unavailable`] if the weights file is missing, the binary
    /// cannot be started, the process exits early, or the model does not
    /// finish loading within `server.startup_timeout_secs`.
    pub async fn launch(model: &ModelConfig, server: &ServerConfig) -> Result<Self, LlmError> {
        if !tokio::fs::try_exists(&model.model_path).await.unwrap_or(false) {
            return Err(LlmError::Unavailable(format!(
                "model file not found: {}",
                model.model_path.display()
            )));
        }

        let args = Self::command_args(model, server.port);
        info!(
            bin = %server.llama_server_bin,
            model = %model.model_path.display(),
            context_window = model.context_window,
            accel_layers = model.accel_layers,
            port = server.port,
            "Launching llama-server"
        );

        let child = Command::new(&server.llama_server_bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                LlmError::Unavailable(format!(
                    "failed to start '{}': {e}",
                    server.llama_server_bin
                ))
            })?;

        let mut launched = Self {
            child,
            root_url: format!("http://127.0.0.1:{}", server.port),
        };
        launched
            .wait_until_ready(Duration::from_secs(server.startup_timeout_secs))
            .await?;
        Ok(launched)
    }

    /// OpenAI-compatible API base (`http://127.0.0.1:<port>/v1`).
    pub fn base_url(&self) -> String {
        format!("{}/v1", self.root_url)
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> Result<(), LlmError> {
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", self.root_url);
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Ok(Some(status)) = self.child.try_wait() {
                return Err(LlmError::Unavailable(format!(
                    "llama-server exited during startup ({status})"
                )));
            }

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!(url = %self.base_url(), "llama-server ready");
                    return Ok(());
                }
                // 503 while the model is loading
                Ok(resp) => debug!(status = %resp.status(), "llama-server not ready yet"),
                Err(e) => debug!(error = %e, "llama-server not accepting connections yet"),
            }

            if tokio::time::Instant::now() >= deadline {
                let _ = self.child.kill().await;
                return Err(LlmError::Unavailable(format!(
                    "llama-server did not become ready within {}s",
                    timeout.as_secs()
                )));
            }
            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }
    }

    /// Stop the server and reap the process.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "Failed to stop llama-server");
        } else {
            info!("llama-server stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_command_args() {
        let model = ModelConfig {
            model_path: PathBuf::from("/models/llama-2-7b-chat.Q2_K.gguf"),
            context_window: 3900,
            accel_layers: 1,
            ..Default::default()
        };
        let args = LlamaServer::command_args(&model, 8081);
        assert_eq!(
            args,
            vec![
                "-m",
                "/models/llama-2-7b-chat.Q2_K.gguf",
                "-c",
                "3900",
                "-ngl",
                "1",
                "--host",
                "127.0.0.1",
                "--port",
                "8081",
            ]
        );
    }

    #[tokio::test]
    async fn test_launch_missing_model_file() {
        let tmp = TempDir::new().unwrap();
        let model = ModelConfig {
            model_path: tmp.path().join("absent.gguf"),
            ..Default::default()
        };
        let err = LlamaServer::launch(&model, &ServerConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::Unavailable(ref m) if m.contains("model file not found")));
    }

    #[tokio::test]
    async fn test_launch_missing_binary() {
        let tmp = TempDir::new().unwrap();
        let model_path = tmp.path().join("tiny.gguf");
        tokio::fs::write(&model_path, b"GGUF").await.unwrap();
        let model = ModelConfig {
            model_path,
            ..Default::default()
        };
        let server = ServerConfig {
            llama_server_bin: tmp
                .path()
                .join("no-such-llama-server")
                .display()
                .to_string(),
            ..Default::default()
        };

        let err = LlamaServer::launch(&model, &server).await.err().unwrap();
        assert!(matches!(err, LlmError::Unavailable(ref m) if m.contains("failed to start")));
    }
}
