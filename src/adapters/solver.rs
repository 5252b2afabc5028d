use crate::domain::model::{SolverOutput, SolverSettings, MODEL_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use crate::domain::ports::Solver;
use crate::utils::error::{LpError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// 以子程序執行命令列 LP 求解器（預設 `glpsol --cpxlp <model> -o <output>`）
#[derive(Debug, Clone)]
pub struct ExternalSolver {
    settings: SolverSettings,
}

impl ExternalSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    /// 將參數樣板中的 `{model}`、`{output}` 換成實際路徑
    pub fn render_args(&self, model_path: &Path, result_path: &Path) -> Vec<String> {
        let model = model_path.to_string_lossy();
        let output = result_path.to_string_lossy();
        self.settings
            .args
            .iter()
            .map(|arg| {
                arg.replace(MODEL_PLACEHOLDER, &model)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    fn failure(&self, reason: String) -> LpError {
        LpError::SolverInvocationError {
            command: self.settings.command.clone(),
            reason,
        }
    }
}

#[async_trait]
impl Solver for ExternalSolver {
    async fn solve(&self, model_path: &Path, result_path: &Path) -> Result<SolverOutput> {
        let args = self.render_args(model_path, result_path);
        tracing::info!(
            "🧮 Running solver: {} {}",
            self.settings.command,
            args.join(" ")
        );

        let mut command = Command::new(&self.settings.command);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // 逾時後 future 被丟棄，kill_on_drop 會終止子程序
        let output = match tokio::time::timeout(self.settings.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(self.failure(format!("failed to start: {}", e))),
            Err(_) => {
                return Err(self.failure(format!(
                    "timed out after {}s",
                    self.settings.timeout.as_secs_f64()
                )))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let result_text = tokio::fs::read_to_string(result_path)
            .await
            .map_err(|e| {
                self.failure(format!(
                    "could not read result file {}: {}",
                    result_path.display(),
                    e
                ))
            })?;

        tracing::debug!(
            "Solver finished: {} bytes stdout, {} bytes result",
            stdout.len(),
            result_text.len()
        );

        Ok(SolverOutput {
            stdout,
            result_text,
        })
    }

    fn name(&self) -> &str {
        &self.settings.command
    }
}
