use crate::core::{Pipeline, RunOutcome};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitor.is_enabled()
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting allocation run");

        // Extract
        let datasets = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} resource records and {} student records",
            datasets.resources.len(),
            datasets.students.len()
        );
        self.monitor.log_phase("Extract");

        // Transform
        let transformed = self.pipeline.transform(datasets).await?;
        tracing::info!(
            "Built LP model with {} variables and {} constraints",
            transformed.model.variable_count(),
            transformed.model.constraints.len()
        );
        self.monitor.log_phase("Transform");

        // Load
        let outcome = self.pipeline.load(transformed).await?;
        tracing::info!("Model saved to: {}", outcome.model_path.display());
        self.monitor.log_phase("Load");
        self.monitor.log_final_stats();

        Ok(outcome)
    }
}
