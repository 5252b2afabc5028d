use crate::adapters::solver::ExternalSolver;
use crate::adapters::source::DatasetLoader;
use crate::core::aggregator::aggregate;
use crate::core::lp_builder::{variable_name, LpModelBuilder};
use crate::core::{ConfigProvider, Pipeline, Solver, Storage};
use crate::domain::model::{Aggregation, Datasets, RunOutcome, TransformResult};
use crate::utils::error::{LpError, Result};
use serde::Serialize;

/// 讀取兩個資料集 → 聚合並建立 LP 模型 → 寫出模型並呼叫求解器
pub struct AllocationPipeline<S: Storage, C: ConfigProvider, V: Solver> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) solver: V,
    pub(crate) loader: DatasetLoader,
}

impl<S: Storage, C: ConfigProvider, V: Solver> AllocationPipeline<S, C, V> {
    pub fn new(storage: S, config: C, solver: V) -> Self {
        Self {
            storage,
            config,
            solver,
            loader: DatasetLoader::new(),
        }
    }
}

impl<S: Storage, C: ConfigProvider> AllocationPipeline<S, C, ExternalSolver> {
    /// 使用設定中的求解器命令
    pub fn with_external_solver(storage: S, config: C) -> Self {
        let solver = ExternalSolver::new(config.solver_settings());
        Self::new(storage, config, solver)
    }
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    variable: String,
    entity: &'a str,
    resource_total: f64,
    student_count: u64,
    average_spend_per_student: f64,
}

/// 每個決策變數一列，供對照求解結果中的 `xN`
pub fn summary_csv(aggregation: &Aggregation) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (i, name) in aggregation.entities().iter().enumerate() {
        writer.serialize(SummaryRow {
            variable: variable_name(i),
            entity: name,
            resource_total: aggregation.resource_total(name).unwrap_or(0.0),
            student_count: aggregation.student_count(name),
            average_spend_per_student: aggregation
                .average_spend_per_student(name)
                .unwrap_or(0.0),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| LpError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, V: Solver> Pipeline for AllocationPipeline<S, C, V> {
    async fn extract(&self) -> Result<Datasets> {
        let resources_config = self.config.resources_source();
        let students_config = self.config.students_source();

        tracing::info!("📥 Loading resources from: {}", resources_config.label());
        let (resources, skipped_resources) = self.loader.load_resources(&resources_config).await?;

        tracing::info!("📥 Loading students from: {}", students_config.label());
        let (students, skipped_students) = self.loader.load_students(&students_config).await?;

        Ok(Datasets {
            resources_label: resources_config.label(),
            resources,
            students_label: students_config.label(),
            students,
            skipped_records: skipped_resources + skipped_students,
        })
    }

    async fn transform(&self, data: Datasets) -> Result<TransformResult> {
        let settings = self.config.model_settings();

        let aggregation = aggregate(&data, settings.max_entities);
        if aggregation.skipped_records() > 0 {
            tracing::warn!(
                "⚠️ {} records were skipped during aggregation",
                aggregation.skipped_records()
            );
        }
        tracing::info!(
            "🧾 Aggregated {} municipalities ({} variant)",
            aggregation.entities().len(),
            settings.variant
        );

        let model = LpModelBuilder::new(settings).build(&aggregation.ordered_totals())?;
        let lp_text = model.to_lp_string();

        Ok(TransformResult {
            aggregation,
            model,
            lp_text,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<RunOutcome> {
        let model_file = self.config.model_file();
        let summary_file = self.config.summary_file();

        self.storage
            .write_file(model_file, result.lp_text.as_bytes())
            .await?;
        tracing::debug!("LP model written ({} bytes)", result.lp_text.len());

        let summary = summary_csv(&result.aggregation)?;
        self.storage.write_file(summary_file, &summary).await?;

        let model_path = self.storage.locate(model_file);
        let summary_path = self.storage.locate(summary_file);

        let solver = if self.config.solver_settings().enabled {
            let result_path = self.storage.locate(self.config.result_file());
            Some(self.solver.solve(&model_path, &result_path).await?)
        } else {
            tracing::info!("⏭️ Solver disabled, skipping {}", self.solver.name());
            None
        };

        Ok(RunOutcome {
            model_path,
            summary_path,
            variable_count: result.model.variable_count(),
            lp_text: result.lp_text,
            solver,
        })
    }
}
