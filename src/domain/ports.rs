use crate::domain::model::{
    DatasetConfig, Datasets, ModelSettings, RunOutcome, SolverOutput, SolverSettings,
    TransformResult,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// 外部程序（求解器）需要的實際檔案路徑
    fn locate(&self, path: &str) -> PathBuf;
}

pub trait ConfigProvider: Send + Sync {
    fn resources_source(&self) -> DatasetConfig;
    fn students_source(&self) -> DatasetConfig;
    fn output_path(&self) -> &str;
    fn model_file(&self) -> &str;
    fn result_file(&self) -> &str;
    fn summary_file(&self) -> &str;
    fn model_settings(&self) -> ModelSettings;
    fn solver_settings(&self) -> SolverSettings;
}

/// 外部 LP 求解器。讀取模型檔，寫出結果檔，回傳主控台輸出與結果內容。
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(&self, model_path: &Path, result_path: &Path) -> Result<SolverOutput>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Datasets>;
    async fn transform(&self, data: Datasets) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<RunOutcome>;
}
