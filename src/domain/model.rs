use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::lp::LpModel;

pub const DEFAULT_ENTITY_FIELD: &str = "Municipio";
pub const DEFAULT_RESOURCE_FIELD: &str = "Vl_total_escolas";
pub const DEFAULT_STUDENT_FIELD: &str = "Qt_alunos_pnae";

/// 資料集 A：每筆記錄的轉移金額（逗號小數的文字）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub entity: String,
    pub value_text: String,
}

/// 資料集 B：每筆記錄的受益學生數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub entity: String,
    pub students: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub resources_label: String,
    pub resources: Vec<ResourceRecord>,
    pub students_label: String,
    pub students: Vec<StudentRecord>,
    /// 讀取階段已跳過的記錄數
    pub skipped_records: usize,
}

/// 一個決策變數對應的聚合數值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTotals {
    pub name: String,
    pub resource_total: f64,
    pub student_count: u64,
    pub average_spend_per_student: f64,
}

/// 聚合結果。建立後不可變更；`entities` 決定變數索引順序。
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub(crate) entities: Vec<String>,
    pub(crate) resource_totals: HashMap<String, f64>,
    pub(crate) student_counts: HashMap<String, u64>,
    pub(crate) average_spend: HashMap<String, f64>,
    pub(crate) skipped_records: usize,
}

impl Aggregation {
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn resource_total(&self, entity: &str) -> Option<f64> {
        self.resource_totals.get(entity).copied()
    }

    /// 未出現在學生資料集的實體視為 0
    pub fn student_count(&self, entity: &str) -> u64 {
        self.student_counts.get(entity).copied().unwrap_or(0)
    }

    pub fn average_spend_per_student(&self, entity: &str) -> Option<f64> {
        self.average_spend.get(entity).copied()
    }

    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// 依變數順序展開成模型建構器使用的向量
    pub fn ordered_totals(&self) -> Vec<EntityTotals> {
        self.entities
            .iter()
            .map(|name| EntityTotals {
                name: name.clone(),
                resource_total: self.resource_total(name).unwrap_or(0.0),
                student_count: self.student_count(name),
                average_spend_per_student: self.average_spend_per_student(name).unwrap_or(0.0),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ModelVariant {
    /// 以平均每生支出加權的目標函數
    #[default]
    Simple,
    /// 最小化總配置，並加上固定下限與每生平均下限
    Extended,
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelVariant::Simple => write!(f, "simple"),
            ModelVariant::Extended => write!(f, "extended"),
        }
    }
}

pub const EXTENDED_FIXED_MINIMUM: f64 = 9000.0;
pub const EXTENDED_MAX_ENTITIES: usize = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub variant: ModelVariant,
    /// `min_muniN` 的右側常數
    pub minimum_amount: f64,
    pub max_entities: Option<usize>,
}

impl ModelSettings {
    pub fn for_variant(variant: ModelVariant) -> Self {
        match variant {
            ModelVariant::Simple => Self {
                variant,
                minimum_amount: 0.0,
                max_entities: None,
            },
            ModelVariant::Extended => Self {
                variant,
                minimum_amount: EXTENDED_FIXED_MINIMUM,
                max_entities: Some(EXTENDED_MAX_ENTITIES),
            },
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::for_variant(ModelVariant::Simple)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Endpoint(String),
}

impl DatasetSource {
    /// `http://` 或 `https://` 開頭視為 API 端點，其餘為本地檔案
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DatasetSource::Endpoint(location.to_string())
        } else {
            DatasetSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Endpoint(url) => write!(f, "{}", url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub source: DatasetSource,
    pub entity_field: String,
    pub value_field: String,
    pub timeout: Option<Duration>,
}

impl DatasetConfig {
    pub fn resources(source: DatasetSource) -> Self {
        Self {
            source,
            entity_field: DEFAULT_ENTITY_FIELD.to_string(),
            value_field: DEFAULT_RESOURCE_FIELD.to_string(),
            timeout: None,
        }
    }

    pub fn students(source: DatasetSource) -> Self {
        Self {
            source,
            entity_field: DEFAULT_ENTITY_FIELD.to_string(),
            value_field: DEFAULT_STUDENT_FIELD.to_string(),
            timeout: None,
        }
    }

    pub fn label(&self) -> String {
        self.source.to_string()
    }
}

pub const DEFAULT_SOLVER_COMMAND: &str = "glpsol";
pub const DEFAULT_SOLVER_TIMEOUT_SECONDS: u64 = 300;
pub const MODEL_PLACEHOLDER: &str = "{model}";
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

pub fn default_solver_args() -> Vec<String> {
    vec![
        "--cpxlp".to_string(),
        MODEL_PLACEHOLDER.to_string(),
        "-o".to_string(),
        OUTPUT_PLACEHOLDER.to_string(),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverSettings {
    pub enabled: bool,
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: DEFAULT_SOLVER_COMMAND.to_string(),
            args: default_solver_args(),
            timeout: Duration::from_secs(DEFAULT_SOLVER_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub aggregation: Aggregation,
    pub model: LpModel,
    pub lp_text: String,
}

/// 外部求解器的主控台輸出與結果檔內容，原樣轉交
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverOutput {
    pub stdout: String,
    pub result_text: String,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub model_path: PathBuf,
    pub summary_path: PathBuf,
    pub variable_count: usize,
    pub lp_text: String,
    pub solver: Option<SolverOutput>,
}
