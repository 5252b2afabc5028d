use crate::config::{
    DEFAULT_MODEL_FILE, DEFAULT_RESOURCES_FILE, DEFAULT_RESULT_FILE, DEFAULT_STUDENTS_FILE,
    DEFAULT_SUMMARY_FILE,
};
use crate::core::ConfigProvider;
use crate::domain::model::{
    DatasetConfig, DatasetSource, ModelSettings, ModelVariant, SolverSettings,
};
use crate::utils::error::{LpError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    pub sources: SourcesConfig,
    pub model: Option<ModelConfig>,
    pub solver: Option<SolverConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub resources: SourceConfig,
    pub students: SourceConfig,
}

/// `path` 與 `endpoint` 擇一
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub name_field: Option<String>,
    pub value_field: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub variant: Option<ModelVariant>,
    pub fixed_minimum: Option<f64>,
    pub max_entities: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub enabled: Option<bool>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub model_file: Option<String>,
    pub result_file: Option<String>,
    pub summary_file: Option<String>,
    pub print_model: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<LogFormat>,
}

impl SourceConfig {
    fn dataset(&self, defaults: DatasetConfig) -> DatasetConfig {
        let mut dataset = defaults;
        if let Some(endpoint) = &self.endpoint {
            dataset.source = DatasetSource::Endpoint(endpoint.clone());
        } else if let Some(path) = &self.path {
            dataset.source = DatasetSource::File(path.into());
        }
        if let Some(field) = &self.name_field {
            dataset.entity_field = field.clone();
        }
        if let Some(field) = &self.value_field {
            dataset.value_field = field.clone();
        }
        dataset.timeout = self.timeout_seconds.map(Duration::from_secs);
        dataset
    }

    fn validate(&self, prefix: &str) -> Result<()> {
        match (&self.path, &self.endpoint) {
            (Some(_), Some(_)) => {
                return Err(LpError::ConfigValidationError {
                    field: prefix.to_string(),
                    message: "Specify either 'path' or 'endpoint', not both".to_string(),
                })
            }
            (Some(path), None) => validation::validate_path(&format!("{}.path", prefix), path)?,
            (None, endpoint) => {
                let field = format!("{}.endpoint", prefix);
                let endpoint = validation::validate_required_field(&field, endpoint)?;
                validation::validate_url(&field, endpoint)?;
            }
        }

        if let Some(field) = &self.name_field {
            validation::validate_non_empty_string(&format!("{}.name_field", prefix), field)?;
        }
        if let Some(field) = &self.value_field {
            validation::validate_non_empty_string(&format!("{}.value_field", prefix), field)?;
        }
        Ok(())
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LpError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LpError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FNDE_API})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LpError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("run.name", &self.run.name)?;
        self.sources.resources.validate("sources.resources")?;
        self.sources.students.validate("sources.students")?;

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_file_extension("output.model_file", self.model_file(), &["lp"])?;
        validation::validate_path("output.result_file", self.result_file())?;
        validation::validate_file_extension("output.summary_file", self.summary_file(), &["csv"])?;

        if let Some(model) = &self.model {
            if let Some(minimum) = model.fixed_minimum {
                validation::validate_range("model.fixed_minimum", minimum, 0.0, f64::MAX)?;
            }
            if let Some(max) = model.max_entities {
                validation::validate_positive_number("model.max_entities", max, 1)?;
            }
        }

        if let Some(solver) = &self.solver {
            if let Some(command) = &solver.command {
                validation::validate_non_empty_string("solver.command", command)?;
            }
            if let Some(timeout) = solver.timeout_seconds {
                validation::validate_positive_number("solver.timeout_seconds", timeout as usize, 1)?;
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> LogFormat {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format)
            .unwrap_or_default()
    }

    pub fn print_model(&self) -> bool {
        self.output.print_model.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn resources_source(&self) -> DatasetConfig {
        self.sources
            .resources
            .dataset(DatasetConfig::resources(DatasetSource::parse(
                DEFAULT_RESOURCES_FILE,
            )))
    }

    fn students_source(&self) -> DatasetConfig {
        self.sources
            .students
            .dataset(DatasetConfig::students(DatasetSource::parse(
                DEFAULT_STUDENTS_FILE,
            )))
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn model_file(&self) -> &str {
        self.output.model_file.as_deref().unwrap_or(DEFAULT_MODEL_FILE)
    }

    fn result_file(&self) -> &str {
        self.output
            .result_file
            .as_deref()
            .unwrap_or(DEFAULT_RESULT_FILE)
    }

    fn summary_file(&self) -> &str {
        self.output
            .summary_file
            .as_deref()
            .unwrap_or(DEFAULT_SUMMARY_FILE)
    }

    fn model_settings(&self) -> ModelSettings {
        let Some(model) = &self.model else {
            return ModelSettings::default();
        };

        let mut settings = ModelSettings::for_variant(model.variant.unwrap_or_default());
        if let Some(minimum) = model.fixed_minimum {
            settings.minimum_amount = minimum;
        }
        if let Some(max) = model.max_entities {
            settings.max_entities = Some(max);
        }
        settings
    }

    fn solver_settings(&self) -> SolverSettings {
        let mut settings = SolverSettings::default();
        if let Some(solver) = &self.solver {
            if let Some(enabled) = solver.enabled {
                settings.enabled = enabled;
            }
            if let Some(command) = &solver.command {
                settings.command = command.clone();
            }
            if let Some(args) = &solver.args {
                settings.args = args.clone();
            }
            if let Some(timeout) = solver.timeout_seconds {
                settings.timeout = Duration::from_secs(timeout);
            }
        }
        settings
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
