pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{
    DatasetConfig, DatasetSource, ModelSettings, ModelVariant, SolverSettings,
};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_RESOURCES_FILE: &str = "RecursosRepassados.json";
pub const DEFAULT_STUDENTS_FILE: &str = "AlunosAtendidosPNAE.json";
pub const DEFAULT_MODEL_FILE: &str = "modelo.lp";
pub const DEFAULT_RESULT_FILE: &str = "output.txt";
pub const DEFAULT_SUMMARY_FILE: &str = "aggregados.csv";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "pnae-lp")]
#[command(about = "Builds a municipal resource allocation LP model and runs an external solver")]
pub struct CliConfig {
    /// Resources dataset: JSON file path or http(s) endpoint
    #[arg(long, default_value = DEFAULT_RESOURCES_FILE)]
    pub resources: String,

    /// Students dataset: JSON file path or http(s) endpoint
    #[arg(long, default_value = DEFAULT_STUDENTS_FILE)]
    pub students: String,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_MODEL_FILE)]
    pub model_file: String,

    #[arg(long, default_value = DEFAULT_RESULT_FILE)]
    pub result_file: String,

    #[arg(long, default_value = DEFAULT_SUMMARY_FILE)]
    pub summary_file: String,

    #[arg(long, value_enum, default_value_t = ModelVariant::Simple)]
    pub variant: ModelVariant,

    /// Per-municipality floor (default: 0 for simple, 9000 for extended)
    #[arg(long)]
    pub fixed_minimum: Option<f64>,

    /// Keep only the first N municipalities (default: unlimited for simple, 5000 for extended)
    #[arg(long)]
    pub max_entities: Option<usize>,

    #[arg(long, default_value = "glpsol")]
    pub solver: String,

    /// Solver timeout in seconds
    #[arg(long, default_value = "300")]
    pub solver_timeout: u64,

    #[arg(long, help = "Write the model without running the solver")]
    pub no_solve: bool,

    #[arg(long, help = "Print the generated LP model to stdout")]
    pub print_model: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU/memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn resources_source(&self) -> DatasetConfig {
        DatasetConfig::resources(DatasetSource::parse(&self.resources))
    }

    fn students_source(&self) -> DatasetConfig {
        DatasetConfig::students(DatasetSource::parse(&self.students))
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn model_file(&self) -> &str {
        &self.model_file
    }

    fn result_file(&self) -> &str {
        &self.result_file
    }

    fn summary_file(&self) -> &str {
        &self.summary_file
    }

    fn model_settings(&self) -> ModelSettings {
        let mut settings = ModelSettings::for_variant(self.variant);
        if let Some(minimum) = self.fixed_minimum {
            settings.minimum_amount = minimum;
        }
        if let Some(max) = self.max_entities {
            settings.max_entities = Some(max);
        }
        settings
    }

    fn solver_settings(&self) -> SolverSettings {
        SolverSettings {
            enabled: !self.no_solve,
            command: self.solver.clone(),
            timeout: std::time::Duration::from_secs(self.solver_timeout),
            ..SolverSettings::default()
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_dataset_location("resources", &self.resources)?;
        validation::validate_dataset_location("students", &self.students)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_extension("model_file", &self.model_file, &["lp"])?;
        validation::validate_path("result_file", &self.result_file)?;
        validation::validate_file_extension("summary_file", &self.summary_file, &["csv"])?;

        if let Some(minimum) = self.fixed_minimum {
            validation::validate_range("fixed_minimum", minimum, 0.0, f64::MAX)?;
        }
        if let Some(max) = self.max_entities {
            validation::validate_positive_number("max_entities", max, 1)?;
        }

        validation::validate_non_empty_string("solver", &self.solver)?;
        validation::validate_positive_number("solver_timeout", self.solver_timeout as usize, 1)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::parse_from(["pnae-lp"]);

        assert_eq!(config.resources, DEFAULT_RESOURCES_FILE);
        assert_eq!(config.model_file, "modelo.lp");
        assert_eq!(config.variant, ModelVariant::Simple);
        assert_eq!(config.model_settings().minimum_amount, 0.0);
        assert_eq!(config.model_settings().max_entities, None);
        assert!(config.solver_settings().enabled);
        assert_eq!(config.solver_settings().command, "glpsol");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_extended_overrides() {
        let config = CliConfig::parse_from([
            "pnae-lp",
            "--variant",
            "extended",
            "--max-entities",
            "10",
            "--students",
            "https://example.com/odata/AlunosAtendidosPNAE",
            "--no-solve",
        ]);

        let settings = config.model_settings();
        assert_eq!(settings.variant, ModelVariant::Extended);
        assert_eq!(settings.minimum_amount, 9000.0);
        assert_eq!(settings.max_entities, Some(10));
        assert!(!config.solver_settings().enabled);
        assert!(matches!(
            config.students_source().source,
            DatasetSource::Endpoint(_)
        ));
    }

    #[test]
    fn test_cli_validation_rejects_bad_values() {
        let config = CliConfig::parse_from(["pnae-lp", "--model-file", "modelo.txt"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["pnae-lp", "--max-entities", "0"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["pnae-lp", "--fixed-minimum=-5"]);
        assert!(config.validate().is_err());
    }
}
