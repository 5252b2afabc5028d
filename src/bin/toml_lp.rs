use anyhow::Context;
use clap::Parser;
use pnae_lp::config::toml_config::{ModelConfig, TomlConfig};
use pnae_lp::core::{ConfigProvider, Pipeline};
use pnae_lp::domain::model::ModelVariant;
use pnae_lp::utils::{logger, validation::Validate};
use pnae_lp::{AllocationPipeline, EtlEngine, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-lp")]
#[command(about = "Allocation LP builder with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "pnae-lp.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the model variant from config
    #[arg(long, value_enum)]
    variant: Option<ModelVariant>,

    /// Load and aggregate the datasets and build the model without writing files or solving
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    logger::init_logger(args.verbose, config.log_format());

    tracing::info!("🚀 Starting TOML-based allocation run");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 命令列覆蓋設定
    if let Some(variant) = args.variant {
        let model = config.model.get_or_insert_with(ModelConfig::default);
        model.variant = Some(variant);
        tracing::info!("🔧 Model variant overridden to: {}", variant);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let print_model = config.print_model();

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AllocationPipeline::with_external_solver(storage, config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be written");
        let datasets = pipeline.extract().await?;
        let result = pipeline.transform(datasets).await?;

        println!("🔍 Dry Run Analysis:");
        println!("  Municipalities: {}", result.aggregation.entities().len());
        println!("  Skipped records: {}", result.aggregation.skipped_records());
        println!("  Variables: {}", result.model.variable_count());
        println!("  Constraints: {}", result.model.constraints.len());
        if print_model {
            println!();
            println!("{}", result.lp_text);
        }
        return Ok(());
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            if print_model {
                println!("{}", outcome.lp_text);
            }
            tracing::info!("✅ Allocation run completed successfully!");
            println!("📁 Model saved to: {}", outcome.model_path.display());
            println!("📁 Aggregation summary: {}", outcome.summary_path.display());

            if let Some(solver) = &outcome.solver {
                println!("{}", solver.stdout);
                println!("{}", solver.result_text);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Allocation run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let model = config.model_settings();
    let solver = config.solver_settings();

    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        println!("  Description: {}", description);
    }
    println!("  Resources: {}", config.resources_source().label());
    println!("  Students: {}", config.students_source().label());
    println!("  Variant: {}", model.variant);
    println!("  Minimum per municipality: {}", model.minimum_amount);
    match model.max_entities {
        Some(max) => println!("  Max municipalities: {}", max),
        None => println!("  Max municipalities: unlimited"),
    }
    println!("  Output: {}/{}", config.output_path(), config.model_file());
    if solver.enabled {
        println!(
            "  Solver: {} {} (timeout {}s)",
            solver.command,
            solver.args.join(" "),
            solver.timeout.as_secs()
        );
    } else {
        println!("  Solver: disabled");
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
