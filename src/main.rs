use clap::Parser;
use pnae_lp::core::ConfigProvider;
use pnae_lp::utils::{logger, validation::Validate};
use pnae_lp::{AllocationPipeline, CliConfig, EtlEngine, LocalStorage, RunOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting pnae-lp CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    let print_model = config.print_model;

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AllocationPipeline::with_external_solver(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => report(&outcome, print_model),
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

fn report(outcome: &RunOutcome, print_model: bool) {
    if print_model {
        println!("{}", outcome.lp_text);
    }

    println!(
        "✅ LP model with {} variables written to: {}",
        outcome.variable_count,
        outcome.model_path.display()
    );
    println!("📁 Aggregation summary: {}", outcome.summary_path.display());

    // 求解器輸出原樣轉交
    if let Some(solver) = &outcome.solver {
        println!("{}", solver.stdout);
        println!("{}", solver.result_text);
    }
}
