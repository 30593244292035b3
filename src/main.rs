use clap::Parser;
use job_market_report::utils::logger::{self, LogFormat};
use job_market_report::utils::validation::Validate;
use job_market_report::{CliConfig, LocalStorage, ReportEngine, ReportPipeline, RunReport};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(LogFormat::Compact, config.verbose);

    tracing::info!("Starting job-market-report");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }
    let print_json = config.json;

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ReportPipeline::new(storage, config);
    let engine = ReportEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => print_report(&report, print_json, monitor_enabled),
        Err(e) => {
            tracing::error!(
                "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

fn print_report(report: &RunReport, as_json: bool, with_stats: bool) {
    let outcome = &report.outcome;

    if as_json {
        // stdout 只輸出 JSON
        match report.to_json(with_stats) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(e.exit_code());
            }
        }
    } else {
        print!("{}", report.summary.render_text());
        println!(
            "\n✅ Created {} of {} visualizations",
            outcome.written.len(),
            outcome.attempted()
        );
        for path in &outcome.written {
            println!("📁 {}", path);
        }
        if with_stats {
            print!("{}", report.stats.render_text());
        }
    }

    for (kind, reason) in &outcome.failed {
        eprintln!("⚠️ {} failed: {}", kind.file_name(), reason);
    }
}
