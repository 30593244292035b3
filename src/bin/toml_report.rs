use anyhow::Context;
use clap::Parser;
use job_market_report::core::{ConfigProvider, Pipeline};
use job_market_report::utils::{logger, validation::Validate};
use job_market_report::{LocalStorage, ReportEngine, ReportPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Job market report driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Load and aggregate the dataset, list the charts, write nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(3);
        }
    };

    // 初始化日誌
    logger::init_logger(config.log_format(), args.verbose);

    tracing::info!("🚀 Starting TOML-based report");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No charts will be written");
        return perform_dry_run(config).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ReportPipeline::new(storage, config);
    let engine = ReportEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            if args.json {
                let json = report
                    .to_json(monitor_enabled)
                    .context("serializing summary")?;
                println!("{}", json);
            } else {
                print!("{}", report.summary.render_text());
                println!(
                    "\n✅ Created {} of {} visualizations",
                    report.outcome.written.len(),
                    report.outcome.attempted()
                );
                for path in &report.outcome.written {
                    println!("📁 {}", path);
                }
                if monitor_enabled {
                    print!("{}", report.stats.render_text());
                }
            }
            for (kind, reason) in &report.outcome.failed {
                eprintln!("⚠️ {} failed: {}", kind.file_name(), reason);
            }
        }
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

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let load = config.load_options();
    let views = config.view_options();
    let style = config.styling();

    eprintln!("📋 Configuration Summary:");
    eprintln!("  Report: {}", config.report.name);
    if let Some(description) = &config.report.description {
        eprintln!("  Description: {}", description);
    }
    eprintln!("  Dataset: {}", config.data_path());
    if !config.lookup_files().is_empty() {
        eprintln!("  Role lookups: {}", config.lookup_files().join(", "));
    }
    eprintln!("  Output: {}", config.output_path());
    eprintln!("  Years: {} - {}", load.min_year, load.max_year);
    eprintln!("  Malformed rows: {:?}", load.on_malformed_row);
    eprintln!(
        "  Top-N: {} (min postings: titles {}, locations {})",
        views.top_n, views.min_title_postings, views.min_location_postings
    );
    eprintln!(
        "  Style: {} on {} ({}x{} in)",
        style.color_scheme, style.background_color, style.figure_size.0, style.figure_size.1
    );

    if args.dry_run {
        eprintln!("  🔍 DRY RUN MODE ENABLED");
    }

    eprintln!();
}

async fn perform_dry_run(config: TomlConfig) -> anyhow::Result<()> {
    let output_path = config.output_path().to_string();
    let pipeline = ReportPipeline::new(LocalStorage::new(output_path.clone()), config);

    let dataset = pipeline
        .extract()
        .await
        .context("loading dataset for dry run")?;
    let rejected = dataset.rejected.len();
    let loaded = dataset.len();
    let analysis = pipeline.transform(dataset).await?;

    println!("🔍 Dry Run Analysis:");
    println!("  Postings loaded: {}", loaded);
    println!("  Rows rejected: {}", rejected);
    println!();
    println!("📊 Charts:");
    for view in &analysis.views {
        if view.is_empty() {
            println!("  ⏭️  {} (no data, would be skipped)", view.kind.file_name());
        } else {
            println!(
                "  ✅ {}/{} ({} points)",
                output_path,
                view.kind.file_name(),
                view.chart.categories.len()
            );
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Run without --dry-run to write the charts.");
    Ok(())
}
