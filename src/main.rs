use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use customer_recsys::app::{build_source, export_customer_report, Clock};
use customer_recsys::config::cli::{Cli, Command};
use customer_recsys::core::customer::DEFAULT_SIMILAR_CUSTOMERS;
use customer_recsys::core::generator::{write_sample_files, DataGenerator, SAMPLE_CUSTOMERS_FILE};
use customer_recsys::core::inspector::{inspect_data_dir, FileInspection};
use customer_recsys::domain::ports::Storage;
use customer_recsys::utils::error::ErrorSeverity;
use customer_recsys::utils::{logger, validation::Validate};
use customer_recsys::{server, AppConfig, LaunchPlan, LocalStorage, RecommendationSystem, RecsysError};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    match cli.command {
        Command::Serve { .. } => logger::init_server_logger(cli.verbose, config.logging.json),
        _ => logger::init_cli_logger(cli.verbose),
    }

    tracing::info!("Starting customer-recsys CLI");
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(cli.command, config).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => std::process::exit(report_failure(&err)),
    }
}

/// 載入配置檔並套用 CLI 參數覆寫
fn load_config(cli: &Cli) -> customer_recsys::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    if let Command::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    Ok(config)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// 統計以查詢當下的日期計算，serve 跨日後仍正確
async fn load_system(config: &AppConfig) -> customer_recsys::Result<RecommendationSystem> {
    let source = build_source(&config.data, today());
    RecommendationSystem::initialize(source.as_ref(), config.recommendation, Clock::Local).await
}

/// 回傳行程結束碼；launch 會沿用子行程的結束碼
async fn run(command: Command, config: AppConfig) -> anyhow::Result<i32> {
    match command {
        Command::Serve { .. } => {
            let system = load_system(&config).await?;
            server::run_server(system, &config.server).await?;
        }
        Command::Recommend {
            customer_id,
            query,
            n,
        } => {
            let system = load_system(&config).await?;
            let recommendations = system.recommend_for(customer_id, &query, n)?;

            println!("🛒 Recommendations for customer {}:", customer_id);
            for (i, rec) in recommendations.iter().enumerate() {
                println!(
                    "{:>2}. {} ({} / {}) ${:.2} - {} [{:.3}]",
                    i + 1,
                    rec.product_name,
                    rec.category,
                    rec.brand,
                    rec.price,
                    rec.reason.label(),
                    rec.similarity_to_query
                );
            }
        }
        Command::Profile { customer_id } => {
            let system = load_system(&config).await?;
            let manager = system.manager();
            let output = serde_json::json!({
                "profile": manager.profile(customer_id)?,
                "statistics": system.statistics(customer_id),
                "spending": manager.spending_summary(customer_id),
                "similar_customers": manager.similar_customers(customer_id, DEFAULT_SIMILAR_CUSTOMERS),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Generate {
            output,
            customers,
            products,
            transactions,
            seed,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.data.dir));
            let seed = seed.unwrap_or(config.data.seed);
            let storage = LocalStorage::new(output);
            if storage.exists(SAMPLE_CUSTOMERS_FILE) {
                tracing::warn!(
                    "Overwriting existing sample files in {}",
                    storage.base_path().display()
                );
            }

            let dataset =
                DataGenerator::new(seed, today()).generate_dataset(customers, products, transactions);
            write_sample_files(&storage, &dataset)
                .await
                .with_context(|| format!("writing sample files to {}", storage.base_path().display()))?;
            println!("📁 Sample data saved to: {}", storage.base_path().display());
        }
        Command::Inspect { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.data.dir));
            println!("🔍 Inspecting {}", dir.display());
            for inspection in inspect_data_dir(&dir, &config.data.inspect_files) {
                print_inspection(&inspection);
            }
        }
        Command::Report {
            customer_id,
            query,
            output,
        } => {
            let system = load_system(&config).await?;
            let storage = LocalStorage::new(output);
            let file_name = export_customer_report(&storage, &system, customer_id, &query).await?;
            println!("📁 Report saved to: {}", storage.full_path(&file_name).display());
        }
        Command::Launch { dry_run } => {
            let plan = LaunchPlan::from_config(&config.launcher)?;
            if dry_run {
                for line in plan.describe() {
                    println!("{}", line);
                }
                return Ok(0);
            }

            let outcome = plan.run().await?;
            return Ok(outcome.exit_code());
        }
    }

    Ok(0)
}

fn print_inspection(inspection: &FileInspection) {
    match inspection {
        FileInspection::Found {
            file_name,
            columns,
            total_rows,
        } => {
            println!("✅ {} ({} rows)", file_name, total_rows);
            for column in columns {
                println!("   - {}: {}", column.column, column.values.join(", "));
            }
        }
        FileInspection::Missing { file_name } => println!("❌ {} - file not found", file_name),
        FileInspection::Unreadable { file_name, error } => {
            println!("⚠️ {} - {}", file_name, error)
        }
    }
}

/// 記錄錯誤並依嚴重程度決定結束碼
fn report_failure(err: &anyhow::Error) -> i32 {
    let Some(e) = err.downcast_ref::<RecsysError>() else {
        tracing::error!("❌ Command failed: {:#}", err);
        eprintln!("❌ {:#}", err);
        return 1;
    };

    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
