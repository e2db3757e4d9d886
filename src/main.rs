use clap::{Parser, Subcommand};
use mealhost::utils::{logger, validation::Validate};
use mealhost::{mealplanner_app, AppSettings, ExportFormat, HostEngine, LocalStorage};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "mealhost")]
#[command(about = "Composition host for the meal planner stack")]
struct Cli {
    /// Path to the TOML manifest
    #[arg(short, long, default_value = "mealhost.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the manifest and the composition graph
    Check,

    /// Print the resolved startup plan
    Plan,

    /// Print one service's environment in dotenv form
    Env {
        /// Service name as declared by the application
        #[arg(long)]
        service: String,
    },

    /// Write plan.json and dotenv files for the runtime
    Export {
        /// Output directory
        #[arg(short, long, default_value = "./mealhost-out")]
        out: String,

        /// Artifact selection: json, dotenv or all
        #[arg(long, default_value = "all")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("🚀 Starting mealhost");
    tracing::info!("📁 Loading manifest from: {}", cli.config);

    // 載入 TOML 設定
    let mut settings = match AppSettings::from_file(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load manifest '{}': {}", cli.config, e);
            eprintln!("💡 An empty file is a valid manifest; create one to start from defaults");
            std::process::exit(1);
        }
    };

    // 套用環境變數覆寫
    settings.apply_env_overrides();

    // 驗證設定
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Settings validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Settings loaded and validated successfully");

    // 組合應用並建立引擎
    let graph = mealplanner_app(&settings);
    let engine = HostEngine::new(graph, settings);

    if let Err(e) = run_command(&engine, &cli).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ mealhost failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            mealhost::utils::error::ErrorSeverity::Low => 0,
            mealhost::utils::error::ErrorSeverity::Medium => 2,
            mealhost::utils::error::ErrorSeverity::High => 1,
            mealhost::utils::error::ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run_command(engine: &HostEngine, cli: &Cli) -> mealhost::Result<()> {
    match &cli.command {
        Command::Check => {
            engine.check()?;
            println!("✅ Composition graph is valid");
        }
        Command::Plan => {
            let plan = engine.plan()?;
            print!("{}", plan.render_summary());
        }
        Command::Env { service } => {
            let plan = engine.plan()?;
            print!("{}", plan.dotenv_for(service)?);
        }
        Command::Export { out, format } => {
            let format = ExportFormat::from_str(format)?;
            let plan = engine.plan()?;
            let storage = LocalStorage::new(out.clone());
            let written = plan.export(&storage, format).await?;

            tracing::info!("✅ Export completed successfully!");
            println!("✅ Export completed successfully!");
            for file in written {
                println!("📁 {}/{}", out, file);
            }
        }
    }

    Ok(())
}
