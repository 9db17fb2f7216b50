use clap::Parser;
use meal_ticket::http::{self, AppState};
use meal_ticket::utils::error::{ErrorSeverity, ServiceError};
use meal_ticket::utils::{logger, validation::Validate};
use meal_ticket::{
    CliArgs, ClaimService, DeviceSink, HttpStudentDirectory, ServiceConfig, SystemClock,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting meal-ticket service");

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match ServiceConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => ServiceConfig::default(),
    };

    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    display_config_summary(&config);

    let sink = Arc::new(DeviceSink::new(config.printer.sink_address.clone()));
    let directory = match HttpStudentDirectory::new(config.gateway.endpoint.clone(), config.gateway_timeout()) {
        Ok(directory) => Arc::new(directory),
        Err(e) => fail(&e),
    };
    let claims = match ClaimService::from_config(&config, sink, directory, Arc::new(SystemClock)) {
        Ok(claims) => claims,
        Err(e) => fail(&e),
    };

    let app = http::router(AppState::new(claims));
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;

    tracing::info!("📍 Server: http://{}", config.server.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

fn fail(e: &ServiceError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn display_config_summary(config: &ServiceConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  Bind: {}", config.server.bind);
    tracing::info!("  🖨️  Printer: {}", config.printer.sink_address);
    tracing::info!("  Staging: {}", config.staging_dir().display());
    tracing::info!(
        "  🧪 Test Mode: {}",
        if config.printer.dry_run {
            "ENABLED (Not printing)"
        } else {
            "DISABLED (Printing enabled)"
        }
    );
    tracing::info!("  Directory: {}", config.gateway.endpoint);
    tracing::info!("  Line width: {}", config.ticket.max_line_width);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
