use crate::config::toml_config::ServiceConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "meal-ticket")]
#[command(about = "Meal entitlement and ticket printing service")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the listen address from config
    #[arg(long)]
    pub bind: Option<String>,

    /// Override dry-run mode from config
    #[arg(long)]
    pub dry_run: Option<bool>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl CliArgs {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut ServiceConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
            tracing::info!("🔧 Bind address overridden to: {}", bind);
        }
        if let Some(dry_run) = self.dry_run {
            config.printer.dry_run = dry_run;
            tracing::info!("🔧 Dry-run mode overridden to: {}", dry_run);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied() {
        let args = CliArgs::parse_from(["meal-ticket", "--dry-run", "false", "--bind", "127.0.0.1:9000"]);
        let mut config = ServiceConfig::default();
        args.apply_overrides(&mut config);

        assert!(!config.printer.dry_run);
        assert_eq!(config.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let args = CliArgs::parse_from(["meal-ticket", "-c", "service.toml", "-v"]);
        let mut config = ServiceConfig::default();
        args.apply_overrides(&mut config);

        assert!(config.printer.dry_run);
        assert_eq!(args.config.as_deref(), Some("service.toml"));
        assert!(args.verbose);
    }
}
