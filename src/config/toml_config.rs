use crate::core::access::DEFAULT_DENIED_GRADES;
use crate::core::entitlement::{DEFAULT_LUNCH_LABEL, DEFAULT_SNACK_LABEL};
use crate::core::keyword::DEFAULT_WORDS;
use crate::core::ticket::DEFAULT_MAX_LINE_WIDTH;
use crate::domain::model::{Service, TimeWindow};
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub printer: PrinterConfig,
    pub ticket: TicketConfig,
    pub schedule: ScheduleConfig,
    pub gateway: GatewayConfig,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Stage tickets but never touch the device.
    pub dry_run: bool,
    pub sink_address: String,
    pub staging_dir: Option<PathBuf>,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            sink_address: r"\\localhost\TICKET".to_string(),
            staging_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketConfig {
    pub max_line_width: usize,
    pub words: Vec<String>,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            max_line_width: DEFAULT_MAX_LINE_WIDTH,
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub snack: WindowConfig,
    pub lunch: WindowConfig,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            snack: WindowConfig {
                start: "06:00".to_string(),
                end: "11:30".to_string(),
                label: DEFAULT_SNACK_LABEL.to_string(),
            },
            lunch: WindowConfig {
                start: "11:40".to_string(),
                end: "18:00".to_string(),
                label: DEFAULT_LUNCH_LABEL.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/verificar".to_string(),
            timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub denied_grades: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            denied_grades: DEFAULT_DENIED_GRADES.iter().map(|g| g.to_string()).collect(),
        }
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ServiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PRINTER_SHARE})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ServiceError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn snack_window(&self) -> Result<TimeWindow> {
        window_from(Service::Snack, "schedule.snack", &self.schedule.snack)
    }

    pub fn lunch_window(&self) -> Result<TimeWindow> {
        window_from(Service::Lunch, "schedule.lunch", &self.schedule.lunch)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.printer
            .staging_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("meal-ticket"))
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.timeout_seconds)
    }
}

fn window_from(service: Service, field: &str, cfg: &WindowConfig) -> Result<TimeWindow> {
    let start = validation::parse_clock_time(&format!("{}.start", field), &cfg.start)?;
    let end = validation::parse_clock_time(&format!("{}.end", field), &cfg.end)?;

    // 不支援跨午夜的時段
    if start > end {
        return Err(ServiceError::ConfigValidationError {
            field: field.to_string(),
            message: format!("window starts at {} but ends at {}", cfg.start, cfg.end),
        });
    }

    Ok(TimeWindow::new(service, start, end, cfg.label.clone()))
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("server.bind", &self.server.bind)?;

        if !self.printer.dry_run {
            validation::validate_non_empty_string("printer.sink_address", &self.printer.sink_address)?;
        }
        if let Some(dir) = &self.printer.staging_dir {
            validation::validate_path("printer.staging_dir", &dir.to_string_lossy())?;
        }

        validation::validate_positive_number("ticket.max_line_width", self.ticket.max_line_width, 1)?;
        validation::validate_positive_number("ticket.words", self.ticket.words.len(), 1)?;

        let snack = self.snack_window()?;
        let lunch = self.lunch_window()?;
        validation::validate_non_empty_string("schedule.snack.label", &snack.label)?;
        validation::validate_non_empty_string("schedule.lunch.label", &lunch.label)?;

        validation::validate_url("gateway.endpoint", &self.gateway.endpoint)?;
        validation::validate_range("gateway.timeout_seconds", self.gateway.timeout_seconds, 1, 60)?;

        Ok(())
    }
}
