use crate::guard::GuardCooldowns;
use crate::notify::PollTimings;
use crate::orders::EngineRules;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
/// | POLL_TIMEOUT_SECS | 25 | 长轮询默认超时 |
/// | POLL_MAX_TIMEOUT_SECS | 30 | 客户端超时上限 |
/// | KITCHEN_RECHECK_MS | 500 | 厨房轮询复查间隔 |
/// | STOCK_RECHECK_MS | 1000 | 库存轮询复查间隔 |
/// | TAX_RATE_PERCENT | 19 | 开票税率 (%) |
/// | DEBOUNCE_DEFAULT_MS | 500 | 默认防重冷却 |
/// | DEBOUNCE_CRITICAL_MS | 2000 | 关键操作冷却 |
/// | DEBOUNCE_FORM_MS | 1000 | 表单操作冷却 |
/// | DEBOUNCE_RETENTION_SECS | 300 | 防重记录保留时间 |
/// | COMMAND_RETENTION_HOURS | 72 | 已处理命令 ID 保留时间 (幂等窗口) |
/// | SEED_FILE | - | 首次启动导入的目录 JSON |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/comanda HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub poll_timeout_secs: u64,
    pub poll_max_timeout_secs: u64,
    pub kitchen_recheck_ms: u64,
    pub stock_recheck_ms: u64,
    pub tax_rate_percent: Decimal,
    pub debounce_default_ms: u64,
    pub debounce_critical_ms: u64,
    pub debounce_form_ms: u64,
    pub debounce_retention_secs: u64,
    /// 已处理命令 ID 的保留时间，超过后重放会被再次执行
    pub command_retention_hours: u64,
    /// 目录种子文件 (仅在目录为空时导入)
    pub seed_file: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 8000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            poll_timeout_secs: env_or("POLL_TIMEOUT_SECS", 25),
            poll_max_timeout_secs: env_or("POLL_MAX_TIMEOUT_SECS", 30),
            kitchen_recheck_ms: env_or("KITCHEN_RECHECK_MS", 500),
            stock_recheck_ms: env_or("STOCK_RECHECK_MS", 1000),
            tax_rate_percent: env_or("TAX_RATE_PERCENT", Decimal::new(19, 0)),
            debounce_default_ms: env_or("DEBOUNCE_DEFAULT_MS", 500),
            debounce_critical_ms: env_or("DEBOUNCE_CRITICAL_MS", 2000),
            debounce_form_ms: env_or("DEBOUNCE_FORM_MS", 1000),
            debounce_retention_secs: env_or("DEBOUNCE_RETENTION_SECS", 300),
            command_retention_hours: env_or("COMMAND_RETENTION_HOURS", 72),
            seed_file: std::env::var("SEED_FILE").ok().filter(|s| !s.is_empty()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("comanda.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn engine_rules(&self) -> EngineRules {
        EngineRules {
            tax_rate: self.tax_rate_percent / Decimal::ONE_HUNDRED,
        }
    }

    pub fn poll_timings(&self) -> PollTimings {
        PollTimings {
            default_timeout: Duration::from_secs(self.poll_timeout_secs),
            max_timeout: Duration::from_secs(self.poll_max_timeout_secs),
            kitchen_recheck: Duration::from_millis(self.kitchen_recheck_ms),
            stock_recheck: Duration::from_millis(self.stock_recheck_ms),
        }
    }

    pub fn guard_cooldowns(&self) -> GuardCooldowns {
        GuardCooldowns {
            default: Duration::from_millis(self.debounce_default_ms),
            critical: Duration::from_millis(self.debounce_critical_ms),
            form: Duration::from_millis(self.debounce_form_ms),
            retention: Duration::from_secs(self.debounce_retention_secs),
        }
    }

    pub fn command_retention(&self) -> Duration {
        Duration::from_secs(self.command_retention_hours * 3600)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_settings() {
        let mut config = Config::with_overrides("/tmp/comanda-test", 9000);
        config.tax_rate_percent = Decimal::new(19, 0);
        config.poll_max_timeout_secs = 30;
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.engine_rules().tax_rate, Decimal::new(19, 2));
        assert_eq!(
            config.poll_timings().max_timeout,
            Duration::from_secs(30)
        );
        assert!(config.database_path().ends_with("comanda.redb"));

        config.command_retention_hours = 2;
        assert_eq!(config.command_retention(), Duration::from_secs(7200));
    }
}
