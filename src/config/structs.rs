use serde::{Deserialize, Serialize};

use crate::errors::{Result, ShortpathError};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀与分隔符，例如 SP__LINKS__MAX_SHORT_LENGTH=16
pub const ENV_PREFIX: &str = "SP";
pub const ENV_SEPARATOR: &str = "__";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、worker 数量
/// - database: 数据库连接与重试
/// - links: 短链接生命周期参数
/// - instance: 对外展示的实例信息
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub instance: InstanceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置并校验
    ///
    /// 优先级：ENV > config.toml > 默认值
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let explicit = path != DEFAULT_CONFIG_PATH;

        let settings = Config::builder()
            // 显式指定的文件必须存在，默认文件可选
            .add_source(File::with_name(path).required(explicit))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ShortpathError::config(format!("Failed to build config: {}", e)))?;

        let mut config: StaticConfig = settings
            .try_deserialize()
            .map_err(|e| ShortpathError::config(format!("Failed to deserialize config: {}", e)))?;

        config.validate()?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 校验并规范化配置（实例地址补齐结尾的 "/"）
    pub fn validate(&mut self) -> Result<()> {
        super::validators::validate(self)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
///
/// `database_url = "memory://"` 使用不持久化的内存存储
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 短链接生命周期参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksConfig {
    /// 未指定长度时生成的短链接长度
    #[serde(default = "default_short_length")]
    pub default_short_length: i64,
    /// 生成短链接的最大长度（冲突升级的上限）
    #[serde(default = "default_max_short_length")]
    pub max_short_length: i64,
    /// 自定义短链接的截断长度
    #[serde(default = "default_max_custom_length")]
    pub max_custom_length: i64,
    /// 默认有效期（分钟），0 表示永不过期
    #[serde(default = "default_expiry_minutes")]
    pub default_expiry_minutes: i64,
    #[serde(default = "default_cleanup_interval_minutes")]
    pub cleanup_interval_minutes: i64,
}

/// 实例信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(default = "default_instance_name")]
    pub name: String,
    /// 对外访问地址，用于拼接完整短链接，校验后以 "/" 结尾
    #[serde(default = "default_instance_url")]
    pub url: String,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" 或 "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://links.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_short_length() -> i64 {
    3
}

fn default_max_short_length() -> i64 {
    12
}

fn default_max_custom_length() -> i64 {
    default_max_short_length()
}

fn default_expiry_minutes() -> i64 {
    2880
}

fn default_cleanup_interval_minutes() -> i64 {
    1
}

fn default_instance_name() -> String {
    "shortpath".to_string()
}

fn default_instance_url() -> String {
    "http://127.0.0.1:8080/".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            default_short_length: default_short_length(),
            max_short_length: default_max_short_length(),
            max_custom_length: default_max_custom_length(),
            default_expiry_minutes: default_expiry_minutes(),
            cleanup_interval_minutes: default_cleanup_interval_minutes(),
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            name: default_instance_name(),
            url: default_instance_url(),
            contact_email: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let links = LinksConfig::default();
        assert_eq!(links.default_short_length, 3);
        assert_eq!(links.max_short_length, 12);
        assert_eq!(links.max_custom_length, 12);
        assert_eq!(links.default_expiry_minutes, 2880);
        assert_eq!(links.cleanup_interval_minutes, 1);
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[links]"));
        assert!(sample.contains("[instance]"));

        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.links, LinksConfig::default());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [links]
            max_short_length = 20
            "#,
        )
        .unwrap();
        assert_eq!(parsed.links.max_short_length, 20);
        assert_eq!(parsed.links.default_short_length, 3);
        assert_eq!(parsed.server.port, 8080);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("shortpath.toml");
        std::fs::write(
            &path,
            r#"
            [instance]
            url = "https://sho.rt"

            [links]
            default_expiry_minutes = 0
            "#,
        )
        .unwrap();

        let config = StaticConfig::load(path.to_str()).unwrap();
        assert_eq!(config.instance.url, "https://sho.rt/");
        assert_eq!(config.links.default_expiry_minutes, 0);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = StaticConfig::load(Some("/nonexistent/shortpath.toml"));
        assert!(matches!(result, Err(ShortpathError::Config(_))));
    }
}
