use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub points: PointsConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

/// 积分余额的存储方式，每个部署只选其一，两者不互相同步
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointsBackend {
    /// service_user.points + version 乐观锁
    #[default]
    Counter,
    /// user_points_ledger 追加写流水
    Ledger,
}

impl std::str::FromStr for PointsBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counter" => Ok(PointsBackend::Counter),
            "ledger" => Ok(PointsBackend::Ledger),
            other => Err(format!("unknown points backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PointsConfig {
    #[serde(default)]
    pub backend: PointsBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// 应用到每一行订单明细的折扣率 (0, 1]
    #[serde(default = "default_discount_ratio")]
    pub discount_ratio: f64,
}

fn default_discount_ratio() -> f64 {
    1.0
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            discount_ratio: default_discount_ratio(),
        }
    }
}

impl Config {
    /// 解析配置文件内容
    pub fn parse(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("解析配置文件失败: {e}")))
    }

    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    AppError::ConfigError(
                        "缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml".to_string(),
                    )
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                    },
                    points: PointsConfig::default(),
                    checkout: CheckoutConfig::default(),
                }
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "无法读取配置文件 {config_path}: {e}"
                )));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("POINTS_BACKEND") {
            config.points.backend = v.parse().map_err(AppError::ConfigError)?;
        }
        if let Ok(v) = env::var("CHECKOUT_DISCOUNT_RATIO") {
            config.checkout.discount_ratio = v.parse().map_err(|e| {
                AppError::ConfigError(format!("CHECKOUT_DISCOUNT_RATIO 无效: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        let ratio = self.checkout.discount_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(AppError::ConfigError(format!(
                "checkout.discount_ratio must be in (0, 1], got {ratio}"
            )));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::ConfigError(
                "database.max_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8000

        [database]
        url = "postgres://localhost/checkout"
        max_connections = 5

        [jwt]
        secret = "secret"
        access_token_expires_in = 3600

        [points]
        backend = "ledger"

        [checkout]
        discount_ratio = 0.9
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.points.backend, PointsBackend::Ledger);
        assert_eq!(config.checkout.discount_ratio, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_optional_sections_default() {
        let trimmed: String = SAMPLE
            .split("[points]")
            .next()
            .unwrap()
            .to_string();
        let config: Config = toml::from_str(&trimmed).unwrap();
        assert_eq!(config.points.backend, PointsBackend::Counter);
        assert_eq!(config.checkout.discount_ratio, 1.0);
    }

    #[test]
    fn test_invalid_discount_ratio_rejected() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.checkout.discount_ratio = 1.5;
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));
        config.checkout.discount_ratio = 0.0;
        assert!(matches!(config.validate(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let err = Config::parse("[server]\nport = \"not a number\"").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_points_backend_from_str() {
        assert_eq!("Ledger".parse::<PointsBackend>(), Ok(PointsBackend::Ledger));
        assert_eq!("counter".parse::<PointsBackend>(), Ok(PointsBackend::Counter));
        assert!("redis".parse::<PointsBackend>().is_err());
    }
}
