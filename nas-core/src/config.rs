use crate::constants::{config, logging, nas, timeout};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub docker: DockerConfig,
    pub nas: NasConfig,
    pub logging: LoggingConfig,
}

/// Docker相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DockerConfig {
    pub engine_start_timeout_secs: u64,
    pub engine_poll_interval_secs: u64,
}

/// 共享相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct NasConfig {
    pub share_name: String,
    pub work_dir: String,
}

/// 日志相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            engine_start_timeout_secs: timeout::ENGINE_START_TIMEOUT,
            engine_poll_interval_secs: timeout::ENGINE_POLL_INTERVAL,
        }
    }
}

impl Default for NasConfig {
    fn default() -> Self {
        Self {
            share_name: nas::DEFAULT_SHARE_NAME.to_string(),
            work_dir: nas::DEFAULT_WORK_DIR.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: logging::LOG_DIR_NAME.to_string(),
        }
    }
}

impl DockerConfig {
    pub fn engine_start_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_start_timeout_secs)
    }

    /// 检查间隔至少 1 秒
    pub fn engine_poll_interval(&self) -> Duration {
        Duration::from_secs(self.engine_poll_interval_secs.max(1))
    }
}

impl AppConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：config.toml -> nas.toml -> .nas.toml
    pub fn find_and_load_config() -> Result<Self> {
        Self::find_and_load_config_in(Path::new("."))
    }

    /// 在指定目录中查找配置文件，都不存在时使用默认配置（不写入磁盘）
    pub fn find_and_load_config_in(dir: &Path) -> Result<Self> {
        for config_file in config::CONFIG_FILE_CANDIDATES {
            let path = dir.join(config_file);
            if path.exists() {
                tracing::info!("找到配置文件: {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(Self::default())
    }

    /// 加载指定配置文件；文件不存在时使用默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::warn!("配置文件 {} 不存在，使用默认配置", path.display());
            Ok(Self::default())
        }
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/config.toml.template");

        TEMPLATE
            .replace(
                "{engine_start_timeout_secs}",
                &self.docker.engine_start_timeout_secs.to_string(),
            )
            .replace(
                "{engine_poll_interval_secs}",
                &self.docker.engine_poll_interval_secs.to_string(),
            )
            .replace("{share_name}", &escape_toml_string(&self.nas.share_name))
            .replace("{work_dir}", &escape_toml_string(&self.nas.work_dir))
            .replace("{log_dir}", &escape_toml_string(&self.logging.log_dir))
    }

    /// compose 文件所在目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.nas.work_dir)
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.logging.log_dir)
    }
}

/// Windows 路径中的反斜杠需要转义
fn escape_toml_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.docker.engine_start_timeout_secs, 30);
        assert_eq!(config.docker.engine_poll_interval_secs, 2);
        assert_eq!(config.nas.share_name, "MyNasShare");
        assert_eq!(config.work_dir(), PathBuf::from("."));
        assert_eq!(config.log_dir(), PathBuf::from("logs"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.docker.engine_start_timeout_secs = 60;
        config.nas.share_name = "Family".to_string();
        config.nas.work_dir = r"C:\Users\me\nas".to_string();
        config.save_to_file(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Anytime Anywhere NAS"));

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nas.toml");
        fs::write(&path, "[nas]\nshare_name = \"Photos\"\n").unwrap();

        let loaded = AppConfig::find_and_load_config_in(dir.path()).unwrap();
        assert_eq!(loaded.nas.share_name, "Photos");
        assert_eq!(loaded.nas.work_dir, ".");
        assert_eq!(loaded.docker, DockerConfig::default());
    }

    #[test]
    fn test_candidate_priority() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".nas.toml"), "[nas]\nshare_name = \"Hidden\"\n").unwrap();
        fs::write(dir.path().join("config.toml"), "[nas]\nshare_name = \"Main\"\n").unwrap();

        let loaded = AppConfig::find_and_load_config_in(dir.path()).unwrap();
        assert_eq!(loaded.nas.share_name, "Main");
    }

    #[test]
    fn test_missing_config_not_written() {
        let dir = tempdir().unwrap();
        let loaded = AppConfig::find_and_load_config_in(dir.path()).unwrap();
        assert_eq!(loaded, AppConfig::default());
        assert!(!dir.path().join("config.toml").exists());

        let loaded = AppConfig::load_or_default(dir.path().join("custom.toml")).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[docker\nbroken").unwrap();
        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(crate::NasError::Config(_))
        ));
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let docker = DockerConfig {
            engine_start_timeout_secs: 10,
            engine_poll_interval_secs: 0,
        };
        assert_eq!(docker.engine_poll_interval(), Duration::from_secs(1));
        assert_eq!(docker.engine_start_timeout(), Duration::from_secs(10));
    }
}
