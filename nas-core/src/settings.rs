use crate::constants::config;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// 用户设置（跨会话保留）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 上次选择的共享目录
    pub last_folder: Option<PathBuf>,
    /// 上次成功启动 NAS 的时间
    pub last_started_at: Option<DateTime<Local>>,
}

/// 用户设置存储
///
/// 读写都是尽力而为：失败只记录日志，读取失败时返回默认设置。
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<config_dir>/AnytimeAnywhereNAS/settings.json`
    pub fn default_location() -> Self {
        Self::new(config::get_settings_file_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Settings {
        if !self.path.exists() {
            debug!("设置文件不存在: {}", self.path.display());
            return Settings::default();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                error!("读取设置文件失败 {}: {}", self.path.display(), e);
                return Settings::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("设置文件格式错误 {}，使用默认设置: {}", self.path.display(), e);
                Settings::default()
            }
        }
    }

    /// 保存设置，返回是否成功
    pub fn save(&self, settings: &Settings) -> bool {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("创建设置目录失败 {}: {}", parent.display(), e);
                return false;
            }
        }

        let content = match serde_json::to_string_pretty(settings) {
            Ok(content) => content,
            Err(e) => {
                error!("序列化设置失败: {}", e);
                return false;
            }
        };

        match std::fs::write(&self.path, content) {
            Ok(()) => {
                debug!("设置已保存: {}", self.path.display());
                true
            }
            Err(e) => {
                error!("保存设置文件失败 {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// 读取、修改并保存
    pub fn update<F: FnOnce(&mut Settings)>(&self, modify: F) -> Settings {
        let mut settings = self.load();
        modify(&mut settings);
        self.save(&settings);
        settings
    }
}
