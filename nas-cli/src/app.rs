use nas_core::{
    Result, config::AppConfig, error::NasError, nas::NasController, settings::SettingsStore,
};
use std::path::Path;

use crate::cli::Commands;
use crate::commands;

/// 加载配置：显式指定路径时只读该文件，否则按默认顺序查找
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_or_default(path),
        None => AppConfig::find_and_load_config(),
    }
}

pub struct CliApp {
    pub config: AppConfig,
    pub controller: NasController,
    pub settings: SettingsStore,
}

impl CliApp {
    pub fn new(config: AppConfig) -> Self {
        Self::with_settings(config, SettingsStore::default_location())
    }

    pub fn with_settings(config: AppConfig, settings: SettingsStore) -> Self {
        let controller = NasController::from_config(&config).with_settings(settings.clone());
        Self {
            config,
            controller,
            settings,
        }
    }

    /// 运行应用命令
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Init { .. } => Err(NasError::custom("init 命令需要在加载配置前处理")),
            Commands::Status { json } => commands::run_status(self, json).await,
            Commands::InstallDocker => commands::run_install_docker(self).await,
            Commands::Start { folder } => commands::run_start(self, folder).await,
            Commands::Stop => commands::run_stop(self).await,
            Commands::Address => commands::run_address(self).await,
            Commands::SelectFolder { folder } => commands::run_select_folder(self, folder),
        }
    }
}
