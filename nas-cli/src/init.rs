use nas_core::{config::AppConfig, constants::config, error::Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 生成默认配置文件，返回配置文件路径；已存在且未指定 force 时返回 None
pub async fn run_init(force: bool, config_path: Option<&Path>) -> Result<Option<PathBuf>> {
    info!("🗄️  Anytime Anywhere NAS 初始化");
    info!("======================");

    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE_NAME));

    // 检查是否已经初始化过
    if !force && config_path.exists() {
        warn!("⚠️  检测到已存在的配置文件: {}", config_path.display());
        info!("如果您要重新初始化，请使用 --force 参数");
        info!("示例: nas-cli init --force");
        return Ok(None);
    }

    info!("📋 步骤 1: 创建配置文件");
    let config = AppConfig::default();
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    config.save_to_file(&config_path)?;
    info!("   ✅ 创建配置文件: {}", config_path.display());

    info!("📋 步骤 2: 创建目录结构");
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let log_dir = base_dir.join(config.log_dir());
    tokio::fs::create_dir_all(&log_dir).await?;
    info!("   ✅ 创建日志目录: {}", log_dir.display());

    info!("🎉 初始化完成！");
    info!("");
    info!("📝 接下来的步骤:");
    info!("   1️⃣  运行 'nas-cli status' 检查 Docker 是否可用");
    info!("   2️⃣  运行 'nas-cli select-folder <目录>' 选择要共享的目录");
    info!("   3️⃣  运行 'nas-cli start' 启动 NAS");
    info!("");
    info!("💡 提示:");
    info!(
        "   - 配置文件: {} (可手动编辑修改共享名称和等待时间)",
        config_path.display()
    );
    info!("   - 使用 'nas-cli --help' 查看所有可用命令");

    Ok(Some(config_path))
}
