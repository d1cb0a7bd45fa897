use super::follow_status;
use crate::app::CliApp;
use nas_core::Result;
use std::path::PathBuf;
use tracing::info;

/// 选择并保存共享目录
pub fn run_select_folder(app: &CliApp, folder: PathBuf) -> Result<()> {
    app.controller.select_folder(&folder)?;

    let snapshot = app.controller.snapshot();
    if let Some(selected) = &snapshot.selected_folder {
        info!("✅ 共享目录已保存: {}", selected.display());
    }
    info!("💾 设置文件: {}", app.settings.path().display());
    Ok(())
}

/// 启动 NAS
pub async fn run_start(app: &CliApp, folder: Option<PathBuf>) -> Result<()> {
    info!("▶️  启动 NAS...");
    app.controller.initialize().await;

    if let Some(folder) = folder {
        app.controller.select_folder(&folder)?;
    }

    follow_status(&app.controller, app.controller.start()).await?;

    let snapshot = app.controller.snapshot();
    if let Some(address) = &snapshot.connection_address {
        info!("🎉 NAS 已启动");
        info!("🔗 连接地址: {}", address);
    }
    Ok(())
}

/// 停止 NAS
pub async fn run_stop(app: &CliApp) -> Result<()> {
    info!("⏹️  停止 NAS...");
    follow_status(&app.controller, app.controller.stop()).await?;
    info!("✅ NAS 已停止");
    Ok(())
}
