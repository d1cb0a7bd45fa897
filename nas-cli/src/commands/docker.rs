use super::follow_status;
use crate::app::CliApp;
use nas_core::Result;
use tracing::info;

/// 自动安装 Docker Desktop
pub async fn run_install_docker(app: &CliApp) -> Result<()> {
    let snapshot = app.controller.initialize().await;
    if snapshot.docker_installed {
        info!("✅ Docker 已安装，无需重复安装");
        return Ok(());
    }

    info!("📦 开始安装 Docker，可能需要几分钟...");
    follow_status(&app.controller, app.controller.install_docker()).await?;

    info!("🎉 Docker 安装完成");
    info!("💡 安装后可能需要重启系统，然后运行 'nas-cli start' 启动 NAS");
    Ok(())
}
