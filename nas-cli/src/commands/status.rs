use crate::app::CliApp;
use crate::project_info::{get_copyright_info, get_version_string};
use nas_core::{Result, constants::docker, network};
use tracing::{debug, info, warn};

/// 显示客户端版本信息
pub fn show_client_version() {
    info!("🗄️  {}", get_version_string());
    debug!("{}", get_copyright_info());
}

/// 显示主机、Docker 和 NAS 状态
pub async fn run_status(app: &CliApp, json: bool) -> Result<()> {
    let snapshot = app.controller.initialize().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    show_client_version();
    info!("==================");

    if let Some(host) = &snapshot.host {
        info!("🖥️  {}", host.summary());
        if !host.ram_known() {
            warn!("⚠️  无法读取主机内存，将使用最小内存限制");
        }
    }

    info!(
        "🐳 Docker: {}",
        if snapshot.docker_installed {
            "已安装"
        } else {
            "未安装"
        }
    );
    info!("📦 NAS: {} - {}", snapshot.phase, snapshot.status_message);

    match &snapshot.selected_folder {
        Some(folder) => info!("📁 共享目录: {}", folder.display()),
        None => info!("📁 共享目录: No folder selected."),
    }
    if let Some(address) = &snapshot.connection_address {
        info!("🔗 连接地址: {}", address);
    }

    let compose_file = docker::get_compose_file_path(app.controller.work_dir());
    info!("⚙️  配置:");
    info!("   共享名称: {}", app.config.nas.share_name);
    info!(
        "   compose 文件: {} ({})",
        compose_file.display(),
        if compose_file.exists() {
            "已生成"
        } else {
            "未生成"
        }
    );
    info!("   设置文件: {}", app.settings.path().display());

    if snapshot.can_install_docker() {
        info!("👉 运行 'nas-cli install-docker' 自动安装 Docker Desktop");
    }
    if snapshot.can_start() {
        info!("👉 运行 'nas-cli start --folder <目录>' 启动 NAS");
    }
    if snapshot.can_stop() {
        info!("👉 运行 'nas-cli stop' 停止 NAS");
    }

    Ok(())
}

/// 显示共享连接地址；NAS 未运行时给出启动后的预期地址
pub async fn run_address(app: &CliApp) -> Result<()> {
    let snapshot = app.controller.initialize().await;

    let address = match snapshot.connection_address {
        Some(address) => {
            info!("🔗 NAS 运行中，连接地址:");
            address
        }
        None => {
            warn!("⚠️  NAS 当前未运行，启动后可通过以下地址访问:");
            let ip = network::locate_lan_ipv4();
            if network::is_fallback_address(&ip) {
                warn!("⚠️  未检测到局域网地址，该地址仅在本机可用");
            }
            network::connection_url(
                &ip,
                app.controller.share_name(),
                app.controller.host_profile().os_family,
            )
        }
    };

    println!("{address}");
    Ok(())
}
