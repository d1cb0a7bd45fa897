/// Docker 相关常量
pub mod docker {
    use std::path::{Path, PathBuf};

    /// docker-compose.yml 文件名
    pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

    /// 固定的容器名称
    pub const CONTAINER_NAME: &str = "my-simple-nas";

    /// compose 中的服务名称
    pub const SERVICE_NAME: &str = "samba";

    /// Samba 镜像
    pub const SAMBA_IMAGE: &str = "dperson/samba";

    /// 容器内共享目录
    pub const CONTAINER_SHARE_PATH: &str = "/share";

    /// Samba 端口
    pub const SMB_PORTS: [u16; 2] = [139, 445];

    /// Docker Desktop 默认安装路径（仅 Windows）
    pub const DOCKER_DESKTOP_EXE: &str = r"C:\Program Files\Docker\Docker\Docker Desktop.exe";

    /// Docker Desktop 下载地址
    pub const DOCKER_DESKTOP_URL: &str = "https://www.docker.com/products/docker-desktop";

    /// 获取 compose 文件路径
    pub fn get_compose_file_path(work_dir: &Path) -> PathBuf {
        work_dir.join(COMPOSE_FILE_NAME)
    }
}

/// 资源限制计算常量
pub mod limits {
    /// 分配给 NAS 的主机资源比例
    pub const HOST_SHARE_RATIO: f64 = 0.25;

    /// CPU 下限（核）
    pub const MIN_CPU: f64 = 0.5;

    /// CPU 上限（核）
    pub const MAX_CPU: f64 = 2.0;

    /// 内存下限（GB）
    pub const MIN_MEMORY_GB: f64 = 1.0;

    /// 内存上限（GB）
    pub const MAX_MEMORY_GB: f64 = 3.0;
}

/// NAS 共享相关常量
pub mod nas {
    /// 默认共享名称
    pub const DEFAULT_SHARE_NAME: &str = "MyNasShare";

    /// 默认工作目录（compose 文件所在目录）
    pub const DEFAULT_WORK_DIR: &str = ".";
}

/// 超时时间常量（秒）
pub mod timeout {
    /// 启动 Docker Desktop 后等待引擎就绪的最长时间
    pub const ENGINE_START_TIMEOUT: u64 = 30;

    /// 引擎就绪检查间隔
    pub const ENGINE_POLL_INTERVAL: u64 = 2;
}

/// 网络相关常量
pub mod network {
    /// 本地回环地址（同时表示"地址未知"）
    pub const LOCALHOST_IPV4: &str = "127.0.0.1";

    /// 虚拟网卡关键字（大小写不敏感）
    pub const VIRTUAL_ADAPTER_MARKERS: [&str; 5] =
        ["virtual", "hyper-v", "wsl", "docker", "vethernet"];

    /// 用于探测默认路由网卡的外部地址（UDP connect 不发送数据）
    pub const ROUTE_TARGET_ADDR: &str = "8.8.8.8:80";
}

/// 日志相关常量
pub mod logging {
    use std::path::{Path, PathBuf};

    /// 默认日志级别
    pub const DEFAULT_LOG_LEVEL: &str = "info";

    /// 日志目录名
    pub const LOG_DIR_NAME: &str = "logs";

    /// 滚动日志文件名前缀
    pub const LOG_FILE_PREFIX: &str = "anytime-nas.log";

    /// 获取日志文件保存目录
    pub fn get_log_dir() -> PathBuf {
        Path::new(".").join(LOG_DIR_NAME)
    }
}

/// 应用配置相关常量
pub mod config {
    use std::path::PathBuf;

    /// 配置文件名
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    /// 配置文件查找顺序
    pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["config.toml", "nas.toml", ".nas.toml"];

    /// 用户配置目录下的应用目录名
    pub const APP_DIR_NAME: &str = "AnytimeAnywhereNAS";

    /// 用户设置文件名
    pub const SETTINGS_FILE_NAME: &str = "settings.json";

    /// 获取用户设置文件路径（平台配置目录，失败时回退到当前目录）
    pub fn get_settings_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(SETTINGS_FILE_NAME)
    }
}

/// Linux 发行版识别相关常量
pub mod distro {
    /// os-release 文件
    pub const OS_RELEASE: &str = "etc/os-release";

    /// 发行版标记文件及其对应标识（按优先级）
    pub const MARKER_FILES: [(&str, &str); 4] = [
        ("etc/debian_version", "debian"),
        ("etc/redhat-release", "rhel"),
        ("etc/arch-release", "arch"),
        ("etc/SuSE-release", "suse"),
    ];

    /// 无法识别时的默认值
    pub const UNKNOWN: &str = "unknown";
}

/// 技术版本信息常量
pub mod version {
    /// 核心库版本（自动同步）
    pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
}
