use crate::constants::distro;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// 操作系统类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsFamily {
    Windows,
    Linux,
    MacOS,
    /// 兜底分类，不代表识别出了具体系统
    Other,
}

impl OsFamily {
    /// 当前编译目标对应的系统类别
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "linux") {
            OsFamily::Linux
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOS
        } else {
            OsFamily::Other
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OsFamily::Windows => "Windows",
            OsFamily::Linux => "Linux",
            OsFamily::MacOS => "macOS",
            OsFamily::Other => "Other",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// 主机信息，每个会话生成一次，之后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostProfile {
    pub os_family: OsFamily,
    pub cpu_count: usize,
    /// 0 表示未知
    pub total_ram_gb: f64,
    pub linux_distro: Option<String>,
}

impl HostProfile {
    /// 界面标题使用的摘要
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "OS: {} | Cores: {} | RAM: {} GB",
            self.os_family, self.cpu_count, self.total_ram_gb
        );
        if let Some(distro) = &self.linux_distro {
            summary.push_str(&format!(" | Distro: {distro}"));
        }
        summary
    }

    pub fn ram_known(&self) -> bool {
        self.total_ram_gb > 0.0
    }
}

/// 主机信息探测
///
/// 所有探测均为尽力而为：失败时记录日志并返回默认值，不向调用方抛错。
#[derive(Debug, Clone)]
pub struct HostInspector {
    root: PathBuf,
}

impl Default for HostInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl HostInspector {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/"),
        }
    }

    /// 指定文件系统根目录（用于读取 /proc、/etc 的测试夹具）
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn detect_os(&self) -> OsFamily {
        let os = OsFamily::current();
        debug!("检测到操作系统: {}", os);
        os
    }

    pub fn cpu_count(&self) -> usize {
        num_cpus::get().max(1)
    }

    /// 主机总内存（GB，保留两位小数），失败返回 0
    pub fn total_memory_gb(&self) -> f64 {
        self.total_memory_gb_for(self.detect_os())
    }

    fn total_memory_gb_for(&self, os: OsFamily) -> f64 {
        debug!("开始获取主机内存信息");
        match os {
            OsFamily::Linux => {
                let meminfo_path = self.root.join("proc/meminfo");
                match std::fs::read_to_string(&meminfo_path) {
                    Ok(content) => match parse_meminfo(&content) {
                        Some(gb) => {
                            info!("从 {} 读取到内存: {}GB", meminfo_path.display(), gb);
                            return gb;
                        }
                        None => warn!("{} 中没有 MemTotal 字段", meminfo_path.display()),
                    },
                    Err(e) => error!("读取 {} 失败: {}", meminfo_path.display(), e),
                }
            }
            _ => {
                let mut sys = sysinfo::System::new();
                sys.refresh_memory();
                let total_bytes = sys.total_memory();
                if total_bytes > 0 {
                    let gb = round2(total_bytes as f64 / (1024.0 * 1024.0 * 1024.0));
                    info!("通过系统接口读取到内存: {}GB", gb);
                    return gb;
                }
                warn!("系统接口未返回内存信息");
            }
        }

        warn!("无法获取内存信息，返回 0");
        0.0
    }

    /// 识别 Linux 发行版，无法识别时返回 "unknown"
    pub fn detect_linux_distro(&self) -> String {
        info!("检测 Linux 发行版");

        let os_release = self.root.join(distro::OS_RELEASE);
        if os_release.exists() {
            match std::fs::read_to_string(&os_release) {
                Ok(content) => {
                    if let Some(id) = parse_os_release_id(&content) {
                        info!("检测到 Linux 发行版: {}", id);
                        return id;
                    }
                }
                Err(e) => error!("读取 {} 失败: {}", os_release.display(), e),
            }
        }

        for (marker, name) in distro::MARKER_FILES {
            if self.root.join(marker).exists() {
                info!("通过标记文件 {} 识别为 {}", marker, name);
                return name.to_string();
            }
        }

        warn!("无法识别 Linux 发行版，使用 '{}'", distro::UNKNOWN);
        distro::UNKNOWN.to_string()
    }

    /// 汇总主机信息
    pub fn inspect(&self) -> HostProfile {
        info!("获取系统信息");
        let os_family = self.detect_os();
        let profile = HostProfile {
            os_family,
            cpu_count: self.cpu_count(),
            total_ram_gb: self.total_memory_gb_for(os_family),
            linux_distro: (os_family == OsFamily::Linux).then(|| self.detect_linux_distro()),
        };
        info!(
            os = %profile.os_family,
            cores = profile.cpu_count,
            ram_gb = profile.total_ram_gb,
            "系统信息获取完成"
        );
        profile
    }
}

/// 从 /proc/meminfo 文本中解析 MemTotal（kB）并换算为 GB
pub fn parse_meminfo(content: &str) -> Option<f64> {
    let re = Regex::new(r"MemTotal:\s+(\d+) kB").ok()?;
    let kb: f64 = re.captures(content)?.get(1)?.as_str().parse().ok()?;
    Some(round2(kb / (1024.0 * 1024.0)))
}

/// 解析 os-release 的 ID 字段（去引号、转小写）
pub fn parse_os_release_id(content: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^ID=(.+)$").ok()?;
    let raw = re.captures(content)?.get(1)?.as_str();
    let id = raw.trim().trim_matches('"').trim_matches('\'').to_lowercase();
    (!id.is_empty()).then_some(id)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
