use crate::constants::{docker, limits};
use crate::host::HostProfile;
use crate::{NasError, Result};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

const TEMPLATE: &str = include_str!("../../templates/docker-compose.yml.template");

/// 按主机 CPU 数计算容器 CPU 限制
pub fn cpu_limit_for(cpu_count: usize) -> f64 {
    (cpu_count as f64 * limits::HOST_SHARE_RATIO).clamp(limits::MIN_CPU, limits::MAX_CPU)
}

/// 按主机内存计算容器内存限制（GB）
pub fn memory_limit_for(total_ram_gb: f64) -> f64 {
    (total_ram_gb * limits::HOST_SHARE_RATIO).clamp(limits::MIN_MEMORY_GB, limits::MAX_MEMORY_GB)
}

/// 一次启动所使用的共享配置
#[derive(Debug, Clone, PartialEq)]
pub struct ShareConfig {
    pub host_path: PathBuf,
    pub share_name: String,
    pub cpu_limit: f64,
    pub memory_limit_gb: f64,
}

impl ShareConfig {
    /// 资源限制由主机信息推导，不接受用户输入
    pub fn new(host_path: impl Into<PathBuf>, share_name: impl Into<String>, host: &HostProfile) -> Self {
        Self {
            host_path: host_path.into(),
            share_name: share_name.into(),
            cpu_limit: cpu_limit_for(host.cpu_count),
            memory_limit_gb: memory_limit_for(host.total_ram_gb),
        }
    }

    /// Docker 使用的路径形式（反斜杠转为正斜杠）
    pub fn docker_host_path(&self) -> String {
        self.host_path.to_string_lossy().replace('\\', "/")
    }
}

/// 校验共享目录：非空、存在且为目录
pub fn validate_host_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(NasError::validation("Please select a folder to share first."));
    }
    if !path.exists() {
        return Err(NasError::validation(format!(
            "Selected folder does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(NasError::validation(format!(
            "Selected path is not a folder: {}",
            path.display()
        )));
    }
    Ok(())
}

/// 校验共享名称（会被拼进 Samba 的 `-s` 参数）
fn validate_share_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(NasError::validation("Share name must not be empty."));
    }
    if name.contains([';', '"', '\n']) {
        return Err(NasError::validation(format!(
            "Share name contains unsupported characters: {name}"
        )));
    }
    Ok(())
}

/// 渲染 compose 文件内容
///
/// 占位符一次性替换，替换进去的路径或共享名中即使含有 `{...}` 也不会被再次展开。
pub fn render_service_definition(config: &ShareConfig) -> Result<String> {
    let ports = docker::SMB_PORTS
        .iter()
        .map(|port| format!("      - \"{port}:{port}\""))
        .collect::<Vec<_>>()
        .join("\n");
    let host_path = config.docker_host_path();
    let cpu_limit = format!("{:.1}", config.cpu_limit);
    let memory_limit = format!("{:.1}", config.memory_limit_gb);

    let placeholder = Regex::new(r"\{([a-z_]+)\}")
        .map_err(|e| NasError::compose(format!("模板占位符规则无效: {e}")))?;

    let rendered = placeholder.replace_all(TEMPLATE, |caps: &Captures| {
        match &caps[1] {
            "service_name" => docker::SERVICE_NAME.to_string(),
            "image" => docker::SAMBA_IMAGE.to_string(),
            "container_name" => docker::CONTAINER_NAME.to_string(),
            "ports" => ports.clone(),
            "host_path" => host_path.clone(),
            "container_path" => docker::CONTAINER_SHARE_PATH.to_string(),
            "share_name" => config.share_name.clone(),
            "cpu_limit" => cpu_limit.clone(),
            "memory_limit" => memory_limit.clone(),
            _ => caps[0].to_string(),
        }
    });
    Ok(rendered.into_owned())
}

/// 确认渲染结果是合法 YAML，且挂载路径未被路径中的特殊字符破坏
fn verify_rendered(content: &str, config: &ShareConfig) -> Result<()> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| NasError::compose(format!("生成的 compose 文件无法解析: {e}")))?;

    let volume = yaml
        .get("services")
        .and_then(|services| services.get(docker::SERVICE_NAME))
        .and_then(|service| service.get("volumes"))
        .and_then(|volumes| volumes.get(0))
        .and_then(|volume| volume.as_str())
        .ok_or_else(|| NasError::compose("compose 文件缺少 volumes 配置"))?;

    let expected = format!(
        "{}:{}",
        config.docker_host_path(),
        docker::CONTAINER_SHARE_PATH
    );
    if volume != expected {
        return Err(NasError::compose(format!(
            "挂载路径不一致: {volume} != {expected}"
        )));
    }
    Ok(())
}

/// 生成并写入 compose 文件，覆盖已有文件
pub async fn write_service_definition(work_dir: &Path, config: &ShareConfig) -> Result<PathBuf> {
    info!(
        storage_path = %config.host_path.display(),
        share_name = %config.share_name,
        cpu = config.cpu_limit,
        ram_gb = config.memory_limit_gb,
        "写入 docker-compose 文件"
    );

    validate_host_path(&config.host_path)?;
    validate_share_name(&config.share_name)?;

    debug!("Docker 使用的路径: {}", config.docker_host_path());
    let content = render_service_definition(config)?;
    verify_rendered(&content, config)?;

    let compose_file = docker::get_compose_file_path(work_dir);
    tokio::fs::write(&compose_file, content).await.map_err(|e| {
        error!("写入 {} 失败: {}", compose_file.display(), e);
        NasError::Io(e)
    })?;

    info!("{} 写入成功", compose_file.display());
    Ok(compose_file)
}
