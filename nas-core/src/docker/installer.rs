use crate::command::{CommandOutcome, CommandRunner};
use crate::constants::docker;
use crate::host::OsFamily;
use crate::{NasError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 一种安装方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallStrategy {
    pub name: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
}

/// Windows 下按顺序尝试的安装方式
pub const WINDOWS_STRATEGIES: [InstallStrategy; 2] = [
    InstallStrategy {
        name: "winget",
        program: "winget",
        args: &[
            "install",
            "-e",
            "--id",
            "Docker.DockerDesktop",
            "--accept-package-agreements",
            "--accept-source-agreements",
        ],
    },
    InstallStrategy {
        name: "chocolatey",
        program: "choco",
        args: &["install", "docker-desktop", "-y"],
    },
];

/// 自动安装 Docker
#[derive(Clone)]
pub struct DockerInstaller {
    runner: Arc<dyn CommandRunner>,
    strategies: Vec<InstallStrategy>,
}

impl DockerInstaller {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            strategies: WINDOWS_STRATEGIES.to_vec(),
        }
    }

    /// 依次尝试各安装方式，第一个成功即返回；全部失败时返回提示手动安装的结果
    pub async fn install(&self, os: OsFamily) -> CommandOutcome {
        info!("开始 Docker 安装流程");

        if os != OsFamily::Windows {
            error!("仅 Windows 支持自动安装 Docker (当前: {})", os);
            return CommandOutcome::failure(
                -1,
                "Automatic installation only available on Windows. Please install Docker manually.",
            );
        }

        for strategy in &self.strategies {
            info!("尝试通过 {} 安装 Docker Desktop", strategy.name);
            let outcome = self.runner.run(strategy.program, strategy.args).await;
            if outcome.succeeded() {
                info!("通过 {} 安装 Docker Desktop 成功", strategy.name);
                return outcome;
            }
            warn!(
                "{} 安装失败 (exit {}): {}",
                strategy.name,
                outcome.exit_code,
                outcome.stderr.trim()
            );
        }

        error!("自动安装 Docker Desktop 失败");
        CommandOutcome::failure(
            -1,
            format!(
                "Automatic installation failed. Please download Docker Desktop from {} and install it manually.",
                docker::DOCKER_DESKTOP_URL
            ),
        )
    }
}

/// Docker Desktop 启动器
///
/// 只查找默认安装路径，不支持自定义安装位置。
#[derive(Clone)]
pub struct DockerDesktop {
    runner: Arc<dyn CommandRunner>,
    executable: PathBuf,
}

impl DockerDesktop {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            executable: PathBuf::from(docker::DOCKER_DESKTOP_EXE),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_executable<P: AsRef<Path>>(mut self, executable: P) -> Self {
        self.executable = executable.as_ref().to_path_buf();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// 启动 Docker Desktop，可执行文件不存在时返回 [`NasError::DockerDesktopNotFound`]
    pub async fn start(&self) -> Result<()> {
        info!("尝试启动 Docker Desktop...");

        if !self.executable.exists() {
            error!(
                "未在默认路径找到 Docker Desktop: {}",
                self.executable.display()
            );
            return Err(NasError::DockerDesktopNotFound(
                self.executable.display().to_string(),
            ));
        }

        self.runner.launch(&self.executable).await?;
        info!("Docker Desktop 已启动");
        Ok(())
    }
}
