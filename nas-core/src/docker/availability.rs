use crate::command::{CommandOutcome, CommandRunner};
use std::sync::Arc;
use tracing::{info, warn};

/// Docker 命令失败的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerFailureKind {
    /// 当前用户无权访问 Docker 引擎（Linux 上通常是未加入 docker 组）
    PermissionDenied,
    Other,
}

/// 根据 stderr 对 Docker 命令失败进行分类
///
/// 这是唯一的 "permission denied" 匹配规则，大小写不敏感。
pub fn classify_failure(stderr: &str) -> DockerFailureKind {
    if stderr.to_lowercase().contains("permission denied") {
        DockerFailureKind::PermissionDenied
    } else {
        DockerFailureKind::Other
    }
}

/// Docker 可用性
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerAvailability {
    NotInstalled { stderr: String },
    PermissionDenied { stderr: String },
    EngineDown { stderr: String },
    Reachable,
}

impl DockerAvailability {
    /// Docker 命令行已安装（引擎不一定可达）
    pub fn is_installed(&self) -> bool {
        !matches!(self, DockerAvailability::NotInstalled { .. })
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, DockerAvailability::Reachable)
    }

    /// 由 `docker ps` 的结果推导引擎状态
    fn from_engine_outcome(outcome: &CommandOutcome) -> Self {
        if outcome.succeeded() {
            return DockerAvailability::Reachable;
        }
        let stderr = outcome.stderr.clone();
        if outcome.is_launch_failure() {
            return DockerAvailability::NotInstalled { stderr };
        }
        match classify_failure(&stderr) {
            DockerFailureKind::PermissionDenied => DockerAvailability::PermissionDenied { stderr },
            DockerFailureKind::Other => DockerAvailability::EngineDown { stderr },
        }
    }
}

/// 容器存在状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerPresence {
    Absent,
    Stopped,
    Running,
}

/// Docker 安装与引擎可达性检查
#[derive(Clone)]
pub struct DockerChecker {
    runner: Arc<dyn CommandRunner>,
}

impl DockerChecker {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// `docker --version`
    pub async fn check_installed(&self) -> CommandOutcome {
        info!("检查 Docker 是否安装");
        let outcome = self.runner.run("docker", &["--version"]).await;
        if outcome.succeeded() {
            info!("Docker 已安装: {}", outcome.stdout.trim());
        } else {
            warn!("Docker 未安装: {}", outcome.stderr.trim());
        }
        outcome
    }

    /// `docker ps`
    pub async fn check_engine(&self) -> CommandOutcome {
        info!("检查 Docker 引擎是否运行");
        let outcome = self.runner.run("docker", &["ps"]).await;
        if outcome.succeeded() {
            info!("Docker 引擎运行中");
        } else {
            warn!("Docker 引擎不可达: {}", outcome.stderr.trim());
        }
        outcome
    }

    /// 仅检查引擎可达性（启动流程中的复查）
    pub async fn engine_status(&self) -> DockerAvailability {
        DockerAvailability::from_engine_outcome(&self.check_engine().await)
    }

    /// 完整检查：先确认安装，再确认引擎可达
    pub async fn assess(&self) -> DockerAvailability {
        let installed = self.check_installed().await;
        if !installed.succeeded() {
            let stderr = installed.stderr;
            return match classify_failure(&stderr) {
                DockerFailureKind::PermissionDenied => {
                    DockerAvailability::PermissionDenied { stderr }
                }
                DockerFailureKind::Other => DockerAvailability::NotInstalled { stderr },
            };
        }
        self.engine_status().await
    }

    /// 查询指定名称容器的状态
    pub async fn container_presence(&self, name: &str) -> ContainerPresence {
        let filter = format!("name={name}");

        let all = self
            .runner
            .run("docker", &["ps", "-a", "--filter", &filter, "--format", "{{.Names}}"])
            .await;
        if !all.succeeded() || !lists_name(&all.stdout, name) {
            return ContainerPresence::Absent;
        }

        let running = self
            .runner
            .run("docker", &["ps", "--filter", &filter, "--format", "{{.Names}}"])
            .await;
        if running.succeeded() && lists_name(&running.stdout, name) {
            ContainerPresence::Running
        } else {
            ContainerPresence::Stopped
        }
    }
}

/// `--filter name=` 是子串匹配，这里要求整行相等
fn lists_name(stdout: &str, name: &str) -> bool {
    stdout.lines().any(|line| line.trim() == name)
}
