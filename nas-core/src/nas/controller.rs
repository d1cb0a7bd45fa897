use super::state::{NasPhase, NasSnapshot, NasState};
use crate::command::{CommandRunner, SystemCommandRunner};
use crate::config::{AppConfig, DockerConfig};
use crate::constants::{docker, network as net_consts};
use crate::docker::compose::validate_host_path;
use crate::docker::{
    ContainerPresence, DockerAvailability, DockerChecker, DockerDesktop, DockerFailureKind,
    DockerInstaller, ShareConfig, classify_failure, write_service_definition,
};
use crate::host::{HostInspector, HostProfile, OsFamily};
use crate::network;
use crate::settings::SettingsStore;
use crate::{NasError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::{error, info, warn};

const PERMISSION_FIX_STEPS: [&str; 3] = [
    "1. Open a terminal and run: sudo usermod -aG docker $USER",
    "2. Log out of your session completely and log back in (or reboot).",
    "3. Restart this application.",
];

/// 启动 Docker Desktop 后等待引擎就绪的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineWaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl EngineWaitPolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn from_config(config: &DockerConfig) -> Self {
        Self::new(config.engine_start_timeout(), config.engine_poll_interval())
    }
}

impl Default for EngineWaitPolicy {
    fn default() -> Self {
        Self::from_config(&DockerConfig::default())
    }
}

/// NAS 生命周期控制器
///
/// 唯一持有运行状态的对象。启动、停止与安装共用一把操作锁，
/// 并发调用会立即返回 [`NasError::Busy`]。
pub struct NasController {
    runner: Arc<dyn CommandRunner>,
    inspector: HostInspector,
    checker: DockerChecker,
    installer: DockerInstaller,
    desktop: DockerDesktop,
    work_dir: PathBuf,
    share_name: String,
    wait_policy: EngineWaitPolicy,
    settings: Option<SettingsStore>,
    host: OnceLock<HostProfile>,
    state: NasState,
    op_lock: Mutex<()>,
}

impl NasController {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &AppConfig) -> Self {
        Self {
            inspector: HostInspector::new(),
            checker: DockerChecker::new(runner.clone()),
            installer: DockerInstaller::new(runner.clone()),
            desktop: DockerDesktop::new(runner.clone()),
            runner,
            work_dir: config.work_dir(),
            share_name: config.nas.share_name.clone(),
            wait_policy: EngineWaitPolicy::from_config(&config.docker),
            settings: None,
            host: OnceLock::new(),
            state: NasState::new(),
            op_lock: Mutex::new(()),
        }
    }

    /// 使用系统命令执行器，命令在配置的工作目录下运行
    pub fn from_config(config: &AppConfig) -> Self {
        let runner = SystemCommandRunner::new().with_working_dir(config.work_dir());
        Self::new(Arc::new(runner), config)
    }

    /// 持久化共享目录与启动时间
    pub fn with_settings(mut self, settings: SettingsStore) -> Self {
        self.settings = Some(settings);
        self
    }

    /// 使用已知的主机信息，跳过探测
    pub fn with_host_profile(self, profile: HostProfile) -> Self {
        let _ = self.host.set(profile);
        self
    }

    pub fn with_wait_policy(mut self, policy: EngineWaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_desktop_executable<P: AsRef<Path>>(mut self, executable: P) -> Self {
        self.desktop = self.desktop.with_executable(executable);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<NasSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> NasSnapshot {
        self.state.snapshot()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn share_name(&self) -> &str {
        &self.share_name
    }

    /// 主机信息（首次调用时探测，之后复用）
    pub fn host_profile(&self) -> &HostProfile {
        self.host.get_or_init(|| self.inspector.inspect())
    }

    /// 启动时调用：探测主机与 Docker，恢复上次的共享目录并同步容器运行状态
    pub async fn initialize(&self) -> NasSnapshot {
        let host = self.host_profile().clone();
        info!("{}", host.summary());
        self.state.update(|s| s.host = Some(host.clone()));

        self.restore_last_folder();

        info!("检查 Docker 状态");
        let availability = self.checker.assess().await;
        let message = match &availability {
            DockerAvailability::Reachable | DockerAvailability::EngineDown { .. } => {
                "Docker is installed. Ready to start NAS.".to_string()
            }
            DockerAvailability::PermissionDenied { .. } => {
                log_permission_fix();
                "Docker permission denied. Run: sudo usermod -aG docker $USER (then logout/login)"
                    .to_string()
            }
            DockerAvailability::NotInstalled { .. } => match host.os_family {
                OsFamily::Windows => {
                    "Docker not detected. Run 'install-docker' to proceed.".to_string()
                }
                OsFamily::Linux => "Docker not detected. Please install Docker manually.".to_string(),
                _ => "Docker not detected. Please install Docker for your operating system."
                    .to_string(),
            },
        };
        let installed = availability.is_installed();
        self.state.update(|s| {
            s.docker_installed = installed;
            s.status_message = message;
        });

        if availability.is_reachable() {
            self.sync_running_state(&host).await;
        }

        self.snapshot()
    }

    fn restore_last_folder(&self) {
        let Some(store) = &self.settings else {
            return;
        };
        if let Some(folder) = store.load().last_folder {
            if validate_host_path(&folder).is_ok() {
                info!("恢复上次的共享目录: {}", folder.display());
                self.state.update(|s| s.selected_folder = Some(folder));
            } else {
                warn!("上次的共享目录已不可用: {}", folder.display());
            }
        }
    }

    async fn sync_running_state(&self, host: &HostProfile) {
        if self.checker.container_presence(docker::CONTAINER_NAME).await
            == ContainerPresence::Running
        {
            info!("容器 {} 已在运行", docker::CONTAINER_NAME);
            let address = self.connection_address(host.os_family).await;
            self.state.update(|s| {
                s.phase = NasPhase::Running;
                s.is_running = true;
                s.connection_address = Some(address);
                s.status_message = "NAS is RUNNING.".to_string();
            });
        }
    }

    /// 记录共享目录（转为绝对路径），目录无效时拒绝
    pub fn select_folder<P: AsRef<Path>>(&self, folder: P) -> Result<()> {
        let folder = folder.as_ref();
        info!("设置共享目录: {}", folder.display());
        validate_host_path(folder)?;

        // compose 会把相对路径当作命名卷
        let folder = std::path::absolute(folder)?;

        if let Some(store) = &self.settings {
            store.update(|s| s.last_folder = Some(folder.clone()));
        }
        self.state.update(|s| s.selected_folder = Some(folder));
        Ok(())
    }

    /// 自动安装 Docker（仅 Windows）
    pub async fn install_docker(&self) -> Result<()> {
        let _guard = self.op_lock.try_lock().map_err(|_| NasError::Busy)?;
        let os = self.host_profile().os_family;

        self.state
            .set_status("Installing Docker... This may take several minutes.");
        let outcome = self.installer.install(os).await;

        if outcome.succeeded() {
            info!("Docker 安装完成");
            self.state.update(|s| {
                s.docker_installed = true;
                s.status_message =
                    "Docker installed successfully! You may need to restart your system."
                        .to_string();
            });
            Ok(())
        } else {
            error!("Docker 安装失败: {}", outcome.stderr);
            self.state.set_status(format!(
                "Docker installation failed: {}",
                outcome.stderr.trim()
            ));
            Err(NasError::Install(outcome.stderr))
        }
    }

    /// 启动 NAS：检查引擎、生成 compose 文件、重建容器
    pub async fn start(&self) -> Result<()> {
        let _guard = self.op_lock.try_lock().map_err(|_| NasError::Busy)?;
        info!("启动 NAS");

        // 目录校验先于任何 docker 命令
        let folder = self.state.snapshot().selected_folder.unwrap_or_default();
        if let Err(e) = validate_host_path(&folder) {
            warn!("无法启动 NAS: {}", e);
            self.state.set_status(format!("Error: {e}"));
            return Err(e);
        }

        let host = self.host_profile().clone();
        self.state
            .transition(NasPhase::Starting, "Starting... (Checking for Docker)");

        self.ensure_engine(host.os_family).await?;

        info!("Docker 运行中，继续启动 NAS");
        self.state.set_status("Docker OK. Starting NAS...");

        let share = ShareConfig::new(folder, self.share_name.clone(), &host);
        info!(
            "分配资源: {:.1} CPU, {:.1}GB 内存",
            share.cpu_limit, share.memory_limit_gb
        );
        if let Err(e) = write_service_definition(&self.work_dir, &share).await {
            error!("写入 compose 文件失败: {}", e);
            self.fail(format!("Error: {e}"));
            return Err(e);
        }

        self.recreate_container().await;

        let outcome = self.runner.run("docker", &["compose", "up", "-d"]).await;
        if !outcome.succeeded() {
            return Err(match classify_failure(&outcome.stderr) {
                DockerFailureKind::PermissionDenied => {
                    log_permission_fix();
                    self.fail("Error: Docker permission denied. See logs.");
                    NasError::permission_denied(outcome.stderr)
                }
                DockerFailureKind::Other => {
                    error!("NAS 启动失败: {}", outcome.stderr.trim());
                    self.fail(format!("Error: {}", outcome.stderr.trim()));
                    NasError::command(outcome.exit_code, outcome.stderr)
                }
            });
        }

        let address = self.connection_address(host.os_family).await;
        info!("NAS 启动成功: {}", address);
        self.state.update(|s| {
            s.phase = NasPhase::Running;
            s.is_running = true;
            s.connection_address = Some(address);
            s.status_message = "NAS is RUNNING.".to_string();
        });
        if let Some(store) = &self.settings {
            store.update(|s| s.last_started_at = Some(Local::now()));
        }
        Ok(())
    }

    /// 停止 NAS（docker compose down）
    pub async fn stop(&self) -> Result<()> {
        let _guard = self.op_lock.try_lock().map_err(|_| NasError::Busy)?;
        info!("停止 NAS");

        self.state.transition(NasPhase::Stopping, "Stopping...");
        let outcome = self.runner.run("docker", &["compose", "down"]).await;

        if outcome.succeeded() {
            info!("NAS 已停止");
            self.state.update(|s| {
                s.phase = NasPhase::Stopped;
                s.is_running = false;
                s.connection_address = None;
                s.status_message = "NAS is Stopped.".to_string();
            });
            Ok(())
        } else {
            error!(
                "停止 NAS 失败 (exit {}): {}",
                outcome.exit_code,
                outcome.stderr.trim()
            );
            self.fail(format!("Error: {}", outcome.stderr.trim()));
            Err(NasError::command(outcome.exit_code, outcome.stderr))
        }
    }

    /// 确认引擎可达；Windows 上会尝试启动 Docker Desktop 并等待
    async fn ensure_engine(&self, os: OsFamily) -> Result<()> {
        let stderr = match self.checker.engine_status().await {
            DockerAvailability::Reachable => return Ok(()),
            DockerAvailability::PermissionDenied { stderr } => {
                log_permission_fix();
                self.fail(
                    "Error: Docker permission denied. Run: sudo usermod -aG docker $USER, then log out and back in.",
                );
                return Err(NasError::permission_denied(stderr));
            }
            DockerAvailability::NotInstalled { stderr } | DockerAvailability::EngineDown { stderr } => {
                stderr
            }
        };

        match os {
            OsFamily::Windows => self.start_desktop_and_wait().await,
            OsFamily::Linux => {
                warn!("Docker 服务未运行，无法启动 NAS");
                self.fail(
                    "Error: Docker is not running! Please start Docker service: sudo systemctl start docker",
                );
                Err(NasError::EngineNotRunning(stderr))
            }
            _ => {
                warn!("Docker 不可用，无法启动 NAS");
                self.fail("Error: Docker is not installed or not running!");
                Err(NasError::DockerNotInstalled(stderr))
            }
        }
    }

    async fn start_desktop_and_wait(&self) -> Result<()> {
        warn!("Docker 引擎未运行，尝试启动 Docker Desktop");
        self.state
            .set_status("Docker not running... Starting Docker Desktop. Please wait.");

        match self.desktop.start().await {
            Ok(()) => {}
            Err(e @ NasError::DockerDesktopNotFound(_)) => {
                self.state.update(|s| {
                    s.phase = NasPhase::Error;
                    s.docker_installed = false;
                    s.status_message =
                        "Error: Docker Desktop is not installed. Please install it first."
                            .to_string();
                });
                return Err(e);
            }
            Err(e) => {
                self.fail(format!("Error: Failed to start Docker Desktop: {e}"));
                return Err(e);
            }
        }

        if self.wait_for_engine().await {
            info!("Docker Desktop 启动成功，引擎已就绪");
            self.state.set_status("Docker started successfully. Continuing...");
            Ok(())
        } else {
            error!("启动 Docker Desktop 后仍无法连接引擎");
            self.fail(
                "Error: Docker Desktop started but failed to connect. Please check Docker Desktop.",
            );
            Err(NasError::EngineNotRunning(format!(
                "engine not reachable after {}s",
                self.wait_policy.timeout.as_secs()
            )))
        }
    }

    /// 按间隔轮询引擎，直到可达或超时
    async fn wait_for_engine(&self) -> bool {
        let deadline = Instant::now() + self.wait_policy.timeout;
        loop {
            tokio::time::sleep(self.wait_policy.poll_interval).await;
            if self.checker.engine_status().await.is_reachable() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
        }
    }

    /// 已存在的容器总是先删除再由 compose 重建，以应用新配置
    async fn recreate_container(&self) {
        let name = docker::CONTAINER_NAME;
        match self.checker.container_presence(name).await {
            ContainerPresence::Running => {
                info!("容器 {} 正在运行，重启以应用新配置", name);
                self.run_best_effort(&["stop", name]).await;
                self.run_best_effort(&["rm", name]).await;
                self.state.update(|s| {
                    s.is_running = false;
                    s.connection_address = None;
                });
            }
            ContainerPresence::Stopped => {
                info!("容器 {} 已存在但未运行，删除旧容器", name);
                self.run_best_effort(&["rm", name]).await;
            }
            ContainerPresence::Absent => {}
        }
    }

    async fn run_best_effort(&self, args: &[&str]) {
        let outcome = self.runner.run("docker", args).await;
        if !outcome.succeeded() {
            warn!("docker {} 失败: {}", args.join(" "), outcome.stderr.trim());
        }
    }

    /// 网卡枚举是阻塞调用，放到 blocking 线程池执行
    async fn connection_address(&self, os: OsFamily) -> String {
        let address = match tokio::task::spawn_blocking(network::locate_lan_ipv4).await {
            Ok(address) => address,
            Err(e) => {
                warn!("检测本机 IP 地址的任务失败: {}", e);
                net_consts::LOCALHOST_IPV4.to_string()
            }
        };
        if network::is_fallback_address(&address) {
            warn!("未找到局域网地址，连接地址仅在本机可用");
        }
        network::connection_url(&address, &self.share_name, os)
    }

    fn fail(&self, message: impl Into<String>) {
        self.state.transition(NasPhase::Error, message);
    }
}

fn log_permission_fix() {
    error!("--- DOCKER PERMISSION ERROR DETECTED ---");
    error!("Docker is installed but you don't have permission to use it.");
    for step in PERMISSION_FIX_STEPS {
        error!("{}", step);
    }
    error!("The group changes only take effect after you log back in!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutcome;
    use crate::command::testing::ScriptedRunner;
    use tempfile::{TempDir, tempdir};

    const ALL: &str = "docker ps -a --filter name=my-simple-nas --format {{.Names}}";
    const RUNNING: &str = "docker ps --filter name=my-simple-nas --format {{.Names}}";
    const UP: &str = "docker compose up -d";
    const DOWN: &str = "docker compose down";

    struct Fixture {
        runner: Arc<ScriptedRunner>,
        controller: NasController,
        work_dir: TempDir,
        share_dir: TempDir,
    }

    fn host(os_family: OsFamily) -> HostProfile {
        HostProfile {
            os_family,
            cpu_count: 8,
            total_ram_gb: 16.0,
            linux_distro: None,
        }
    }

    fn fixture(os_family: OsFamily) -> Fixture {
        let work_dir = tempdir().unwrap();
        let share_dir = tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new());

        let mut config = AppConfig::default();
        config.nas.work_dir = work_dir.path().to_string_lossy().to_string();

        let controller = NasController::new(runner.clone(), &config)
            .with_host_profile(host(os_family))
            .with_wait_policy(EngineWaitPolicy::new(
                Duration::from_millis(200),
                Duration::from_millis(10),
            ));

        Fixture {
            runner,
            controller,
            work_dir,
            share_dir,
        }
    }

    #[tokio::test]
    async fn test_start_without_folder_runs_nothing() {
        let f = fixture(OsFamily::Linux);

        let err = f.controller.start().await.unwrap_err();
        assert!(matches!(err, NasError::Validation(_)));
        assert!(f.runner.calls().is_empty());
        assert!(!f.work_dir.path().join("docker-compose.yml").exists());

        let snapshot = f.controller.snapshot();
        assert_eq!(
            snapshot.status_message,
            "Error: Please select a folder to share first."
        );
        assert_eq!(snapshot.phase, NasPhase::Stopped);
    }

    #[tokio::test]
    async fn test_start_recreates_running_container() {
        let f = fixture(OsFamily::Linux);
        f.runner
            .on(ALL, CommandOutcome::success("my-simple-nas\n"))
            .on(RUNNING, CommandOutcome::success("my-simple-nas\n"));
        f.controller.select_folder(f.share_dir.path()).unwrap();

        f.controller.start().await.unwrap();

        let stop = f.runner.position("docker stop my-simple-nas").unwrap();
        let rm = f.runner.position("docker rm my-simple-nas").unwrap();
        let up = f.runner.position(UP).unwrap();
        assert!(stop < rm && rm < up);

        let snapshot = f.controller.snapshot();
        assert_eq!(snapshot.phase, NasPhase::Running);
        assert!(snapshot.is_running);
        assert_eq!(snapshot.status_message, "NAS is RUNNING.");
        assert!(
            snapshot
                .connection_address
                .unwrap()
                .ends_with("/MyNasShare")
        );

        let compose = std::fs::read_to_string(f.work_dir.path().join("docker-compose.yml")).unwrap();
        assert!(compose.contains("cpus: \"2.0\""));
        assert!(compose.contains("mem_limit: \"3.0G\""));
    }

    #[tokio::test]
    async fn test_start_removes_stopped_container_without_stop() {
        let f = fixture(OsFamily::Linux);
        f.runner
            .on(ALL, CommandOutcome::success("my-simple-nas\n"))
            .on(RUNNING, CommandOutcome::success(""));
        f.controller.select_folder(f.share_dir.path()).unwrap();

        f.controller.start().await.unwrap();
        assert!(f.runner.position("docker stop my-simple-nas").is_none());
        assert!(f.runner.position("docker rm my-simple-nas").unwrap() < f.runner.position(UP).unwrap());
    }

    #[tokio::test]
    async fn test_linux_permission_denied_is_terminal() {
        let f = fixture(OsFamily::Linux);
        f.runner.on(
            "docker ps",
            CommandOutcome::failure(1, "Got Permission Denied while trying to connect"),
        );
        f.controller.select_folder(f.share_dir.path()).unwrap();

        let err = f.controller.start().await.unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(f.runner.calls(), vec!["docker ps"]);

        let snapshot = f.controller.snapshot();
        assert_eq!(snapshot.phase, NasPhase::Error);
        assert!(snapshot.status_message.contains("permission denied"));
    }

    #[tokio::test]
    async fn test_linux_engine_down() {
        let f = fixture(OsFamily::Linux);
        f.runner
            .on("docker ps", CommandOutcome::failure(1, "Cannot connect to the Docker daemon"));
        f.controller.select_folder(f.share_dir.path()).unwrap();

        let err = f.controller.start().await.unwrap_err();
        assert!(matches!(err, NasError::EngineNotRunning(_)));
        assert!(f
            .controller
            .snapshot()
            .status_message
            .contains("sudo systemctl start docker"));
        assert!(f.runner.launches().is_empty());
    }

    #[tokio::test]
    async fn test_windows_starts_desktop_and_polls_until_ready() {
        let f = fixture(OsFamily::Windows);
        let exe = f.work_dir.path().join("Docker Desktop.exe");
        std::fs::write(&exe, b"").unwrap();
        let controller = f.controller.with_desktop_executable(&exe);

        f.runner
            .on("docker ps", CommandOutcome::failure(1, "error during connect"))
            .on("docker ps", CommandOutcome::failure(1, "error during connect"))
            .on("docker ps", CommandOutcome::success("CONTAINER ID"));
        controller.select_folder(f.share_dir.path()).unwrap();

        controller.start().await.unwrap();
        assert_eq!(f.runner.launches(), vec![exe]);
        let ps_calls = f.runner.calls().iter().filter(|c| *c == "docker ps").count();
        assert_eq!(ps_calls, 3);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, NasPhase::Running);
        assert!(snapshot.connection_address.unwrap().starts_with(r"\\"));
    }

    #[tokio::test]
    async fn test_windows_engine_never_ready() {
        let f = fixture(OsFamily::Windows);
        let exe = f.work_dir.path().join("Docker Desktop.exe");
        std::fs::write(&exe, b"").unwrap();
        let controller = f.controller.with_desktop_executable(&exe);

        f.runner
            .on("docker ps", CommandOutcome::failure(1, "error during connect"));
        controller.select_folder(f.share_dir.path()).unwrap();

        let err = controller.start().await.unwrap_err();
        assert!(matches!(err, NasError::EngineNotRunning(_)));
        assert!(f.runner.position(UP).is_none());
        assert_eq!(
            controller.snapshot().status_message,
            "Error: Docker Desktop started but failed to connect. Please check Docker Desktop."
        );
    }

    #[tokio::test]
    async fn test_windows_desktop_missing_marks_not_installed() {
        let f = fixture(OsFamily::Windows);
        let controller = f
            .controller
            .with_desktop_executable(f.work_dir.path().join("missing.exe"));
        f.runner
            .on("docker ps", CommandOutcome::failure(1, "error during connect"));
        controller.select_folder(f.share_dir.path()).unwrap();

        let err = controller.start().await.unwrap_err();
        assert!(matches!(err, NasError::DockerDesktopNotFound(_)));

        let snapshot = controller.snapshot();
        assert!(!snapshot.docker_installed);
        assert_eq!(
            snapshot.status_message,
            "Error: Docker Desktop is not installed. Please install it first."
        );
    }

    #[tokio::test]
    async fn test_compose_up_failure_preserves_stderr() {
        let f = fixture(OsFamily::Linux);
        f.runner
            .on(UP, CommandOutcome::failure(1, "port 445 already in use\n"));
        f.controller.select_folder(f.share_dir.path()).unwrap();

        let err = f.controller.start().await.unwrap_err();
        assert!(matches!(err, NasError::Command { exit_code: 1, .. }));

        let snapshot = f.controller.snapshot();
        assert_eq!(snapshot.phase, NasPhase::Error);
        assert_eq!(snapshot.status_message, "Error: port 445 already in use");
        assert!(!snapshot.is_running);
    }

    #[tokio::test]
    async fn test_compose_up_permission_denied() {
        let f = fixture(OsFamily::Linux);
        f.runner.on(
            UP,
            CommandOutcome::failure(1, "permission denied while trying to connect to the Docker daemon socket"),
        );
        f.controller.select_folder(f.share_dir.path()).unwrap();

        let err = f.controller.start().await.unwrap_err();
        assert!(err.is_permission_denied());
        assert!(matches!(
            &err,
            NasError::PermissionDenied { stderr } if stderr.contains("Docker daemon socket")
        ));

        let snapshot = f.controller.snapshot();
        assert_eq!(snapshot.phase, NasPhase::Error);
        assert_eq!(
            snapshot.status_message,
            "Error: Docker permission denied. See logs."
        );
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.connection_address, None);
    }

    #[tokio::test]
    async fn test_second_start_recreates_container() {
        let f = fixture(OsFamily::Linux);
        f.runner
            .on(ALL, CommandOutcome::success(""))
            .on(ALL, CommandOutcome::success("my-simple-nas\n"))
            .on(RUNNING, CommandOutcome::success("my-simple-nas\n"));
        f.controller.select_folder(f.share_dir.path()).unwrap();

        f.controller.start().await.unwrap();
        let first_up = f.runner.position(UP).unwrap();
        assert!(f.runner.position("docker stop my-simple-nas").is_none());
        assert!(f.runner.position("docker rm my-simple-nas").is_none());

        f.controller.start().await.unwrap();
        let calls = f.runner.calls();
        let after_first = |command: &str| {
            calls
                .iter()
                .skip(first_up + 1)
                .position(|c| c == command)
                .map(|i| i + first_up + 1)
                .unwrap()
        };
        let stop = after_first("docker stop my-simple-nas");
        let rm = after_first("docker rm my-simple-nas");
        let second_up = after_first(UP);
        assert!(first_up < stop && stop < rm && rm < second_up);
        assert_eq!(calls.iter().filter(|c| *c == UP).count(), 2);

        let snapshot = f.controller.snapshot();
        assert_eq!(snapshot.phase, NasPhase::Running);
        assert!(snapshot.is_running);
    }

    #[tokio::test]
    async fn test_connection_address_formats_per_os() {
        let linux = fixture(OsFamily::Linux);
        let address = linux.controller.connection_address(OsFamily::Linux).await;
        assert!(address.starts_with("smb://"));
        assert!(address.ends_with("/MyNasShare"));

        let windows = fixture(OsFamily::Windows);
        let address = windows.controller.connection_address(OsFamily::Windows).await;
        assert!(address.starts_with(r"\\"));
        assert!(address.ends_with(r"\MyNasShare"));
    }

    #[tokio::test]
    async fn test_stop_success_and_failure() {
        let f = fixture(OsFamily::Linux);
        f.controller.stop().await.unwrap();
        let snapshot = f.controller.snapshot();
        assert_eq!(snapshot.phase, NasPhase::Stopped);
        assert_eq!(snapshot.status_message, "NAS is Stopped.");
        assert_eq!(f.runner.calls(), vec![DOWN]);

        let f = fixture(OsFamily::Linux);
        f.runner.on(DOWN, CommandOutcome::failure(1, "no such service"));
        assert!(f.controller.stop().await.is_err());
        assert_eq!(f.controller.snapshot().status_message, "Error: no such service");
    }

    #[tokio::test]
    async fn test_concurrent_operation_is_busy() {
        let f = fixture(OsFamily::Linux);
        let _held = f.controller.op_lock.lock().await;

        assert!(matches!(f.controller.stop().await, Err(NasError::Busy)));
        assert!(matches!(f.controller.start().await, Err(NasError::Busy)));
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_install_docker_sets_installed() {
        let f = fixture(OsFamily::Windows);
        f.runner.on(
            "winget install -e --id Docker.DockerDesktop --accept-package-agreements --accept-source-agreements",
            CommandOutcome::success("Successfully installed"),
        );

        f.controller.install_docker().await.unwrap();
        let snapshot = f.controller.snapshot();
        assert!(snapshot.docker_installed);
        assert!(snapshot.status_message.starts_with("Docker installed successfully!"));
    }

    #[tokio::test]
    async fn test_install_docker_non_windows_fails() {
        let f = fixture(OsFamily::Linux);
        let err = f.controller.install_docker().await.unwrap_err();
        assert!(matches!(err, NasError::Install(_)));
        assert!(f
            .controller
            .snapshot()
            .status_message
            .contains("only available on Windows"));
    }

    #[tokio::test]
    async fn test_initialize_syncs_running_container() {
        let f = fixture(OsFamily::Linux);
        f.runner
            .on("docker --version", CommandOutcome::success("Docker version 27.0.3"))
            .on(ALL, CommandOutcome::success("my-simple-nas\n"))
            .on(RUNNING, CommandOutcome::success("my-simple-nas\n"));

        let snapshot = f.controller.initialize().await;
        assert!(snapshot.docker_installed);
        assert!(snapshot.is_running);
        assert_eq!(snapshot.phase, NasPhase::Running);
        assert!(snapshot.can_stop());
    }

    #[tokio::test]
    async fn test_initialize_not_installed_message() {
        let f = fixture(OsFamily::Linux);
        f.runner
            .on("docker --version", CommandOutcome::launch_failure());

        let snapshot = f.controller.initialize().await;
        assert!(!snapshot.docker_installed);
        assert_eq!(
            snapshot.status_message,
            "Docker not detected. Please install Docker manually."
        );
        assert!(!snapshot.can_install_docker());
    }

    #[tokio::test]
    async fn test_folder_persisted_and_restored() {
        let f = fixture(OsFamily::Linux);
        let settings_dir = tempdir().unwrap();
        let store = SettingsStore::new(settings_dir.path().join("settings.json"));
        let controller = f.controller.with_settings(store.clone());

        controller.select_folder(f.share_dir.path()).unwrap();
        assert_eq!(
            store.load().last_folder,
            Some(f.share_dir.path().to_path_buf())
        );

        let mut config = AppConfig::default();
        config.nas.work_dir = f.work_dir.path().to_string_lossy().to_string();
        let restored = NasController::new(f.runner.clone(), &config)
            .with_host_profile(host(OsFamily::Linux))
            .with_settings(store);
        let snapshot = restored.initialize().await;
        assert_eq!(
            snapshot.selected_folder,
            Some(f.share_dir.path().to_path_buf())
        );
    }

    #[test]
    fn test_select_invalid_folder_rejected() {
        let f = fixture(OsFamily::Linux);
        let missing = f.share_dir.path().join("missing");
        assert!(f.controller.select_folder(&missing).is_err());
        assert_eq!(f.controller.snapshot().selected_folder, None);
    }
}
