use crate::host::{HostProfile, OsFamily};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::watch;

/// NAS 运行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NasPhase {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

impl fmt::Display for NasPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NasPhase::Stopped => "stopped",
            NasPhase::Starting => "starting",
            NasPhase::Running => "running",
            NasPhase::Stopping => "stopping",
            NasPhase::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// 对外发布的状态快照
#[derive(Debug, Clone, Serialize)]
pub struct NasSnapshot {
    pub phase: NasPhase,
    pub is_running: bool,
    pub docker_installed: bool,
    pub status_message: String,
    /// 仅在运行中时有值
    pub connection_address: Option<String>,
    pub selected_folder: Option<PathBuf>,
    pub host: Option<HostProfile>,
    pub updated_at: DateTime<Local>,
}

impl Default for NasSnapshot {
    fn default() -> Self {
        Self {
            phase: NasPhase::Stopped,
            is_running: false,
            docker_installed: false,
            status_message: "NAS is Stopped.".to_string(),
            connection_address: None,
            selected_folder: None,
            host: None,
            updated_at: Local::now(),
        }
    }
}

impl NasSnapshot {
    /// 自动安装仅在 Windows 上提供
    pub fn can_install_docker(&self) -> bool {
        !self.docker_installed
            && self
                .host
                .as_ref()
                .is_some_and(|host| host.os_family == OsFamily::Windows)
    }

    pub fn can_start(&self) -> bool {
        !self.is_running && self.docker_installed
    }

    pub fn can_stop(&self) -> bool {
        self.is_running
    }
}

/// 控制器持有的可变状态，观察者只能拿到快照
#[derive(Debug)]
pub(crate) struct NasState {
    tx: watch::Sender<NasSnapshot>,
}

impl NasState {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(NasSnapshot::default());
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<NasSnapshot> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> NasSnapshot {
        self.tx.borrow().clone()
    }

    /// 修改状态并通知所有观察者（没有观察者时同样生效）
    pub(crate) fn update<F: FnOnce(&mut NasSnapshot)>(&self, modify: F) {
        self.tx.send_modify(|snapshot| {
            modify(snapshot);
            snapshot.updated_at = Local::now();
        });
    }

    pub(crate) fn set_status(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|s| s.status_message = message);
    }

    pub(crate) fn transition(&self, phase: NasPhase, message: impl Into<String>) {
        let message = message.into();
        self.update(|s| {
            s.phase = phase;
            s.status_message = message;
        });
    }
}
