// 模块声明
mod availability;
pub mod compose;
mod installer;

// 重新导出公共API
pub use availability::{
    ContainerPresence, DockerAvailability, DockerChecker, DockerFailureKind, classify_failure,
};
pub use compose::{ShareConfig, cpu_limit_for, memory_limit_for, write_service_definition};
pub use installer::{DockerDesktop, DockerInstaller, InstallStrategy, WINDOWS_STRATEGIES};
