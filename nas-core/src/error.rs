use thiserror::Error;

pub type Result<T> = std::result::Result<T, NasError>;

#[derive(Error, Debug)]
pub enum NasError {
    #[error("配置错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Compose 文件校验失败: {0}")]
    Compose(String),

    #[error("{0}")]
    Validation(String),

    #[error("Docker 权限不足: {stderr}")]
    PermissionDenied { stderr: String },

    #[error("Docker 引擎未运行: {0}")]
    EngineNotRunning(String),

    #[error("未找到 Docker Desktop: {0}")]
    DockerDesktopNotFound(String),

    #[error("Docker 未安装: {0}")]
    DockerNotInstalled(String),

    #[error("命令执行失败 (exit {exit_code}): {stderr}")]
    Command { exit_code: i32, stderr: String },

    #[error("Docker 安装失败: {0}")]
    Install(String),

    #[error("另一个操作正在进行中")]
    Busy,

    #[error("自定义错误: {0}")]
    Custom(String),
}

impl NasError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn compose(msg: impl Into<String>) -> Self {
        Self::Compose(msg.into())
    }

    pub fn command(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::Command {
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn permission_denied(stderr: impl Into<String>) -> Self {
        Self::PermissionDenied {
            stderr: stderr.into(),
        }
    }

    /// 是否为权限类错误（用于展示修复提示）
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, NasError::PermissionDenied { .. })
    }
}
