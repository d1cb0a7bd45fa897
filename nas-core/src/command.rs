use crate::{NasError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// 进程无法启动时的固定错误输出
pub const LAUNCH_FAILURE_MESSAGE: &str = "process failed to start";

/// 外部命令的执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutcome {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// 成功结果（exit 0）
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(stdout, "", 0)
    }

    /// 失败结果
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::new("", stderr, exit_code)
    }

    /// 进程未能启动
    pub fn launch_failure() -> Self {
        Self::failure(-1, LAUNCH_FAILURE_MESSAGE)
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// 是否为"进程未能启动"（通常意味着程序不存在）
    pub fn is_launch_failure(&self) -> bool {
        self.exit_code == -1 && self.stderr == LAUNCH_FAILURE_MESSAGE
    }
}

/// 外部命令执行器
///
/// 非零退出码与程序不存在都不会返回错误，而是体现在 [`CommandOutcome`] 中，
/// 由调用方根据结果决定下一步。
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 执行命令并等待结束，完整捕获 stdout/stderr
    async fn run(&self, program: &str, args: &[&str]) -> CommandOutcome;

    /// 以分离方式启动图形程序，不等待其退出
    async fn launch(&self, executable: &Path) -> Result<()>;
}

/// 基于 tokio::process 的命令执行器
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner {
    working_dir: Option<PathBuf>,
}

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有命令在指定目录下执行（docker compose 依赖当前目录查找 compose 文件）
    pub fn with_working_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> CommandOutcome {
        let command_line = format!("{} {}", program, args.join(" "));
        info!("执行命令: {}", command_line);

        let resolved = match which::which(program) {
            Ok(path) => path,
            Err(e) => {
                error!("进程启动失败: {} ({})", command_line, e);
                return CommandOutcome::launch_failure();
            }
        };

        let mut cmd = Command::new(resolved);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => {
                error!("进程启动失败: {} ({})", command_line, e);
                return CommandOutcome::launch_failure();
            }
        };

        let outcome = CommandOutcome {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            // 被信号终止时没有退出码
            exit_code: output.status.code().unwrap_or(-1),
        };

        if outcome.succeeded() {
            info!("命令执行成功: {}", command_line);
            debug!("命令输出: {}", outcome.stdout.trim());
        } else {
            warn!(
                "命令执行失败，退出码 {}: {}",
                outcome.exit_code, command_line
            );
            debug!("命令错误输出: {}", outcome.stderr.trim());
        }

        outcome
    }

    async fn launch(&self, executable: &Path) -> Result<()> {
        info!("启动程序: {}", executable.display());

        // 使用 std::process 以便子进程在父进程退出后继续运行
        let child = std::process::Command::new(executable)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                error!("程序启动失败 {}: {}", executable.display(), e);
                NasError::custom(format!("无法启动 {}: {}", executable.display(), e))
            })?;

        info!("程序已启动 (pid {})", child.id());
        Ok(())
    }
}

/// 测试用的脚本化执行器：按命令行返回预设结果并记录调用顺序
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        scripts: Mutex<HashMap<String, VecDeque<CommandOutcome>>>,
        calls: Mutex<Vec<String>>,
        launches: Mutex<Vec<PathBuf>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// 为某条命令行追加一个结果；队列只剩最后一个结果时会重复返回它
        pub(crate) fn on(&self, command_line: &str, outcome: CommandOutcome) -> &Self {
            self.scripts
                .lock()
                .unwrap()
                .entry(command_line.to_string())
                .or_default()
                .push_back(outcome);
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn launches(&self) -> Vec<PathBuf> {
            self.launches.lock().unwrap().clone()
        }

        pub(crate) fn position(&self, command_line: &str) -> Option<usize> {
            self.calls().iter().position(|c| c == command_line)
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, program: &str, args: &[&str]) -> CommandOutcome {
            let command_line = if args.is_empty() {
                program.to_string()
            } else {
                format!("{} {}", program, args.join(" "))
            };
            self.calls.lock().unwrap().push(command_line.clone());

            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(&command_line) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
                Some(queue) => queue.front().cloned().unwrap_or_default(),
                None => CommandOutcome::success(""),
            }
        }

        async fn launch(&self, executable: &Path) -> Result<()> {
            self.launches
                .lock()
                .unwrap()
                .push(executable.to_path_buf());
            Ok(())
        }
    }
}
