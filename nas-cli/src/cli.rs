use crate::project_info::{metadata, version_info};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Anytime Anywhere NAS CLI - 在 Docker 中运行 Samba 共享
#[derive(Parser, Debug)]
#[command(name = "nas-cli")]
#[command(about = metadata::PROJECT_DESCRIPTION)]
#[command(version = version_info::CLI_VERSION)]
#[command(long_about = metadata::display::DESCRIPTION_LONG)]
#[command(author = metadata::PROJECT_AUTHORS)]
pub struct Cli {
    /// 配置文件路径（默认依次查找 config.toml、nas.toml、.nas.toml）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// 生成默认配置文件和日志目录
    Init {
        /// 如果配置文件已存在，强制覆盖
        #[arg(long)]
        force: bool,
    },
    /// 显示主机信息、Docker 状态和 NAS 状态
    Status {
        /// 以 JSON 格式输出状态快照
        #[arg(long)]
        json: bool,
    },
    /// 自动安装 Docker Desktop（仅 Windows）
    InstallDocker,
    /// 启动 NAS（已在运行时会重建容器）
    Start {
        /// 要共享的目录，不指定时使用上次选择的目录
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// 停止 NAS
    Stop,
    /// 显示共享连接地址
    Address,
    /// 选择并保存要共享的目录
    SelectFolder {
        /// 目录路径
        folder: PathBuf,
    },
}
