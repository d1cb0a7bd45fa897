use clap::Parser;
use nas_cli::{Cli, CliApp, Commands, load_config, run_init, setup_logging};
use nas_core::constants::logging;
use tracing::error;

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let cli = Cli::parse();

    // 日志目录来自配置文件，因此先加载配置再初始化日志
    let config = load_config(cli.config.as_deref());
    let log_dir = match &config {
        Ok(config) => config.log_dir(),
        Err(_) => logging::get_log_dir(),
    };
    let _log_guard = setup_logging(cli.verbose, &log_dir);

    // `init` 命令是特例，它不依赖已有配置
    if let Commands::Init { force } = cli.command {
        if let Err(e) = run_init(force, cli.config.as_deref()).await {
            error!("❌ 初始化失败: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("❌ 配置文件加载失败: {}", e);
            error!("👉 请检查配置文件格式，或运行 'nas-cli init --force' 重新生成。");
            std::process::exit(1);
        }
    };

    // 运行命令
    let app = CliApp::new(config);
    if let Err(e) = app.run(cli.command).await {
        error!("❌ 操作失败: {}", e);
        std::process::exit(1);
    }
}
