/// NAS CLI 项目信息模块
///
/// nas-cli 是面向用户的主程序，项目元数据统一在这里定义；
/// nas-core 作为内部库，只提供技术性常量

/// 项目元数据（自动从 nas-cli 的 Cargo.toml 同步）
pub mod metadata {
    /// 项目描述（自动从 Cargo.toml 同步）
    pub const PROJECT_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    /// 项目作者（自动从 Cargo.toml 同步）
    pub const PROJECT_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    /// 项目许可证（自动从 Cargo.toml 同步）
    pub const PROJECT_LICENSE: &str = env!("CARGO_PKG_LICENSE");

    /// 项目仓库地址（自动从 Cargo.toml 同步）
    pub const PROJECT_REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

    /// 用户友好的显示名称（手动维护，用于 UI 显示）
    pub mod display {
        /// 用户友好的项目名称
        pub const FRIENDLY_NAME: &str = "Anytime Anywhere NAS";

        /// 项目详细描述（比 Cargo.toml 中的描述更详细）
        pub const DESCRIPTION_LONG: &str = "检测主机环境，按需安装 Docker，并通过 docker compose 运行一个 Samba 共享容器，把本机目录共享到局域网";
    }
}

/// 版本信息
pub mod version_info {
    /// CLI 版本（自动从 Cargo.toml 同步）
    pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// 核心库版本（从 nas-core 获取）
    pub const CORE_VERSION: &str = nas_core::constants::version::CORE_VERSION;
}

/// 获取版本信息字符串
pub fn get_version_string() -> String {
    format!(
        "{} v{} (core v{})",
        metadata::display::FRIENDLY_NAME,
        version_info::CLI_VERSION,
        version_info::CORE_VERSION
    )
}

/// 获取作者和许可证信息
pub fn get_copyright_info() -> String {
    format!(
        "© {} - Licensed under {} - {}",
        metadata::PROJECT_AUTHORS,
        metadata::PROJECT_LICENSE,
        metadata::PROJECT_REPOSITORY
    )
}
