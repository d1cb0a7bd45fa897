// 模块声明
mod controller;
mod state;

// 重新导出公共API
pub use controller::{EngineWaitPolicy, NasController};
pub use state::{NasPhase, NasSnapshot};
