mod docker;
mod nas;
mod status;

use nas_core::nas::NasController;
use std::future::Future;
use tracing::info;

// Status commands
pub use status::{run_address, run_status, show_client_version};

// Docker commands
pub use docker::run_install_docker;

// NAS commands
pub use nas::{run_select_folder, run_start, run_stop};

/// 执行长时间操作，同时把控制器发布的状态变化实时打印出来
pub(crate) async fn follow_status<F, T>(controller: &NasController, operation: F) -> T
where
    F: Future<Output = T>,
{
    let mut rx = controller.subscribe();
    tokio::pin!(operation);

    loop {
        tokio::select! {
            result = &mut operation => {
                if rx.has_changed().unwrap_or(false) {
                    info!("📣 {}", rx.borrow_and_update().status_message);
                }
                return result;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    return (&mut operation).await;
                }
                info!("📣 {}", rx.borrow_and_update().status_message);
            }
        }
    }
}
