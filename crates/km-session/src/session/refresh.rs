use crate::SessionManager;

use std::sync::Weak;
use std::time::Duration;

use log::debug;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Periodic refresh check. Ends when the manager is dropped or a refresh fails.
pub(crate) async fn run(manager: Weak<SessionManager>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let Some(manager) = manager.upgrade() else {
            break;
        };
        if manager.refresh_if_needed().await.is_err() {
            break;
        }
    }

    debug!("Refresh timer stopped");
}
