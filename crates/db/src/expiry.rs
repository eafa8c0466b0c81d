use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::repositories::WinRepository;

/// Spawns the background sweep that removes expired wins, standing in for
/// the managed store's own time-to-live removal. Scans already exclude
/// expired rows, so the sweep only reclaims space and may lag arbitrarily.
pub fn spawn_sweeper(repo: Arc<dyn WinRepository>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match repo.delete_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(swept) => {
                    info!(
                        event_name = "store.expiry.swept",
                        swept_count = swept,
                        "removed expired wins"
                    );
                }
                Err(error) => {
                    warn!(
                        event_name = "store.expiry.sweep_failed",
                        error = %error,
                        "expiry sweep failed; will retry on next tick"
                    );
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;

    use kudos_core::domain::{Win, WinId};

    use super::spawn_sweeper;
    use crate::repositories::{InMemoryWinRepository, WinRepository};

    #[tokio::test]
    async fn sweeper_removes_expired_rows_on_first_tick() {
        let repo = Arc::new(InMemoryWinRepository::default());
        let created = Utc::now() - chrono::Duration::days(8);
        repo.save(Win {
            id: WinId("expired-1".to_owned()),
            user_id: "U1".to_owned(),
            user_name: "alice".to_owned(),
            who: "Bob".to_owned(),
            title: "Old win".to_owned(),
            description: "Big WIN!".to_owned(),
            created_at: created,
            updated_at: created,
            expires_at: created + chrono::Duration::days(7),
        })
        .await
        .expect("save expired");

        let handle = spawn_sweeper(repo.clone(), Duration::from_secs(60));
        // Let the runtime park so the timer driver can fire the sweeper's
        // first tick; a yield_now loop never parks and so never advances it.
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(repo.delete_expired(Utc::now()).await.expect("manual sweep"), 0);
        handle.abort();
    }
}
