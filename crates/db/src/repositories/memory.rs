use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use kudos_core::domain::Win;

use super::{RepositoryError, WinRepository};

#[derive(Default)]
pub struct InMemoryWinRepository {
    wins: RwLock<HashMap<String, Win>>,
}

#[async_trait::async_trait]
impl WinRepository for InMemoryWinRepository {
    async fn save(&self, win: Win) -> Result<(), RepositoryError> {
        let mut wins = self.wins.write().await;
        wins.insert(win.id.0.clone(), win);
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<Win>, RepositoryError> {
        let now = Utc::now();
        let wins = self.wins.read().await;
        Ok(wins.values().filter(|win| !win.is_expired(now)).cloned().collect())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut wins = self.wins.write().await;
        let before = wins.len();
        wins.retain(|_, win| !win.is_expired(now));
        Ok((before - wins.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use kudos_core::domain::{Win, WinId, WinSubmission};

    use super::InMemoryWinRepository;
    use crate::repositories::WinRepository;

    #[tokio::test]
    async fn in_memory_win_repo_round_trip() {
        let repo = InMemoryWinRepository::default();
        let win = Win::submit(
            WinSubmission {
                user_id: "U1".to_owned(),
                user_name: "alice".to_owned(),
                who: "Bob".to_owned(),
                title: "Shipped feature".to_owned(),
                description: String::new(),
            },
            Utc::now(),
        )
        .expect("submit");

        repo.save(win.clone()).await.expect("save win");
        let found = repo.scan_all().await.expect("scan wins");

        assert_eq!(found, vec![win]);
    }

    #[tokio::test]
    async fn in_memory_scan_and_sweep_honor_expiry() {
        let repo = InMemoryWinRepository::default();
        let created = Utc::now() - Duration::days(8);
        repo.save(Win {
            id: WinId("expired-1".to_owned()),
            user_id: "U2".to_owned(),
            user_name: "bob".to_owned(),
            who: "Carol".to_owned(),
            title: "Old win".to_owned(),
            description: "Big WIN!".to_owned(),
            created_at: created,
            updated_at: created,
            expires_at: created + Duration::days(7),
        })
        .await
        .expect("save expired");

        assert!(repo.scan_all().await.expect("scan").is_empty());
        assert_eq!(repo.delete_expired(Utc::now()).await.expect("sweep"), 1);
        assert_eq!(repo.delete_expired(Utc::now()).await.expect("second sweep"), 0);
    }
}
