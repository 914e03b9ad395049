use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::auth::capability::Scope;
use crate::database::store::{ConsoleStore, Counter};

/// Buffered counts per subscriber; a slow client only delays its own watcher
const FEED_BUFFER: usize = 8;

/// Live unread-inquiry count for one subscriber
pub struct UnreadFeed {
    pub counts: mpsc::Receiver<i64>,
    pub handle: JoinHandle<()>,
}

/// Spawn a watcher that sends the current unread count, then re-reads and
/// sends it after every change notification. Notifications carry no payload
/// so duplicates or reordering only cost an extra read.
///
/// The watcher stops when the receiving side is dropped or the change feed
/// ends. `changes` should be subscribed before calling so that nothing
/// between the initial read and the first notification is missed.
pub fn spawn_unread_watcher(
    store: Arc<dyn ConsoleStore>,
    scope: Scope,
    mut changes: BoxStream<'static, ()>,
) -> UnreadFeed {
    let (tx, counts) = mpsc::channel(FEED_BUFFER);

    let handle = tokio::spawn(async move {
        if !push_count(store.as_ref(), scope, &tx).await {
            return;
        }
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                next = changes.next() => match next {
                    Some(()) => {
                        if !push_count(store.as_ref(), scope, &tx).await {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("Inquiry change feed ended");
                        break;
                    }
                },
            }
        }
        tracing::debug!("Unread watcher stopped");
    });

    UnreadFeed { counts, handle }
}

/// False once the subscriber is gone
async fn push_count(store: &dyn ConsoleStore, scope: Scope, tx: &mpsc::Sender<i64>) -> bool {
    match store.count(Counter::UnreadInquiries, scope).await {
        Ok(count) => tx.send(count).await.is_ok(),
        Err(e) => {
            // Keep watching; the next notification retries the read
            tracing::warn!("Failed to refresh unread count: {}", e);
            !tx.is_closed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Inquiry;
    use crate::database::MemoryStore;
    use std::time::Duration;
    use uuid::Uuid;

    fn unread(church: Uuid) -> Inquiry {
        Inquiry {
            id: Uuid::new_v4(),
            title: "주차 문의".into(),
            content: None,
            status: "open".into(),
            is_admin_unread: true,
            user_id: None,
            church_id: Some(church),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn pushes_initial_and_changed_counts() {
        let store = Arc::new(MemoryStore::new());
        let church = Uuid::new_v4();
        let scope = Scope { church_id: Some(church), department_id: None };

        let changes = store.subscribe_inquiry_changes().await.unwrap();
        let mut feed = spawn_unread_watcher(store.clone(), scope, changes);
        assert_eq!(feed.counts.recv().await, Some(0));

        store.insert_inquiry(unread(church)).await;
        assert_eq!(feed.counts.recv().await, Some(1));

        // Other churches still trigger a re-read, but the count is unchanged
        store.insert_inquiry(unread(Uuid::new_v4())).await;
        assert_eq!(feed.counts.recv().await, Some(1));
    }

    #[tokio::test]
    async fn watcher_exits_when_subscriber_drops() {
        let store = Arc::new(MemoryStore::new());
        let changes = store.subscribe_inquiry_changes().await.unwrap();
        let UnreadFeed { counts, handle } =
            spawn_unread_watcher(store.clone(), Scope::default(), changes);

        drop(counts);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("watcher should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn watcher_exits_when_feed_ends() {
        let store = Arc::new(MemoryStore::new());
        let changes = futures::stream::empty().boxed();
        let mut feed = spawn_unread_watcher(store, Scope::default(), changes);

        assert_eq!(feed.counts.recv().await, Some(0));
        assert_eq!(feed.counts.recv().await, None);
        feed.handle.await.unwrap();
    }
}
