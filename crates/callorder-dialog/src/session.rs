//! Call sessions and the per-call serialized session store.
//!
//! The store maps call ids to individually locked sessions. The outer map
//! lock is only held for the lookup; each turn then holds the session's own
//! async lock, so overlapping deliveries for one call are serialized while
//! unrelated calls never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use callorder_core::catalog::{MenuItem, MenuOption};
use callorder_core::order::{OrderLine, SelectedOption};

use crate::error::DialogError;
use crate::stage::Stage;

/// The item being configured or confirmed before it joins the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    pub item: MenuItem,
    pub options: Vec<SelectedOption>,
    /// Index of the option currently being asked about.
    pub option_index: usize,
}

impl PendingItem {
    pub fn new(item: MenuItem) -> Self {
        Self {
            item,
            options: Vec::new(),
            option_index: 0,
        }
    }

    /// The option the caller is currently choosing, if any remain.
    pub fn current_option(&self) -> Option<&MenuOption> {
        self.item.options.get(self.option_index)
    }

    /// "{name}" or "{name} with {choice}, {choice}".
    pub fn describe(&self) -> String {
        OrderLine::new(self.item.clone(), self.options.clone()).describe()
    }

    pub fn into_line(self) -> OrderLine {
        OrderLine::new(self.item, self.options)
    }
}

/// Everything the engine knows about one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    pub call_id: String,
    pub stage: Stage,
    pub catalog_id: String,
    /// Confirmed cart, in the order items were added.
    pub current_order: Vec<OrderLine>,
    pub pending: Option<PendingItem>,
    /// Consecutive empty turns.
    pub silence_count: u32,
}

impl CallSession {
    pub fn new(call_id: impl Into<String>, catalog_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            stage: Stage::Init,
            catalog_id: catalog_id.into(),
            current_order: Vec::new(),
            pending: None,
            silence_count: 0,
        }
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }
}

type SessionSlot = Arc<AsyncMutex<CallSession>>;

/// Process-wide store holding one session per active call.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the session for `call_id`, creating it in `Init` if
    /// absent. An existing session is returned unchanged.
    pub async fn get_or_create(
        &self,
        call_id: &str,
        catalog_id: &str,
    ) -> Result<CallSession, DialogError> {
        let slot = self.slot(call_id, catalog_id)?;
        let session = slot.lock().await;
        Ok(session.clone())
    }

    /// Upsert a session by its call id.
    ///
    /// Waits for any turn currently holding the call's lock. Must not be
    /// called while the caller itself holds that lock.
    pub async fn save(&self, session: CallSession) -> Result<(), DialogError> {
        let slot = self.slot(&session.call_id, &session.catalog_id)?;
        let mut stored = slot.lock().await;
        *stored = session;
        Ok(())
    }

    /// Take exclusive access to the session for `call_id` for one turn,
    /// creating it if absent.
    pub async fn lock(
        &self,
        call_id: &str,
        catalog_id: &str,
    ) -> Result<OwnedMutexGuard<CallSession>, DialogError> {
        let slot = self.slot(call_id, catalog_id)?;
        Ok(slot.lock_owned().await)
    }

    /// Drop a session. Returns `true` if it existed.
    pub fn remove(&self, call_id: &str) -> Result<bool, DialogError> {
        let mut sessions = self.map()?;
        Ok(sessions.remove(call_id).is_some())
    }

    pub fn len(&self) -> Result<usize, DialogError> {
        Ok(self.map()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, DialogError> {
        Ok(self.map()?.is_empty())
    }

    fn slot(&self, call_id: &str, catalog_id: &str) -> Result<SessionSlot, DialogError> {
        let mut sessions = self.map()?;
        let slot = sessions.entry(call_id.to_string()).or_insert_with(|| {
            tracing::debug!(call_id = %call_id, catalog_id = %catalog_id, "Session created");
            Arc::new(AsyncMutex::new(CallSession::new(call_id, catalog_id)))
        });
        Ok(Arc::clone(slot))
    }

    fn map(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, SessionSlot>>, DialogError> {
        self.sessions
            .lock()
            .map_err(|e| DialogError::LockPoisoned(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn item_with_options(n: usize) -> MenuItem {
        MenuItem {
            id: "10".to_string(),
            name: "Dumplings".to_string(),
            price: 9.5,
            category: "Appetizers".to_string(),
            description: String::new(),
            options: (0..n)
                .map(|i| MenuOption {
                    name: format!("Option {}", i),
                    choices: vec![callorder_core::catalog::OptionChoice {
                        id: "1".to_string(),
                        name: "Plain".to_string(),
                        price_extra: 0.0,
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let session = CallSession::new("CA1", "lanzhou");
        assert_eq!(session.stage, Stage::Init);
        assert!(session.current_order.is_empty());
        assert!(session.pending.is_none());
        assert_eq!(session.silence_count, 0);
    }

    #[test]
    fn test_pending_item_option_walk() {
        let mut pending = PendingItem::new(item_with_options(2));
        assert_eq!(pending.current_option().unwrap().name, "Option 0");
        pending.option_index += 1;
        assert_eq!(pending.current_option().unwrap().name, "Option 1");
        pending.option_index += 1;
        assert!(pending.current_option().is_none());
    }

    #[test]
    fn test_pending_item_into_line() {
        let mut pending = PendingItem::new(item_with_options(1));
        pending.options.push(SelectedOption {
            option_name: "Option 0".to_string(),
            choice_name: "Plain".to_string(),
            price_extra: 0.5,
        });
        assert_eq!(pending.describe(), "Dumplings with Plain");
        let line = pending.into_line();
        assert!((line.total() - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_get_or_create_twice_is_equivalent() {
        let store = SessionStore::new();
        let first = store.get_or_create("CA1", "lanzhou").await.unwrap();
        let second = store.get_or_create("CA1", "lanzhou").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.stage, Stage::Init);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing_unchanged() {
        let store = SessionStore::new();
        let mut session = store.get_or_create("CA1", "lanzhou").await.unwrap();
        session.stage = Stage::AskAddMore;
        session.silence_count = 2;
        store.save(session.clone()).await.unwrap();

        let loaded = store.get_or_create("CA1", "other-catalog").await.unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.catalog_id, "lanzhou");
    }

    #[tokio::test]
    async fn test_save_upserts_unknown_call() {
        let store = SessionStore::new();
        let mut session = CallSession::new("CA9", "wok");
        session.stage = Stage::OrderingId;
        store.save(session).await.unwrap();
        assert_eq!(store.len().unwrap(), 1);
        let loaded = store.get_or_create("CA9", "wok").await.unwrap();
        assert_eq!(loaded.stage, Stage::OrderingId);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SessionStore::new();
        store.get_or_create("CA1", "lanzhou").await.unwrap();
        assert!(store.remove("CA1").unwrap());
        assert!(!store.remove("CA1").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_poisoned_map_is_reported() {
        let store = Arc::new(SessionStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.lock().unwrap();
            panic!("poison the session map");
        })
        .join();

        assert!(matches!(store.len(), Err(DialogError::LockPoisoned(_))));
        assert!(matches!(store.is_empty(), Err(DialogError::LockPoisoned(_))));
        assert!(matches!(store.remove("CA1"), Err(DialogError::LockPoisoned(_))));
    }

    #[tokio::test]
    async fn test_lock_serializes_same_call() {
        let store = Arc::new(SessionStore::new());
        let guard = store.lock("CA1", "lanzhou").await.unwrap();

        let contender = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut session = store.lock("CA1", "lanzhou").await.unwrap();
                session.silence_count += 1;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        drop(guard);
        contender.await.unwrap();

        let session = store.get_or_create("CA1", "lanzhou").await.unwrap();
        assert_eq!(session.silence_count, 1);
    }

    #[tokio::test]
    async fn test_lock_does_not_block_other_calls() {
        let store = SessionStore::new();
        let _held = store.lock("CA1", "lanzhou").await.unwrap();
        let other = tokio::time::timeout(Duration::from_millis(100), store.lock("CA2", "lanzhou"))
            .await
            .expect("unrelated call must not wait")
            .unwrap();
        assert_eq!(other.call_id, "CA2");
    }

    #[tokio::test]
    async fn test_concurrent_turns_do_not_lose_updates() {
        let store = Arc::new(SessionStore::new());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let mut session = store.lock("CA1", "lanzhou").await.unwrap();
                let seen = session.silence_count;
                tokio::task::yield_now().await;
                session.silence_count = seen + 1;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let session = store.get_or_create("CA1", "lanzhou").await.unwrap();
        assert_eq!(session.silence_count, 50);
    }
}
