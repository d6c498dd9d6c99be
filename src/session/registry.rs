use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use super::{Session, ViewScope};

pub type SessionHandle = Arc<Mutex<Session>>;

struct Entry {
    session: SessionHandle,
    // Копия области сессии: отмена без захвата блокировки сессии.
    scope: ViewScope,
    in_flight: Arc<AtomicUsize>,
}

impl Entry {
    fn has_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }
}

/// Запрос в upstream от имени сессии, пока её блокировка отпущена.
/// Пока отметка жива, сессия не считается простаивающей.
#[derive(Debug)]
pub struct InFlight {
    counter: Arc<AtomicUsize>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Открытые сессии BFF.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) -> (Uuid, SessionHandle) {
        let id = session.id();
        let scope = session.scope().clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(
            id,
            Entry {
                session: handle.clone(),
                scope,
                in_flight: Arc::new(AtomicUsize::new(0)),
            },
        );
        (id, handle)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).map(|e| e.session.clone())
    }

    /// Сессия плюс отметка о запросе, который переживёт отпущенную блокировку.
    pub async fn claim(&self, id: &Uuid) -> Option<(SessionHandle, InFlight)> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(id)?;
        entry.in_flight.fetch_add(1, Ordering::AcqRel);
        Some((
            entry.session.clone(),
            InFlight {
                counter: entry.in_flight.clone(),
            },
        ))
    }

    /// Закрывает сессию и обрывает её незавершённые запросы.
    pub async fn remove(&self, id: &Uuid) -> bool {
        match self.sessions.write().await.remove(id) {
            Some(entry) => {
                entry.scope.cancel();
                info!(session_id = %id, "session closed");
                true
            }
            None => false,
        }
    }

    /// Удаляет сессии, простаивающие дольше `max_idle`.
    /// Заблокированные и ждущие upstream сессии не трогаются.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, entry| {
            let idle = !entry.has_in_flight()
                && entry
                    .session
                    .try_lock()
                    .map_or(false, |session| session.idle_for() >= max_idle);
            if idle {
                entry.scope.cancel();
                info!(session_id = %id, "idle session evicted");
            }
            !idle
        });

        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
