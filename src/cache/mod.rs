use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::layout::memo::LayoutMemo;
use crate::layout::Layout;
use crate::models::Event;

/// Кеш раскладок стадиона по событию.
///
/// Раскладка пересчитывается только когда у события поменялся набор трибун.
#[derive(Default)]
pub struct LayoutCache {
    memos: Mutex<HashMap<String, LayoutMemo>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Раскладка для события; `None`, если у события нет стадиона.
    pub async fn layout_for(&self, event: &Event) -> Option<Arc<Layout>> {
        let stadium = event.stadium.as_ref()?;
        let mut memos = self.memos.lock().await;
        let memo = memos.entry(event.id.clone()).or_default();

        let before = memo.computations();
        let layout = memo.get(&stadium.stands);
        if memo.computations() != before {
            debug!(event_id = %event.id, stands = stadium.stands.len(), "layout recomputed");
        }
        Some(layout)
    }

    pub async fn invalidate(&self, event_id: &str) {
        if self.memos.lock().await.remove(event_id).is_some() {
            info!(event_id, "layout cache invalidated");
        }
    }

    pub async fn len(&self) -> usize {
        self.memos.lock().await.len()
    }
}
