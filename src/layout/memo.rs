use std::sync::Arc;

use super::{compute_layout, Layout};
use crate::models::Stand;

/// Мемоизация раскладки по набору трибун.
///
/// Пересчёт синхронный и происходит только когда входной набор изменился.
#[derive(Debug, Default)]
pub struct LayoutMemo {
    input: Vec<Stand>,
    layout: Option<Arc<Layout>>,
    computations: u64,
}

impl LayoutMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, stands: &[Stand]) -> Arc<Layout> {
        if let Some(layout) = &self.layout {
            if self.input.as_slice() == stands {
                return layout.clone();
            }
        }

        let layout = Arc::new(compute_layout(stands));
        self.input = stands.to_vec();
        self.layout = Some(layout.clone());
        self.computations += 1;
        layout
    }

    /// Сколько раз раскладка реально пересчитывалась.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
