use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::services::ApiClient;

/// Область жизни представления. Все запросы, запущенные от имени сессии,
/// обрываются при закрытии сессии.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn run<T, F>(&self, operation: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        ApiClient::cancellable(&self.token, operation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_aborts_pending_operation() {
        let scope = ViewScope::new();
        let view = scope.clone();

        let pending = tokio::spawn({
            let view = view.clone();
            async move {
                view
                    .run(async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok::<_, ApiError>(1)
                    })
                    .await
            }
        });

        scope.cancel();
        let result = pending.await.unwrap();
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(view.is_cancelled());
    }

    #[tokio::test]
    async fn completed_operation_passes_through() {
        let scope = ViewScope::new();
        let value = scope.run(async { Ok::<_, ApiError>("listo") }).await.unwrap();
        assert_eq!(value, "listo");
    }
}
