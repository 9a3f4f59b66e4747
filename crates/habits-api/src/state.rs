use std::sync::Arc;
use std::time::Duration;

use habits_db::Database;
use tracing::error;

use crate::credentials::CredentialStore;
use crate::error::AppError;
use crate::middleware::SessionKeys;
use crate::report::AdherenceReporter;
use crate::repository::HabitRepository;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub credentials: CredentialStore,
    pub habits: HabitRepository,
    pub reporter: AdherenceReporter,
    pub session: SessionKeys,
    /// Upper bound on a single store call issued from a request.
    pub store_timeout: Duration,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, session: SessionKeys, store_timeout: Duration) -> Self {
        Self {
            credentials: CredentialStore::new(db.clone()),
            habits: HabitRepository::new(db.clone()),
            reporter: AdherenceReporter::new(db),
            session,
            store_timeout,
        }
    }
}

/// Runs a blocking store operation off the async runtime, giving up after
/// `timeout`. The closure keeps running to completion on the blocking pool
/// if the deadline passes; only the request is failed.
pub async fn run_blocking<F, T>(timeout: Duration, f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(res)) => res,
        Ok(Err(e)) => {
            error!("spawn_blocking join error: {}", e);
            Err(AppError::Internal(anyhow::anyhow!("store task failed: {e}")))
        }
        Err(_) => Err(AppError::Internal(anyhow::anyhow!(
            "store call exceeded {} ms",
            timeout.as_millis()
        ))),
    }
}
