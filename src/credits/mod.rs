use crate::api::JobApi;
use crate::auth::TokenSource;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinHandle;

/// Balance as the process currently knows it. `Error` means the balance
/// could not be determined, which is distinct from `Available(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditState {
    Unknown,
    Loading,
    Available(i64),
    Error,
}

impl CreditState {
    pub fn value(&self) -> Option<i64> {
        match self {
            CreditState::Available(value) => Some(*value),
            _ => None,
        }
    }
}

struct StoreInner {
    state: CreditState,
    identity: Option<String>,
}

/// Process-wide cache of the signed-in user's credit balance.
///
/// Many readers, one writer path: every write goes through `run_refresh`,
/// which replaces the whole state at once. Each refresh carries a ticket
/// from a monotonic sequence; a result is applied only while its ticket is
/// still the newest, so reordered completions cannot publish stale data.
pub struct CreditStore {
    tokens: Arc<dyn TokenSource>,
    api: Arc<dyn JobApi>,
    inner: Arc<TokioMutex<StoreInner>>,
    refresh_seq: Arc<AtomicU64>,
    tasks: StdMutex<Vec<JoinHandle<()>>>,
}

impl CreditStore {
    pub fn new(tokens: Arc<dyn TokenSource>, api: Arc<dyn JobApi>) -> Self {
        Self {
            tokens,
            api,
            inner: Arc::new(TokioMutex::new(StoreInner {
                state: CreditState::Unknown,
                identity: None,
            })),
            refresh_seq: Arc::new(AtomicU64::new(0)),
            tasks: StdMutex::new(Vec::new()),
        }
    }

    /// Feed the identity observed by the presentation layer. A refresh is
    /// triggered only when the signed-in identity actually changes, never on
    /// unrelated re-renders. Sign-out clears the balance and invalidates any
    /// refresh still in flight.
    pub async fn observe_identity(&self, identity: Option<&str>) {
        let should_refresh = {
            let mut inner = self.inner.lock().await;
            match identity {
                None => {
                    if inner.identity.take().is_some() {
                        tracing::info!("Signed out, clearing credit balance");
                        self.refresh_seq.fetch_add(1, Ordering::SeqCst);
                    }
                    inner.state = CreditState::Unknown;
                    false
                }
                Some(id) if inner.identity.as_deref() == Some(id) => false,
                Some(id) => {
                    tracing::info!("Identity changed, refreshing credit balance");
                    inner.identity = Some(id.to_string());
                    true
                }
            }
        };

        if should_refresh {
            self.spawn_refresh();
        }
    }

    /// Re-fetch the balance now, inline. Safe to call concurrently; only the
    /// newest refresh gets to publish its result.
    pub async fn refresh(&self) {
        Self::run_refresh(
            Arc::clone(&self.tokens),
            Arc::clone(&self.api),
            Arc::clone(&self.inner),
            Arc::clone(&self.refresh_seq),
        )
        .await;
    }

    pub async fn snapshot(&self) -> CreditState {
        self.inner.lock().await.state
    }

    fn spawn_refresh(&self) {
        let tokens = Arc::clone(&self.tokens);
        let api = Arc::clone(&self.api);
        let inner = Arc::clone(&self.inner);
        let seq = Arc::clone(&self.refresh_seq);

        let handle = tokio::spawn(async move {
            Self::run_refresh(tokens, api, inner, seq).await;
        });

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle);
        }
    }

    async fn run_refresh(
        tokens: Arc<dyn TokenSource>,
        api: Arc<dyn JobApi>,
        inner: Arc<TokioMutex<StoreInner>>,
        seq: Arc<AtomicU64>,
    ) {
        let ticket = seq.fetch_add(1, Ordering::SeqCst) + 1;
        Self::apply(&inner, &seq, ticket, CreditState::Loading).await;

        let token = match tokens.get_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!("Credit refresh skipped: no authenticated session");
                Self::apply(&inner, &seq, ticket, CreditState::Error).await;
                return;
            }
            Err(e) => {
                tracing::warn!("Credit refresh token fetch failed: {}", e);
                Self::apply(&inner, &seq, ticket, CreditState::Error).await;
                return;
            }
        };

        let state = match api.get_current_user(&token).await {
            Ok(user) => {
                tracing::info!("Credit balance: {}", user.credit_balance);
                CreditState::Available(user.credit_balance)
            }
            Err(e) => {
                tracing::warn!("Credit refresh failed: {}", e);
                CreditState::Error
            }
        };

        Self::apply(&inner, &seq, ticket, state).await;
    }

    /// Whole-state replacement, gated on the ticket still being the newest.
    async fn apply(
        inner: &Arc<TokioMutex<StoreInner>>,
        seq: &Arc<AtomicU64>,
        ticket: u64,
        state: CreditState,
    ) {
        let mut store = inner.lock().await;
        if seq.load(Ordering::SeqCst) != ticket {
            tracing::debug!("Discarding superseded credit refresh result");
            return;
        }
        store.state = state;
    }
}

impl Drop for CreditStore {
    fn drop(&mut self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }
}
