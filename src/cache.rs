//! Generation-based query cache for backend reference lists.
//!
//! Entries are tagged with the generation they were fetched under and the
//! time of the fetch. A read misses when the generation has moved on (a
//! mutation happened) or when the entry is older than the TTL, in which case
//! the list is refetched from the backend.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::trace;

use crate::api::{self, ApiClient};
use crate::error::AppResult;
use crate::models::{Account, ChartOfAccount, Division, JournalType, Partner, PartnerType};
use crate::state::AppState;

struct Slot<T> {
    inner: RwLock<Option<(u64, Instant, T)>>,
}

impl<T: Clone> Slot<T> {
    fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    fn get(&self, gen: u64, ttl: Duration) -> Option<T> {
        let guard = self.inner.read().ok()?;
        match guard.as_ref() {
            Some((stored_gen, fetched_at, val))
                if *stored_gen == gen && fetched_at.elapsed() <= ttl =>
            {
                Some(val.clone())
            }
            _ => None,
        }
    }

    fn set(&self, gen: u64, val: T) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some((gen, Instant::now(), val));
        }
    }
}

pub struct QueryCache {
    generation: AtomicU64,
    ttl: Duration,
    divisions: Slot<Vec<Division>>,
    partner_types: Slot<Vec<PartnerType>>,
    partners: Slot<Vec<Partner>>,
    coa: Slot<Vec<ChartOfAccount>>,
    accounts: Slot<Vec<Account>>,
    journal_types: Slot<Vec<JournalType>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            generation: AtomicU64::new(0),
            ttl,
            divisions: Slot::new(),
            partner_types: Slot::new(),
            partners: Slot::new(),
            coa: Slot::new(),
            accounts: Slot::new(),
            journal_types: Slot::new(),
        }
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn load<T, F, Fut>(&self, slot: &Slot<T>, name: &'static str, fetch: F) -> AppResult<T>
    where
        T: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let gen = self.generation();
        if let Some(cached) = slot.get(gen, self.ttl) {
            trace!(query = name, "cache hit");
            return Ok(cached);
        }
        trace!(query = name, "cache miss");
        let val = fetch().await?;
        slot.set(gen, val.clone());
        Ok(val)
    }

    pub async fn load_divisions(&self, api: &ApiClient, token: &str) -> AppResult<Vec<Division>> {
        self.load(&self.divisions, "divisions", || {
            api::divisions::list_divisions(api, token)
        })
        .await
    }

    pub async fn load_partner_types(
        &self,
        api: &ApiClient,
        token: &str,
    ) -> AppResult<Vec<PartnerType>> {
        self.load(&self.partner_types, "partner_types", || {
            api::partner_types::list_partner_types(api, token)
        })
        .await
    }

    pub async fn load_partners(&self, api: &ApiClient, token: &str) -> AppResult<Vec<Partner>> {
        self.load(&self.partners, "partners", || {
            api::partners::list_partners(api, token)
        })
        .await
    }

    pub async fn load_coa(&self, api: &ApiClient, token: &str) -> AppResult<Vec<ChartOfAccount>> {
        self.load(&self.coa, "coa", || api::coa::list_coa(api, token))
            .await
    }

    pub async fn load_accounts(&self, api: &ApiClient, token: &str) -> AppResult<Vec<Account>> {
        self.load(&self.accounts, "accounts", || {
            api::accounts::list_accounts(api, token)
        })
        .await
    }

    pub async fn load_journal_types(
        &self,
        api: &ApiClient,
        token: &str,
    ) -> AppResult<Vec<JournalType>> {
        self.load(&self.journal_types, "journal_types", || {
            api::journal_types::list_journal_types(api, token)
        })
        .await
    }
}

pub async fn cache_invalidation_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mutating = matches!(
        *req.method(),
        Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    );
    let resp = next.run(req).await;
    if mutating && (resp.status().is_success() || resp.status().is_redirection()) {
        state.cache.invalidate();
    }
    resp
}
