use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::error::AppResult;
use crate::filters::MoneyFormat;
use crate::models::{
    Account, ChartOfAccount, Division, JournalType, Partner, PartnerType, Role, User,
};
use crate::xsrf::XsrfToken;

/// A signed-in portal user, held server-side and keyed by the session cookie.
#[derive(Clone, Debug)]
pub struct Session {
    /// Bearer token issued by the backend.
    pub token: String,
    pub user: User,
    pub role: Role,
    /// Per-session XSRF token embedded in portal forms.
    pub xsrf_token: String,
    pub last_seen: Instant,
}

/// Server-side session store.
#[derive(Clone, Default)]
pub struct SessionStore(Arc<Mutex<HashMap<String, Session>>>);

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: String, session: Session) {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, session);
    }

    /// Look up a session and mark it as used. Sessions idle for longer than
    /// `idle_timeout` are dropped and `None` is returned.
    pub fn touch(&self, id: &str, idle_timeout: Duration) -> Option<Session> {
        let mut sessions = self.0.lock().unwrap_or_else(|e| e.into_inner());
        let session = sessions.get_mut(id)?;
        if session.last_seen.elapsed() > idle_timeout {
            sessions.remove(id);
            return None;
        }
        session.last_seen = Instant::now();
        Some(session.clone())
    }

    /// Look up a session without marking it as used.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Session> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    /// Drop every idle session, returning how many were removed.
    pub fn purge_idle(&self, idle_timeout: Duration) -> usize {
        let mut sessions = self.0.lock().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen.elapsed() <= idle_timeout);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub config: Arc<Config>,
    pub manifest: JsManifest,
    /// Token for forms rendered before sign-in (the login form).
    pub xsrf_token: XsrfToken,
    pub cache: Arc<QueryCache>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let api = ApiClient::new(&config.api_base_url, config.api_timeout)?;
        let manifest = JsManifest::load(&config.static_path);
        let cache = Arc::new(QueryCache::new(config.cache_ttl));

        Ok(Self {
            api,
            config: Arc::new(config),
            manifest,
            xsrf_token: XsrfToken::generate(),
            cache,
            sessions: SessionStore::new(),
        })
    }

    pub fn money(&self) -> MoneyFormat {
        MoneyFormat::new(&self.config.currency, &self.config.locale)
    }

    pub async fn cached_divisions(&self, token: &str) -> AppResult<Vec<Division>> {
        self.cache.load_divisions(&self.api, token).await
    }

    pub async fn cached_partner_types(&self, token: &str) -> AppResult<Vec<PartnerType>> {
        self.cache.load_partner_types(&self.api, token).await
    }

    pub async fn cached_partners(&self, token: &str) -> AppResult<Vec<Partner>> {
        self.cache.load_partners(&self.api, token).await
    }

    pub async fn cached_coa(&self, token: &str) -> AppResult<Vec<ChartOfAccount>> {
        self.cache.load_coa(&self.api, token).await
    }

    pub async fn cached_accounts(&self, token: &str) -> AppResult<Vec<Account>> {
        self.cache.load_accounts(&self.api, token).await
    }

    pub async fn cached_journal_types(&self, token: &str) -> AppResult<Vec<JournalType>> {
        self.cache.load_journal_types(&self.api, token).await
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct JsManifest(HashMap<String, String>);

impl JsManifest {
    pub fn load(static_path: &Path) -> Self {
        let path = static_path.join("js/dist/manifest.json");
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => {
                tracing::warn!(
                    "manifest.json not found at {}, using empty manifest",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> String {
        self.0
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}
