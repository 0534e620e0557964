//! Session lifecycle: restore, login, OTP verification, logout.
//!
//! The store is the only writer of the persisted `token`/`user`/`role` trio
//! and of the in-memory session. It is constructed with its API client and
//! storage backend injected, so tests run against an in-memory database and
//! a mock server.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use dayflow_common::models::{AuthResponse, Role, Session, SignupRequest, User};
use dayflow_common::storage::{KeyValueStore, KEY_ROLE, KEY_TOKEN, KEY_USER};

use crate::api::ApiClient;

/// Route unauthenticated users are sent to.
pub const LOGIN_ROUTE: &str = "/login";

type Listener = Box<dyn Fn(Option<&Session>) + Send + Sync>;

pub struct SessionStore {
    api: Arc<ApiClient>,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<Option<Session>>,
    listeners: Mutex<Vec<Listener>>,
}

impl SessionStore {
    /// Builds the store and restores any persisted session. No server
    /// round-trip happens here; a stale token is only discovered on the
    /// first authenticated call.
    pub fn new(api: Arc<ApiClient>, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let store = Self {
            api,
            storage,
            state: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
        };
        store.restore()?;
        Ok(store)
    }

    fn restore(&self) -> Result<()> {
        let token = self.storage.get(KEY_TOKEN)?;
        let user = self.storage.get(KEY_USER)?;
        let role = self.storage.get(KEY_ROLE)?;

        // Missing token means unauthenticated no matter what else is left
        // behind; same for any other gap in the trio.
        let (Some(token), Some(user), Some(role)) = (token, user, role) else {
            debug!("no persisted session, starting unauthenticated");
            return Ok(());
        };

        let user: User = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(e) => {
                warn!("discarding unreadable persisted user: {}", e);
                return Ok(());
            }
        };
        let role: Role = match role.parse() {
            Ok(role) => role,
            Err(e) => {
                warn!("discarding persisted session: {}", e);
                return Ok(());
            }
        };

        debug!("restored session for {} ({})", user.email, role);
        self.api.set_token(&token);
        *self.state.write() = Some(Session { user, role, token });
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.read().as_ref().map(|s| s.role)
    }

    /// Registers a listener invoked after every session transition.
    pub fn on_change(&self, listener: impl Fn(Option<&Session>) + Send + Sync + 'static) {
        self.listeners.lock().push(Box::new(listener));
    }

    fn notify(&self) {
        let state = self.state.read();
        for listener in self.listeners.lock().iter() {
            listener(state.as_ref());
        }
    }

    /// Authenticates against the role-specific endpoint and returns the
    /// landing route for the role the server actually granted.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_role: Role,
    ) -> Result<&'static str> {
        let auth = match requested_role {
            Role::Manager => self.api.manager_login(email, password).await?,
            _ => self.api.login(email, password).await?,
        };

        let role = self.establish(auth)?;
        info!("logged in as {} ({})", email, role);
        Ok(role.landing_route())
    }

    /// Registers a new account. Does not establish a session; the returned
    /// message tells the user to verify via OTP.
    pub async fn signup(&self, request: &SignupRequest) -> Result<String> {
        let response = self.api.signup(request).await?;
        Ok(response.message)
    }

    /// Completes registration; on success the session is established
    /// exactly like a login.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<&'static str> {
        let auth = self.api.verify_otp(email, otp).await?;
        let role = self.establish(auth)?;
        info!("verified {} ({})", email, role);
        Ok(role.landing_route())
    }

    pub async fn resend_otp(&self, email: &str) -> Result<String> {
        let response = self.api.resend_otp(email).await?;
        Ok(response.message)
    }

    /// Clears the persisted trio and the in-memory session. Safe to call
    /// when no session exists.
    pub fn logout(&self) -> &'static str {
        self.clear();
        info!("logged out");
        LOGIN_ROUTE
    }

    /// Invoked via the API client's auth-expired hook: same teardown as a
    /// logout, after which the user lands back on the login route.
    pub fn handle_auth_expired(&self) {
        warn!("session expired, clearing stored credentials");
        self.clear();
    }

    /// Persists and installs a fresh session. The server-declared role
    /// takes precedence over whatever the caller asked for.
    fn establish(&self, auth: AuthResponse) -> Result<Role> {
        let role = auth.user.role;

        self.storage.set(KEY_TOKEN, &auth.token)?;
        self.storage
            .set(KEY_USER, &serde_json::to_string(&auth.user)?)?;
        self.storage.set(KEY_ROLE, role.as_str())?;

        self.api.set_token(&auth.token);
        *self.state.write() = Some(Session {
            user: auth.user,
            role,
            token: auth.token,
        });
        self.notify();
        Ok(role)
    }

    fn clear(&self) {
        // Removal is best-effort: logout must not fail on a broken store.
        for key in [KEY_TOKEN, KEY_USER, KEY_ROLE] {
            if let Err(e) = self.storage.remove(key) {
                warn!("failed to remove {}: {}", key, e);
            }
        }
        self.api.clear_token();
        *self.state.write() = None;
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::config::ApiSettings;
    use dayflow_common::storage::SqliteStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(uri: &str) -> Arc<ApiClient> {
        Arc::new(
            ApiClient::new(&ApiSettings {
                base_url: uri.to_string(),
                timeout_secs: 5,
            })
            .unwrap(),
        )
    }

    fn auth_body(role: &str, id_field: &str, id: &str) -> serde_json::Value {
        let mut user = serde_json::json!({
            "email": "ava@dayflow.dev",
            "name": "Ava",
            "role": role,
        });
        user[id_field] = serde_json::Value::String(id.to_string());
        serde_json::json!({
            "message": "Login successful",
            "token": "jwt-123",
            "user": user,
        })
    }

    fn store_with(
        server_uri: &str,
        storage: Arc<dyn KeyValueStore>,
    ) -> (Arc<ApiClient>, Arc<SessionStore>) {
        let api = api_for(server_uri);
        let store = Arc::new(SessionStore::new(api.clone(), storage).unwrap());
        (api, store)
    }

    #[test]
    fn restore_requires_the_full_trio() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        storage.set(KEY_USER, r#"{"email":"a@b.c","name":"A","role":"employee"}"#).unwrap();
        storage.set(KEY_ROLE, "employee").unwrap();
        // No token: stale user/role must not resurrect a session.

        let (_api, store) = store_with("http://localhost:0", storage);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn restore_picks_up_a_complete_trio() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        storage.set(KEY_TOKEN, "jwt-123").unwrap();
        storage.set(KEY_USER, r#"{"email":"a@b.c","name":"A","role":"manager","manager_id":"MGR01"}"#).unwrap();
        storage.set(KEY_ROLE, "manager").unwrap();

        let (_api, store) = store_with("http://localhost:0", storage);
        let session = store.current().unwrap();
        assert_eq!(session.role, Role::Manager);
        assert_eq!(session.token, "jwt-123");
    }

    #[test]
    fn restore_discards_unreadable_state() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        storage.set(KEY_TOKEN, "jwt-123").unwrap();
        storage.set(KEY_USER, "not json").unwrap();
        storage.set(KEY_ROLE, "employee").unwrap();

        let (_api, store) = store_with("http://localhost:0", storage);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn login_stores_the_server_declared_role() {
        let server = MockServer::start().await;
        // Client asks for employee; server says this account is a manager.
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(auth_body("manager", "manager_id", "MGR01")),
            )
            .mount(&server)
            .await;

        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let (_api, store) = store_with(&server.uri(), storage.clone());

        let route = store
            .login("ava@dayflow.dev", "hunter2!A", Role::Employee)
            .await
            .unwrap();

        assert_eq!(route, "/manager/dashboard");
        assert_eq!(store.role(), Some(Role::Manager));
        assert_eq!(storage.get(KEY_ROLE).unwrap().as_deref(), Some("manager"));
        assert_eq!(storage.get(KEY_TOKEN).unwrap().as_deref(), Some("jwt-123"));
    }

    #[tokio::test]
    async fn manager_login_uses_the_manager_endpoint() {
        let server = MockServer::start().await;
        // Only the manager endpoint is mocked; hitting /auth/login would 404.
        Mock::given(method("POST"))
            .and(path("/auth/manager/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(auth_body("manager", "manager_id", "MGR01")),
            )
            .mount(&server)
            .await;

        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let (_api, store) = store_with(&server.uri(), storage);

        let route = store
            .login("mia@dayflow.dev", "hunter2!A", Role::Manager)
            .await
            .unwrap();
        assert_eq!(route, "/manager/dashboard");
    }

    #[tokio::test]
    async fn failed_login_leaves_state_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "Invalid email or password"
            })))
            .mount(&server)
            .await;

        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let (_api, store) = store_with(&server.uri(), storage.clone());

        let err = store
            .login("ava@dayflow.dev", "wrong", Role::Employee)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!store.is_authenticated());
        assert!(storage.get(KEY_TOKEN).unwrap().is_none());
    }

    #[tokio::test]
    async fn verify_otp_establishes_a_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(auth_body("employee", "employee_id", "EMP01")),
            )
            .mount(&server)
            .await;

        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let (_api, store) = store_with(&server.uri(), storage);

        let route = store.verify_otp("ava@dayflow.dev", "123456").await.unwrap();
        assert_eq!(route, "/employee/dashboard");
        assert_eq!(store.role(), Some(Role::Employee));
    }

    #[tokio::test]
    async fn logout_clears_everything_and_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(auth_body("employee", "employee_id", "EMP01")),
            )
            .mount(&server)
            .await;

        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let (_api, store) = store_with(&server.uri(), storage.clone());

        store
            .login("ava@dayflow.dev", "hunter2!A", Role::Employee)
            .await
            .unwrap();
        assert!(store.is_authenticated());

        assert_eq!(store.logout(), LOGIN_ROUTE);
        assert!(!store.is_authenticated());
        for key in [KEY_TOKEN, KEY_USER, KEY_ROLE] {
            assert!(storage.get(key).unwrap().is_none());
        }

        // Logging out again with no session is a no-op.
        assert_eq!(store.logout(), LOGIN_ROUTE);
    }

    #[tokio::test]
    async fn expired_token_tears_down_the_session_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(auth_body("employee", "employee_id", "EMP01")),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/employee/profile"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "Token has expired",
                "code": "token_expired"
            })))
            .mount(&server)
            .await;

        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let (api, store) = store_with(&server.uri(), storage.clone());

        // Same wiring as main: transport reports expiry, the store clears.
        let hooked = store.clone();
        api.on_auth_expired(move || hooked.handle_auth_expired());

        let transitions = Arc::new(AtomicUsize::new(0));
        let counter = transitions.clone();
        store.on_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store
            .login("ava@dayflow.dev", "hunter2!A", Role::Employee)
            .await
            .unwrap();
        assert_eq!(transitions.load(Ordering::SeqCst), 1);

        let err = api.profile().await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));

        assert!(!store.is_authenticated());
        for key in [KEY_TOKEN, KEY_USER, KEY_ROLE] {
            assert!(storage.get(key).unwrap().is_none());
        }
        // One login transition plus exactly one teardown.
        assert_eq!(transitions.load(Ordering::SeqCst), 2);
    }
}
