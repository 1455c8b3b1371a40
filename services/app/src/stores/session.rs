//! services/app/src/stores/session.rs
//!
//! The session store: the authentication state machine that gates the
//! protected views and survives restarts through the durable session record.
//!
//! State changes are published over a `tokio::sync::watch` channel so the
//! route guard (and anything else) can re-evaluate on every transition.

use std::sync::Arc;

use polaris_core::domain::{Route, User};
use polaris_core::ports::{AuthService, GatewayError, Navigator, Notifier, SessionStorage};
use tokio::sync::{watch, Mutex};
use tracing::warn;

use crate::error::AppError;

/// A point-in-time view of the session.
///
/// `authenticated iff user present` holds structurally: the user record
/// only exists inside the `SignedIn` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSnapshot {
    /// Restoration from durable storage has not completed yet.
    Restoring,
    SignedOut,
    SignedIn(User),
}

impl SessionSnapshot {
    pub fn is_restoring(&self) -> bool {
        matches!(self, SessionSnapshot::Restoring)
    }

    pub fn authenticated(&self) -> bool {
        matches!(self, SessionSnapshot::SignedIn(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionSnapshot::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

struct SessionInner {
    /// True while a login or register call is outstanding. Shared between
    /// the two so at most one auth call is in flight per store.
    pending: bool,
}

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn SessionStorage>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    inner: Mutex<SessionInner>,
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    /// Creates a store in the `Restoring` state. Callers are expected to
    /// invoke [`restore`](Self::restore) before the first guard decision.
    pub fn new(
        auth: Arc<dyn AuthService>,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::Restoring);
        Self {
            auth,
            storage,
            notifier,
            navigator,
            inner: Mutex::new(SessionInner { pending: false }),
            tx,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribes to session transitions for guard re-evaluation.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub async fn is_pending(&self) -> bool {
        self.inner.lock().await.pending
    }

    /// Reads the durable session record and leaves the store either signed
    /// in or signed out. A missing or malformed record means no session.
    pub fn restore(&self) {
        match self.storage.load() {
            Some(user) => {
                self.tx.send_replace(SessionSnapshot::SignedIn(user));
            }
            None => {
                self.tx.send_replace(SessionSnapshot::SignedOut);
            }
        }
    }

    /// Authenticates against the gateway. On success the session record is
    /// persisted only after the in-memory transition, and the user lands on
    /// the dashboard. Logical failures and gateway errors leave the session
    /// untouched and unpersisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AppError> {
        if email.trim().is_empty() || password.is_empty() {
            self.notifier.error("Please enter your email and password.");
            return Err(AppError::validation("email and password are required"));
        }

        {
            let mut inner = self.inner.lock().await;
            if inner.pending {
                return Ok(());
            }
            inner.pending = true;
        }

        let result = self.auth.login(email, password).await;
        let outcome = match result {
            Ok(response) if response.success => match response.user {
                Some(user) => {
                    self.tx.send_replace(SessionSnapshot::SignedIn(user.clone()));
                    if let Err(e) = self.storage.save(&user) {
                        warn!("Failed to persist session record: {}", e);
                    }
                    self.notifier.success("Logged in successfully!");
                    self.navigator.navigate(Route::Dashboard);
                    Ok(())
                }
                None => {
                    self.notifier.error("An error occurred during login.");
                    Err(AppError::Gateway(GatewayError::Contract(
                        "login reported success without a user record".to_string(),
                    )))
                }
            },
            Ok(_) => {
                self.notifier
                    .error("Login failed. Please check your credentials.");
                Ok(())
            }
            Err(e) => {
                warn!("Login gateway error: {}", e);
                self.notifier.error("An error occurred during login.");
                Err(AppError::Gateway(e))
            }
        };

        self.inner.lock().await.pending = false;
        outcome
    }

    /// Creates an account. Registration never authenticates by itself; on
    /// success the user is sent to the login view.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), AppError> {
        if email.trim().is_empty() || password.is_empty() {
            self.notifier.error("Please enter your email and password.");
            return Err(AppError::validation("email and password are required"));
        }

        {
            let mut inner = self.inner.lock().await;
            if inner.pending {
                return Ok(());
            }
            inner.pending = true;
        }

        let result = self.auth.register(email, password).await;
        let outcome = match result {
            Ok(response) if response.success => {
                self.notifier
                    .success("Registration successful! Please log in.");
                self.navigator.navigate(Route::Login);
                Ok(())
            }
            Ok(_) => {
                self.notifier.error("Registration failed. Please try again.");
                Ok(())
            }
            Err(e) => {
                warn!("Register gateway error: {}", e);
                self.notifier.error("An error occurred during registration.");
                Err(AppError::Gateway(e))
            }
        };

        self.inner.lock().await.pending = false;
        outcome
    }

    /// Clears the session and removes the durable record. Requires no
    /// gateway call, so it cannot fail.
    pub fn logout(&self) {
        self.tx.send_replace(SessionSnapshot::SignedOut);
        self.storage.clear();
        self.notifier.success("Logged out successfully.");
        self.navigator.navigate(Route::Landing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_test_support::{
        FakeAuthService, MemorySessionStorage, RecordingNavigator, RecordingNotifier,
    };
    use polaris_core::ports::{LoginResponse, RegisterResponse};

    fn store_with(
        auth: FakeAuthService,
    ) -> (
        SessionStore,
        Arc<MemorySessionStorage>,
        Arc<RecordingNotifier>,
        Arc<RecordingNavigator>,
    ) {
        let storage = Arc::new(MemorySessionStorage::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let store = SessionStore::new(
            Arc::new(auth),
            storage.clone(),
            notifier.clone(),
            navigator.clone(),
        );
        (store, storage, notifier, navigator)
    }

    fn logged_in_user() -> User {
        User {
            email: "ada@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn login_success_signs_in_persists_and_navigates() {
        let auth = FakeAuthService::with_login(Ok(LoginResponse {
            success: true,
            user: Some(logged_in_user()),
        }));
        let (store, storage, notifier, navigator) = store_with(auth);
        store.restore();

        store.login("ada@example.com", "secret").await.unwrap();

        let snapshot = store.snapshot();
        assert!(snapshot.authenticated());
        assert_eq!(snapshot.user().unwrap().email, "ada@example.com");
        assert_eq!(storage.stored(), Some(logged_in_user()));
        assert_eq!(navigator.last(), Some(Route::Dashboard));
        assert!(notifier.successes().contains(&"Logged in successfully!".to_string()));
        assert!(!store.is_pending().await);
    }

    #[tokio::test]
    async fn login_logical_failure_leaves_session_untouched() {
        let auth = FakeAuthService::with_login(Ok(LoginResponse {
            success: false,
            user: None,
        }));
        let (store, storage, notifier, navigator) = store_with(auth);
        store.restore();

        store.login("ada@example.com", "wrong").await.unwrap();

        assert_eq!(store.snapshot(), SessionSnapshot::SignedOut);
        assert_eq!(storage.stored(), None);
        assert_eq!(navigator.last(), None);
        assert!(notifier
            .errors()
            .contains(&"Login failed. Please check your credentials.".to_string()));
        assert!(!store.is_pending().await);
    }

    #[tokio::test]
    async fn login_gateway_error_clears_pending_and_reports() {
        let auth =
            FakeAuthService::with_login(Err(GatewayError::Service("connection refused".into())));
        let (store, storage, _notifier, _navigator) = store_with(auth);
        store.restore();

        let result = store.login("ada@example.com", "secret").await;

        assert!(matches!(result, Err(AppError::Gateway(_))));
        assert_eq!(store.snapshot(), SessionSnapshot::SignedOut);
        assert_eq!(storage.stored(), None);
        assert!(!store.is_pending().await);
    }

    #[tokio::test]
    async fn login_success_without_user_record_is_a_contract_violation() {
        let auth = FakeAuthService::with_login(Ok(LoginResponse {
            success: true,
            user: None,
        }));
        let (store, storage, _notifier, navigator) = store_with(auth);
        store.restore();

        let result = store.login("ada@example.com", "secret").await;

        assert!(matches!(
            result,
            Err(AppError::Gateway(GatewayError::Contract(_)))
        ));
        assert_eq!(store.snapshot(), SessionSnapshot::SignedOut);
        assert_eq!(storage.stored(), None);
        assert_eq!(navigator.last(), None);
    }

    #[tokio::test]
    async fn empty_credentials_are_rejected_without_a_gateway_call() {
        let auth = FakeAuthService::with_login(Ok(LoginResponse {
            success: true,
            user: Some(logged_in_user()),
        }));
        let calls = auth.call_count();
        let (store, _storage, _notifier, _navigator) = store_with(auth);
        store.restore();

        let result = store.login("", "secret").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(store.snapshot(), SessionSnapshot::SignedOut);
    }

    #[tokio::test]
    async fn second_login_while_pending_is_a_no_op() {
        let auth = FakeAuthService::with_login(Ok(LoginResponse {
            success: true,
            user: Some(logged_in_user()),
        }))
        .gated();
        let gate = auth.gate();
        let calls = auth.call_count();
        let (store, _storage, _notifier, _navigator) = store_with(auth);
        store.restore();
        let store = Arc::new(store);

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.login("ada@example.com", "secret").await })
        };
        gate.wait_entered(1).await;

        // The overlapping call must not reach the gateway.
        store.login("ada@example.com", "secret").await.unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        gate.release();
        first.await.unwrap().unwrap();
        assert!(store.snapshot().authenticated());
    }

    #[tokio::test]
    async fn register_success_navigates_to_login_without_authenticating() {
        let auth = FakeAuthService::with_register(Ok(RegisterResponse { success: true }));
        let (store, storage, notifier, navigator) = store_with(auth);
        store.restore();

        store.register("ada@example.com", "secret").await.unwrap();

        assert_eq!(store.snapshot(), SessionSnapshot::SignedOut);
        assert_eq!(storage.stored(), None);
        assert_eq!(navigator.last(), Some(Route::Login));
        assert!(notifier
            .successes()
            .contains(&"Registration successful! Please log in.".to_string()));
    }

    #[tokio::test]
    async fn restore_after_logout_yields_signed_out() {
        let auth = FakeAuthService::with_login(Ok(LoginResponse {
            success: true,
            user: Some(logged_in_user()),
        }));
        let (store, storage, _notifier, _navigator) = store_with(auth);
        store.restore();
        store.login("ada@example.com", "secret").await.unwrap();
        assert!(store.snapshot().authenticated());

        store.logout();
        assert_eq!(store.snapshot(), SessionSnapshot::SignedOut);
        assert_eq!(storage.stored(), None);

        // A fresh restore must not resurrect the session.
        store.restore();
        assert_eq!(store.snapshot(), SessionSnapshot::SignedOut);
    }

    #[tokio::test]
    async fn subscribers_observe_logout() {
        let auth = FakeAuthService::with_login(Ok(LoginResponse {
            success: true,
            user: Some(logged_in_user()),
        }));
        let (store, _storage, _notifier, _navigator) = store_with(auth);
        store.restore();
        store.login("ada@example.com", "secret").await.unwrap();

        let mut rx = store.subscribe();
        store.logout();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), SessionSnapshot::SignedOut);
    }
}
