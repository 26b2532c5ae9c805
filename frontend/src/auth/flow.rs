//! 登录/注册流程
//!
//! 注册成功后自动以相同凭据登录：后端的注册响应不含 token，
//! 因此从不把注册响应当作会话。

use plantshout_shared::{Credentials, Session};
use tracing::{info, warn};

use crate::api::{HttpTransport, PlantApi};
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }

    /// Shown when no response was received.
    pub fn failure_notice(self) -> &'static str {
        match self {
            AuthMode::Login => "Failed to login",
            AuthMode::Register => "Failed to register",
        }
    }
}

/// Raw form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    /// Only read in register mode.
    pub confirm_password: String,
}

impl AuthForm {
    pub fn validate(&self, mode: AuthMode) -> ClientResult<Credentials> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ClientError::validation("Please fill in all fields"));
        }
        if mode == AuthMode::Register && self.password != self.confirm_password {
            return Err(ClientError::validation("Passwords do not match"));
        }
        Ok(Credentials::new(email, self.password.clone()))
    }
}

pub struct AuthFlow<T> {
    api: PlantApi<T>,
    store: SessionStore,
}

impl<T> Clone for AuthFlow<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            store: self.store.clone(),
        }
    }
}

impl<T: HttpTransport> AuthFlow<T> {
    pub fn new(api: PlantApi<T>, store: SessionStore) -> Self {
        Self { api, store }
    }

    /// Runs one form submission.
    ///
    /// On success the session is persisted, which flips the auth gate
    /// synchronously. On any error storage is left untouched.
    pub async fn submit(&self, mode: AuthMode, form: &AuthForm) -> ClientResult<Session> {
        let credentials = form.validate(mode)?;

        let session = match mode {
            AuthMode::Login => self.api.login(&credentials).await,
            AuthMode::Register => self.register_then_login(&credentials).await,
        }
        .inspect_err(|e| warn!(mode = mode.title(), error = %e, "authentication failed"))?;

        self.store.set(&session)?;
        info!(mode = mode.title(), user_id = %session.user_id, "signed in");
        Ok(session)
    }

    async fn register_then_login(&self, credentials: &Credentials) -> ClientResult<Session> {
        let res = self.api.register(credentials).await?;
        info!(user_id = ?res.user_id, "account registered, signing in");
        self.api.login(credentials).await
    }

    pub fn logout(&self) -> ClientResult<()> {
        info!("signing out");
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::session::{AuthGate, MemoryStorage};
    use crate::web::route::AppRoute;
    use plantshout_shared::protocol::HttpMethod;
    use serde_json::json;

    const LOGIN: &str = "http://api.test/api/login";
    const REGISTER: &str = "http://api.test/api/register";

    struct Harness {
        mock: MockTransport,
        storage: MemoryStorage,
        gate: AuthGate,
        flow: AuthFlow<MockTransport>,
    }

    fn harness() -> Harness {
        let mock = MockTransport::new();
        let storage = MemoryStorage::new();
        let store = SessionStore::new(storage.clone());
        let gate = AuthGate::new(&store);
        let flow = AuthFlow::new(PlantApi::new("http://api.test", mock.clone()), store);
        Harness {
            mock,
            storage,
            gate,
            flow,
        }
    }

    fn form(email: &str, password: &str) -> AuthForm {
        AuthForm {
            email: email.into(),
            password: password.into(),
            confirm_password: password.into(),
        }
    }

    #[tokio::test]
    async fn login_success_stores_session_and_lands_on_main() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Post,
            LOGIN,
            200,
            json!({"token": "T1", "user_id": "42"}),
        );

        let session = h
            .flow
            .submit(AuthMode::Login, &form("a@b.com", "pw"))
            .await
            .unwrap();

        assert_eq!(session, Session::new("T1", "42"));
        assert_eq!(h.storage.raw("token").as_deref(), Some("T1"));
        assert_eq!(h.storage.raw("user_id").as_deref(), Some("42"));
        assert!(h.gate.is_authenticated());
        assert_eq!(
            AppRoute::Login.resolve(h.gate.is_authenticated()),
            AppRoute::Main
        );
    }

    #[tokio::test]
    async fn login_rejection_leaves_state_untouched() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Post,
            LOGIN,
            401,
            json!({"message": "Invalid email or password"}),
        );

        let err = h
            .flow
            .submit(AuthMode::Login, &form("a@b.com", "bad"))
            .await
            .unwrap_err();

        assert_eq!(
            err.user_message(AuthMode::Login.failure_notice()),
            "Invalid email or password"
        );
        assert!(!h.gate.is_authenticated());
        assert_eq!(h.storage.raw("token"), None);
    }

    #[tokio::test]
    async fn transport_failure_shows_generic_notice() {
        let h = harness();
        h.mock.fail(
            HttpMethod::Post,
            LOGIN,
            ClientError::Transport("connection refused".into()),
        );

        let err = h
            .flow
            .submit(AuthMode::Login, &form("a@b.com", "pw"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(AuthMode::Login.failure_notice()), "Failed to login");
        assert!(!h.gate.is_authenticated());
    }

    #[tokio::test]
    async fn empty_token_in_login_reply_fails_without_storing() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Post,
            LOGIN,
            200,
            json!({"token": "", "user_id": "42"}),
        );

        let err = h
            .flow
            .submit(AuthMode::Login, &form("a@b.com", "pw"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(AuthMode::Login.failure_notice()), "Failed to login");
        assert!(!h.gate.is_authenticated());
        assert_eq!(h.storage.raw("token"), None);
        assert_eq!(h.storage.raw("user_id"), None);
    }

    #[tokio::test]
    async fn registration_signs_in_without_second_submission() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Post,
            REGISTER,
            201,
            json!({"message": "User registered successfully", "user_id": 7}),
        );
        h.mock.reply(
            HttpMethod::Post,
            LOGIN,
            200,
            json!({"token": "T7", "user_id": 7}),
        );

        let session = h
            .flow
            .submit(AuthMode::Register, &form("new@b.com", "pw"))
            .await
            .unwrap();

        assert_eq!(session, Session::new("T7", "7"));
        assert!(h.gate.is_authenticated());
        assert_eq!(h.mock.count(HttpMethod::Post, REGISTER), 1);
        assert_eq!(h.mock.count(HttpMethod::Post, LOGIN), 1);
    }

    #[tokio::test]
    async fn registration_conflict_skips_login() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Post,
            REGISTER,
            409,
            json!({"message": "Email already exists"}),
        );

        let err = h
            .flow
            .submit(AuthMode::Register, &form("a@b.com", "pw"))
            .await
            .unwrap_err();

        assert_eq!(
            err.user_message(AuthMode::Register.failure_notice()),
            "Email already exists"
        );
        assert_eq!(h.mock.count(HttpMethod::Post, LOGIN), 0);
        assert!(!h.gate.is_authenticated());
    }

    #[tokio::test]
    async fn register_response_is_never_trusted_as_session() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Post,
            REGISTER,
            201,
            json!({"token": "FROM_REGISTER", "user_id": 7}),
        );
        h.mock.reply(
            HttpMethod::Post,
            LOGIN,
            200,
            json!({"token": "FROM_LOGIN", "user_id": 7}),
        );

        let session = h
            .flow
            .submit(AuthMode::Register, &form("new@b.com", "pw"))
            .await
            .unwrap();
        assert_eq!(session.token, "FROM_LOGIN");
    }

    #[tokio::test]
    async fn validation_happens_before_any_request() {
        let h = harness();

        let mismatch = AuthForm {
            email: "a@b.com".into(),
            password: "pw".into(),
            confirm_password: "pw2".into(),
        };
        let err = h.flow.submit(AuthMode::Register, &mismatch).await.unwrap_err();
        assert_eq!(err, ClientError::validation("Passwords do not match"));

        let err = h
            .flow
            .submit(AuthMode::Login, &form("  ", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::validation("Please fill in all fields"));

        assert!(h.mock.requests().is_empty());
    }

    #[test]
    fn confirm_password_ignored_in_login_mode() {
        let f = AuthForm {
            email: " a@b.com ".into(),
            password: "pw".into(),
            confirm_password: String::new(),
        };
        assert_eq!(
            f.validate(AuthMode::Login).unwrap(),
            Credentials::new("a@b.com", "pw")
        );
    }

    #[tokio::test]
    async fn logout_clears_both_fields_and_returns_to_login() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Post,
            LOGIN,
            200,
            json!({"token": "T1", "user_id": "42"}),
        );
        h.flow
            .submit(AuthMode::Login, &form("a@b.com", "pw"))
            .await
            .unwrap();

        h.flow.logout().unwrap();

        assert_eq!(h.storage.raw("token"), None);
        assert_eq!(h.storage.raw("user_id"), None);
        assert!(!h.gate.is_authenticated());
        assert_eq!(
            AppRoute::Main.resolve(h.gate.is_authenticated()),
            AppRoute::Login
        );
    }

    #[test]
    fn mode_toggles() {
        assert_eq!(AuthMode::Login.toggled(), AuthMode::Register);
        assert_eq!(AuthMode::Register.toggled().toggled(), AuthMode::Register);
    }
}
