use crate::api::error::ApiError;
use crate::api::gateway::{Gateway, UserUpdate};
use crate::session::Session;

use super::{parse_phone, require_user};

/// Profile tab: contact details and logout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub email: String,
    pub phone: String,
    pub error: Option<String>,
    pub saved: bool,
}

impl ProfileForm {
    pub fn from_session(session: &Session) -> Self {
        let user = session.user();
        Self {
            email: user.and_then(|u| u.email()).unwrap_or_default().to_string(),
            phone: user.and_then(|u| u.phone_number()).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Push edited fields to the server and adopt the returned user.
    pub async fn submit<G: Gateway>(
        &mut self,
        gateway: &G,
        session: &mut Session,
    ) -> Result<(), ApiError> {
        self.saved = false;
        match self.update(gateway, session).await {
            Ok(()) => {
                self.error = None;
                self.saved = true;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn update<G: Gateway>(&self, gateway: &G, session: &mut Session) -> Result<(), ApiError> {
        let update = UserUpdate {
            username: require_user(session.username())?.to_string(),
            email: Some(self.email.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            phone_number: parse_phone(&self.phone)?,
            ..UserUpdate::default()
        };
        let payload = gateway
            .update_user(&update)
            .await?
            .into_result("Failed to update profile")?;
        if let Some(user) = payload.user {
            session.replace(user);
        }
        Ok(())
    }
}

/// End the session. Local state is torn down even if the server call fails;
/// the error is still reported.
pub async fn logout<G: Gateway>(gateway: &G, session: &mut Session) -> Result<(), ApiError> {
    let result = match gateway.logout().await {
        Ok(env) => env.into_result("Logout failed").map(|_| ()),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = &result {
        log::warn!("Logout request failed: {}", e);
    }
    session.tear_down();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::fake::FakeGateway;
    use crate::screens::home::HomeScreen;
    use crate::screens::LoadState;
    use crate::screens::auth::LoginForm;

    async fn logged_in(gw: &FakeGateway) -> Session {
        let mut session = Session::new();
        LoginForm {
            username: "alice".into(),
            password: "pw".into(),
            ..LoginForm::default()
        }
        .submit(gw, &mut session)
        .await
        .unwrap();
        session
    }

    #[tokio::test]
    async fn update_replaces_session_user() {
        let gw = FakeGateway::default().with_user("alice", "pw");
        let mut session = logged_in(&gw).await;

        let mut form = ProfileForm::from_session(&session);
        assert_eq!(form.email, "");
        form.email = "alice@example.com".into();
        form.phone = "555-0100".into();
        form.submit(&gw, &mut session).await.unwrap();

        assert!(form.saved);
        let user = session.user().unwrap();
        assert_eq!(user.email(), Some("alice@example.com"));
        assert_eq!(user.phone_number().as_deref(), Some("5550100"));
    }

    #[tokio::test]
    async fn bad_phone_is_not_sent() {
        let gw = FakeGateway::default().with_user("alice", "pw");
        let mut session = logged_in(&gw).await;
        let mut form = ProfileForm { phone: "n/a".into(), ..ProfileForm::default() };
        assert!(form.submit(&gw, &mut session).await.is_err());
        assert_eq!(gw.count("update_user"), 0);
    }

    #[tokio::test]
    async fn logout_tears_down_even_on_failure() {
        let gw = FakeGateway::default().with_user("alice", "pw");
        let mut session = logged_in(&gw).await;
        gw.break_op("logout");
        assert!(logout(&gw, &mut session).await.is_err());
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn logout_resets_screens() {
        let gw = FakeGateway::default().with_user("alice", "pw");
        let mut session = logged_in(&gw).await;
        let mut home = HomeScreen::new();
        home.on_session_changed(&gw, &session).await;
        assert_eq!(home.state, LoadState::Ready);

        logout(&gw, &mut session).await.unwrap();
        home.on_session_changed(&gw, &session).await;
        assert_eq!(home.state, LoadState::Idle);
    }
}
