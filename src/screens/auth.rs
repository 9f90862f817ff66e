use crate::api::error::ApiError;
use crate::api::gateway::{Credentials, Gateway, Registration};
use crate::core::user::User;
use crate::session::Session;

use super::parse_phone;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginForm {
    /// Log in and establish the session.
    pub async fn submit<G: Gateway>(
        &mut self,
        gateway: &G,
        session: &mut Session,
    ) -> Result<(), ApiError> {
        let result = self.login(gateway).await;
        finish(result, &mut self.error, session)
    }

    async fn login<G: Gateway>(&self, gateway: &G) -> Result<User, ApiError> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(ApiError::validation("Username and password are required"));
        }
        let credentials = Credentials {
            username: username.to_string(),
            password: self.password.clone(),
        };
        let payload = gateway
            .login(&credentials)
            .await?
            .into_result("Login failed")?;
        payload
            .user
            .ok_or_else(|| ApiError::Logical("Login failed".into()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: String,
    pub error: Option<String>,
}

impl RegisterForm {
    fn to_request(&self) -> Result<Registration, ApiError> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.is_empty() || self.password.is_empty() || email.is_empty() {
            return Err(ApiError::validation("All fields are required"));
        }
        let phone_number = parse_phone(&self.phone)?
            .ok_or_else(|| ApiError::validation("All fields are required"))?;
        Ok(Registration {
            username: username.to_string(),
            password: self.password.clone(),
            email: email.to_string(),
            phone_number,
        })
    }

    /// Register and, on success, establish the session.
    pub async fn submit<G: Gateway>(
        &mut self,
        gateway: &G,
        session: &mut Session,
    ) -> Result<(), ApiError> {
        let result = self.register(gateway).await;
        finish(result, &mut self.error, session)
    }

    async fn register<G: Gateway>(&self, gateway: &G) -> Result<User, ApiError> {
        let request = self.to_request()?;
        let payload = gateway
            .register(&request)
            .await?
            .into_result("Registration failed")?;
        payload
            .user
            .ok_or_else(|| ApiError::Logical("Registration failed".into()))
    }
}

fn finish(
    result: Result<User, ApiError>,
    error: &mut Option<String>,
    session: &mut Session,
) -> Result<(), ApiError> {
    match result {
        Ok(user) => {
            *error = None;
            session.establish(user);
            Ok(())
        }
        Err(e) => {
            log::info!("Authentication failed: {}", e);
            *error = Some(e.to_string());
            Err(e)
        }
    }
}
