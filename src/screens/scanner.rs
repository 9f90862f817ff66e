use regex::Regex;
use std::sync::LazyLock;

use crate::api::error::ApiError;
use crate::api::gateway::{Gateway, NewConnection};
use crate::session::Session;

use super::require_user;

static LINKEDIN_PROFILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:(?:www|[a-z]{2})\.)?linkedin\.com/in/(?P<username>[a-z0-9_%.-]+)/?(?:[?#].*)?$",
    )
    .unwrap()
});

pub const NOT_LINKEDIN: &str = "Not a LinkedIn profile QR code";

/// Pull the profile username out of a scanned QR payload.
pub fn linkedin_username(payload: &str) -> Option<&str> {
    LINKEDIN_PROFILE_RE
        .captures(payload.trim())
        .and_then(|c| c.name("username"))
        .map(|m| m.as_str())
}

/// Camera tab. Accepts one LinkedIn QR code at a time; further scans are
/// ignored until [`ScannerScreen::reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannerScreen {
    pub scanned: Option<String>,
    pub note: String,
    pub error: Option<String>,
    pub added: bool,
}

impl ScannerScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a decoded QR payload. Returns the username when this scan was
    /// accepted.
    pub fn handle_scan(&mut self, payload: &str) -> Option<&str> {
        if self.scanned.is_some() {
            return None;
        }
        match linkedin_username(payload) {
            Some(username) => {
                log::debug!("Scanned LinkedIn profile {}", username);
                self.error = None;
                self.scanned = Some(username.to_string());
                self.scanned.as_deref()
            }
            None => {
                self.error = Some(NOT_LINKEDIN.to_string());
                None
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Save the scanned profile as a connection.
    pub async fn connect<G: Gateway>(
        &mut self,
        gateway: &G,
        session: &Session,
    ) -> Result<(), ApiError> {
        let result = self.add(gateway, session).await;
        match &result {
            Ok(()) => {
                self.added = true;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        result
    }

    async fn add<G: Gateway>(&self, gateway: &G, session: &Session) -> Result<(), ApiError> {
        let username = require_user(session.username())?;
        let scanned = self
            .scanned
            .as_deref()
            .ok_or_else(|| ApiError::validation("Scan a QR code first"))?;
        let request = NewConnection {
            username: username.to_string(),
            connection_name: scanned.to_string(),
            note: self.note.trim().to_string(),
            ..NewConnection::default()
        };
        gateway
            .add_connection(&request)
            .await?
            .into_result("Failed to add connection")?;
        log::info!("Added {} from QR scan", scanned);
        Ok(())
    }
}
