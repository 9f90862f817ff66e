use crate::api::error::ApiError;
use crate::api::gateway::{Gateway, NewConnection};
use crate::core::connection::Connection;
use crate::core::user::User;
use crate::normalize::{ListItem, connection_items};
use crate::session::Session;

use super::{Effect, FetchTicket, LoadState, parse_phone, require_user};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionForm {
    pub visible: bool,
    pub name: String,
    pub note: String,
    pub email: String,
    pub phone: String,
    pub error: Option<String>,
}

impl ConnectionForm {
    fn to_request(&self, username: &str) -> Result<NewConnection, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Connection name is required"));
        }
        let email = Some(self.email.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(NewConnection {
            username: username.to_string(),
            connection_name: name.to_string(),
            note: self.note.trim().to_string(),
            email,
            phone_number: parse_phone(&self.phone)?,
        })
    }
}

/// People tab: the user's connections.
#[derive(Debug, Default)]
pub struct PeopleScreen {
    effect: Effect,
    user: Option<User>,
    username: Option<String>,
    pub state: LoadState,
    connections: Vec<Connection>,
    pub error: Option<String>,
    pub form: ConnectionForm,
}

async fn fetch_connections<G: Gateway>(
    gateway: &G,
    username: &str,
) -> Result<Vec<Connection>, ApiError> {
    let env = gateway.get_connections(username).await?;
    Ok(env.into_result("Failed to load connections")?.connections)
}

impl PeopleScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync_session(&mut self, session: &Session) -> Option<FetchTicket> {
        self.user = session.user().cloned();
        let username = session.username();
        if username == self.username.as_deref() && self.state != LoadState::Idle {
            return None;
        }
        if username != self.username.as_deref() {
            self.clear();
            self.username = username.map(str::to_string);
        }
        self.reload()
    }

    pub fn reload(&mut self) -> Option<FetchTicket> {
        let ticket = self.effect.restart(self.username.as_deref());
        if ticket.is_some() {
            self.state = LoadState::Loading;
        } else {
            self.state = LoadState::Idle;
            self.clear();
        }
        ticket
    }

    fn clear(&mut self) {
        self.connections.clear();
        self.error = None;
        self.form = ConnectionForm::default();
    }

    pub async fn load<G: Gateway>(
        gateway: &G,
        ticket: &FetchTicket,
    ) -> Result<Vec<Connection>, ApiError> {
        fetch_connections(gateway, ticket.username()).await
    }

    pub fn apply(&mut self, ticket: &FetchTicket, load: Result<Vec<Connection>, ApiError>) -> bool {
        if !self.effect.is_current(ticket) {
            log::debug!("People: discarding stale load for {}", ticket.username());
            return false;
        }
        match load {
            Ok(connections) => {
                self.connections = connections;
                self.error = None;
            }
            Err(e) => {
                log::warn!("People: failed to load connections: {}", e);
                self.error = Some(e.to_string());
            }
        }
        self.state = LoadState::Ready;
        true
    }

    pub async fn on_session_changed<G: Gateway>(&mut self, gateway: &G, session: &Session) {
        if let Some(ticket) = self.sync_session(session) {
            let load = Self::load(gateway, &ticket).await;
            self.apply(&ticket, load);
        }
    }

    pub async fn refresh<G: Gateway>(&mut self, gateway: &G) {
        if let Some(ticket) = self.reload() {
            let load = Self::load(gateway, &ticket).await;
            self.apply(&ticket, load);
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Rows to render; the user's embedded connections stand in until the
    /// server returns a non-empty list.
    pub fn items(&self) -> Vec<ListItem> {
        connection_items(self.user.as_ref(), &self.connections)
    }

    pub fn open_form(&mut self) {
        self.form = ConnectionForm {
            visible: true,
            ..ConnectionForm::default()
        };
    }

    pub fn close_form(&mut self) {
        self.form = ConnectionForm::default();
    }

    pub async fn submit_connection<G: Gateway>(&mut self, gateway: &G) -> Result<(), ApiError> {
        let result = match require_user(self.username.as_deref())
            .and_then(|u| self.form.to_request(u))
        {
            Ok(request) => match gateway.add_connection(&request).await {
                Ok(env) => env.into_result("Failed to add connection").map(|_| ()),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                self.close_form();
                self.refresh(gateway).await;
                Ok(())
            }
            Err(e) => {
                self.form.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn remove_connection<G: Gateway>(
        &mut self,
        gateway: &G,
        connection_id: &str,
    ) -> Result<(), ApiError> {
        let result = match require_user(self.username.as_deref()) {
            Ok(username) => match gateway.remove_connection(username, connection_id).await {
                Ok(env) => env.into_result("Failed to remove connection").map(|_| ()),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                self.refresh(gateway).await;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
