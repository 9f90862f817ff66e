use crate::core::user::User;

/// The logged-in user for this process. Established by a successful login
/// or registration, torn down on logout; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn establish(&mut self, user: User) {
        log::info!("Session established for {}", user.username().unwrap_or("<unknown>"));
        self.user = Some(user);
    }

    /// Swap in a fresher copy of the user returned by a mutation.
    pub fn replace(&mut self, user: User) {
        if self.user.is_some() {
            self.user = Some(user);
        } else {
            log::warn!("Ignoring user update with no active session");
        }
    }

    pub fn tear_down(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("Session closed for {}", user.username().unwrap_or("<unknown>"));
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().and_then(User::username)
    }

    pub fn is_active(&self) -> bool {
        self.user.is_some()
    }
}
