//! Per-screen view state. Each screen owns its collections exclusively and
//! refetches on its own; nothing is shared between screens except the
//! [`Session`](crate::session::Session) handed in by the caller.
//!
//! Fetches follow a ticket protocol: a screen hands out a [`FetchTicket`]
//! when its user changes, the caller runs the load, and the result is only
//! applied if the ticket is still the newest one.

pub mod auth;
pub mod home;
pub mod people;
pub mod profile;
pub mod scanner;

#[cfg(test)]
pub(crate) mod fake;

use crate::api::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No user; collections are empty.
    #[default]
    Idle,
    Loading,
    /// Data present, possibly empty, possibly with an error message alongside.
    Ready,
}

/// Identifies one fetch. Tickets from an earlier cycle are rejected on
/// apply, and a collection never takes data older than what it already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    seq: u64,
    username: String,
}

impl FetchTicket {
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Counters behind a screen's fetch-on-user-change effect. `generation`
/// changes per cycle; `seq` increases with every ticket issued.
#[derive(Debug, Clone, Default)]
pub(crate) struct Effect {
    generation: u64,
    seq: u64,
}

impl Effect {
    /// Invalidate every outstanding ticket and, if there is a user, issue a
    /// fresh one.
    pub(crate) fn restart(&mut self, username: Option<&str>) -> Option<FetchTicket> {
        self.generation += 1;
        username.map(|u| self.issue(u))
    }

    pub(crate) fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Ticket for a follow-up fetch within the current cycle. It outranks
    /// every ticket issued before it.
    pub(crate) fn follow_up(&mut self, username: &str) -> FetchTicket {
        self.issue(username)
    }

    fn issue(&mut self, username: &str) -> FetchTicket {
        self.seq += 1;
        FetchTicket {
            generation: self.generation,
            seq: self.seq,
            username: username.to_string(),
        }
    }
}

/// Newest ticket a collection has taken data from.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Freshness {
    seq: u64,
}

impl Freshness {
    /// Accept `ticket` if it is newer than the data already held.
    pub(crate) fn accept(&mut self, ticket: &FetchTicket) -> bool {
        if ticket.seq > self.seq {
            self.seq = ticket.seq;
            true
        } else {
            false
        }
    }
}

pub(crate) const NOT_LOGGED_IN: &str = "You must be logged in";

pub(crate) fn require_user(username: Option<&str>) -> Result<&str, ApiError> {
    username.ok_or_else(|| ApiError::validation(NOT_LOGGED_IN))
}

/// Parse a phone number typed into a form. Blank input is `None`; spaces,
/// dashes, dots and parentheses are ignored.
pub fn parse_phone(input: &str) -> Result<Option<i64>, ApiError> {
    let digits: String = input
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    if digits.is_empty() {
        return Ok(None);
    }
    digits
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ApiError::validation("Phone number must be a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_invalidates_older() {
        let mut effect = Effect::default();
        let first = effect.restart(Some("alice")).unwrap();
        let second = effect.restart(Some("bob")).unwrap();
        assert!(!effect.is_current(&first));
        assert!(effect.is_current(&second));
        assert!(effect.restart(None).is_none());
        assert!(!effect.is_current(&second));
    }

    #[test]
    fn follow_up_outranks_earlier_ticket() {
        let mut effect = Effect::default();
        let load = effect.restart(Some("alice")).unwrap();
        let refetch = effect.follow_up("alice");
        assert!(effect.is_current(&load));

        let mut tasks = Freshness::default();
        assert!(tasks.accept(&refetch));
        assert!(!tasks.accept(&load));
    }

    #[test]
    fn phone_parsing() {
        assert_eq!(parse_phone("").unwrap(), None);
        assert_eq!(parse_phone("555-0123").unwrap(), Some(5550123));
        assert_eq!(parse_phone("(555) 012 3456").unwrap(), Some(5550123456));
        assert_eq!(
            parse_phone("call me").unwrap_err().to_string(),
            "Phone number must be a number"
        );
    }
}
