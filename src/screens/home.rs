use crate::api::error::ApiError;
use crate::api::gateway::{EventUpdate, Gateway, NewTask, TaskUpdate};
use crate::core::event::EventRecord;
use crate::core::task::{STATUS_COMPLETED, STATUS_PENDING, TaskRecord, TaskType};
use crate::core::user::User;
use crate::normalize::{EventSummary, derive_events};
use crate::session::Session;

use super::{Effect, FetchTicket, Freshness, LoadState, require_user};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub visible: bool,
    pub info: String,
    pub task_type: TaskType,
    pub event_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub visible: bool,
    pub name: String,
    pub error: Option<String>,
}

/// Result of the parallel events + tasks fetch. Each half fails on its own.
#[derive(Debug)]
pub struct HomeLoad {
    pub events: Result<Vec<EventRecord>, ApiError>,
    pub tasks: Result<Vec<TaskRecord>, ApiError>,
}

/// Home feed: the user's events and tasks.
#[derive(Debug, Default)]
pub struct HomeScreen {
    effect: Effect,
    user: Option<User>,
    username: Option<String>,
    pub state: LoadState,
    fetched_events: Vec<EventRecord>,
    events_fresh: Freshness,
    tasks: Vec<TaskRecord>,
    tasks_fresh: Freshness,
    pub events_error: Option<String>,
    pub tasks_error: Option<String>,
    pub task_form: TaskForm,
    pub event_form: EventForm,
}

async fn fetch_events<G: Gateway>(gateway: &G, username: &str) -> Result<Vec<EventRecord>, ApiError> {
    let env = gateway.get_events(username).await?;
    Ok(env.into_result("Failed to load events")?.events)
}

async fn fetch_tasks<G: Gateway>(gateway: &G, username: &str) -> Result<Vec<TaskRecord>, ApiError> {
    let env = gateway.get_user_tasks(username).await?;
    Ok(env.into_result("Failed to load tasks")?.tasks)
}

impl HomeScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up the current session. Returns a ticket when a fetch is needed;
    /// a logout clears the screen and invalidates any fetch in flight.
    pub fn sync_session(&mut self, session: &Session) -> Option<FetchTicket> {
        self.user = session.user().cloned();
        let username = session.username();
        if username == self.username.as_deref() && self.state != LoadState::Idle {
            return None;
        }
        if username != self.username.as_deref() {
            // Another user's data must never show under this one.
            self.clear();
            self.username = username.map(str::to_string);
        }
        self.restart()
    }

    /// Start a new fetch cycle for the current user.
    pub fn reload(&mut self) -> Option<FetchTicket> {
        self.restart()
    }

    fn restart(&mut self) -> Option<FetchTicket> {
        let ticket = self.effect.restart(self.username.as_deref());
        if ticket.is_some() {
            self.state = LoadState::Loading;
        } else {
            log::debug!("Home: no user, clearing");
            self.state = LoadState::Idle;
            self.clear();
        }
        ticket
    }

    fn clear(&mut self) {
        self.fetched_events.clear();
        self.tasks.clear();
        self.events_error = None;
        self.tasks_error = None;
        self.task_form = TaskForm::default();
        self.event_form = EventForm::default();
    }

    /// Fetch events and tasks concurrently.
    pub async fn load<G: Gateway>(gateway: &G, ticket: &FetchTicket) -> HomeLoad {
        let (events, tasks) = futures::join!(
            fetch_events(gateway, ticket.username()),
            fetch_tasks(gateway, ticket.username()),
        );
        HomeLoad { events, tasks }
    }

    /// Apply a finished load. Returns `false` if the ticket belongs to an
    /// earlier cycle and the result was dropped. Within the cycle, a
    /// collection already refreshed by a newer fetch keeps its data.
    pub fn apply(&mut self, ticket: &FetchTicket, load: HomeLoad) -> bool {
        if !self.effect.is_current(ticket) {
            log::debug!("Home: discarding stale load for {}", ticket.username());
            return false;
        }
        if self.events_fresh.accept(ticket) {
            self.apply_events(load.events);
        }
        if self.tasks_fresh.accept(ticket) {
            self.apply_tasks(load.tasks);
        }
        self.state = LoadState::Ready;
        true
    }

    fn apply_events(&mut self, events: Result<Vec<EventRecord>, ApiError>) {
        match events {
            Ok(events) => {
                self.fetched_events = events;
                self.events_error = None;
            }
            Err(e) => {
                log::warn!("Home: failed to load events: {}", e);
                self.events_error = Some(e.to_string());
            }
        }
    }

    fn apply_tasks(&mut self, tasks: Result<Vec<TaskRecord>, ApiError>) {
        match tasks {
            Ok(tasks) => {
                self.tasks = tasks;
                self.tasks_error = None;
            }
            Err(e) => {
                log::warn!("Home: failed to load tasks: {}", e);
                self.tasks_error = Some(e.to_string());
            }
        }
    }

    /// Sync with the session and, if needed, fetch and apply in one go.
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

    async fn refetch_tasks<G: Gateway>(&mut self, gateway: &G) {
        let Some(username) = self.username.clone() else { return };
        let ticket = self.effect.follow_up(&username);
        let tasks = fetch_tasks(gateway, &username).await;
        if self.effect.is_current(&ticket) && self.tasks_fresh.accept(&ticket) {
            self.apply_tasks(tasks);
        }
    }

    async fn refetch_events<G: Gateway>(&mut self, gateway: &G) {
        let Some(username) = self.username.clone() else { return };
        let ticket = self.effect.follow_up(&username);
        let events = fetch_events(gateway, &username).await;
        if self.effect.is_current(&ticket) && self.events_fresh.accept(&ticket) {
            self.apply_events(events);
        }
    }

    pub fn events(&self) -> Vec<EventSummary> {
        derive_events(self.user.as_ref(), Some(self.fetched_events.as_slice()))
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter().filter(|t| !t.is_completed())
    }

    pub fn completed_tasks(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter().filter(|t| t.is_completed())
    }

    pub fn tasks_for_event<'a>(&'a self, event_id: &'a str) -> impl Iterator<Item = &'a TaskRecord> {
        self.tasks.iter().filter(move |t| t.belongs_to(event_id))
    }

    pub fn open_task_form(&mut self, event_id: Option<String>) {
        self.task_form = TaskForm {
            visible: true,
            event_id,
            ..TaskForm::default()
        };
    }

    pub fn close_task_form(&mut self) {
        self.task_form = TaskForm::default();
    }

    pub fn open_event_form(&mut self) {
        self.event_form = EventForm {
            visible: true,
            ..EventForm::default()
        };
    }

    pub fn close_event_form(&mut self) {
        self.event_form = EventForm::default();
    }

    /// Create a task from the form. On success the modal closes and tasks are
    /// refetched; on failure the message stays in the form.
    pub async fn submit_task<G: Gateway>(&mut self, gateway: &G) -> Result<(), ApiError> {
        match self.create_task(gateway).await {
            Ok(()) => {
                self.close_task_form();
                self.refetch_tasks(gateway).await;
                Ok(())
            }
            Err(e) => {
                self.task_form.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn create_task<G: Gateway>(&self, gateway: &G) -> Result<(), ApiError> {
        let info = self.task_form.info.trim();
        if info.is_empty() {
            return Err(ApiError::validation("Task info is required"));
        }
        let username = require_user(self.username.as_deref())?;
        let new = NewTask {
            username: username.to_string(),
            info: info.to_string(),
            task_type: self.task_form.task_type,
            event_id: self.task_form.event_id.clone().filter(|id| !id.is_empty()),
        };
        gateway
            .create_task(&new)
            .await?
            .into_result("Failed to create task")?;
        log::info!("Created task for {}", username);
        Ok(())
    }

    /// Flip a task between completed and pending.
    pub async fn toggle_task<G: Gateway>(&mut self, gateway: &G, task_id: &str) -> Result<(), ApiError> {
        let result = self.set_status(gateway, task_id).await;
        self.finish_task_mutation(gateway, result).await
    }

    async fn set_status<G: Gateway>(&self, gateway: &G, task_id: &str) -> Result<(), ApiError> {
        let username = require_user(self.username.as_deref())?;
        let task = self
            .tasks
            .iter()
            .find(|t| t.server_id() == Some(task_id))
            .ok_or_else(|| ApiError::validation("Task not found"))?;
        let status = if task.is_completed() { STATUS_PENDING } else { STATUS_COMPLETED };
        let update = TaskUpdate {
            username: username.to_string(),
            task_id: task_id.to_string(),
            status: Some(status.to_string()),
            ..TaskUpdate::default()
        };
        gateway
            .update_task(&update)
            .await?
            .into_result("Failed to update task")?;
        Ok(())
    }

    pub async fn delete_task<G: Gateway>(&mut self, gateway: &G, task_id: &str) -> Result<(), ApiError> {
        let result = match require_user(self.username.as_deref()) {
            Ok(username) => match gateway.delete_task(username, task_id).await {
                Ok(env) => env.into_result("Failed to delete task").map(|_| ()),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };
        self.finish_task_mutation(gateway, result).await
    }

    async fn finish_task_mutation<G: Gateway>(
        &mut self,
        gateway: &G,
        result: Result<(), ApiError>,
    ) -> Result<(), ApiError> {
        match result {
            Ok(()) => {
                self.refetch_tasks(gateway).await;
                Ok(())
            }
            Err(e) => {
                self.tasks_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Create an event from the form. The server returns the updated user,
    /// which replaces the session copy.
    pub async fn submit_event<G: Gateway>(
        &mut self,
        gateway: &G,
        session: &mut Session,
    ) -> Result<(), ApiError> {
        let name = self.event_form.name.trim().to_string();
        let result = if name.is_empty() {
            Err(ApiError::validation("Event name is required"))
        } else {
            match require_user(self.username.as_deref()) {
                Ok(username) => match gateway.create_event(username, &name).await {
                    Ok(env) => env.into_result("Failed to create event"),
                    Err(e) => Err(e.into()),
                },
                Err(e) => Err(e),
            }
        };
        match result {
            Ok(payload) => {
                if let Some(user) = payload.user {
                    session.replace(user);
                    self.user = session.user().cloned();
                }
                self.close_event_form();
                self.refetch_events(gateway).await;
                Ok(())
            }
            Err(e) => {
                self.event_form.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn rename_event<G: Gateway>(
        &mut self,
        gateway: &G,
        event_id: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let name = name.trim();
        let result = if name.is_empty() {
            Err(ApiError::validation("Event name is required"))
        } else {
            match require_user(self.username.as_deref()) {
                Ok(username) => {
                    let update = EventUpdate {
                        username: username.to_string(),
                        event_id: event_id.to_string(),
                        name: Some(name.to_string()),
                        ..EventUpdate::default()
                    };
                    match gateway.update_event(&update).await {
                        Ok(env) => env.into_result("Failed to update event").map(|_| ()),
                        Err(e) => Err(e.into()),
                    }
                }
                Err(e) => Err(e),
            }
        };
        match result {
            Ok(()) => {
                self.refetch_events(gateway).await;
                Ok(())
            }
            Err(e) => {
                self.events_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
