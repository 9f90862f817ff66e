//! In-memory backend used by the screen tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde_json::json;

use crate::api::envelope::{
    ConnectionPayload, ConnectionsPayload, Envelope, EventPayload, EventTasksPayload,
    EventsPayload, NoPayload, TaskPayload, TasksPayload, UserPayload,
};
use crate::api::error::RequestError;
use crate::api::gateway::{
    Credentials, EventUpdate, Gateway, GatewayResult, NewConnection, NewTask, Registration,
    TaskUpdate, UserUpdate,
};
use crate::core::connection::Connection;
use crate::core::event::EventRecord;
use crate::core::task::TaskRecord;
use crate::core::user::User;

#[derive(Default)]
pub(crate) struct FakeState {
    pub passwords: HashMap<String, String>,
    pub users: HashMap<String, User>,
    pub events: HashMap<String, Vec<EventRecord>>,
    pub tasks: HashMap<String, Vec<TaskRecord>>,
    pub connections: HashMap<String, Vec<Connection>>,
    pub calls: Vec<String>,
    /// Operations that fail at the transport level.
    pub broken: HashSet<&'static str>,
    /// Operations that answer `success: false` with this message.
    pub refused: HashMap<&'static str, String>,
    pub next_id: u32,
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    pub state: Mutex<FakeState>,
}

pub(crate) fn user(name: &str) -> User {
    serde_json::from_value(json!({ "username": name })).unwrap()
}

pub(crate) fn task(id: &str, info: &str, status: &str) -> TaskRecord {
    TaskRecord {
        object_id: Some(id.into()),
        info: info.into(),
        status: Some(status.into()),
        ..TaskRecord::default()
    }
}

pub(crate) fn event(id: &str, name: &str) -> EventRecord {
    EventRecord {
        object_id: Some(id.into()),
        name: Some(name.into()),
        ..EventRecord::default()
    }
}

pub(crate) fn connection(id: &str, name: &str) -> Connection {
    serde_json::from_value(json!({ "_id": id, "connectionName": name })).unwrap()
}

impl FakeGateway {
    pub fn with_user(self, name: &str, password: &str) -> Self {
        {
            let mut s = self.state.lock().unwrap();
            s.passwords.insert(name.into(), password.into());
            s.users.insert(name.into(), user(name));
        }
        self
    }

    pub fn break_op(&self, op: &'static str) {
        self.state.lock().unwrap().broken.insert(op);
    }

    pub fn refuse(&self, op: &'static str, msg: &str) {
        self.state.lock().unwrap().refused.insert(op, msg.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == op).count()
    }

    /// Record the call and apply configured failures.
    fn enter<P: Default>(&self, op: &'static str) -> Result<Option<Envelope<P>>, RequestError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(op.to_string());
        if s.broken.contains(op) {
            return Err(RequestError::Transport(format!("{} unreachable", op)));
        }
        Ok(s.refused.get(op).map(|msg| Envelope::failed(msg.clone())))
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut s = self.state.lock().unwrap();
        s.next_id += 1;
        format!("{}{}", prefix, s.next_id)
    }
}

impl Gateway for FakeGateway {
    async fn login(&self, credentials: &Credentials) -> GatewayResult<UserPayload> {
        if let Some(env) = self.enter("login")? {
            return Ok(env);
        }
        let s = self.state.lock().unwrap();
        if s.passwords.get(&credentials.username) == Some(&credentials.password) {
            Ok(Envelope::ok(UserPayload {
                user: s.users.get(&credentials.username).cloned(),
            }))
        } else {
            Err(RequestError::Status { status: 401, message: "Invalid credentials".into() })
        }
    }

    async fn register(&self, registration: &Registration) -> GatewayResult<UserPayload> {
        if let Some(env) = self.enter("register")? {
            return Ok(env);
        }
        let mut s = self.state.lock().unwrap();
        if s.users.contains_key(&registration.username) {
            return Ok(Envelope::failed("Username already exists"));
        }
        let u: User = serde_json::from_value(json!({
            "username": registration.username,
            "email": registration.email,
            "phoneNumber": registration.phone_number,
        }))
        .unwrap();
        s.passwords.insert(registration.username.clone(), registration.password.clone());
        s.users.insert(registration.username.clone(), u.clone());
        Ok(Envelope::ok(UserPayload { user: Some(u) }))
    }

    async fn update_user(&self, update: &UserUpdate) -> GatewayResult<UserPayload> {
        if let Some(env) = self.enter("update_user")? {
            return Ok(env);
        }
        let mut s = self.state.lock().unwrap();
        let Some(u) = s.users.get_mut(&update.username) else {
            return Ok(Envelope::failed("User not found"));
        };
        if let Some(email) = &update.email {
            u.0.insert("email".into(), json!(email));
        }
        if let Some(phone) = update.phone_number {
            u.0.insert("phoneNumber".into(), json!(phone));
        }
        Ok(Envelope::ok(UserPayload { user: Some(u.clone()) }))
    }

    async fn logout(&self) -> GatewayResult<NoPayload> {
        if let Some(env) = self.enter("logout")? {
            return Ok(env);
        }
        Ok(Envelope::ok(NoPayload {}))
    }

    async fn create_event(&self, username: &str, name: &str) -> GatewayResult<EventPayload> {
        if let Some(env) = self.enter("create_event")? {
            return Ok(env);
        }
        let ev = event(&self.fresh_id("e"), name);
        let mut s = self.state.lock().unwrap();
        s.events.entry(username.into()).or_default().push(ev.clone());
        let u = s.users.get(username).cloned();
        Ok(Envelope::ok(EventPayload { event: Some(ev), user: u }))
    }

    async fn update_event(&self, update: &EventUpdate) -> GatewayResult<EventPayload> {
        if let Some(env) = self.enter("update_event")? {
            return Ok(env);
        }
        let mut s = self.state.lock().unwrap();
        let events = s.events.entry(update.username.clone()).or_default();
        let Some(ev) = events.iter_mut().find(|e| e.server_id() == Some(update.event_id.as_str()))
        else {
            return Ok(Envelope::failed("Event not found"));
        };
        if let Some(name) = &update.name {
            ev.name = Some(name.clone());
        }
        if let Some(date) = &update.date {
            ev.date = Some(date.clone());
        }
        Ok(Envelope::ok(EventPayload { event: Some(ev.clone()), user: None }))
    }

    async fn get_events(&self, username: &str) -> GatewayResult<EventsPayload> {
        if let Some(env) = self.enter("get_events")? {
            return Ok(env);
        }
        let s = self.state.lock().unwrap();
        Ok(Envelope::ok(EventsPayload {
            events: s.events.get(username).cloned().unwrap_or_default(),
        }))
    }

    async fn get_event(&self, username: &str, event_id: &str) -> GatewayResult<EventPayload> {
        if let Some(env) = self.enter("get_event")? {
            return Ok(env);
        }
        let s = self.state.lock().unwrap();
        let ev = s
            .events
            .get(username)
            .and_then(|evs| evs.iter().find(|e| e.server_id() == Some(event_id)))
            .cloned();
        Ok(Envelope::ok(EventPayload { event: ev, user: None }))
    }

    async fn create_task(&self, new: &NewTask) -> GatewayResult<TaskPayload> {
        if let Some(env) = self.enter("create_task")? {
            return Ok(env);
        }
        let mut t = task(&self.fresh_id("t"), &new.info, "pending");
        t.task_type = new.task_type;
        t.event_id = new.event_id.clone();
        let mut s = self.state.lock().unwrap();
        s.tasks.entry(new.username.clone()).or_default().push(t.clone());
        Ok(Envelope::ok(TaskPayload { task: Some(t) }))
    }

    async fn update_task(&self, update: &TaskUpdate) -> GatewayResult<TaskPayload> {
        if let Some(env) = self.enter("update_task")? {
            return Ok(env);
        }
        let mut s = self.state.lock().unwrap();
        let tasks = s.tasks.entry(update.username.clone()).or_default();
        let Some(t) = tasks.iter_mut().find(|t| t.server_id() == Some(update.task_id.as_str()))
        else {
            return Ok(Envelope::failed("Task not found"));
        };
        if let Some(status) = &update.status {
            t.status = Some(status.clone());
        }
        if let Some(info) = &update.info {
            t.info = info.clone();
        }
        if let Some(tt) = update.task_type {
            t.task_type = tt;
        }
        if update.event_id.is_some() {
            t.event_id = update.event_id.clone();
        }
        Ok(Envelope::ok(TaskPayload { task: Some(t.clone()) }))
    }

    async fn delete_task(&self, username: &str, task_id: &str) -> GatewayResult<NoPayload> {
        if let Some(env) = self.enter("delete_task")? {
            return Ok(env);
        }
        let mut s = self.state.lock().unwrap();
        if let Some(tasks) = s.tasks.get_mut(username) {
            tasks.retain(|t| t.server_id() != Some(task_id));
        }
        Ok(Envelope::ok(NoPayload {}))
    }

    async fn get_user_tasks(&self, username: &str) -> GatewayResult<TasksPayload> {
        if let Some(env) = self.enter("get_user_tasks")? {
            return Ok(env);
        }
        let s = self.state.lock().unwrap();
        Ok(Envelope::ok(TasksPayload {
            tasks: s.tasks.get(username).cloned().unwrap_or_default(),
        }))
    }

    async fn get_task(&self, task_id: &str) -> GatewayResult<TaskPayload> {
        if let Some(env) = self.enter("get_task")? {
            return Ok(env);
        }
        let s = self.state.lock().unwrap();
        let t = s
            .tasks
            .values()
            .flatten()
            .find(|t| t.server_id() == Some(task_id))
            .cloned();
        Ok(Envelope::ok(TaskPayload { task: t }))
    }

    async fn get_event_tasks(
        &self,
        username: &str,
        event_id: &str,
    ) -> GatewayResult<EventTasksPayload> {
        if let Some(env) = self.enter("get_event_tasks")? {
            return Ok(env);
        }
        let s = self.state.lock().unwrap();
        let tasks = s
            .tasks
            .get(username)
            .map(|ts| ts.iter().filter(|t| t.belongs_to(event_id)).cloned().collect())
            .unwrap_or_default();
        Ok(Envelope::ok(EventTasksPayload { tasks, event: None }))
    }

    async fn add_connection(&self, new: &NewConnection) -> GatewayResult<ConnectionPayload> {
        if let Some(env) = self.enter("add_connection")? {
            return Ok(env);
        }
        let c = connection(&self.fresh_id("c"), &new.connection_name);
        let mut s = self.state.lock().unwrap();
        s.connections.entry(new.username.clone()).or_default().push(c.clone());
        Ok(Envelope::ok(ConnectionPayload { connection: Some(c) }))
    }

    async fn remove_connection(
        &self,
        username: &str,
        connection_id: &str,
    ) -> GatewayResult<NoPayload> {
        if let Some(env) = self.enter("remove_connection")? {
            return Ok(env);
        }
        let mut s = self.state.lock().unwrap();
        if let Some(cs) = s.connections.get_mut(username) {
            cs.retain(|c| c.server_id() != Some(connection_id));
        }
        Ok(Envelope::ok(NoPayload {}))
    }

    async fn get_connections(&self, username: &str) -> GatewayResult<ConnectionsPayload> {
        if let Some(env) = self.enter("get_connections")? {
            return Ok(env);
        }
        let s = self.state.lock().unwrap();
        Ok(Envelope::ok(ConnectionsPayload {
            connections: s.connections.get(username).cloned().unwrap_or_default(),
        }))
    }
}
