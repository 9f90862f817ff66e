use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::{HttpClient, RequestOptions};
use super::envelope::{
    ConnectionPayload, ConnectionsPayload, Envelope, EventPayload, EventTasksPayload,
    EventsPayload, NoPayload, TaskPayload, TasksPayload, UserPayload,
};
use super::error::RequestError;
use crate::core::task::TaskType;

pub type GatewayResult<P> = Result<Envelope<P>, RequestError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone_number: i64,
}

/// Partial profile update. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub username: String,
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub username: String,
    pub info: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub username: String,
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of `/add-connection`. This is the single request shape used by every
/// caller (people form and QR scanner alike).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnection {
    pub username: String,
    pub connection_name: String,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<i64>,
}

/// Typed operations against the backend. Screens are generic over this so
/// they can be driven by an in-memory backend in tests.
#[allow(async_fn_in_trait)]
pub trait Gateway {
    async fn login(&self, credentials: &Credentials) -> GatewayResult<UserPayload>;
    async fn register(&self, registration: &Registration) -> GatewayResult<UserPayload>;
    async fn update_user(&self, update: &UserUpdate) -> GatewayResult<UserPayload>;
    async fn logout(&self) -> GatewayResult<NoPayload>;

    async fn create_event(&self, username: &str, name: &str) -> GatewayResult<EventPayload>;
    async fn update_event(&self, update: &EventUpdate) -> GatewayResult<EventPayload>;
    async fn get_events(&self, username: &str) -> GatewayResult<EventsPayload>;
    async fn get_event(&self, username: &str, event_id: &str) -> GatewayResult<EventPayload>;

    async fn create_task(&self, task: &NewTask) -> GatewayResult<TaskPayload>;
    async fn update_task(&self, update: &TaskUpdate) -> GatewayResult<TaskPayload>;
    async fn delete_task(&self, username: &str, task_id: &str) -> GatewayResult<NoPayload>;
    async fn get_user_tasks(&self, username: &str) -> GatewayResult<TasksPayload>;
    async fn get_task(&self, task_id: &str) -> GatewayResult<TaskPayload>;
    async fn get_event_tasks(&self, username: &str, event_id: &str)
    -> GatewayResult<EventTasksPayload>;

    async fn add_connection(&self, connection: &NewConnection) -> GatewayResult<ConnectionPayload>;
    async fn remove_connection(
        &self,
        username: &str,
        connection_id: &str,
    ) -> GatewayResult<NoPayload>;
    async fn get_connections(&self, username: &str) -> GatewayResult<ConnectionsPayload>;

    /// Completed tasks, derived from `get_user_tasks`. There is no dedicated
    /// endpoint; order is preserved.
    async fn get_finished_tasks(&self, username: &str) -> GatewayResult<TasksPayload> {
        let env = self.get_user_tasks(username).await?;
        if !env.success {
            return Ok(env);
        }
        let tasks = env
            .payload
            .tasks
            .into_iter()
            .filter(|t| t.is_completed())
            .collect();
        Ok(Envelope::ok(TasksPayload { tasks }))
    }
}

/// `Gateway` backed by the real REST API.
#[derive(Clone)]
pub struct ApiGateway {
    client: HttpClient,
}

impl ApiGateway {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn connect(base_url: &str) -> Result<Self, RequestError> {
        Ok(Self::new(HttpClient::new(base_url)?))
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn post<B, P>(&self, path: &str, body: &B) -> GatewayResult<P>
    where
        B: Serialize,
        P: DeserializeOwned + Default,
    {
        let body = serde_json::to_value(body).map_err(|e| RequestError::Encode(e.to_string()))?;
        let resp = self.client.request(path, RequestOptions::post(body)).await?;
        Envelope::from_body(resp)
    }

    async fn get<P>(&self, path: &str, opts: RequestOptions) -> GatewayResult<P>
    where
        P: DeserializeOwned + Default,
    {
        let resp = self.client.request(path, opts).await?;
        Envelope::from_body(resp)
    }
}

impl Gateway for ApiGateway {
    async fn login(&self, credentials: &Credentials) -> GatewayResult<UserPayload> {
        log::info!("Logging in as {}", credentials.username);
        self.post("/login", credentials).await
    }

    async fn register(&self, registration: &Registration) -> GatewayResult<UserPayload> {
        log::info!("Registering {}", registration.username);
        self.post("/register", registration).await
    }

    async fn update_user(&self, update: &UserUpdate) -> GatewayResult<UserPayload> {
        self.post("/update-user", update).await
    }

    async fn logout(&self) -> GatewayResult<NoPayload> {
        self.get("/logout", RequestOptions::get()).await
    }

    async fn create_event(&self, username: &str, name: &str) -> GatewayResult<EventPayload> {
        self.post(
            "/create-event",
            &serde_json::json!({ "username": username, "name": name }),
        )
        .await
    }

    async fn update_event(&self, update: &EventUpdate) -> GatewayResult<EventPayload> {
        self.post("/update-event", update).await
    }

    async fn get_events(&self, username: &str) -> GatewayResult<EventsPayload> {
        self.get("/get-events", RequestOptions::get().query("username", Some(username)))
            .await
    }

    async fn get_event(&self, username: &str, event_id: &str) -> GatewayResult<EventPayload> {
        self.get(
            "/get-event",
            RequestOptions::get()
                .query("username", Some(username))
                .query("eventId", Some(event_id)),
        )
        .await
    }

    async fn create_task(&self, task: &NewTask) -> GatewayResult<TaskPayload> {
        self.post("/create-task", task).await
    }

    async fn update_task(&self, update: &TaskUpdate) -> GatewayResult<TaskPayload> {
        self.post("/update-task", update).await
    }

    async fn delete_task(&self, username: &str, task_id: &str) -> GatewayResult<NoPayload> {
        self.post(
            "/delete-task",
            &serde_json::json!({ "username": username, "taskId": task_id }),
        )
        .await
    }

    async fn get_user_tasks(&self, username: &str) -> GatewayResult<TasksPayload> {
        self.get("/get-user-tasks", RequestOptions::get().query("username", Some(username)))
            .await
    }

    async fn get_task(&self, task_id: &str) -> GatewayResult<TaskPayload> {
        self.get("/get-task", RequestOptions::get().query("taskId", Some(task_id)))
            .await
    }

    async fn get_event_tasks(
        &self,
        username: &str,
        event_id: &str,
    ) -> GatewayResult<EventTasksPayload> {
        self.get(
            "/get-event-tasks",
            RequestOptions::get()
                .query("username", Some(username))
                .query("eventId", Some(event_id)),
        )
        .await
    }

    async fn add_connection(&self, connection: &NewConnection) -> GatewayResult<ConnectionPayload> {
        self.post("/add-connection", connection).await
    }

    async fn remove_connection(
        &self,
        username: &str,
        connection_id: &str,
    ) -> GatewayResult<NoPayload> {
        self.post(
            "/remove-connection",
            &serde_json::json!({ "username": username, "connectionId": connection_id }),
        )
        .await
    }

    async fn get_connections(&self, username: &str) -> GatewayResult<ConnectionsPayload> {
        self.get("/get-connections", RequestOptions::get().query("username", Some(username)))
            .await
    }
}
