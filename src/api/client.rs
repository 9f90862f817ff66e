use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;

use super::error::RequestError;

/// Options for a single request. `query` entries with a `None` value are dropped.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub query: Vec<(&'static str, Option<String>)>,
    pub headers: Vec<(&'static str, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn query(mut self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        self.query.push((key, value.map(Into::into)));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// JSON-over-HTTP client. Holds a cookie store so the session cookie set by
/// `/login` travels with every later request.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    http: Client,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| RequestError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and return the parsed body. Success is decided by the
    /// HTTP status alone; an unparseable 2xx body comes back as `Value::Null`.
    pub async fn request(&self, path: &str, opts: RequestOptions) -> Result<Value, RequestError> {
        let url = self.url(path);
        let query: Vec<(&str, String)> = opts
            .query
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &opts.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::Transport(format!("Invalid header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RequestError::Transport(format!("Invalid header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        log::debug!("{} {}", opts.method, url);

        let mut req = self.http.request(opts.method, &url).headers(headers);
        if !query.is_empty() {
            req = req.query(&query);
        }
        if let Some(body) = &opts.body {
            req = req.body(body.to_string());
        }

        let resp = req.send().await.map_err(|e| {
            log::warn!("Request to {} failed: {}", url, e);
            RequestError::from(e)
        })?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            log::info!("{} returned {}: {}", url, status, message);
            return Err(RequestError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}
