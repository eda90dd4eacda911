use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::constants::{EVENT_TYPES, FETCH_EVENT_TYPES};
use crate::error::{CoreError, Result};
use crate::models::{InitialSnapshot, Message, MessageFlag, MessageId, Narrow};
use crate::normalize::{self, RawMessage, RawRegisterResponse};
use crate::events::ServerEvent;

/// Long polls are held open by the server for about a minute.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct Credentials {
    pub server_url: String,
    pub email: String,
    pub api_key: String,
}

/// Every API response carries a result marker; errors add a message and code.
#[derive(Debug, Deserialize)]
struct ApiStatus {
    result: String,
    #[serde(default)]
    msg: String,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Vec<RawMessage>,
}

/// Event queue position: where polling resumes.
#[derive(Debug, Clone)]
pub struct QueuePosition {
    pub queue_id: String,
    pub last_event_id: i64,
}

/// Thin HTTP client for the chat server API. No retries: failures surface as
/// `ServerConnectionFailure` and the caller decides what to do.
pub struct ServerClient {
    credentials: Credentials,
    client: reqwest::Client,
}

impl ServerClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("zterm/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            credentials,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/v1/{}",
            self.credentials.server_url.trim_end_matches('/'),
            path
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Value> {
        let response = request
            .basic_auth(&self.credentials.email, Some(&self.credentials.api_key))
            .send()
            .await
            .map_err(|e| CoreError::ServerConnectionFailure(format!("{what}: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| CoreError::ServerConnectionFailure(format!("{what} ({status}): {e}")))?;

        let api: ApiStatus = serde_json::from_value(body.clone())?;
        if api.result != "success" {
            let code = api.code.unwrap_or_else(|| status.to_string());
            return Err(CoreError::ServerConnectionFailure(format!(
                "{what} failed ({code}): {}",
                api.msg
            )));
        }
        Ok(body)
    }

    /// Register an event queue and fetch the initial state.
    pub async fn register(&self) -> Result<InitialSnapshot> {
        let params = [
            ("event_types", serde_json::to_string(EVENT_TYPES)?),
            ("fetch_event_types", serde_json::to_string(FETCH_EVENT_TYPES)?),
            ("apply_markdown", "true".to_string()),
            ("client_gravatar", "true".to_string()),
        ];
        let body = self
            .send(self.client.post(self.url("register")).form(&params), "register")
            .await?;
        let raw: RawRegisterResponse = serde_json::from_value(body)?;
        let snapshot = normalize::normalize_snapshot(raw)?;
        info!(
            "Registered queue {} as {}",
            snapshot.queue_id, snapshot.me.email
        );
        Ok(snapshot)
    }

    /// Long-poll for events after `position`, advancing it past what was
    /// received.
    pub async fn get_events(&self, position: &mut QueuePosition) -> Result<Vec<ServerEvent>> {
        let query = [
            ("queue_id", position.queue_id.clone()),
            ("last_event_id", position.last_event_id.to_string()),
        ];
        let body = self
            .send(self.client.get(self.url("events")).query(&query), "get events")
            .await?;
        let response: EventsResponse = serde_json::from_value(body)?;
        let (last_id, events) = normalize::normalize_events(response.events)?;
        if let Some(last_id) = last_id {
            position.last_event_id = position.last_event_id.max(last_id);
        }
        debug!("Received {} events", events.len());
        Ok(events)
    }

    /// Fetch messages around `anchor` under `narrow`.
    pub async fn get_messages(
        &self,
        narrow: &Narrow,
        anchor: MessageId,
        num_before: u32,
        num_after: u32,
    ) -> Result<Vec<Message>> {
        let query = [
            ("anchor", anchor.to_string()),
            ("num_before", num_before.to_string()),
            ("num_after", num_after.to_string()),
            ("apply_markdown", "true".to_string()),
            ("narrow", narrow_to_wire(narrow).to_string()),
        ];
        let body = self
            .send(self.client.get(self.url("messages")).query(&query), "get messages")
            .await?;
        let response: MessagesResponse = serde_json::from_value(body)?;
        response
            .messages
            .into_iter()
            .map(|raw| normalize::normalize_message(raw, None))
            .collect()
    }

    pub async fn update_message_flags(&self, ids: &[MessageId], flag: MessageFlag, add: bool) -> Result<()> {
        let params = [
            ("messages", serde_json::to_string(ids)?),
            ("op", if add { "add" } else { "remove" }.to_string()),
            ("flag", flag.as_wire().to_string()),
        ];
        self.send(self.client.post(self.url("messages/flags")).form(&params), "update flags")
            .await?;
        Ok(())
    }
}

/// `[{operator, operand}, ...]`
pub fn narrow_to_wire(narrow: &Narrow) -> Value {
    Value::Array(
        narrow
            .clauses()
            .into_iter()
            .map(|(operator, operand)| serde_json::json!({ "operator": operator, "operand": operand }))
            .collect(),
    )
}
