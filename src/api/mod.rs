// Copyright 2025 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Client for the OpenCode session API

pub mod types;

pub use types::{
	last_assistant, Message, MessageError, MessageInfo, ModelSelection, Part, ProviderCatalog,
	ProviderInfo, Role, SendAck, SessionSummary, ToolPart, ToolState, ToolStatus,
};

use crate::config::Config;
use crate::error::{sanitize_body, ChatError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Operations the chat loop needs from the agent server
#[async_trait]
pub trait AgentApi: Send + Sync {
	/// Create a fresh session and return its id
	async fn create_session(&self) -> Result<String>;

	/// Submit one user turn; returns once the server finished the turn
	async fn send_message(
		&self,
		session_id: &str,
		text: &str,
		selection: &ModelSelection,
	) -> Result<SendAck>;

	/// All messages of a session, oldest first
	async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>>;

	async fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

	/// Stop whatever the session is doing; harmless when it is idle
	async fn abort(&self, session_id: &str) -> Result<()>;

	/// Provider id to default model id
	async fn discover_defaults(&self) -> Result<HashMap<String, String>>;

	async fn providers(&self) -> Result<ProviderCatalog>;

	/// The `provider/model` the server itself is configured with
	async fn configured_model(&self) -> Result<Option<ModelSelection>>;
}

/// Anything starting with `<` is markup, JSON never does
pub fn looks_like_html(body: &str) -> bool {
	body.trim_start().starts_with('<')
}

pub struct SessionClient {
	base_url: String,
	client: Client,
	send_timeout: Duration,
}

impl SessionClient {
	pub fn new(base_url: &str, config: &Config) -> Result<Self> {
		let client = Client::builder()
			.timeout(config.request_timeout())
			.build()
			.map_err(|e| ChatError::transport(base_url, e))?;
		Ok(Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			client,
			send_timeout: config.send_timeout(),
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	// Send a request and return the body of a 2xx answer
	async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<String> {
		crate::log_debug!("-> {}", endpoint);

		let response = request
			.send()
			.await
			.map_err(|e| ChatError::transport(endpoint, e))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| ChatError::transport(endpoint, e))?;

		crate::log_debug!("<- {} {} ({} bytes)", endpoint, status.as_u16(), body.len());

		if !status.is_success() {
			return Err(ChatError::Api {
				endpoint: endpoint.to_string(),
				status: status.as_u16(),
				body: sanitize_body(&body),
			});
		}
		Ok(body)
	}

	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
		let endpoint = format!("GET {}", path);
		let body = self.execute(&endpoint, self.client.get(self.url(path))).await?;
		parse_json(&endpoint, &body)
	}
}

fn parse_json<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
	if looks_like_html(body) {
		return Err(ChatError::malformed(endpoint, "received HTML instead of JSON"));
	}
	serde_json::from_str(body).map_err(|e| ChatError::malformed(endpoint, e.to_string()))
}

#[async_trait]
impl AgentApi for SessionClient {
	async fn create_session(&self) -> Result<String> {
		let path = "/session";
		let endpoint = format!("POST {}", path);
		let request = self.client.post(self.url(path)).json(&json!({}));
		let body = self.execute(&endpoint, request).await?;

		let session: SessionSummary = parse_json(&endpoint, &body)?;
		if session.id.is_empty() {
			return Err(ChatError::malformed(endpoint, "session id is empty"));
		}
		crate::log_debug!("Created session {}", session.id);
		Ok(session.id)
	}

	async fn send_message(
		&self,
		session_id: &str,
		text: &str,
		selection: &ModelSelection,
	) -> Result<SendAck> {
		let path = format!("/session/{}/message", session_id);
		let endpoint = format!("POST {}", path);
		let payload = json!({
			"providerID": selection.provider_id,
			"modelID": selection.model_id,
			"parts": [{"type": "text", "text": text}],
		});

		let request = self
			.client
			.post(self.url(&path))
			.timeout(self.send_timeout)
			.json(&payload);
		let body = self.execute(&endpoint, request).await?;

		let ack = SendAck::from_body(&body);
		if let Some(error) = &ack.error {
			crate::log_debug!("Server reported an error for the turn: {}", error);
		}
		Ok(ack)
	}

	async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>> {
		self.get_json(&format!("/session/{}/message", session_id)).await
	}

	async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
		self.get_json("/session").await
	}

	async fn abort(&self, session_id: &str) -> Result<()> {
		let path = format!("/session/{}/abort", session_id);
		let endpoint = format!("POST {}", path);
		self.execute(&endpoint, self.client.post(self.url(&path))).await?;
		Ok(())
	}

	async fn discover_defaults(&self) -> Result<HashMap<String, String>> {
		Ok(self.providers().await?.default)
	}

	async fn providers(&self) -> Result<ProviderCatalog> {
		self.get_json("/config/providers").await
	}

	async fn configured_model(&self) -> Result<Option<ModelSelection>> {
		let config: Value = self.get_json("/config").await?;
		Ok(config
			.get("model")
			.and_then(Value::as_str)
			.and_then(ModelSelection::parse))
	}
}
