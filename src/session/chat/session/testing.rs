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

// Test doubles for driving the chat loop without a server or a terminal

use super::core::ChatContext;
use crate::api::{
	AgentApi, Message, ModelSelection, ProviderCatalog, SendAck, SessionSummary,
};
use crate::config::{Config, RenderConfig};
use crate::error::{ChatError, Result};
use crate::server::ServerHandle;
use crate::session::chat::{InputEvent, InputSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const START_SESSION: &str = "ses_start";

/// Cloneable in-memory console
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
	pub fn contents(&self) -> String {
		String::from_utf8_lossy(&self.0.lock()).to_string()
	}
}

impl Write for SharedBuffer {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.lock().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

/// Replays a fixed list of input events, then reports end of input
pub struct ScriptedInput {
	events: VecDeque<InputEvent>,
}

impl ScriptedInput {
	pub fn lines(lines: &[&str]) -> Self {
		Self {
			events: lines.iter().map(|l| InputEvent::Line(l.to_string())).collect(),
		}
	}

	pub fn then(mut self, event: InputEvent) -> Self {
		self.events.push_back(event);
		self
	}

	pub fn remaining(&self) -> usize {
		self.events.len()
	}
}

impl InputSource for ScriptedInput {
	fn read_line(&mut self) -> anyhow::Result<InputEvent> {
		Ok(self.events.pop_front().unwrap_or(InputEvent::Eof))
	}
}

/// Records every call and answers like a tiny agent server
#[derive(Default)]
pub struct MockApi {
	calls: Mutex<Vec<String>>,
	sessions: Mutex<Vec<SessionSummary>>,
	messages: Mutex<HashMap<String, Vec<Message>>>,
	catalog: Option<ProviderCatalog>,
	configured: Option<ModelSelection>,
	substitute: Option<ModelSelection>,
	hang_on_send: Option<Arc<AtomicBool>>,
	fail_send: bool,
	watched: Mutex<Option<Arc<AtomicBool>>>,
	processing_log: Mutex<Vec<(String, bool)>>,
}

impl MockApi {
	pub fn with_catalog(mut self, catalog: ProviderCatalog) -> Self {
		self.catalog = Some(catalog);
		self
	}

	pub fn with_configured(mut self, selection: ModelSelection) -> Self {
		self.configured = Some(selection);
		self
	}

	/// Answer every turn with this model regardless of the request
	pub fn with_substitute(mut self, selection: ModelSelection) -> Self {
		self.substitute = Some(selection);
		self
	}

	/// Never finish a send; raise `interrupt` once the send started
	pub fn hanging(mut self, interrupt: Arc<AtomicBool>) -> Self {
		self.hang_on_send = Some(interrupt);
		self
	}

	pub fn failing_send(mut self) -> Self {
		self.fail_send = true;
		self
	}

	/// Note the value of `flag` at every later call
	pub fn watch_processing(&self, flag: Arc<AtomicBool>) {
		*self.watched.lock() = Some(flag);
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	pub fn processing_log(&self) -> Vec<(String, bool)> {
		self.processing_log.lock().clone()
	}

	fn record(&self, call: String) {
		if let Some(flag) = self.watched.lock().as_ref() {
			self.processing_log
				.lock()
				.push((call.clone(), flag.load(Ordering::SeqCst)));
		}
		self.calls.lock().push(call);
	}

	fn push_turn(&self, session_id: &str, user_text: &str, reply: serde_json::Value) {
		let user = serde_json::from_value(json!({
			"info": {"role": "user"},
			"parts": [{"type": "text", "text": user_text}]
		}))
		.unwrap();
		let assistant = serde_json::from_value(reply).unwrap();
		let mut messages = self.messages.lock();
		let history = messages.entry(session_id.to_string()).or_default();
		history.push(user);
		history.push(assistant);
	}
}

#[async_trait]
impl AgentApi for MockApi {
	async fn create_session(&self) -> Result<String> {
		self.record("create".to_string());
		let mut sessions = self.sessions.lock();
		let id = format!("ses_mock_{}", sessions.len() + 1);
		sessions.push(SessionSummary {
			id: id.clone(),
			title: Some("New session".to_string()),
			time: None,
		});
		Ok(id)
	}

	async fn send_message(&self, session_id: &str, text: &str, selection: &ModelSelection) -> Result<SendAck> {
		self.record(format!("send {} {}", session_id, selection));

		if let Some(interrupt) = &self.hang_on_send {
			self.push_turn(
				session_id,
				text,
				json!({
					"info": {"role": "assistant", "error": {"name": "MessageAbortedError"}},
					"parts": [{"type": "text", "text": "partial answer"}]
				}),
			);
			interrupt.store(true, Ordering::SeqCst);
			std::future::pending::<()>().await;
		}

		if self.fail_send {
			return Err(ChatError::Api {
				endpoint: format!("POST /session/{}/message", session_id),
				status: 502,
				body: "bad gateway".to_string(),
			});
		}

		let used = self.substitute.clone().unwrap_or_else(|| selection.clone());
		self.push_turn(
			session_id,
			text,
			json!({
				"info": {
					"role": "assistant",
					"providerID": used.provider_id,
					"modelID": used.model_id,
					"cost": 0.001
				},
				"parts": [
					{"type": "step-start"},
					{"type": "text", "text": format!("echo: {}", text)},
					{"type": "step-finish", "tokens": {"input": 10, "output": 2}, "cost": 0.001}
				]
			}),
		);
		Ok(SendAck {
			cost: Some(0.001),
			error: None,
			model: Some(used),
		})
	}

	async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>> {
		self.record(format!("messages {}", session_id));
		Ok(self
			.messages
			.lock()
			.get(session_id)
			.cloned()
			.unwrap_or_default())
	}

	async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
		self.record("sessions".to_string());
		Ok(self.sessions.lock().clone())
	}

	async fn abort(&self, session_id: &str) -> Result<()> {
		self.record(format!("abort {}", session_id));
		Ok(())
	}

	async fn discover_defaults(&self) -> Result<HashMap<String, String>> {
		Ok(self.providers().await?.default)
	}

	async fn providers(&self) -> Result<ProviderCatalog> {
		self.record("providers".to_string());
		self.catalog
			.clone()
			.ok_or_else(|| ChatError::malformed("GET /config/providers", "no catalog"))
	}

	async fn configured_model(&self) -> Result<Option<ModelSelection>> {
		Ok(self.configured.clone())
	}
}

/// Context over `api` writing into `buffer`, with plain-text rendering
pub fn context_with(api: Arc<MockApi>, buffer: &SharedBuffer) -> ChatContext {
	context_over(api, buffer, ServerHandle::detached())
}

pub fn context_over(api: Arc<dyn AgentApi>, buffer: &SharedBuffer, server: ServerHandle) -> ChatContext {
	let config = Config {
		render: RenderConfig {
			enable_markdown_rendering: false,
			..Default::default()
		},
		..Default::default()
	};
	ChatContext::new(
		api,
		START_SESSION.to_string(),
		ModelSelection::new("opencode", "kimi-k2.5-free"),
		config,
		server,
		Box::new(buffer.clone()),
	)
}
