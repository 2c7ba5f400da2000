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

// Wire types for the OpenCode session API
//
// Everything here is deliberately lenient: fields default when missing and a
// part that does not match its declared kind degrades to `Part::Unknown`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Provider/model pair sent with every message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
	#[serde(rename = "providerID")]
	pub provider_id: String,
	#[serde(rename = "modelID")]
	pub model_id: String,
}

impl ModelSelection {
	pub fn new(provider_id: impl Into<String>, model_id: impl Into<String>) -> Self {
		Self {
			provider_id: provider_id.into(),
			model_id: model_id.into(),
		}
	}

	/// Parse `provider/model`. Only the first slash separates, model ids such
	/// as `openrouter/anthropic/claude-sonnet-4` keep their own slashes.
	pub fn parse(arg: &str) -> Option<Self> {
		let (provider, model) = arg.trim().split_once('/')?;
		let (provider, model) = (provider.trim(), model.trim());
		if provider.is_empty() || model.is_empty() {
			return None;
		}
		Some(Self::new(provider, model))
	}
}

impl fmt::Display for ModelSelection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.provider_id, self.model_id)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionTime {
	#[serde(default, deserialize_with = "lenient_u64")]
	pub created: u64,
	#[serde(default, deserialize_with = "lenient_u64")]
	pub updated: u64,
}

/// Entry of `GET /session`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionSummary {
	pub id: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub time: Option<SessionTime>,
}

impl SessionSummary {
	/// Creation time; the server reports milliseconds since the epoch
	pub fn created_at(&self) -> Option<DateTime<Utc>> {
		let created = self.time.as_ref()?.created;
		if created == 0 {
			return None;
		}
		DateTime::<Utc>::from_timestamp_millis(created as i64)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Assistant,
	#[default]
	#[serde(other)]
	Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CacheTokens {
	#[serde(default, deserialize_with = "lenient_u64")]
	pub read: u64,
	#[serde(default, deserialize_with = "lenient_u64")]
	pub write: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tokens {
	#[serde(default, deserialize_with = "lenient_u64")]
	pub input: u64,
	#[serde(default, deserialize_with = "lenient_u64")]
	pub output: u64,
	#[serde(default, deserialize_with = "lenient_u64")]
	pub reasoning: u64,
	#[serde(default)]
	pub cache: CacheTokens,
}

impl Tokens {
	/// Tokens shown to the user: prompt plus completion
	pub fn total(&self) -> u64 {
		self.input.saturating_add(self.output)
	}
}

/// Assistant-level error attached to a message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageError {
	#[serde(default = "default_error_name")]
	pub name: String,
	#[serde(default)]
	pub data: Option<Value>,
}

fn default_error_name() -> String {
	"Error".to_string()
}

impl MessageError {
	pub fn message(&self) -> String {
		match &self.data {
			Some(Value::Object(map)) => map
				.get("message")
				.and_then(Value::as_str)
				.map(str::to_string)
				.unwrap_or_else(|| Value::Object(map.clone()).to_string()),
			Some(Value::String(text)) => text.clone(),
			Some(other) => other.to_string(),
			None => String::new(),
		}
	}

	pub fn provider_id(&self) -> Option<&str> {
		self.data.as_ref()?.get("providerID")?.as_str()
	}

	pub fn is_aborted(&self) -> bool {
		self.name == "MessageAbortedError"
	}

	pub fn is_provider_auth(&self) -> bool {
		self.name == "ProviderAuthError"
	}
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageInfo {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub role: Role,
	#[serde(default)]
	pub error: Option<MessageError>,
	#[serde(default)]
	pub cost: Option<f64>,
	#[serde(default)]
	pub tokens: Option<Tokens>,
	#[serde(rename = "providerID", default)]
	pub provider_id: Option<String>,
	#[serde(rename = "modelID", default)]
	pub model_id: Option<String>,
}

impl MessageInfo {
	/// The provider/model the server reports it actually used
	pub fn used_model(&self) -> Option<ModelSelection> {
		match (&self.provider_id, &self.model_id) {
			(Some(provider), Some(model)) => Some(ModelSelection::new(provider, model)),
			_ => None,
		}
	}
}

/// Entry of `GET /session/{id}/message`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
	#[serde(default)]
	pub info: MessageInfo,
	#[serde(default)]
	pub parts: Vec<Part>,
}

impl Message {
	pub fn is_assistant(&self) -> bool {
		self.info.role == Role::Assistant
	}
}

/// Last assistant message of a conversation, scanning from the newest
pub fn last_assistant(messages: &[Message]) -> Option<&Message> {
	messages.iter().rev().find(|message| message.is_assistant())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextPart {
	#[serde(default)]
	pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
	#[default]
	Pending,
	Running,
	Completed,
	Error,
	#[serde(other)]
	Unknown,
}

impl ToolStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ToolStatus::Pending => "pending",
			ToolStatus::Running => "running",
			ToolStatus::Completed => "completed",
			ToolStatus::Error => "error",
			ToolStatus::Unknown => "unknown",
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolState {
	#[serde(default)]
	pub status: ToolStatus,
	#[serde(default)]
	pub input: Option<Value>,
	#[serde(default)]
	pub output: Option<Value>,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolPart {
	#[serde(default)]
	pub tool: String,
	#[serde(rename = "callID", default)]
	pub call_id: Option<String>,
	#[serde(default)]
	pub state: ToolState,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StepStartPart {
	#[serde(default, alias = "title")]
	pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StepFinishPart {
	#[serde(default, alias = "title")]
	pub name: Option<String>,
	#[serde(default)]
	pub reason: Option<String>,
	#[serde(default)]
	pub tokens: Tokens,
	#[serde(default)]
	pub cost: f64,
}

impl StepFinishPart {
	pub fn label(&self) -> Option<&str> {
		self.name.as_deref().or(self.reason.as_deref())
	}
}

/// One fragment of a message
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
	Text(TextPart),
	Reasoning(TextPart),
	Tool(ToolPart),
	StepStart(StepStartPart),
	StepFinish(StepFinishPart),
	/// Any kind we do not know, or a known kind with an unexpected shape
	Unknown { kind: String, raw: Value },
}

impl Part {
	pub fn from_value(raw: Value) -> Self {
		let kind = raw
			.get("type")
			.and_then(Value::as_str)
			.unwrap_or("unknown")
			.to_string();

		let parsed = match kind.as_str() {
			"text" => serde_json::from_value(raw.clone()).map(Part::Text),
			"reasoning" => serde_json::from_value(raw.clone()).map(Part::Reasoning),
			"tool" => serde_json::from_value(raw.clone()).map(Part::Tool),
			"step-start" => serde_json::from_value(raw.clone()).map(Part::StepStart),
			"step-finish" => serde_json::from_value(raw.clone()).map(Part::StepFinish),
			_ => return Part::Unknown { kind, raw },
		};

		match parsed {
			Ok(part) => part,
			Err(e) => {
				crate::log_debug!("Part of kind '{}' did not parse: {}", kind, e);
				Part::Unknown { kind, raw }
			}
		}
	}

	/// The server-side `type` tag
	pub fn kind(&self) -> &str {
		match self {
			Part::Text(_) => "text",
			Part::Reasoning(_) => "reasoning",
			Part::Tool(_) => "tool",
			Part::StepStart(_) => "step-start",
			Part::StepFinish(_) => "step-finish",
			Part::Unknown { kind, .. } => kind,
		}
	}
}

impl<'de> Deserialize<'de> for Part {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = Value::deserialize(deserializer)?;
		Ok(Part::from_value(raw))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelCost {
	#[serde(default)]
	pub input: f64,
	#[serde(default)]
	pub output: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelInfo {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub cost: Option<ModelCost>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderInfo {
	pub id: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub models: BTreeMap<String, ModelInfo>,
}

/// Body of `GET /config/providers`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderCatalog {
	#[serde(default)]
	pub providers: Vec<ProviderInfo>,
	#[serde(default)]
	pub default: HashMap<String, String>,
}

impl ProviderCatalog {
	pub fn provider(&self, id: &str) -> Option<&ProviderInfo> {
		self.providers.iter().find(|provider| provider.id == id)
	}

	/// First provider, in server order, that advertises a model with this id
	pub fn provider_for_model(&self, model_id: &str) -> Option<&ProviderInfo> {
		self.providers
			.iter()
			.find(|provider| provider.models.contains_key(model_id))
	}

	/// First provider, in server order, that has a default model
	pub fn first_default(&self) -> Option<ModelSelection> {
		self.providers.iter().find_map(|provider| {
			self.default
				.get(&provider.id)
				.map(|model| ModelSelection::new(provider.id.clone(), model.clone()))
		})
	}
}

/// Loose summary of the `POST /session/{id}/message` answer
///
/// The body is not trusted to follow any declared shape; it is only mined for
/// diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendAck {
	pub cost: Option<f64>,
	pub error: Option<String>,
	pub model: Option<ModelSelection>,
}

impl SendAck {
	pub fn from_body(body: &str) -> Self {
		let value: Value = match serde_json::from_str(body) {
			Ok(value) => value,
			Err(_) => return Self::default(),
		};
		let info = value.get("info").unwrap_or(&value);

		let cost = info.get("cost").and_then(Value::as_f64);
		let error = info.get("error").map(|error| {
			error
				.pointer("/data/message")
				.and_then(Value::as_str)
				.or_else(|| error.get("name").and_then(Value::as_str))
				.map(str::to_string)
				.unwrap_or_else(|| error.to_string())
		});
		let model = match (
			info.get("providerID").and_then(Value::as_str),
			info.get("modelID").and_then(Value::as_str),
		) {
			(Some(provider), Some(model)) => Some(ModelSelection::new(provider, model)),
			_ => None,
		};

		Self { cost, error, model }
	}
}

// Accepts integers, floats and null for counters the server may emit as any of them
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	Ok(match value {
		Value::Number(number) => number
			.as_u64()
			.or_else(|| number.as_f64().map(|f| if f > 0.0 { f.round() as u64 } else { 0 }))
			.unwrap_or(0),
		_ => 0,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_model_selection_parse() {
		assert_eq!(
			ModelSelection::parse("anthropic/claude-sonnet-4"),
			Some(ModelSelection::new("anthropic", "claude-sonnet-4"))
		);
		assert_eq!(
			ModelSelection::parse("openrouter/anthropic/claude-sonnet-4"),
			Some(ModelSelection::new("openrouter", "anthropic/claude-sonnet-4"))
		);
		assert_eq!(ModelSelection::parse("no-slash"), None);
		assert_eq!(ModelSelection::parse("/model"), None);
		assert_eq!(ModelSelection::parse("provider/"), None);
	}

	#[test]
	fn test_known_parts_parse() {
		let parts: Vec<Part> = serde_json::from_value(json!([
			{"type": "text", "text": "hello"},
			{"type": "reasoning", "text": "thinking hard"},
			{"type": "step-start"},
			{"type": "tool", "tool": "bash", "callID": "c1", "state": {
				"status": "completed",
				"input": {"command": "ls"},
				"output": "Cargo.toml",
				"title": "List files"
			}},
			{"type": "step-finish", "tokens": {"input": 10, "output": 5.0}, "cost": 0.0012}
		]))
		.unwrap();

		assert_eq!(parts.len(), 5);
		assert_eq!(parts[0], Part::Text(TextPart { text: "hello".to_string() }));
		assert!(matches!(parts[1], Part::Reasoning(_)));
		assert!(matches!(parts[2], Part::StepStart(_)));
		match &parts[3] {
			Part::Tool(tool) => {
				assert_eq!(tool.tool, "bash");
				assert_eq!(tool.state.status, ToolStatus::Completed);
				assert_eq!(tool.state.title.as_deref(), Some("List files"));
			}
			other => panic!("expected tool part, got {:?}", other),
		}
		match &parts[4] {
			Part::StepFinish(step) => {
				assert_eq!(step.tokens.total(), 15);
				assert!((step.cost - 0.0012).abs() < f64::EPSILON);
			}
			other => panic!("expected step-finish part, got {:?}", other),
		}
	}

	#[test]
	fn test_unknown_kind_is_kept() {
		let part: Part = serde_json::from_value(json!({"type": "snapshot", "snapshot": "abc"})).unwrap();
		match &part {
			Part::Unknown { kind, raw } => {
				assert_eq!(kind, "snapshot");
				assert_eq!(raw["snapshot"], "abc");
			}
			other => panic!("expected unknown part, got {:?}", other),
		}
		assert_eq!(part.kind(), "snapshot");
	}

	#[test]
	fn test_malformed_known_kind_degrades_to_unknown() {
		// "text" must be a string
		let part: Part = serde_json::from_value(json!({"type": "text", "text": 42})).unwrap();
		assert!(matches!(part, Part::Unknown { ref kind, .. } if kind == "text"));

		let part: Part = serde_json::from_value(json!({"text": "no type tag"})).unwrap();
		assert_eq!(part.kind(), "unknown");
	}

	#[test]
	fn test_unknown_tool_status() {
		let part: Part = serde_json::from_value(json!({
			"type": "tool", "tool": "edit", "state": {"status": "queued"}
		}))
		.unwrap();
		match part {
			Part::Tool(tool) => assert_eq!(tool.state.status, ToolStatus::Unknown),
			other => panic!("expected tool part, got {:?}", other),
		}
	}

	#[test]
	fn test_message_roles_and_last_assistant() {
		let messages: Vec<Message> = serde_json::from_value(json!([
			{"info": {"id": "m1", "role": "user"}, "parts": [{"type": "text", "text": "hi"}]},
			{"info": {"id": "m2", "role": "assistant", "providerID": "opencode", "modelID": "big-pickle"}, "parts": []},
			{"info": {"id": "m3", "role": "system"}, "parts": []}
		]))
		.unwrap();

		assert_eq!(messages[2].info.role, Role::Other);
		let last = last_assistant(&messages).unwrap();
		assert_eq!(last.info.id, "m2");
		assert_eq!(
			last.info.used_model(),
			Some(ModelSelection::new("opencode", "big-pickle"))
		);
	}

	#[test]
	fn test_message_error_accessors() {
		let error: MessageError = serde_json::from_value(json!({
			"name": "ProviderAuthError",
			"data": {"providerID": "anthropic", "message": "missing key"}
		}))
		.unwrap();
		assert!(error.is_provider_auth());
		assert_eq!(error.provider_id(), Some("anthropic"));
		assert_eq!(error.message(), "missing key");

		let aborted: MessageError = serde_json::from_value(json!({"name": "MessageAbortedError"})).unwrap();
		assert!(aborted.is_aborted());
		assert_eq!(aborted.message(), "");
	}

	#[test]
	fn test_catalog_lookups() {
		let catalog: ProviderCatalog = serde_json::from_value(json!({
			"providers": [
				{"id": "opencode", "name": "OpenCode", "models": {"big-pickle": {"id": "big-pickle", "name": "Big Pickle"}}},
				{"id": "anthropic", "name": "Anthropic", "models": {"claude-sonnet-4": {"cost": {"input": 3.0, "output": 15.0}}}}
			],
			"default": {"anthropic": "claude-sonnet-4", "opencode": "kimi-k2.5-free"}
		}))
		.unwrap();

		assert_eq!(catalog.provider_for_model("claude-sonnet-4").map(|p| p.id.as_str()), Some("anthropic"));
		assert!(catalog.provider_for_model("gpt-5").is_none());
		// Defaults are passed through even when the provider does not list the model
		assert_eq!(
			catalog.first_default(),
			Some(ModelSelection::new("opencode", "kimi-k2.5-free"))
		);
	}

	#[test]
	fn test_session_created_at_from_millis() {
		let session: SessionSummary = serde_json::from_value(json!({
			"id": "ses_1", "title": "Demo", "time": {"created": 1_700_000_000_000u64, "updated": 1_700_000_000_500u64}
		}))
		.unwrap();
		let created = session.created_at().unwrap();
		assert_eq!(created.timestamp(), 1_700_000_000);
	}

	#[test]
	fn test_send_ack_is_lenient() {
		assert_eq!(SendAck::from_body("<html></html>"), SendAck::default());
		assert_eq!(SendAck::from_body(""), SendAck::default());

		let ack = SendAck::from_body(
			r#"{"info": {"cost": 0.5, "providerID": "opencode", "modelID": "grok-code", "error": {"name": "APIError", "data": {"message": "rate limited"}}}}"#,
		);
		assert_eq!(ack.cost, Some(0.5));
		assert_eq!(ack.error.as_deref(), Some("rate limited"));
		assert_eq!(ack.model, Some(ModelSelection::new("opencode", "grok-code")));
	}
}
