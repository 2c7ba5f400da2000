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

// Health probe for an OpenCode server

use serde_json::Value;

/// Result of a single probe
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
	/// `GET /session` answered with a JSON array
	Reachable,
	/// Nothing answered, or the answer was an error status
	Unreachable(String),
	/// Something answered, but not with structured data (for example a web UI)
	Malformed(String),
}

impl ProbeOutcome {
	pub fn is_reachable(&self) -> bool {
		matches!(self, ProbeOutcome::Reachable)
	}
}

/// Probe `base_url` by listing sessions
pub async fn probe(client: &reqwest::Client, base_url: &str) -> ProbeOutcome {
	let url = format!("{}/session", base_url.trim_end_matches('/'));

	let response = match client.get(&url).send().await {
		Ok(response) => response,
		Err(e) => return ProbeOutcome::Unreachable(e.to_string()),
	};

	let status = response.status();
	if !status.is_success() {
		return ProbeOutcome::Unreachable(format!("status {}", status.as_u16()));
	}

	let body = match response.text().await {
		Ok(body) => body,
		Err(e) => return ProbeOutcome::Unreachable(e.to_string()),
	};

	classify_body(&body)
}

/// Decide whether a successful probe body came from the session API
pub fn classify_body(body: &str) -> ProbeOutcome {
	if crate::api::looks_like_html(body) {
		return ProbeOutcome::Malformed("received HTML instead of JSON".to_string());
	}
	match serde_json::from_str::<Value>(body) {
		Ok(Value::Array(_)) => ProbeOutcome::Reachable,
		Ok(other) => ProbeOutcome::Malformed(format!(
			"expected a session list, got {}",
			json_kind(&other)
		)),
		Err(e) => ProbeOutcome::Malformed(format!("invalid JSON: {}", e)),
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
