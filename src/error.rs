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

// Error taxonomy shared by the supervisor, the API client and the REPL

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
	/// The server never answered the health probe within the startup window
	#[error("OpenCode server at {url} did not become reachable within {timeout:?}")]
	StartupTimeout { url: String, timeout: Duration },

	/// The server binary could not be started or exited while starting
	#[error("Failed to start OpenCode server: {0}")]
	ServerSpawn(String),

	/// Network-level failure (connection refused, timeout, reset)
	#[error("Request to {endpoint} failed: {source}")]
	Transport {
		endpoint: String,
		#[source]
		source: reqwest::Error,
	},

	/// Server answered with a non-success status
	#[error("{endpoint} returned {status}: {body}")]
	Api {
		endpoint: String,
		status: u16,
		body: String,
	},

	/// Server answered with a body we cannot interpret
	#[error("Unexpected response from {endpoint}: {detail}")]
	MalformedResponse { endpoint: String, detail: String },

	#[error("Invalid configuration: {0}")]
	Config(String),
}

impl ChatError {
	pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
		Self::Transport {
			endpoint: endpoint.into(),
			source,
		}
	}

	pub fn malformed(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
		Self::MalformedResponse {
			endpoint: endpoint.into(),
			detail: detail.into(),
		}
	}

	/// Diagnostics distinguish a wrong-shaped answer from a failed connection
	pub fn is_malformed(&self) -> bool {
		matches!(self, Self::MalformedResponse { .. })
	}

	/// Errors that end the process instead of being shown as a panel
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			Self::StartupTimeout { .. } | Self::ServerSpawn(_) | Self::Config(_)
		)
	}

	/// Short label used as the error panel title
	pub fn headline(&self) -> &'static str {
		match self {
			Self::StartupTimeout { .. } => "Server unavailable",
			Self::ServerSpawn(_) => "Server failed to start",
			Self::Transport { .. } => "Lost connection to OpenCode server",
			Self::Api { .. } => "API error",
			Self::MalformedResponse { .. } => "Unexpected server response",
			Self::Config(_) => "Configuration error",
		}
	}
}

pub type Result<T> = std::result::Result<T, ChatError>;

/// Collapse whitespace and control characters and cap the length of a body
/// before it ends up in an error message
pub fn sanitize_body(body: &str) -> String {
	const MAX_LEN: usize = 240;
	let sanitized = body
		.chars()
		.map(|ch| if ch.is_control() { ' ' } else { ch })
		.collect::<String>()
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ");
	if sanitized.chars().count() > MAX_LEN {
		let cut: String = sanitized.chars().take(MAX_LEN).collect();
		format!("{}...", cut)
	} else {
		sanitized
	}
}
