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

use super::Config;
use crate::error::{ChatError, Result};

impl Config {
	/// Validate the configuration for common issues
	pub fn validate(&self) -> Result<()> {
		self.validate_base_url()?;
		self.validate_server_command()?;
		self.validate_timeouts()?;
		self.validate_render()?;
		self.validate_pinned_model()?;
		Ok(())
	}

	fn validate_base_url(&self) -> Result<()> {
		let parsed = url::Url::parse(&self.base_url).map_err(|e| {
			ChatError::Config(format!("base_url '{}' is not a valid URL: {}", self.base_url, e))
		})?;
		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(ChatError::Config(format!(
				"base_url '{}' must use http or https",
				self.base_url
			)));
		}
		if parsed.host_str().is_none() {
			return Err(ChatError::Config(format!(
				"base_url '{}' has no host",
				self.base_url
			)));
		}
		Ok(())
	}

	fn validate_server_command(&self) -> Result<()> {
		if self.server_command.trim().is_empty() {
			return Err(ChatError::Config("server_command must not be empty".to_string()));
		}
		Ok(())
	}

	fn validate_timeouts(&self) -> Result<()> {
		let timeouts = [
			("startup_timeout_secs", self.startup_timeout_secs),
			("request_timeout_secs", self.request_timeout_secs),
			("send_timeout_secs", self.send_timeout_secs),
		];
		for (name, value) in timeouts {
			if value == 0 {
				return Err(ChatError::Config(format!("{} must be greater than 0", name)));
			}
		}
		Ok(())
	}

	fn validate_render(&self) -> Result<()> {
		if self.render.max_args_chars == 0
			|| self.render.max_output_chars == 0
			|| self.render.history_text_chars == 0
		{
			return Err(ChatError::Config(
				"render character caps must be greater than 0".to_string(),
			));
		}
		Ok(())
	}

	fn validate_pinned_model(&self) -> Result<()> {
		match (&self.provider, &self.model) {
			(Some(_), None) => Err(ChatError::Config(
				"provider is set but model is missing".to_string(),
			)),
			(None, Some(_)) => Err(ChatError::Config(
				"model is set but provider is missing".to_string(),
			)),
			_ => Ok(()),
		}
	}
}
