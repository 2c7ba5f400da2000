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

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::{Config, BASE_URL_ENV};

impl Config {
	/// Load configuration from the system-wide config file
	pub fn load() -> Result<Self> {
		let config_path = crate::directories::get_config_file_path()?;

		let mut config = if config_path.exists() {
			Self::load_from_path(&config_path)?
		} else {
			Self::default()
		};

		// Environment variables take precedence over config file values
		config.apply_env_overrides(|name| std::env::var(name).ok());
		config.validate()?;

		Ok(config)
	}

	/// Load configuration from a specific file path without env overrides
	pub fn load_from_path(path: &Path) -> Result<Self> {
		let config_str = fs::read_to_string(path)
			.context(format!("Failed to read config from {}", path.display()))?;
		let mut config: Config =
			toml::from_str(&config_str).context("Failed to parse TOML configuration")?;

		config.config_path = Some(path.to_path_buf());
		Ok(config)
	}

	/// Apply overrides from the environment, looked up through `lookup`
	pub fn apply_env_overrides<F>(&mut self, lookup: F)
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(base_url) = lookup(BASE_URL_ENV) {
			let trimmed = base_url.trim();
			if !trimmed.is_empty() {
				self.base_url = trimmed.to_string();
			}
		}
	}
}
