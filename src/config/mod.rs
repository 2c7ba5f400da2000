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

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::time::Duration;

pub mod loading;
pub mod validation;

/// Environment variable overriding the server base URL
pub const BASE_URL_ENV: &str = "OPENCODE_BASE_URL";

/// Port the client asks `opencode serve` to bind when it spawns the server
pub const DEFAULT_SERVE_PORT: u16 = 54321;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub enum LogLevel {
	#[serde(rename = "none")]
	#[default]
	None,
	#[serde(rename = "info")]
	Info,
	#[serde(rename = "debug")]
	Debug,
}

impl LogLevel {
	/// Check if info logging is enabled
	pub fn is_info_enabled(&self) -> bool {
		matches!(self, LogLevel::Info | LogLevel::Debug)
	}

	/// Check if debug logging is enabled
	pub fn is_debug_enabled(&self) -> bool {
		matches!(self, LogLevel::Debug)
	}
}

// Default functions
fn default_base_url() -> String {
	format!("http://localhost:{}", DEFAULT_SERVE_PORT)
}

fn default_server_command() -> String {
	"opencode".to_string()
}

fn default_discovery_ports() -> Vec<u16> {
	vec![4096, 3000, 8080]
}

fn default_startup_timeout_secs() -> u64 {
	10
}

fn default_shutdown_grace_secs() -> u64 {
	5
}

fn default_request_timeout_secs() -> u64 {
	30
}

fn default_send_timeout_secs() -> u64 {
	300 // Agent turns with many tool calls can run for minutes
}

fn default_true() -> bool {
	true
}

fn default_max_args_chars() -> usize {
	200
}

fn default_max_output_chars() -> usize {
	300
}

fn default_history_text_chars() -> usize {
	200
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
	#[serde(default = "default_true")]
	pub enable_markdown_rendering: bool,
	// Cap for the tool argument summary
	#[serde(default = "default_max_args_chars")]
	pub max_args_chars: usize,
	// Cap for the tool output summary
	#[serde(default = "default_max_output_chars")]
	pub max_output_chars: usize,
	// Cap for assistant text shown by /history
	#[serde(default = "default_history_text_chars")]
	pub history_text_chars: usize,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			enable_markdown_rendering: true,
			max_args_chars: default_max_args_chars(),
			max_output_chars: default_max_output_chars(),
			history_text_chars: default_history_text_chars(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
	#[serde(default)]
	pub log_level: LogLevel,

	#[serde(default = "default_base_url")]
	pub base_url: String,

	// Binary started with `serve` when no server answers
	#[serde(default = "default_server_command")]
	pub server_command: String,

	// Local ports probed for an already running server before spawning one
	#[serde(default = "default_discovery_ports")]
	pub discovery_ports: Vec<u16>,

	#[serde(default = "default_startup_timeout_secs")]
	pub startup_timeout_secs: u64,
	#[serde(default = "default_shutdown_grace_secs")]
	pub shutdown_grace_secs: u64,
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
	#[serde(default = "default_send_timeout_secs")]
	pub send_timeout_secs: u64,

	// Startup provider/model; both or neither
	#[serde(default)]
	pub provider: Option<String>,
	#[serde(default)]
	pub model: Option<String>,

	#[serde(default)]
	pub render: RenderConfig,

	#[serde(skip)]
	pub(crate) config_path: Option<PathBuf>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_level: LogLevel::default(),
			base_url: default_base_url(),
			server_command: default_server_command(),
			discovery_ports: default_discovery_ports(),
			startup_timeout_secs: default_startup_timeout_secs(),
			shutdown_grace_secs: default_shutdown_grace_secs(),
			request_timeout_secs: default_request_timeout_secs(),
			send_timeout_secs: default_send_timeout_secs(),
			provider: None,
			model: None,
			render: RenderConfig::default(),
			config_path: None,
		}
	}
}

impl Config {
	/// Get the global log level
	pub fn get_log_level(&self) -> LogLevel {
		self.log_level
	}

	pub fn startup_timeout(&self) -> Duration {
		Duration::from_secs(self.startup_timeout_secs)
	}

	pub fn shutdown_grace(&self) -> Duration {
		Duration::from_secs(self.shutdown_grace_secs)
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	pub fn send_timeout(&self) -> Duration {
		Duration::from_secs(self.send_timeout_secs)
	}

	/// Path the configuration was read from, if a file existed
	pub fn config_path(&self) -> Option<&PathBuf> {
		self.config_path.as_ref()
	}

	/// Provider/model pinned in the config file, when both are present
	pub fn pinned_model(&self) -> Option<(String, String)> {
		match (&self.provider, &self.model) {
			(Some(provider), Some(model)) => Some((provider.clone(), model.clone())),
			_ => None,
		}
	}
}

// Logging macros for different log levels
// These macros automatically check the current log level and only print if appropriate

thread_local! {
	static CURRENT_CONFIG: RefCell<Option<Config>> = const { RefCell::new(None) };
}

/// Set the current config for the thread (to be used by logging macros)
pub fn set_thread_config(config: &Config) {
	CURRENT_CONFIG.with(|c| {
		*c.borrow_mut() = Some(config.clone());
	});
}

/// Get the current config for the thread
pub fn with_thread_config<F, R>(f: F) -> Option<R>
where
	F: FnOnce(&Config) -> R,
{
	CURRENT_CONFIG.with(|c| (*c.borrow()).as_ref().map(f))
}

/// Info logging macro with automatic cyan coloring
/// Shows info messages when log level is Info OR Debug
#[macro_export]
macro_rules! log_info {
	($fmt:expr) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_info_enabled()) {
			if should_log {
				use colored::Colorize;
				println!("{}", $fmt.cyan());
			}
		}
	};
	($fmt:expr, $($arg:expr),*) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_info_enabled()) {
			if should_log {
				use colored::Colorize;
				println!("{}", format!($fmt, $($arg),*).cyan());
			}
		}
	};
}

/// Debug logging macro with automatic bright blue coloring
#[macro_export]
macro_rules! log_debug {
	($fmt:expr) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_debug_enabled()) {
			if should_log {
				use colored::Colorize;
				println!("{}", $fmt.bright_blue());
			}
		}
	};
	($fmt:expr, $($arg:expr),*) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_debug_enabled()) {
			if should_log {
				use colored::Colorize;
				println!("{}", format!($fmt, $($arg),*).bright_blue());
			}
		}
	};
}

/// Error logging macro with automatic bright red coloring
/// Always visible regardless of log level (errors should always be shown)
#[macro_export]
macro_rules! log_error {
	($fmt:expr) => {{
		use colored::Colorize;
		eprintln!("{}", $fmt.bright_red());
	}};
	($fmt:expr, $($arg:expr),*) => {{
		use colored::Colorize;
		eprintln!("{}", format!($fmt, $($arg),*).bright_red());
	}};
}
