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

// Directory utilities for locating the configuration file

use anyhow::Result;
use std::path::PathBuf;

const APP_DIR: &str = "opencode-chat";

/// Get the system-wide data directory for opencode-chat
///
/// - macOS: ~/.local/share/opencode-chat
/// - Linux: ~/.local/share/opencode-chat (following XDG Base Directory specification)
/// - Windows: %LOCALAPPDATA%/opencode-chat
///
/// Nothing is created here: the client never writes to this directory.
pub fn get_data_dir() -> Result<PathBuf> {
	let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;

	#[cfg(target_os = "windows")]
	let path = match dirs::data_local_dir() {
		Some(dir) => dir.join(APP_DIR),
		None => home.join("AppData").join("Local").join(APP_DIR),
	};

	#[cfg(not(target_os = "windows"))]
	let path = home.join(".local").join("share").join(APP_DIR);

	Ok(path)
}

/// Get the configuration directory path
pub fn get_config_dir() -> Result<PathBuf> {
	Ok(get_data_dir()?.join("config"))
}

/// Get the configuration file path
pub fn get_config_file_path() -> Result<PathBuf> {
	Ok(get_config_dir()?.join("config.toml"))
}
