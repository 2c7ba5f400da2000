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

// Session command processing - one module per command

mod abort;
mod exit;
mod help;
mod history;
mod model;
mod models;
mod new;
mod sessions;

use super::super::commands::*;
use super::core::ChatContext;
use anyhow::Result;
use colored::Colorize;

// Process user commands; returns true when the loop should end
pub async fn process_command(ctx: &mut ChatContext, input: &str) -> Result<bool> {
	// Extract command and potential parameters
	let input_parts: Vec<&str> = input.split_whitespace().collect();
	let Some((&raw_command, params)) = input_parts.split_first() else {
		return Ok(false);
	};
	let command = raw_command.to_lowercase();

	match command.as_str() {
		EXIT_COMMAND | QUIT_COMMAND => exit::handle_exit(ctx),
		HELP_COMMAND => help::handle_help(ctx),
		NEW_COMMAND => new::handle_new(ctx).await,
		HISTORY_COMMAND => history::handle_history(ctx).await,
		SESSIONS_COMMAND => sessions::handle_sessions(ctx).await,
		MODELS_COMMAND => models::handle_models(ctx).await,
		MODEL_COMMAND => model::handle_model(ctx, params).await,
		ABORT_COMMAND => abort::handle_abort(ctx).await,
		_ => {
			ctx.print(&format!(
				"{} {}. Type {} for commands.",
				"Unknown command:".red(),
				raw_command,
				HELP_COMMAND.cyan()
			))?;
			Ok(false)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::testing::{context_with, MockApi, SharedBuffer};
	use super::*;
	use std::sync::Arc;

	#[tokio::test]
	async fn test_unknown_command_hints_help() {
		let buffer = SharedBuffer::default();
		let mut ctx = context_with(Arc::new(MockApi::default()), &buffer);
		let exit = process_command(&mut ctx, "/frobnicate now").await.unwrap();
		assert!(!exit);
		let output = buffer.contents();
		assert!(output.contains("/frobnicate"));
		assert!(output.contains("/help"));
	}

	#[tokio::test]
	async fn test_quit_and_exit_end_session() {
		let buffer = SharedBuffer::default();
		let mut ctx = context_with(Arc::new(MockApi::default()), &buffer);
		assert!(process_command(&mut ctx, "/quit").await.unwrap());
		assert!(process_command(&mut ctx, "/exit").await.unwrap());
	}

	#[tokio::test]
	async fn test_commands_ignore_case() {
		let buffer = SharedBuffer::default();
		let mut ctx = context_with(Arc::new(MockApi::default()), &buffer);
		assert!(!process_command(&mut ctx, "/Help").await.unwrap());
		assert!(buffer.contents().contains("Available commands"));
		assert!(!buffer.contents().contains("Unknown command"));
		assert!(process_command(&mut ctx, "/QUIT").await.unwrap());
	}
}
