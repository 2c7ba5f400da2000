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

// Help command handler

use super::super::super::commands::*;
use super::super::core::ChatContext;
use anyhow::Result;
use colored::Colorize;

pub fn handle_help(ctx: &mut ChatContext) -> Result<bool> {
	let entries = [
		(HELP_COMMAND.to_string(), "Show this help message"),
		(NEW_COMMAND.to_string(), "Start a new chat session"),
		(HISTORY_COMMAND.to_string(), "Show messages in the current session"),
		(SESSIONS_COMMAND.to_string(), "List all sessions on the server"),
		(MODELS_COMMAND.to_string(), "List providers and their models"),
		(MODEL_COMMAND.to_string(), "Show the current model"),
		(
			format!("{} <provider>/<id>", MODEL_COMMAND),
			"Switch model (e.g. /model anthropic/claude-sonnet-4)",
		),
		(
			format!("{} <id>", MODEL_COMMAND),
			"Switch model, looking up its provider",
		),
		(ABORT_COMMAND.to_string(), "Abort whatever the session is running"),
		(
			format!("{}, {}", QUIT_COMMAND, EXIT_COMMAND),
			"Stop the server we started and exit",
		),
	];

	ctx.print(&"\nAvailable commands:\n".bright_cyan().to_string())?;
	for (command, description) in entries {
		ctx.print(&format!("{} - {}", command.cyan(), description))?;
	}
	ctx.print(&"\nCtrl+C while waiting for a reply cancels it; at the prompt it exits.".bright_black().to_string())?;
	Ok(false)
}
