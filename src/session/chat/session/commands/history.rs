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

// History command handler

use super::super::super::render::{glyph_for, truncate};
use super::super::core::ChatContext;
use crate::api::{Message, Part, Role};
use anyhow::Result;
use colored::Colorize;

pub async fn handle_history(ctx: &mut ChatContext) -> Result<bool> {
	let session_id = ctx.session_id.clone();
	let messages = ctx.api.list_messages(&session_id).await?;

	if messages.is_empty() {
		ctx.print(&"No messages yet.".bright_black().to_string())?;
		return Ok(false);
	}

	let lines = history_lines(&messages, ctx.renderer.settings().history_text_chars);
	for line in lines {
		ctx.print(&line)?;
	}
	Ok(false)
}

// Compact transcript: user text in full, assistant text capped, tools by name
fn history_lines(messages: &[Message], max_text_chars: usize) -> Vec<String> {
	let mut lines = Vec::new();

	for message in messages {
		for part in &message.parts {
			match (message.info.role, part) {
				(Role::User, Part::Text(text)) if !text.text.trim().is_empty() => {
					lines.push(format!("{} {}", "You>".bright_green().bold(), text.text.trim()));
				}
				(Role::Assistant, Part::Text(text)) if !text.text.trim().is_empty() => {
					let shown = truncate(text.text.trim(), max_text_chars);
					lines.push(format!("{} {}", "Assistant>".bright_blue().bold(), shown));
				}
				(Role::Assistant, Part::Tool(tool)) => {
					lines.push(
						format!(
							"  Tool: {} ({} {})",
							tool.tool,
							glyph_for(tool.state.status),
							tool.state.status.as_str()
						)
						.cyan()
						.to_string(),
					);
				}
				_ => {}
			}
		}
	}

	lines
}
