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

// Rendering of assistant messages
//
// Every part becomes exactly one block of text. A part that cannot be shown
// the rich way is shown plainly; nothing here returns an error.

use super::markdown::MarkdownRenderer;
use crate::api::{Message, MessageError, MessageInfo, ModelSelection, Part, ToolPart, ToolStatus};
use crate::config::RenderConfig;
use crate::error::ChatError;
use colored::*;
use serde_json::Value;

const TRUNCATION_MARKER: &str = "...";

/// Cut `text` to at most `max_chars` characters, appending a marker when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
		None => text.to_string(),
	}
}

/// Bordered block with a title line, as used for tools and errors
pub fn panel(title: &str, lines: &[String]) -> String {
	let mut block = format!("┌─ {} ─\n", title);
	for line in lines {
		for row in line.lines() {
			block.push_str("│ ");
			block.push_str(row);
			block.push('\n');
		}
	}
	block.push_str("└─────");
	block
}

/// Red panel for a failed request
pub fn error_panel(err: &ChatError) -> String {
	panel(&err.headline().bright_red().to_string(), &[err.to_string().red().to_string()])
}

fn status_glyph(status: ToolStatus) -> ColoredString {
	let label = format!("{} {}", glyph_for(status), status.as_str());
	match status {
		ToolStatus::Completed => label.green(),
		ToolStatus::Error => label.red(),
		ToolStatus::Running => label.yellow(),
		ToolStatus::Pending | ToolStatus::Unknown => label.bright_black(),
	}
}

pub fn glyph_for(status: ToolStatus) -> &'static str {
	match status {
		ToolStatus::Completed => "✅",
		ToolStatus::Error => "❌",
		ToolStatus::Pending | ToolStatus::Running | ToolStatus::Unknown => "⏳",
	}
}

// Strings are shown as-is, anything else as compact JSON
fn summarize_value(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

fn is_empty_value(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(text) => text.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Array(items) => items.is_empty(),
		_ => false,
	}
}

pub struct ResponseRenderer {
	settings: RenderConfig,
	markdown: Option<MarkdownRenderer>,
}

impl ResponseRenderer {
	pub fn new(settings: &RenderConfig) -> Self {
		let markdown = if settings.enable_markdown_rendering {
			match MarkdownRenderer::new() {
				Ok(renderer) => Some(renderer),
				Err(e) => {
					crate::log_debug!("Markdown rendering disabled: {}", e);
					None
				}
			}
		} else {
			None
		};

		Self {
			settings: settings.clone(),
			markdown,
		}
	}

	pub fn settings(&self) -> &RenderConfig {
		&self.settings
	}

	/// Render markdown when enabled, falling back to the raw text
	pub fn render_markdown(&self, text: &str) -> String {
		match &self.markdown {
			Some(renderer) => match renderer.render(text) {
				Ok(rendered) => rendered.trim_end().to_string(),
				Err(e) => {
					crate::log_debug!("Markdown rendering failed, showing plain text: {}", e);
					text.to_string()
				}
			},
			None => text.to_string(),
		}
	}

	/// Blocks for a whole assistant message: error panel, parts, then footer
	pub fn render_message(&self, message: &Message, requested: Option<&ModelSelection>) -> Vec<String> {
		let mut blocks = Vec::with_capacity(message.parts.len() + 2);

		if let Some(error) = &message.info.error {
			blocks.push(Self::render_error(error));
		}

		blocks.extend(self.render_parts(&message.parts));

		if let Some(footer) = Self::render_footer(&message.info, requested) {
			blocks.push(footer);
		}

		blocks
	}

	/// One block per part, in order
	pub fn render_parts(&self, parts: &[Part]) -> Vec<String> {
		parts.iter().map(|part| self.render_part(part)).collect()
	}

	pub fn render_part(&self, part: &Part) -> String {
		match part {
			Part::Text(text) if text.text.trim().is_empty() => {
				"  [empty text]".bright_black().to_string()
			}
			Part::Text(text) => self.render_markdown(&text.text),
			Part::Reasoning(reasoning) => format!(
				"{}\n{}",
				"💭 thinking".bright_black().italic(),
				self.render_markdown(&reasoning.text)
			),
			Part::Tool(tool) => self.render_tool(tool),
			Part::StepStart(step) => {
				let line = match &step.name {
					Some(name) => format!("  ── step started: {} ──", name),
					None => "  ── step started ──".to_string(),
				};
				line.bright_black().italic().to_string()
			}
			Part::StepFinish(step) => {
				let label = step.label().map(|l| format!(" {}", l)).unwrap_or_default();
				format!(
					"  ── step finished{} ({} tokens, ${:.4}) ──",
					label,
					step.tokens.total(),
					step.cost
				)
				.bright_black()
				.italic()
				.to_string()
			}
			Part::Unknown { kind, .. } => format!("  [{}]", kind).bright_black().to_string(),
		}
	}

	fn render_tool(&self, tool: &ToolPart) -> String {
		let state = &tool.state;
		let mut lines = Vec::new();

		if let Some(title) = state.title.as_deref().filter(|t| !t.is_empty()) {
			lines.push(title.bold().to_string());
		}

		lines.push(format!("Status: {}", status_glyph(state.status)));

		if let Some(input) = state.input.as_ref().filter(|v| !is_empty_value(v)) {
			let summary = truncate(&summarize_value(input), self.settings.max_args_chars);
			lines.push(format!("{} {}", "Input:".bright_black(), summary));
		}

		if let Some(output) = state.output.as_ref().filter(|v| !is_empty_value(v)) {
			let summary = truncate(&summarize_value(output), self.settings.max_output_chars);
			lines.push(format!("{} {}", "Output:".bright_black(), summary));
		}

		if let Some(error) = state.error.as_deref().filter(|e| !e.is_empty()) {
			lines.push(format!("Error: {}", error).red().to_string());
		}

		let name = if tool.tool.is_empty() { "unknown" } else { tool.tool.as_str() };
		panel(&format!("Tool: {}", name).cyan().to_string(), &lines)
	}

	/// Assistant-level error attached to the message
	pub fn render_error(error: &MessageError) -> String {
		if error.is_aborted() {
			return panel(
				&"Aborted".yellow().to_string(),
				&["Request was aborted.".yellow().to_string()],
			);
		}

		if error.is_provider_auth() {
			let provider = error.provider_id().unwrap_or_default();
			return panel(
				&"Authentication error".bright_red().to_string(),
				&[
					format!("Authentication error with provider '{}':", provider).red().to_string(),
					error.message().red().to_string(),
				],
			);
		}

		panel(
			&"Error".bright_red().to_string(),
			&[format!("{}: {}", error.name, error.message()).red().to_string()],
		)
	}

	/// Muted line naming the model that actually answered
	pub fn render_footer(info: &MessageInfo, requested: Option<&ModelSelection>) -> Option<String> {
		let used = info.used_model();
		let mut pieces = Vec::new();

		if let Some(used) = &used {
			pieces.push(used.to_string());
		}
		if let Some(tokens) = &info.tokens {
			if tokens.total() > 0 {
				pieces.push(format!("{} tokens", tokens.total()));
			}
		}
		if let Some(cost) = info.cost {
			pieces.push(format!("${:.4}", cost));
		}
		if pieces.is_empty() {
			return None;
		}

		let mut footer = format!("  {}", pieces.join(" · ")).bright_black().to_string();
		if let (Some(used), Some(requested)) = (&used, requested) {
			if used != requested {
				footer.push_str(
					&format!("  (requested {}, server answered with {})", requested, used)
						.yellow()
						.to_string(),
				);
			}
		}
		Some(footer)
	}
}
