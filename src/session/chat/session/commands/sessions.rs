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

// Sessions command handler

use super::super::core::ChatContext;
use crate::api::SessionSummary;
use anyhow::Result;
use colored::Colorize;

pub async fn handle_sessions(ctx: &mut ChatContext) -> Result<bool> {
	let sessions = ctx.api.list_sessions().await?;

	if sessions.is_empty() {
		ctx.print(&"No sessions.".bright_yellow().to_string())?;
		return Ok(false);
	}

	let table = sessions_table(&sessions, &ctx.session_id);
	ctx.print_markdown(&table)?;
	Ok(false)
}

fn sessions_table(sessions: &[SessionSummary], current_id: &str) -> String {
	let mut markdown_content = String::new();
	markdown_content.push_str(&format!("# Sessions ({})\n\n", sessions.len()));

	markdown_content.push_str("| ID | Title | Created | Active |\n");
	markdown_content.push_str("|----|-------|---------|--------|\n");

	for session in sessions {
		let created = session
			.created_at()
			.map(|dt| {
				dt.with_timezone(&chrono::Local)
					.format("%Y-%m-%d %H:%M")
					.to_string()
			})
			.unwrap_or_else(|| "-".to_string());

		// Pipes would split the cell
		let title = session
			.title
			.as_deref()
			.filter(|t| !t.trim().is_empty())
			.unwrap_or("(untitled)")
			.replace('|', "/");

		let active = if session.id == current_id { "**current**" } else { "" };

		markdown_content.push_str(&format!(
			"| {} | {} | {} | {} |\n",
			session.id, title, created, active
		));
	}

	markdown_content
}
