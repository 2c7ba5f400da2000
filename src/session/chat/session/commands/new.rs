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

// New session command handler

use super::super::core::ChatContext;
use anyhow::Result;
use colored::Colorize;

pub async fn handle_new(ctx: &mut ChatContext) -> Result<bool> {
	let session_id = ctx.api.create_session().await?;
	crate::log_debug!("Switched from session {} to {}", ctx.session_id, session_id);
	ctx.session_id = session_id;

	ctx.print(&"New session created.".green().to_string())?;
	ctx.print(&format!("Session: {}", ctx.session_id).bright_black().to_string())?;
	Ok(false)
}
