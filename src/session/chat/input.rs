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

// User input handling module

use crate::session::chat_helper::CommandHelper;
use anyhow::Result;
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config as RustylineConfig, EditMode, Editor};

/// What a single read produced
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
	Line(String),
	/// Ctrl+C at the prompt
	Interrupted,
	/// Ctrl+D or closed stdin
	Eof,
}

/// Source of user lines for the chat loop
pub trait InputSource {
	fn read_line(&mut self) -> Result<InputEvent>;
}

/// Line editor with command completion and in-memory history
pub struct EditorInput {
	editor: Editor<CommandHelper, DefaultHistory>,
}

impl EditorInput {
	pub fn new() -> Result<Self> {
		let config = RustylineConfig::builder()
			.completion_type(CompletionType::List)
			.edit_mode(EditMode::Emacs)
			.auto_add_history(true)
			.bell_style(rustyline::config::BellStyle::None)
			.build();

		let mut editor = Editor::with_config(config)?;
		editor.set_helper(Some(CommandHelper::new()));

		Ok(Self { editor })
	}
}

impl InputSource for EditorInput {
	fn read_line(&mut self) -> Result<InputEvent> {
		let prompt = "You> ".bright_green().bold().to_string();
		match self.editor.readline(&prompt) {
			Ok(line) => Ok(InputEvent::Line(line)),
			Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
			Err(ReadlineError::Eof) => Ok(InputEvent::Eof),
			Err(err) => Err(err.into()),
		}
	}
}
