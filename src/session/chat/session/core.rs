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

// Chat context shared by the loop and the command handlers

use super::super::render::{error_panel, panel, ResponseRenderer};
use super::super::{DEFAULT_MODEL, DEFAULT_PROVIDER};
use crate::api::{AgentApi, ModelSelection};
use crate::config::Config;
use crate::error::ChatError;
use crate::server::ServerHandle;
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplState {
	AwaitingInput,
	Processing,
}

pub struct ChatContext {
	pub api: Arc<dyn AgentApi>,
	pub session_id: String,
	pub selection: ModelSelection,
	pub config: Config,
	pub renderer: ResponseRenderer,
	pub server: ServerHandle,
	// Whether a spinner may draw on the terminal
	pub interactive: bool,
	out: Box<dyn Write>,
	state: ReplState,
	interrupt: Arc<AtomicBool>,
	processing: Arc<AtomicBool>,
}

impl ChatContext {
	pub fn new(
		api: Arc<dyn AgentApi>,
		session_id: String,
		selection: ModelSelection,
		config: Config,
		server: ServerHandle,
		out: Box<dyn Write>,
	) -> Self {
		let renderer = ResponseRenderer::new(&config.render);
		Self {
			api,
			session_id,
			selection,
			config,
			renderer,
			server,
			interactive: false,
			out,
			state: ReplState::AwaitingInput,
			interrupt: Arc::new(AtomicBool::new(false)),
			processing: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Share an interrupt flag owned elsewhere (the Ctrl+C handler)
	pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
		self.interrupt = interrupt;
		self
	}

	pub fn with_interactive(mut self, interactive: bool) -> Self {
		self.interactive = interactive;
		self
	}

	pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
		self.interrupt.clone()
	}

	/// Set while a message is in flight
	pub fn processing_flag(&self) -> Arc<AtomicBool> {
		self.processing.clone()
	}

	pub fn state(&self) -> ReplState {
		self.state
	}

	pub fn set_state(&mut self, state: ReplState) {
		self.state = state;
		self.processing
			.store(state == ReplState::Processing, Ordering::SeqCst);
	}

	pub fn print(&mut self, text: &str) -> Result<()> {
		writeln!(self.out, "{}", text)?;
		self.out.flush()?;
		Ok(())
	}

	pub fn print_blocks(&mut self, blocks: &[String]) -> Result<()> {
		for block in blocks {
			writeln!(self.out, "{}", block)?;
		}
		self.out.flush()?;
		Ok(())
	}

	pub fn print_markdown(&mut self, markdown: &str) -> Result<()> {
		let rendered = self.renderer.render_markdown(markdown);
		self.print(&rendered)
	}

	/// Show a failure as a panel; the loop carries on afterwards
	pub fn report_error(&mut self, err: &anyhow::Error) -> Result<()> {
		let block = match err.downcast_ref::<ChatError>() {
			Some(chat_error) => error_panel(chat_error),
			None => panel(&"Error".bright_red().to_string(), &[err.to_string().red().to_string()]),
		};
		self.print(&block)
	}

	pub fn report_chat_error(&mut self, err: &ChatError) -> Result<()> {
		self.print(&error_panel(err))
	}

	/// Release the server if we own it; later calls do nothing
	pub fn shutdown_server(&mut self) -> Result<bool> {
		let released = self.server.shutdown();
		if released {
			self.print(&"OpenCode server stopped.".bright_black().to_string())?;
		}
		Ok(released)
	}
}

/// Pick the model for the first session
///
/// Order: the local config pin, the server's own configured model, the first
/// provider with a default, then the built-in fallback.
pub async fn resolve_startup_selection(api: &dyn AgentApi, config: &Config) -> ModelSelection {
	if let Some((provider, model)) = config.pinned_model() {
		crate::log_debug!("Using model pinned in config: {}/{}", provider, model);
		return ModelSelection::new(provider, model);
	}

	match api.configured_model().await {
		Ok(Some(selection)) => {
			crate::log_debug!("Using server configured model: {}", selection);
			return selection;
		}
		Ok(None) => {}
		Err(e) => crate::log_debug!("Could not read server config: {}", e),
	}

	match api.providers().await {
		Ok(catalog) => {
			if let Some(selection) = catalog.first_default() {
				crate::log_debug!("Using provider default: {}", selection);
				return selection;
			}
		}
		Err(e) => crate::log_debug!("Could not discover provider defaults: {}", e),
	}

	ModelSelection::new(DEFAULT_PROVIDER, DEFAULT_MODEL)
}
