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

// Interactive session runner

use super::super::animation::show_loading_animation;
use super::super::input::{InputEvent, InputSource};
use super::commands::process_command;
use super::core::{ChatContext, ReplState};
use crate::api::{Message, Role, SendAck};
use crate::log_debug;
use anyhow::Result;
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const INTERRUPT_POLL: Duration = Duration::from_millis(10);

/// Why the loop ended; every reason is a clean exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
	Quit,
	EndOfInput,
	Interrupted,
}

enum SendOutcome {
	Finished(crate::error::Result<SendAck>),
	Interrupted,
}

/// Run the read, dispatch and render loop until the user leaves
pub async fn run_repl(ctx: &mut ChatContext, input: &mut dyn InputSource) -> Result<ExitReason> {
	loop {
		ctx.set_state(ReplState::AwaitingInput);

		let event = match input.read_line() {
			Ok(event) => event,
			Err(e) => {
				crate::log_error!("Failed to read input: {}", e);
				InputEvent::Eof
			}
		};

		let line = match event {
			InputEvent::Line(line) => line,
			InputEvent::Interrupted => {
				ctx.print("\nGoodbye!")?;
				ctx.shutdown_server()?;
				return Ok(ExitReason::Interrupted);
			}
			InputEvent::Eof => {
				ctx.print("\nGoodbye!")?;
				ctx.shutdown_server()?;
				return Ok(ExitReason::EndOfInput);
			}
		};

		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if line.starts_with('/') {
			match process_command(ctx, line).await {
				Ok(true) => {
					ctx.shutdown_server()?;
					return Ok(ExitReason::Quit);
				}
				Ok(false) => {}
				Err(e) => ctx.report_error(&e)?,
			}
			continue;
		}

		send_and_render(ctx, line).await?;
	}
}

/// Send one user turn, then show the reply (or whatever exists of it)
///
/// The context stays in Processing until the reply has been fetched and
/// rendered, so Ctrl+C anywhere in the turn cancels instead of exiting.
pub async fn send_and_render(ctx: &mut ChatContext, text: &str) -> Result<()> {
	let interrupt = ctx.interrupt_flag();
	interrupt.store(false, Ordering::SeqCst);
	ctx.set_state(ReplState::Processing);

	let outcome = send_with_interrupt(ctx, text, interrupt.clone()).await;
	let result = finish_turn(ctx, outcome).await;

	ctx.set_state(ReplState::AwaitingInput);
	interrupt.store(false, Ordering::SeqCst);
	result
}

async fn finish_turn(ctx: &mut ChatContext, outcome: SendOutcome) -> Result<()> {
	match outcome {
		SendOutcome::Finished(Ok(ack)) => {
			if let Some(cost) = ack.cost {
				log_debug!("Turn cost reported by server: ${:.4}", cost);
			}
			if let Some(model) = &ack.model {
				log_debug!("Turn answered by {}", model);
			}
			display_reply(ctx).await
		}
		SendOutcome::Finished(Err(e)) => ctx.report_chat_error(&e),
		SendOutcome::Interrupted => {
			ctx.print(&"\nAborting...".yellow().to_string())?;
			let session_id = ctx.session_id.clone();
			match ctx.api.abort(&session_id).await {
				Ok(()) => ctx.print(&"Request cancelled.".yellow().to_string())?,
				Err(e) => ctx.report_chat_error(&e)?,
			}
			display_reply(ctx).await
		}
	}
}

// Race the send against the interrupt flag; losing the race drops the request
async fn send_with_interrupt(ctx: &ChatContext, text: &str, interrupt: Arc<AtomicBool>) -> SendOutcome {
	let api = ctx.api.clone();
	let session_id = ctx.session_id.clone();
	let selection = ctx.selection.clone();

	let animation_stop = Arc::new(AtomicBool::new(false));
	let animation_task = ctx.interactive.then(|| {
		let stop = animation_stop.clone();
		let label = selection.to_string();
		tokio::spawn(async move {
			let _ = show_loading_animation(stop, label).await;
		})
	});

	let outcome = tokio::select! {
		result = api.send_message(&session_id, text, &selection) => SendOutcome::Finished(result),
		_ = wait_for_interrupt(interrupt) => SendOutcome::Interrupted,
	};

	animation_stop.store(true, Ordering::SeqCst);
	if let Some(task) = animation_task {
		let _ = task.await;
	}

	outcome
}

async fn wait_for_interrupt(flag: Arc<AtomicBool>) {
	while !flag.load(Ordering::SeqCst) {
		tokio::time::sleep(INTERRUPT_POLL).await;
	}
}

/// The assistant message answering the newest user message, if there is one
pub fn latest_reply(messages: &[Message]) -> Option<&Message> {
	let after = messages
		.iter()
		.rposition(|message| message.info.role == Role::User)
		.map(|idx| idx + 1)
		.unwrap_or(0);
	messages[after..].iter().rev().find(|message| message.is_assistant())
}

async fn display_reply(ctx: &mut ChatContext) -> Result<()> {
	let session_id = ctx.session_id.clone();
	let messages = match ctx.api.list_messages(&session_id).await {
		Ok(messages) => messages,
		Err(e) => {
			log_debug!("Fetching messages for {} failed: {}", session_id, e);
			return ctx.report_chat_error(&e);
		}
	};

	match latest_reply(&messages) {
		Some(message) => {
			let blocks = ctx.renderer.render_message(message, Some(&ctx.selection));
			ctx.print_blocks(&blocks)
		}
		None => ctx.print(&"No assistant response found.".bright_black().to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::super::testing::{context_over, context_with, MockApi, ScriptedInput, SharedBuffer};
	use super::*;
	use crate::api::{AgentApi, ModelSelection, SessionClient};
	use crate::config::Config;
	use crate::server::ServerHandle;

	#[tokio::test]
	async fn test_quit_ends_loop() {
		let buffer = SharedBuffer::default();
		let api = Arc::new(MockApi::default());
		let mut ctx = context_with(api.clone(), &buffer);
		let mut input = ScriptedInput::lines(&["/quit", "never read"]);

		let reason = run_repl(&mut ctx, &mut input).await.unwrap();
		assert_eq!(reason, ExitReason::Quit);
		assert_eq!(input.remaining(), 1);
		assert!(buffer.contents().contains("Goodbye!"));
	}

	#[tokio::test]
	async fn test_exit_and_eof_end_loop() {
		let buffer = SharedBuffer::default();
		let mut ctx = context_with(Arc::new(MockApi::default()), &buffer);
		let reason = run_repl(&mut ctx, &mut ScriptedInput::lines(&["/exit"])).await.unwrap();
		assert_eq!(reason, ExitReason::Quit);

		let reason = run_repl(&mut ctx, &mut ScriptedInput::lines(&[])).await.unwrap();
		assert_eq!(reason, ExitReason::EndOfInput);

		let reason = run_repl(&mut ctx, &mut ScriptedInput::lines(&[]).then(InputEvent::Interrupted))
			.await
			.unwrap();
		assert_eq!(reason, ExitReason::Interrupted);
	}

	#[tokio::test]
	async fn test_message_roundtrip_renders_reply() {
		let buffer = SharedBuffer::default();
		let api = Arc::new(MockApi::default());
		let mut ctx = context_with(api.clone(), &buffer);

		run_repl(&mut ctx, &mut ScriptedInput::lines(&["  ", "hello there", "/quit"]))
			.await
			.unwrap();

		let output = buffer.contents();
		assert!(output.contains("echo: hello there"));
		assert!(output.contains("step finished (12 tokens, $0.0010)"));
		assert_eq!(
			api.calls(),
			vec![
				"send ses_start opencode/kimi-k2.5-free".to_string(),
				"messages ses_start".to_string(),
			]
		);
	}

	#[tokio::test]
	async fn test_turn_stays_processing_until_rendered() {
		let buffer = SharedBuffer::default();
		let api = Arc::new(MockApi::default());
		let mut ctx = context_with(api.clone(), &buffer);
		api.watch_processing(ctx.processing_flag());

		run_repl(&mut ctx, &mut ScriptedInput::lines(&["hello", "/history", "/quit"]))
			.await
			.unwrap();

		assert_eq!(
			api.processing_log(),
			vec![
				("send ses_start opencode/kimi-k2.5-free".to_string(), true),
				("messages ses_start".to_string(), true),
				("messages ses_start".to_string(), false),
			]
		);
		assert_eq!(ctx.state(), ReplState::AwaitingInput);
		assert!(!ctx.processing_flag().load(Ordering::SeqCst));
	}

	#[tokio::test]
	async fn test_substituted_model_is_surfaced() {
		let buffer = SharedBuffer::default();
		let api = Arc::new(MockApi::default().with_substitute(ModelSelection::new("opencode", "big-pickle")));
		let mut ctx = context_with(api, &buffer);

		run_repl(&mut ctx, &mut ScriptedInput::lines(&["hi"])).await.unwrap();

		let output = buffer.contents();
		assert!(output.contains("requested opencode/kimi-k2.5-free"));
		assert!(output.contains("opencode/big-pickle"));
	}

	#[tokio::test]
	async fn test_send_failure_shows_panel_and_continues() {
		let buffer = SharedBuffer::default();
		let api = Arc::new(MockApi::default().failing_send());
		let mut ctx = context_with(api.clone(), &buffer);

		let reason = run_repl(&mut ctx, &mut ScriptedInput::lines(&["hi", "/help", "/quit"]))
			.await
			.unwrap();

		assert_eq!(reason, ExitReason::Quit);
		let output = buffer.contents();
		assert!(output.contains("API error"));
		assert!(output.contains("bad gateway"));
		assert!(output.contains("/sessions"));
		assert_eq!(ctx.state(), ReplState::AwaitingInput);
	}

	#[tokio::test]
	async fn test_unreachable_server_shows_connection_panel() {
		let port = std::net::TcpListener::bind("127.0.0.1:0")
			.unwrap()
			.local_addr()
			.unwrap()
			.port();
		let client = SessionClient::new(&format!("http://127.0.0.1:{}", port), &Config::default()).unwrap();
		let api: Arc<dyn AgentApi> = Arc::new(client);
		let buffer = SharedBuffer::default();
		let mut ctx = context_over(api, &buffer, ServerHandle::detached());

		let reason = run_repl(&mut ctx, &mut ScriptedInput::lines(&["hello", "/quit"]))
			.await
			.unwrap();

		assert_eq!(reason, ExitReason::Quit);
		assert!(buffer.contents().contains("Lost connection to OpenCode server"));
	}

	#[tokio::test]
	async fn test_interrupt_during_send_aborts_session() {
		let buffer = SharedBuffer::default();
		let interrupt = Arc::new(AtomicBool::new(false));
		let api = Arc::new(MockApi::default().hanging(interrupt.clone()));
		let mut ctx = context_with(api.clone(), &buffer).with_interrupt(interrupt.clone());
		api.watch_processing(ctx.processing_flag());

		let reason = run_repl(&mut ctx, &mut ScriptedInput::lines(&["long task", "/quit"]))
			.await
			.unwrap();

		assert_eq!(reason, ExitReason::Quit);
		let calls = api.calls();
		assert!(calls.contains(&"abort ses_start".to_string()));
		assert!(api
			.processing_log()
			.contains(&("abort ses_start".to_string(), true)));
		assert_eq!(calls.last().map(String::as_str), Some("messages ses_start"));

		let output = buffer.contents();
		assert!(output.contains("Request cancelled."));
		assert!(output.contains("partial answer"));
		assert!(output.contains("Request was aborted."));
		assert!(!interrupt.load(Ordering::SeqCst));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn test_quit_releases_owned_server_once() {
		let child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
		let handle = ServerHandle::adopt(child, Duration::from_secs(2));
		let buffer = SharedBuffer::default();
		let api: Arc<dyn AgentApi> = Arc::new(MockApi::default());
		let mut ctx = context_over(api, &buffer, handle.clone());

		run_repl(&mut ctx, &mut ScriptedInput::lines(&["/quit"])).await.unwrap();

		assert!(!handle.owns_process());
		assert!(!handle.shutdown());
		assert_eq!(buffer.contents().matches("OpenCode server stopped.").count(), 1);
	}

	#[test]
	fn test_latest_reply_ignores_older_turns() {
		let messages: Vec<Message> = serde_json::from_value(serde_json::json!([
			{"info": {"id": "u1", "role": "user"}, "parts": []},
			{"info": {"id": "a1", "role": "assistant"}, "parts": []},
			{"info": {"id": "u2", "role": "user"}, "parts": []}
		]))
		.unwrap();
		assert!(latest_reply(&messages).is_none());

		let messages: Vec<Message> = serde_json::from_value(serde_json::json!([
			{"info": {"id": "u1", "role": "user"}, "parts": []},
			{"info": {"id": "a1", "role": "assistant"}, "parts": []},
			{"info": {"id": "a2", "role": "assistant"}, "parts": []}
		]))
		.unwrap();
		assert_eq!(latest_reply(&messages).map(|m| m.info.id.as_str()), Some("a2"));
	}
}
