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

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use opencode_chat::api::{AgentApi, SessionClient};
use opencode_chat::config::{set_thread_config, Config};
use opencode_chat::server::{ServerHandle, ServerSupervisor};
use opencode_chat::session::chat::{resolve_startup_selection, ChatContext, EditorInput};
use opencode_chat::session::run_repl;
use opencode_chat::{log_debug, log_error, log_info};

#[derive(Parser)]
#[command(name = "opencode-chat")]
#[command(version)]
#[command(about = "Terminal chat client for a local OpenCode agent server")]
struct ChatArgs {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	let _args = ChatArgs::parse();

	match run().await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			log_error!("Error: {:#}", e);
			ExitCode::from(1)
		}
	}
}

fn print_banner() {
	println!("{}", "┌─────────────────────────────────────────────".green());
	println!("{} {}", "│".green(), "opencode-chat".bold());
	println!("{} Terminal chat client for OpenCode", "│".green());
	println!(
		"{} Type {} for commands, {} to exit",
		"│".green(),
		"/help".cyan(),
		"/quit".cyan()
	);
	println!("{}", "└─────────────────────────────────────────────".green());
}

async fn run() -> Result<()> {
	let config = Config::load()?;
	set_thread_config(&config);

	print_banner();
	if let Some(path) = config.config_path() {
		log_info!("Loaded config from {}", path.display());
	}

	let supervisor = ServerSupervisor::new(&config)?;
	println!("{}", "Connecting to OpenCode server...".bright_black());
	let (base_url, guard) = supervisor.ensure_available().await?;
	println!("{}", format!("Connected to {}", base_url).bright_black());

	let api: Arc<dyn AgentApi> = Arc::new(SessionClient::new(&base_url, &config)?);

	let selection = resolve_startup_selection(api.as_ref(), &config).await;
	println!("{}", format!("Using {}", selection).bright_black());

	let session_id = api
		.create_session()
		.await
		.context("Error creating session")?;
	println!("{}", format!("Session: {}", session_id).bright_black());

	let interrupt = Arc::new(AtomicBool::new(false));
	let mut ctx = ChatContext::new(
		api,
		session_id,
		selection,
		config.clone(),
		guard.handle(),
		Box::new(std::io::stdout()),
	)
	.with_interrupt(interrupt.clone())
	.with_interactive(std::io::stdout().is_terminal());

	install_interrupt_handler(interrupt, ctx.processing_flag(), guard.handle())?;

	let mut input = EditorInput::new()?;
	let reason = run_repl(&mut ctx, &mut input).await?;
	log_debug!("Chat ended: {:?}", reason);

	// Normally already released by the loop; this covers early returns too
	drop(guard);
	Ok(())
}

// Ctrl+C while a reply is pending cancels it, anywhere else it exits
fn install_interrupt_handler(
	interrupt: Arc<AtomicBool>,
	processing: Arc<AtomicBool>,
	server: ServerHandle,
) -> Result<()> {
	ctrlc::set_handler(move || {
		if processing.load(Ordering::SeqCst) {
			// Second Ctrl+C before the first was handled forces the exit
			if interrupt.swap(true, Ordering::SeqCst) {
				println!("\nForcing exit due to repeated Ctrl+C...");
				server.shutdown();
				std::process::exit(130);
			}
			return;
		}

		println!("\nGoodbye!");
		server.shutdown();
		std::process::exit(0);
	})
	.context("Error setting Ctrl+C handler")?;
	Ok(())
}
