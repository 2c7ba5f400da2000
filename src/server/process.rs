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

// OpenCode server process manager

use super::health::{probe, ProbeOutcome};
use crate::config::{Config, DEFAULT_SERVE_PORT};
use crate::error::{ChatError, Result};
use parking_lot::Mutex;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared handle on the server process this client spawned, if any
///
/// Cloning shares the same slot, so whichever clone calls `shutdown` first
/// releases the process and every later call is a no-op.
#[derive(Clone, Debug, Default)]
pub struct ServerHandle {
	child: Arc<Mutex<Option<Child>>>,
	grace: Duration,
}

impl ServerHandle {
	/// A handle that owns nothing (the server was already running)
	pub fn detached() -> Self {
		Self::default()
	}

	pub fn adopt(child: Child, grace: Duration) -> Self {
		Self {
			child: Arc::new(Mutex::new(Some(child))),
			grace,
		}
	}

	pub fn owns_process(&self) -> bool {
		self.child.lock().is_some()
	}

	pub fn pid(&self) -> Option<u32> {
		self.child.lock().as_ref().map(Child::id)
	}

	/// Exit status of the owned child if it already terminated
	pub fn exit_status(&self) -> Option<ExitStatus> {
		let mut slot = self.child.lock();
		let child = slot.as_mut()?;
		child.try_wait().ok().flatten()
	}

	/// Stop the owned server: graceful termination, then a forced kill once
	/// the grace period elapses. Returns whether this call released a process.
	pub fn shutdown(&self) -> bool {
		let child = self.child.lock().take();
		match child {
			Some(child) => {
				terminate(child, self.grace);
				true
			}
			None => false,
		}
	}
}

/// Releases the server when dropped
#[derive(Debug)]
pub struct ServerGuard {
	handle: ServerHandle,
}

impl ServerGuard {
	pub fn new(handle: ServerHandle) -> Self {
		Self { handle }
	}

	pub fn handle(&self) -> ServerHandle {
		self.handle.clone()
	}

	pub fn shutdown(&self) -> bool {
		self.handle.shutdown()
	}
}

impl Drop for ServerGuard {
	fn drop(&mut self) {
		if self.handle.shutdown() {
			crate::log_debug!("OpenCode server stopped");
		}
	}
}

fn terminate(mut child: Child, grace: Duration) {
	let pid = child.id();

	if let Ok(Some(status)) = child.try_wait() {
		crate::log_debug!("OpenCode server (pid {}) already exited: {}", pid, status);
		return;
	}

	if send_terminate(&child) {
		let deadline = Instant::now() + grace;
		while Instant::now() < deadline {
			match child.try_wait() {
				Ok(Some(_)) => return,
				Ok(None) => std::thread::sleep(EXIT_POLL_INTERVAL),
				Err(_) => break,
			}
		}
		crate::log_debug!(
			"OpenCode server (pid {}) ignored termination for {:?}, killing",
			pid,
			grace
		);
	}

	if let Err(e) = child.kill() {
		crate::log_debug!("Failed to kill OpenCode server (pid {}): {}", pid, e);
	}
	let _ = child.wait();
}

#[cfg(unix)]
fn send_terminate(child: &Child) -> bool {
	let Ok(pid) = libc::pid_t::try_from(child.id()) else {
		return false;
	};
	// SAFETY: signalling a pid we spawned and have not yet reaped
	unsafe { libc::kill(pid, libc::SIGTERM) == 0 }
}

#[cfg(not(unix))]
fn send_terminate(_child: &Child) -> bool {
	false
}

/// Hosts we are allowed to start a server for
pub fn is_local_host(host: &str) -> bool {
	matches!(
		host.trim_start_matches('[').trim_end_matches(']'),
		"localhost" | "127.0.0.1" | "::1" | "0.0.0.0"
	)
}

/// Makes sure an OpenCode server answers, starting one when needed
pub struct ServerSupervisor {
	config: Config,
	client: reqwest::Client,
}

impl ServerSupervisor {
	pub fn new(config: &Config) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(PROBE_TIMEOUT.min(config.request_timeout()))
			.build()
			.map_err(|e| ChatError::transport("probe client", e))?;
		Ok(Self {
			config: config.clone(),
			client,
		})
	}

	/// Returns the reachable base URL and a guard owning the spawned server
	pub async fn ensure_available(&self) -> Result<(String, ServerGuard)> {
		let base_url = self.config.base_url.trim_end_matches('/').to_string();

		match probe(&self.client, &base_url).await {
			ProbeOutcome::Reachable => {
				crate::log_debug!("OpenCode server already running at {}", base_url);
				return Ok((base_url, ServerGuard::new(ServerHandle::detached())));
			}
			ProbeOutcome::Unreachable(reason) => {
				crate::log_debug!("No server at {}: {}", base_url, reason);
			}
			ProbeOutcome::Malformed(reason) => {
				crate::log_debug!("{} answered but is not usable: {}", base_url, reason);
			}
		}

		let parsed = url::Url::parse(&base_url)
			.map_err(|e| ChatError::Config(format!("base_url '{}': {}", base_url, e)))?;
		let host = parsed.host_str().unwrap_or("localhost").to_string();
		let port = parsed.port_or_known_default().unwrap_or(DEFAULT_SERVE_PORT);
		let local = is_local_host(&host);

		if local {
			if let Some(found) = self.discover(port).await {
				return Ok((found, ServerGuard::new(ServerHandle::detached())));
			}
		}

		if !local {
			crate::log_info!("Waiting for remote OpenCode server at {}", base_url);
			self.wait_until_reachable(&base_url, None).await?;
			return Ok((base_url, ServerGuard::new(ServerHandle::detached())));
		}

		let handle = self.spawn(&host, port)?;
		let guard = ServerGuard::new(handle.clone());
		self.wait_until_reachable(&base_url, Some(&handle)).await?;

		crate::log_info!(
			"OpenCode server started at {} (pid {})",
			base_url,
			handle.pid().map(|pid| pid.to_string()).unwrap_or_else(|| "-".to_string())
		);
		Ok((base_url, guard))
	}

	// Look for an already running server on the fallback ports
	async fn discover(&self, configured_port: u16) -> Option<String> {
		for port in &self.config.discovery_ports {
			if *port == configured_port {
				continue;
			}
			let candidate = format!("http://127.0.0.1:{}", port);
			if probe(&self.client, &candidate).await.is_reachable() {
				crate::log_info!("Found running OpenCode server at {}", candidate);
				return Some(candidate);
			}
		}
		None
	}

	fn spawn(&self, host: &str, port: u16) -> Result<ServerHandle> {
		let command = &self.config.server_command;
		let hostname = host.trim_start_matches('[').trim_end_matches(']');
		let port = port.to_string();

		crate::log_debug!(
			"Starting OpenCode server: {} serve --hostname {} --port {}",
			command,
			hostname,
			port
		);

		let mut cmd = Command::new(command);
		cmd.args(["serve", "--hostname", hostname, "--port", port.as_str()])
			.stdin(Stdio::null())
			.stdout(Stdio::null())
			.stderr(Stdio::null());

		// Own process group, so a terminal Ctrl+C reaches only the client
		#[cfg(unix)]
		{
			use std::os::unix::process::CommandExt;
			cmd.process_group(0);
		}

		let child = cmd
			.spawn()
			.map_err(|e| ChatError::ServerSpawn(format!("could not run '{}': {}", command, e)))?;

		Ok(ServerHandle::adopt(child, self.config.shutdown_grace()))
	}

	async fn wait_until_reachable(&self, base_url: &str, handle: Option<&ServerHandle>) -> Result<()> {
		let timeout = self.config.startup_timeout();
		let start_time = Instant::now();

		loop {
			if let Some(status) = handle.and_then(ServerHandle::exit_status) {
				return Err(ChatError::ServerSpawn(format!(
					"'{} serve' exited during startup ({})",
					self.config.server_command, status
				)));
			}

			if probe(&self.client, base_url).await.is_reachable() {
				return Ok(());
			}

			if start_time.elapsed() >= timeout {
				if let Some(handle) = handle {
					handle.shutdown();
				}
				return Err(ChatError::StartupTimeout {
					url: base_url.to_string(),
					timeout,
				});
			}

			sleep(POLL_INTERVAL).await;
		}
	}
}
