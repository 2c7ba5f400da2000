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

// Animation module for loading indicators

use anyhow::Result;
use colored::*;
use crossterm::{cursor, execute, terminal};
use std::io::{stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Animation frames for loading indicator
const LOADING_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

// Spin until `stop_flag` is set, showing which model is working and for how long
pub async fn show_loading_animation(stop_flag: Arc<AtomicBool>, model_label: String) -> Result<()> {
	let mut stdout = stdout();
	let mut frame_idx = 0;
	let started = Instant::now();

	execute!(stdout, cursor::SavePosition)?;

	while !stop_flag.load(Ordering::SeqCst) {
		execute!(stdout, cursor::RestorePosition)?;

		print!(
			" {} {} {}",
			LOADING_FRAMES[frame_idx].cyan(),
			format!("Waiting for {}...", model_label).bright_blue(),
			format!("{}s", started.elapsed().as_secs()).bright_black()
		);
		stdout.flush()?;

		frame_idx = (frame_idx + 1) % LOADING_FRAMES.len();
		tokio::time::sleep(Duration::from_millis(100)).await;
	}

	execute!(
		stdout,
		cursor::RestorePosition,
		terminal::Clear(terminal::ClearType::UntilNewLine)
	)?;
	stdout.flush()?;

	Ok(())
}
