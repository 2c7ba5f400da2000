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

// Implementation of a command completer for rustyline

use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::Validator;
use rustyline::Helper;
use std::borrow::Cow::{self, Borrowed, Owned};

struct CommandCompleter {
	commands: Vec<&'static str>,
}

impl CommandCompleter {
	fn new() -> Self {
		Self {
			commands: crate::session::chat::COMMANDS.to_vec(),
		}
	}

	// Commands only complete on the first word; `/model anthropic/...` is free text
	fn matching(&self, line: &str) -> impl Iterator<Item = &&'static str> + '_ {
		let prefix = line.to_string();
		self.commands
			.iter()
			.filter(move |cmd| !prefix.contains(' ') && cmd.starts_with(prefix.as_str()))
	}

	fn is_known(&self, line: &str) -> bool {
		let first = line.split_whitespace().next().unwrap_or_default();
		self.commands.iter().any(|cmd| *cmd == first)
	}
}

impl Completer for CommandCompleter {
	type Candidate = Pair;

	fn complete(
		&self,
		line: &str,
		_pos: usize,
		_ctx: &rustyline::Context<'_>,
	) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
		if !line.starts_with('/') {
			return Ok((0, vec![]));
		}

		let candidates = self
			.matching(line)
			.map(|cmd| Pair {
				display: cmd.to_string(),
				replacement: cmd.to_string(),
			})
			.collect();

		Ok((0, candidates))
	}
}

impl Hinter for CommandCompleter {
	type Hint = String;

	fn hint(&self, line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
		if line.is_empty() || !line.starts_with('/') {
			return None;
		}

		self.matching(line)
			.next()
			.map(|cmd| cmd[line.len()..].to_string())
	}
}

impl Highlighter for CommandCompleter {
	fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
		if line.starts_with('/') && (self.is_known(line) || self.matching(line).next().is_some()) {
			Owned(line.green().to_string())
		} else {
			Borrowed(line)
		}
	}

	fn highlight_char(&self, _line: &str, _pos: usize) -> bool {
		false
	}

	fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
		Owned(hint.bright_black().to_string())
	}
}

impl Validator for CommandCompleter {}

// Helper for rustyline
pub struct CommandHelper {
	completer: CommandCompleter,
	hinter: HistoryHinter,
}

impl CommandHelper {
	pub fn new() -> Self {
		Self {
			completer: CommandCompleter::new(),
			hinter: HistoryHinter {},
		}
	}
}

impl Default for CommandHelper {
	fn default() -> Self {
		Self::new()
	}
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
	type Candidate = Pair;

	fn complete(
		&self,
		line: &str,
		pos: usize,
		ctx: &rustyline::Context<'_>,
	) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
		self.completer.complete(line, pos, ctx)
	}
}

impl Hinter for CommandHelper {
	type Hint = String;

	fn hint(&self, line: &str, pos: usize, ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
		if line.starts_with('/') {
			self.completer.hint(line, pos, ctx)
		} else {
			self.hinter.hint(line, pos, ctx)
		}
	}
}

impl Highlighter for CommandHelper {
	fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
		self.completer.highlight(line, pos)
	}

	fn highlight_char(&self, line: &str, pos: usize) -> bool {
		self.completer.highlight_char(line, pos)
	}

	fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
		self.completer.highlight_hint(hint)
	}
}

impl Validator for CommandHelper {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_prefix_matches_commands() {
		let completer = CommandCompleter::new();
		let matches: Vec<_> = completer.matching("/mo").copied().collect();
		assert_eq!(matches, vec!["/models", "/model"]);
	}

	#[test]
	fn test_arguments_stop_completion() {
		let completer = CommandCompleter::new();
		assert_eq!(completer.matching("/model anth").count(), 0);
		assert!(completer.is_known("/model anthropic/claude-sonnet-4"));
		assert!(!completer.is_known("/bogus"));
	}
}
