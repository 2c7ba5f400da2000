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

// Syntax highlighting for fenced code in assistant replies

use anyhow::{anyhow, Result};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const PREFERRED_THEME: &str = "base16-ocean.dark";

pub struct SyntaxHighlighter {
	syntax_set: SyntaxSet,
	theme: Theme,
}

impl SyntaxHighlighter {
	pub fn new() -> Result<Self> {
		let mut themes = ThemeSet::load_defaults().themes;
		let theme = match themes.remove(PREFERRED_THEME) {
			Some(theme) => theme,
			None => themes
				.into_values()
				.next()
				.ok_or_else(|| anyhow!("No syntax highlighting themes available"))?,
		};

		Ok(Self {
			syntax_set: SyntaxSet::load_defaults_newlines(),
			theme,
		})
	}

	// Fence labels are usually tokens ("rust") but models also emit extensions ("rs")
	fn syntax_for(&self, language: &str) -> &SyntaxReference {
		self.syntax_set
			.find_syntax_by_token(language)
			.or_else(|| self.syntax_set.find_syntax_by_extension(language))
			.unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
	}

	#[cfg(test)]
	fn is_known_language(&self, language: &str) -> bool {
		self.syntax_for(language).name != self.syntax_set.find_syntax_plain_text().name
	}

	/// Highlight `code` as 24-bit terminal escapes, always ending with a newline
	pub fn highlight_code(&self, code: &str, language: &str) -> Result<String> {
		let mut highlighter = HighlightLines::new(self.syntax_for(language), &self.theme);
		let mut highlighted = String::with_capacity(code.len() * 2);

		for line in LinesWithEndings::from(code) {
			let ranges: Vec<(Style, &str)> = highlighter.highlight_line(line, &self.syntax_set)?;
			highlighted.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
		}

		// Reset so colors do not leak into the following text
		highlighted.push_str("\x1b[0m");
		if !code.ends_with('\n') {
			highlighted.push('\n');
		}
		Ok(highlighted)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rust_code_is_colored() {
		let highlighter = SyntaxHighlighter::new().unwrap();
		let result = highlighter
			.highlight_code("fn main() {\n    println!(\"hi\");\n}", "rust")
			.unwrap();
		assert!(result.contains("\x1b["));
		assert!(result.ends_with('\n'));
	}

	#[test]
	fn test_language_lookup_accepts_extensions() {
		let highlighter = SyntaxHighlighter::new().unwrap();
		assert!(highlighter.is_known_language("rust"));
		assert!(highlighter.is_known_language("rs"));
		assert!(!highlighter.is_known_language("no-such-language"));
	}
}
