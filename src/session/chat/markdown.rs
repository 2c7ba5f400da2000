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

// Markdown rendering module

use super::syntax::SyntaxHighlighter;
use anyhow::Result;
use regex::Regex;
use termimad::MadSkin;

pub struct MarkdownRenderer {
	skin: MadSkin,
	syntax_highlighter: SyntaxHighlighter,
	code_block_regex: Regex,
}

impl MarkdownRenderer {
	pub fn new() -> Result<Self> {
		let mut skin = MadSkin::default();

		use termimad::crossterm::style::Attribute;
		use termimad::crossterm::style::Color;

		// Headers with different colors (set separately, not chained)
		skin.headers[0].set_fg(Color::Yellow);
		skin.headers[0].add_attr(Attribute::Bold);
		skin.headers[1].set_fg(Color::Blue);
		skin.headers[1].add_attr(Attribute::Bold);
		skin.headers[2].set_fg(Color::Cyan);
		skin.headers[2].add_attr(Attribute::Bold);
		for header in skin.headers.iter_mut().skip(3) {
			header.set_fg(Color::White);
			header.add_attr(Attribute::Bold);
		}

		skin.inline_code.set_bg(Color::Rgb { r: 60, g: 60, b: 60 });
		skin.inline_code.set_fg(Color::Yellow);

		skin.italic.set_fg(Color::Cyan);
		skin.bold.set_fg(Color::White);
		skin.bold.add_attr(Attribute::Bold);

		skin.quote_mark.set_fg(Color::Blue);
		skin.bullet.set_fg(Color::Green);

		Ok(Self {
			skin,
			syntax_highlighter: SyntaxHighlighter::new()?,
			// Fenced code blocks with an optional language tag
			code_block_regex: Regex::new(r"```([\w+#.-]+)?[^\n]*\n([\s\S]*?)\n?```")?,
		})
	}

	fn width() -> usize {
		(termimad::terminal_size().0 as usize).clamp(60, 120)
	}

	/// Render markdown to a styled string. Prose goes through termimad, code
	/// fences are highlighted separately and framed.
	pub fn render(&self, markdown: &str) -> Result<String> {
		let width = Self::width();
		let mut rendered = String::new();
		let mut last_end = 0;

		for cap in self.code_block_regex.captures_iter(markdown) {
			let Some(whole) = cap.get(0) else {
				continue;
			};

			let before = &markdown[last_end..whole.start()];
			if !before.trim().is_empty() {
				rendered.push_str(&self.skin.text(before, Some(width)).to_string());
			}

			let language = cap.get(1).map(|m| m.as_str()).unwrap_or("text");
			let code = cap.get(2).map(|m| m.as_str()).unwrap_or_default();

			rendered.push_str(&format!("┌─ {} ─\n", language));
			match self.syntax_highlighter.highlight_code(code, language) {
				Ok(highlighted) => rendered.push_str(&highlighted),
				Err(e) => {
					crate::log_debug!("Highlighting {} failed: {}", language, e);
					rendered.push_str(code);
					rendered.push('\n');
				}
			}
			rendered.push_str("└─────\n");

			last_end = whole.end();
		}

		let remaining = &markdown[last_end..];
		if !remaining.trim().is_empty() {
			rendered.push_str(&self.skin.text(remaining, Some(width)).to_string());
		}

		Ok(rendered)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_code_fence_is_framed() {
		let renderer = MarkdownRenderer::new().unwrap();
		let rendered = renderer
			.render("Here you go:\n\n```rust\nfn main() {}\n```\n\nDone.")
			.unwrap();
		assert!(rendered.contains("┌─ rust ─"));
		assert!(rendered.contains("└─────"));
		assert!(rendered.contains("Done."));
	}

	#[test]
	fn test_plain_prose_survives() {
		let renderer = MarkdownRenderer::new().unwrap();
		let rendered = renderer.render("just some words").unwrap();
		assert!(rendered.contains("just some words"));
	}

	#[test]
	fn test_untagged_fence_uses_text_label() {
		let renderer = MarkdownRenderer::new().unwrap();
		let rendered = renderer.render("```\nplain\n```").unwrap();
		assert!(rendered.contains("┌─ text ─"));
	}
}
