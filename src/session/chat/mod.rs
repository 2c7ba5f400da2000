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

// Chat session module
mod animation;
pub mod commands;
mod input;
pub mod markdown;
pub mod render;
mod session;
mod syntax;

// Re-export main structures and functions
pub use animation::show_loading_animation;
pub use commands::COMMANDS;
pub use input::{EditorInput, InputEvent, InputSource};
pub use render::ResponseRenderer;
pub use session::{
	latest_reply, resolve_startup_selection, run_repl, send_and_render, ChatContext, ExitReason,
	ReplState,
};

// Fallback model when neither the config nor the server name one
pub const DEFAULT_PROVIDER: &str = "opencode";
pub const DEFAULT_MODEL: &str = "kimi-k2.5-free";
