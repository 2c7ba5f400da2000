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

// Chat commands module

// Chat commands
pub const HELP_COMMAND: &str = "/help";
pub const NEW_COMMAND: &str = "/new";
pub const HISTORY_COMMAND: &str = "/history";
pub const SESSIONS_COMMAND: &str = "/sessions";
pub const MODELS_COMMAND: &str = "/models";
pub const MODEL_COMMAND: &str = "/model";
pub const ABORT_COMMAND: &str = "/abort";
pub const QUIT_COMMAND: &str = "/quit";
pub const EXIT_COMMAND: &str = "/exit";

// List of all available commands for autocomplete
pub const COMMANDS: [&str; 9] = [
	HELP_COMMAND,
	NEW_COMMAND,
	HISTORY_COMMAND,
	SESSIONS_COMMAND,
	MODELS_COMMAND,
	MODEL_COMMAND,
	ABORT_COMMAND,
	QUIT_COMMAND,
	EXIT_COMMAND,
];
