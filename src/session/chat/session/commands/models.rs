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

// Models command handler

use super::super::core::ChatContext;
use crate::api::{ModelSelection, ProviderCatalog};
use anyhow::Result;
use colored::Colorize;

pub async fn handle_models(ctx: &mut ChatContext) -> Result<bool> {
	let catalog = ctx.api.providers().await?;

	if catalog.providers.is_empty() {
		ctx.print(&"No providers configured on the server.".bright_yellow().to_string())?;
		return Ok(false);
	}

	let markdown = models_markdown(&catalog, &ctx.selection);
	ctx.print_markdown(&markdown)?;
	Ok(false)
}

fn format_cost(cost: f64) -> String {
	if cost == 0.0 {
		"free".to_string()
	} else {
		format!("${}", cost)
	}
}

fn models_markdown(catalog: &ProviderCatalog, active: &ModelSelection) -> String {
	let mut markdown_content = String::new();

	for provider in &catalog.providers {
		let name = if provider.name.is_empty() { &provider.id } else { &provider.name };
		markdown_content.push_str(&format!("## {} (`{}`)\n\n", name, provider.id));

		if let Some(default) = catalog.default.get(&provider.id) {
			markdown_content.push_str(&format!("Default: `{}`\n\n", default));
		}

		if provider.models.is_empty() {
			markdown_content.push_str("*(no models)*\n\n");
			continue;
		}

		markdown_content.push_str("| Model | Input /M | Output /M | |\n");
		markdown_content.push_str("|-------|----------|-----------|---|\n");

		for (model_id, model) in &provider.models {
			let (input, output) = match &model.cost {
				Some(cost) => (format_cost(cost.input), format_cost(cost.output)),
				None => ("-".to_string(), "-".to_string()),
			};
			let marker = if provider.id == active.provider_id && *model_id == active.model_id {
				"← active"
			} else {
				""
			};
			markdown_content.push_str(&format!(
				"| {}/{} | {} | {} | {} |\n",
				provider.id, model_id, input, output, marker
			));
		}
		markdown_content.push('\n');
	}

	markdown_content
}
