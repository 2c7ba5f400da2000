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

// Model command handler

use super::super::super::commands::MODEL_COMMAND;
use super::super::core::ChatContext;
use crate::api::{AgentApi, ModelSelection};
use anyhow::Result;
use colored::Colorize;

/// How a `/model` argument turned into a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLookup {
	/// `provider/model`, taken as written
	Explicit,
	/// Bare model id found under this provider
	Catalog,
	/// Bare model id not found; the current provider is kept
	KeptProvider,
}

/// Turn a `/model` argument into a selection. Nothing is validated against the
/// catalog: the server has the final word on which pairs it accepts.
pub async fn resolve_model(
	api: &dyn AgentApi,
	current: &ModelSelection,
	arg: &str,
) -> (ModelSelection, ModelLookup) {
	if let Some(selection) = ModelSelection::parse(arg) {
		return (selection, ModelLookup::Explicit);
	}

	let model_id = arg.trim().trim_matches('/');
	match api.providers().await {
		Ok(catalog) => {
			if let Some(provider) = catalog.provider_for_model(model_id) {
				return (
					ModelSelection::new(provider.id.clone(), model_id),
					ModelLookup::Catalog,
				);
			}
		}
		Err(e) => crate::log_debug!("Model lookup without catalog: {}", e),
	}

	(
		ModelSelection::new(current.provider_id.clone(), model_id),
		ModelLookup::KeptProvider,
	)
}

pub async fn handle_model(ctx: &mut ChatContext, params: &[&str]) -> Result<bool> {
	let Some(arg) = params.first().filter(|p| !p.trim_matches('/').is_empty()) else {
		ctx.print(&format!("{} {}", "Current:".bold(), ctx.selection))?;
		ctx.print(
			&format!("Usage: {} <provider>/<model_id>", MODEL_COMMAND)
				.bright_black()
				.to_string(),
		)?;
		return Ok(false);
	};

	let (selection, lookup) = resolve_model(ctx.api.as_ref(), &ctx.selection, arg).await;

	if lookup == ModelLookup::KeptProvider {
		ctx.print(
			&format!(
				"Model '{}' is not listed by any provider; keeping provider '{}'.",
				selection.model_id, selection.provider_id
			)
			.yellow()
			.to_string(),
		)?;
	}

	ctx.selection = selection;
	ctx.print(&format!("Switched to {}", ctx.selection).green().to_string())?;
	Ok(false)
}

#[cfg(test)]
mod tests {
	use super::super::super::testing::{context_with, MockApi, SharedBuffer};
	use super::*;
	use crate::api::ProviderCatalog;
	use std::sync::Arc;

	fn catalog() -> ProviderCatalog {
		serde_json::from_value(serde_json::json!({
			"providers": [
				{"id": "opencode", "models": {"big-pickle": {}}},
				{"id": "anthropic", "models": {"claude-sonnet-4": {}}}
			],
			"default": {}
		}))
		.unwrap()
	}

	#[tokio::test]
	async fn test_unknown_pair_is_accepted_verbatim() {
		let buffer = SharedBuffer::default();
		let api = Arc::new(MockApi::default().with_catalog(catalog()));
		let mut ctx = context_with(api.clone(), &buffer);

		handle_model(&mut ctx, &["nobody/imaginary-model"]).await.unwrap();
		assert_eq!(ctx.selection, ModelSelection::new("nobody", "imaginary-model"));
		// Explicit pairs never consult the catalog
		assert!(api.calls().is_empty());
	}

	#[tokio::test]
	async fn test_bare_id_uses_catalog_provider() {
		let api = MockApi::default().with_catalog(catalog());
		let current = ModelSelection::new("opencode", "kimi-k2.5-free");
		let (selection, lookup) = resolve_model(&api, &current, "claude-sonnet-4").await;
		assert_eq!(selection, ModelSelection::new("anthropic", "claude-sonnet-4"));
		assert_eq!(lookup, ModelLookup::Catalog);
	}

	#[tokio::test]
	async fn test_bare_id_keeps_provider_when_missing() {
		let current = ModelSelection::new("opencode", "kimi-k2.5-free");

		let api = MockApi::default().with_catalog(catalog());
		let (selection, lookup) = resolve_model(&api, &current, "gpt-5").await;
		assert_eq!(selection, ModelSelection::new("opencode", "gpt-5"));
		assert_eq!(lookup, ModelLookup::KeptProvider);

		// Catalog unavailable
		let api = MockApi::default();
		let (selection, _) = resolve_model(&api, &current, "gpt-5").await;
		assert_eq!(selection, ModelSelection::new("opencode", "gpt-5"));
	}

	#[tokio::test]
	async fn test_no_argument_shows_current() {
		let buffer = SharedBuffer::default();
		let mut ctx = context_with(Arc::new(MockApi::default()), &buffer);
		handle_model(&mut ctx, &[]).await.unwrap();
		assert!(buffer.contents().contains("opencode/kimi-k2.5-free"));
	}
}
