// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Resolves a named provider from `GlobalConfig.providers` into a concrete
//! connection (endpoint + resolved credential) that the LLM client and the
//! embedding providers build on. Credentials are plain strings
//! resolved at config-load time by `${VAR}` substitution — this registry
//! does not re-touch the environment.

use crate::config::GlobalConfig;
use crate::llm_client::LlmClient;
use ingest_domain::value_objects::AccessMethod;
use ingest_domain::IngestError;

/// A provider's resolved connection shape, ready to build a client from.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub name: String,
    pub access_method: AccessMethod,
    pub endpoint: String,
    pub credential: Option<String>,
    pub default_model: Option<String>,
}

pub struct ProviderRegistry<'a> {
    global: &'a GlobalConfig,
}

impl<'a> ProviderRegistry<'a> {
    pub fn new(global: &'a GlobalConfig) -> Self {
        Self { global }
    }

    pub fn resolve(&self, provider_name: &str) -> Result<ResolvedProvider, IngestError> {
        let cfg = self.global.provider(provider_name)?;
        Ok(ResolvedProvider {
            name: provider_name.to_string(),
            access_method: cfg.access_method,
            endpoint: cfg.endpoint.clone(),
            credential: cfg.credential.clone(),
            default_model: cfg.model.clone(),
        })
    }

    /// Builds a chat-completion client for `provider_name`, defaulting the
    /// model to the provider's configured model when `model` is empty.
    pub fn llm_client(&self, provider_name: &str, model: &str, temperature: f64) -> Result<LlmClient, IngestError> {
        let resolved = self.resolve(provider_name)?;
        let effective_model = if model.is_empty() {
            resolved
                .default_model
                .clone()
                .ok_or_else(|| IngestError::configuration(format!("provider '{provider_name}' has no default model and none was given")))?
        } else {
            model.to_string()
        };
        Ok(LlmClient::new(resolved.endpoint, resolved.credential, effective_model, temperature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use std::collections::BTreeMap;

    fn global_with(provider: &str, endpoint: &str) -> GlobalConfig {
        let mut providers = BTreeMap::new();
        providers.insert(
            provider.to_string(),
            ProviderConfig {
                access_method: AccessMethod::OpenAiCompatible,
                endpoint: endpoint.to_string(),
                credential: Some("secret".to_string()),
                model: Some("gpt-4o-mini".to_string()),
            },
        );
        GlobalConfig { providers, ..Default::default() }
    }

    #[test]
    fn resolves_known_provider() {
        let global = global_with("openai", "https://api.openai.com/v1");
        let registry = ProviderRegistry::new(&global);
        let resolved = registry.resolve("openai").unwrap();
        assert_eq!(resolved.endpoint, "https://api.openai.com/v1");
    }

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        let global = GlobalConfig::default();
        let registry = ProviderRegistry::new(&global);
        assert!(registry.resolve("missing").is_err());
    }

    #[test]
    fn llm_client_falls_back_to_provider_default_model() {
        let global = global_with("openai", "https://api.openai.com/v1");
        let registry = ProviderRegistry::new(&global);
        let client = registry.llm_client("openai", "", 0.1).unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");
    }
}
