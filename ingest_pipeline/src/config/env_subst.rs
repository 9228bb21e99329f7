// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `${VAR}` substitution over raw config text, performed as a pre-parse text
//! pass before handing the result to `serde_yaml`. Grounded in
//! `original_source/rag_framework/config.py`'s substitution pass: unresolved
//! variables whose name ends in `_API_KEY` or `_TOKEN` become a placeholder
//! string rather than failing, since those are routinely left unset in dev
//! environments and the provider is simply unusable until configured;
//! anything else missing is a configuration error.

use ingest_domain::IngestError;
use once_cell::sync::Lazy;
use regex::Regex;

static VAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

const PLACEHOLDER_SUFFIXES: [&str; 2] = ["_API_KEY", "_TOKEN"];

/// Substitutes every `${VAR}` occurrence in `text` using `std::env::var`.
pub fn substitute_env(text: &str) -> Result<String, IngestError> {
    substitute_env_with(text, |name| std::env::var(name).ok())
}

/// Testable variant taking an explicit variable resolver.
pub fn substitute_env_with(text: &str, resolve: impl Fn(&str) -> Option<String>) -> Result<String, IngestError> {
    let mut err: Option<IngestError> = None;
    let substituted = VAR_PATTERN.replace_all(text, |caps: &regex::Captures| {
        let name = &caps[1];
        match resolve(name) {
            Some(value) => value,
            None => {
                if PLACEHOLDER_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                    format!("__unset_{name}__")
                } else {
                    err = Some(IngestError::configuration(format!(
                        "environment variable '{name}' is not set and has no placeholder fallback"
                    )));
                    String::new()
                }
            }
        }
    });
    match err {
        Some(e) => Err(e),
        None => Ok(substituted.into_owned()),
    }
}

/// Preloads a `.env` file (`KEY=VALUE` lines, `#` comments, quoted values)
/// into the process environment without overriding variables already set.
/// A missing file at the default location is not an error; an explicitly
/// given path that doesn't exist is.
pub fn load_env_file(path: Option<&std::path::Path>) -> Result<(), IngestError> {
    match path {
        Some(p) => dotenvy::from_path(p)
            .map_err(|e| IngestError::configuration(format!("failed to load env file {}: {e}", p.display()))),
        None => match dotenvy::dotenv() {
            Ok(_) | Err(dotenvy::Error::Io(_)) => Ok(()),
            Err(e) => Err(IngestError::configuration(format!("failed to load .env: {e}"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_variable() {
        let out = substitute_env_with("endpoint: ${HOST}/v1", |name| {
            (name == "HOST").then(|| "example.com".to_string())
        })
        .unwrap();
        assert_eq!(out, "endpoint: example.com/v1");
    }

    #[test]
    fn unresolved_api_key_becomes_placeholder() {
        let out = substitute_env_with("key: ${MISTRAL_API_KEY}", |_| None).unwrap();
        assert_eq!(out, "key: __unset_MISTRAL_API_KEY__");
    }

    #[test]
    fn unresolved_non_credential_var_is_an_error() {
        let err = substitute_env_with("path: ${DATA_DIR}", |_| None).unwrap_err();
        assert!(matches!(err, IngestError::Configuration(_)));
    }

    #[test]
    fn multiple_vars_on_one_line() {
        let out = substitute_env_with("${A}-${B}", |name| match name {
            "A" => Some("x".into()),
            "B" => Some("y".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(out, "x-y");
    }
}
