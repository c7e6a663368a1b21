//! Operator input validation.
//!
//! `validate` is pure; `prompt_validated` wraps it in the re-prompt loop so a
//! malformed answer never reaches the deployment state.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::OnboardError;
use crate::prompt::Prompter;

static CREDENTIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]+$").expect("credential pattern is valid"));

static CHAIN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,19}$").expect("chain name pattern is valid")
});

static ENVIRONMENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("environment pattern is valid")
});

/// What a raw answer is supposed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Hex signing key with a `0x` prefix.
    Credential,
    /// Absolute http(s) URL.
    Url,
    /// Semver artifact version, optionally prefixed with `v`.
    Version,
    ChainName,
    EnvironmentId,
    /// Unsigned, non-zero integer.
    Number,
    /// Any non-blank text.
    Text,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Credential => "signing credential",
            InputKind::Url => "URL",
            InputKind::Version => "version",
            InputKind::ChainName => "chain name",
            InputKind::EnvironmentId => "environment identifier",
            InputKind::Number => "number",
            InputKind::Text => "value",
        };
        f.write_str(name)
    }
}

/// Check `raw` against the rules for `kind` and return the accepted value.
pub fn validate(kind: InputKind, raw: &str) -> Result<String, OnboardError> {
    let value = raw.trim();
    let reject = |reason: &str| OnboardError::Validation {
        kind,
        reason: reason.to_string(),
    };

    match kind {
        InputKind::Credential => {
            // Never echo the rejected key back.
            if !CREDENTIAL.is_match(value) {
                return Err(reject("expected hexadecimal digits prefixed with 0x"));
            }
        }
        InputKind::Url => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(reject("must start with http:// or https://"));
            }
            let parsed = url::Url::parse(value).map_err(|e| reject(&e.to_string()))?;
            if parsed.host_str().is_none_or(str::is_empty) {
                return Err(reject("missing host"));
            }
        }
        InputKind::Version => {
            let bare = value.strip_prefix('v').unwrap_or(value);
            semver::Version::parse(bare)
                .map_err(|e| reject(&format!("'{}' is not a semantic version ({})", value, e)))?;
        }
        InputKind::ChainName => {
            if !CHAIN_NAME.is_match(value) {
                return Err(reject(
                    "use 1-20 letters, digits, '-' or '_' starting with a letter or digit",
                ));
            }
        }
        InputKind::EnvironmentId => {
            if !ENVIRONMENT_ID.is_match(value) {
                return Err(reject("use lowercase letters, digits and '-'"));
            }
        }
        InputKind::Number => match value.parse::<u64>() {
            Ok(0) => return Err(reject("must be greater than zero")),
            Ok(_) => {}
            Err(_) => return Err(reject(&format!("'{}' is not an unsigned integer", value))),
        },
        InputKind::Text => {
            if value.is_empty() {
                return Err(reject("must not be empty"));
            }
        }
    }

    Ok(value.to_string())
}

/// Ask `question` until the answer validates as `kind`.
pub fn prompt_validated(
    prompter: &mut dyn Prompter,
    kind: InputKind,
    question: &str,
    default: Option<&str>,
) -> anyhow::Result<String> {
    loop {
        let raw = match kind {
            InputKind::Credential => prompter.secret(question)?,
            _ => prompter.input(question, default)?,
        };
        match validate(kind, &raw) {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::debug!(%kind, "rejected operator input");
                prompter.warn(&err.to_string())?;
            }
        }
    }
}

/// Like [`prompt_validated`] but a blank answer yields `None`.
pub fn prompt_optional(
    prompter: &mut dyn Prompter,
    kind: InputKind,
    question: &str,
) -> anyhow::Result<Option<String>> {
    loop {
        let raw = prompter.input(question, None)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match validate(kind, &raw) {
            Ok(value) => return Ok(Some(value)),
            Err(err) => prompter.warn(&err.to_string())?,
        }
    }
}
