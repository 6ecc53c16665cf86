// ABOUTME: Token discovery for the CLI with a precedence chain
// ABOUTME: Checks the --token flag first, then the SIYUAN_TOKEN env var

use crate::{Error, Result};
use std::env;

pub const TOKEN_ENV_VAR: &str = "SIYUAN_TOKEN";

pub fn resolve_token(cli_token: Option<String>) -> Result<String> {
    // 1. CLI flag
    if let Some(token) = cli_token.filter(|t| !t.trim().is_empty()) {
        return Ok(token);
    }

    // 2. Environment variable
    if let Some(token) = env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.trim().is_empty()) {
        return Ok(token);
    }

    Err(Error::Auth(format!(
        "No API token found. Provide via --token or {} env var (Settings → About → API token)",
        TOKEN_ENV_VAR
    )))
}
