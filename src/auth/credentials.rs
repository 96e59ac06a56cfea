//! Login credentials from environment variables or interactive prompts.
//!
//! Environment variables take priority; anything missing is prompted for.
//! Credentials are ephemeral and never written to disk.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Environment variable overrides for non-interactive use
const ENV_USERNAME: &str = "RH_USERNAME";
const ENV_PASSWORD: &str = "RH_PASSWORD";
const ENV_MFA: &str = "RH_MFA";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub mfa_code: Option<String>,
}

impl Credentials {
    /// Collect credentials, preferring environment variables and prompting
    /// interactively for whatever is missing. The password prompt does not
    /// echo. An empty MFA entry means no code is required.
    pub fn from_env_or_prompt() -> Result<Self> {
        let username = match std::env::var(ENV_USERNAME) {
            Ok(u) => u,
            Err(_) => prompt_line("Username: ")?,
        };
        let password = match std::env::var(ENV_PASSWORD) {
            Ok(p) => p,
            Err(_) => rpassword::prompt_password("Password: ")
                .context("Failed to read password")?,
        };
        let mfa_code = match std::env::var(ENV_MFA) {
            Ok(m) if !m.is_empty() => Some(m),
            Ok(_) => None,
            Err(_) => {
                let entry = prompt_line("MFA code (enter to skip): ")?;
                if entry.is_empty() { None } else { Some(entry) }
            }
        };
        Ok(Self {
            username,
            password,
            mfa_code,
        })
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}
