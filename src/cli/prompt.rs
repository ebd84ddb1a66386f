//! Terminal prompts
//!
//! Line prompts are generic over the reader and writer so the interactive
//! flow can be driven from tests.

use crate::config::{secret_string, SecretString};
use anyhow::{Context, Result};
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Read the session secret without echo
///
/// # Errors
///
/// Fails when stdin is not a terminal or the secret is empty.
pub fn read_secret(prompt: &str, env_hint: &str) -> Result<SecretString> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Cannot prompt for the secret: stdin is not a terminal. Set {env_hint}.");
    }

    let secret = rpassword::prompt_password(prompt).context("Failed to read secret")?;
    if secret.is_empty() {
        anyhow::bail!("Secret cannot be empty");
    }
    Ok(secret_string(secret))
}

/// Print `prompt` and read one trimmed line
///
/// Returns `None` at end of input.
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask a yes/no question; anything but `y`/`yes` is no
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<bool> {
    Ok(prompt_line(input, output, prompt)?
        .map(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
        .unwrap_or(false))
}

/// Subdirectories and CSV files directly inside a directory, sorted by name
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub directories: Vec<PathBuf>,
    pub manifests: Vec<PathBuf>,
}

/// List what the browser offers for `dir`
///
/// Hidden entries, whose names start with `.`, are left out.
///
/// # Errors
///
/// Fails if `dir` cannot be read.
pub fn list_manifest_candidates(dir: &Path) -> Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            listing.directories.push(path);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            listing.manifests.push(path);
        }
    }

    listing.directories.sort();
    listing.manifests.sort();
    Ok(listing)
}
