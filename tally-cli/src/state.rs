use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;

/// `$TALLY_HOME` when set, otherwise `$HOME/.tally`.
fn resolve_home(tally_home: Option<String>, home: Option<String>) -> Result<PathBuf> {
    match (tally_home.filter(|s| !s.is_empty()), home) {
        (Some(dir), _) => Ok(PathBuf::from(dir)),
        (None, Some(home)) => Ok(PathBuf::from(home).join(".tally")),
        (None, None) => bail!("neither TALLY_HOME nor HOME is set"),
    }
}

fn tally_home() -> Result<PathBuf> {
    resolve_home(std::env::var("TALLY_HOME").ok(), std::env::var("HOME").ok())
}

/// Config file location; creates the state directory on first use.
pub fn default_config_path() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir.join("config.toml"))
}

/// Google service-account key used by the sheet sink.
pub fn default_credentials_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("service_account.json"))
}
