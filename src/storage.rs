use crate::auth::Credential;
use crate::board::Standing;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use log::debug;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// On-disk home of the signed-in credential, the CLI's stand-in for browser
/// local storage.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/leaderboard-rs/credential.json`, falling back to the
    /// working directory when the platform has no config dir.
    pub fn default_location() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("leaderboard-rs").join("credential.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("create credential dir {}", dir.display()))?;
        }
        let s = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, s)
            .with_context(|| format!("write credential {}", self.path.display()))?;
        debug!("saved credential to {}", self.path.display());
        Ok(())
    }

    /// `Ok(None)` when nothing has been stored yet.
    pub fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read credential {}", self.path.display()))?;
        let credential = serde_json::from_str(&s)
            .with_context(|| format!("parse credential {}", self.path.display()))?;
        Ok(Some(credential))
    }

    /// Remove the stored credential. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", self.path.display())),
        }
    }
}

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn neutralize(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{}", cell),
        _ => cell.to_string(),
    }
}

/// Save standings as CSV with header.
pub fn save_standings_csv<P: AsRef<Path>>(rows: &[Standing], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("rank", "username", "region", "title", "elo", "disabled", "hue", "color"))?;
    for r in rows {
        wtr.serialize((
            r.rank,
            neutralize(&r.user.username),
            neutralize(&r.user.region),
            neutralize(&r.user.title),
            r.user.elo,
            r.user.disabled,
            r.style.hsl.h_deg,
            &r.style.hex,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save standings as pretty JSON array.
pub fn save_standings_json<P: AsRef<Path>>(rows: &[Standing], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
