//! Session persistence between console invocations (`session.toml` next to the config).

use anyhow::{Context, Result};
use solar_sync::config::DashboardConfig;
use solar_sync::{Session, SessionHandle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/solar-dashboard/session.toml`
    pub fn default_location() -> Result<Self> {
        let config = DashboardConfig::config_file_path().context("No config directory")?;
        let dir = config.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(dir.join("session.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file yields a signed-out session
    pub async fn load(&self) -> SessionHandle {
        let session = match tokio::fs::read_to_string(&self.path).await {
            Ok(txt) => toml::from_str::<Session>(&txt).unwrap_or_else(|e| {
                debug!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                Session::default()
            }),
            Err(_) => Session::default(),
        };
        SessionHandle::restore(session)
    }

    pub async fn save(&self, session: &SessionHandle) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(&session.snapshot()).context("Failed to serialize session")?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        // The file carries the bearer token: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await
                .with_context(|| format!("Failed to restrict {}", self.path.display()))?;
        }
        info!("Session saved to {}", self.path.display());
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}
