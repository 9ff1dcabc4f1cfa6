use crate::cdp::CdpClient;
use crate::document::CdpDocument;
use formpilot_engine::config::schema::BrowserConfig;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    #[error("Navigation failed: {0}")]
    Navigation(String),
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub visible: bool,
    /// Falls back to `CHROME_BIN`, then chromiumoxide's own discovery.
    pub chrome_executable: Option<PathBuf>,
    /// Falls back to `FORMPILOT_USER_DATA_DIR`, then a throwaway directory.
    pub user_data_dir: Option<PathBuf>,
}

impl From<&BrowserConfig> for LaunchOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            visible: config.visible,
            chrome_executable: config.chrome_executable.clone(),
            user_data_dir: config.user_data_dir.clone(),
        }
    }
}

/// One browser with one page.
pub struct HeadlessSession {
    client: CdpClient,
    document: CdpDocument,
}

impl HeadlessSession {
    pub async fn launch(options: &LaunchOptions) -> Result<Self, SessionError> {
        info!("Launching Chromium session...");
        let client = CdpClient::launch(options).await?;
        let document = CdpDocument::new(client.page.clone());
        Ok(Self { client, document })
    }

    pub async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        info!("Navigating to: {}", url);
        self.client
            .page
            .goto(url)
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))?;
        Ok(())
    }

    pub async fn title(&self) -> Option<String> {
        self.client.page.get_title().await.ok().flatten()
    }

    pub fn document(&self) -> CdpDocument {
        self.document.clone()
    }

    pub async fn close(self) -> Result<(), SessionError> {
        self.client.close().await
    }
}
