//! Chromium-backed pool construction

use super::SessionPool;
use crate::browser_profile::BrowserProfile;
use crate::browser_setup::launch_browser;
use crate::config::PriceScrapeConfig;
use crate::session::{ChromiumSession, PageSession};
use crate::stealth::{self, StealthProfile};
use anyhow::{Context, Result};
use tracing::{info, warn};

impl SessionPool {
    /// Launch one browser and open `config.concurrency()` pages in it.
    ///
    /// Stealth scripts are registered on every page when `stealth_mode` is on;
    /// a page whose injection fails is still used, without stealth.
    pub async fn launch(config: &PriceScrapeConfig) -> Result<Self> {
        let profile = BrowserProfile::create().context("Failed to create browser profile")?;
        let launched = launch_browser(config.headless(), profile.path())
            .await
            .context("Failed to launch browser for session pool")?;
        // The pool owns cleanup from here on
        let _ = profile.into_path();

        let stealth_profile = StealthProfile::default();
        let mut sessions: Vec<Box<dyn PageSession>> = Vec::with_capacity(config.concurrency());

        for id in 0..config.concurrency() {
            let page = match launched.browser.new_page("about:blank").await {
                Ok(page) => page,
                Err(e) => {
                    let pool = SessionPool::with_browser(sessions, Some(launched));
                    let _ = pool.shutdown().await;
                    return Err(anyhow::Error::new(e).context(format!("Failed to open page {id}")));
                }
            };
            if config.stealth_mode()
                && let Err(e) = stealth::inject(&page, &stealth_profile).await
            {
                warn!(session = id, "Stealth injection failed: {e:#}");
            }
            sessions.push(Box::new(ChromiumSession::new(id, page)));
        }

        info!(
            sessions = sessions.len(),
            headless = config.headless(),
            stealth = config.stealth_mode(),
            "session pool ready"
        );
        Ok(SessionPool::with_browser(sessions, Some(launched)))
    }
}
