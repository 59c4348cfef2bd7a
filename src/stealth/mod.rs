//! Stealth injection for pooled pages.
//!
//! Scripts are registered with `Page.addScriptToEvaluateOnNewDocument`, so
//! they run before any site script on every navigation of the page. The
//! user agent is overridden last to drop the `Headless` marker.

use anyhow::Result;
use chromiumoxide::{Page, cdp};
use tracing::{debug, warn};

mod config;
pub use config::StealthProfile;

const WEBDRIVER_JS: &str = r"
Object.defineProperty(Navigator.prototype, 'webdriver', { get: () => false });
";

const CHROME_RUNTIME_JS: &str = r"
if (!window.chrome) { window.chrome = {}; }
if (!window.chrome.runtime) {
    window.chrome.runtime = {
        connect: () => ({
            onMessage: { addListener: () => {}, removeListener: () => {} },
            postMessage: () => {}
        })
    };
}
";

const PLUGINS_JS: &str = r"
const mockPlugins = [
    { name: 'Chrome PDF Plugin', description: 'Portable Document Format', filename: 'internal-pdf-viewer' },
    { name: 'Chrome PDF Viewer', description: '', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai' },
    { name: 'Native Client', description: '', filename: 'internal-nacl-plugin' }
];
const pluginsProto = Object.getPrototypeOf(navigator.plugins);
Object.defineProperty(navigator, 'plugins', {
    get: () => {
        const plugins = {};
        mockPlugins.forEach((plugin, i) => { plugins[i] = plugin; plugins[plugin.name] = plugin; });
        Object.setPrototypeOf(plugins, pluginsProto);
        Object.defineProperty(plugins, 'length', { value: mockPlugins.length });
        return plugins;
    }
});
";

/// Scripts that depend on the profile's values
fn profile_scripts(profile: &StealthProfile) -> Vec<(&'static str, String)> {
    let languages = serde_json::to_string(&profile.languages).unwrap_or_else(|_| "[]".to_string());
    vec![
        (
            "navigator_languages",
            format!("Object.defineProperty(navigator, 'languages', {{ get: () => {languages} }});"),
        ),
        (
            "hardware_concurrency",
            format!(
                "Object.defineProperty(navigator, 'hardwareConcurrency', {{ get: () => {} }});",
                profile.hardware_concurrency
            ),
        ),
        (
            "webgl_vendor",
            format!(
                r"
if (window.WebGLRenderingContext) {{
    const getParameter = WebGLRenderingContext.prototype.getParameter;
    WebGLRenderingContext.prototype.getParameter = new Proxy(getParameter, {{
        apply(target, ctx, args) {{
            const param = (args && args[0]) || null;
            if (param === 37445) return {vendor};
            if (param === 37446) return {renderer};
            return Reflect.apply(target, ctx, args);
        }}
    }});
}}
",
                vendor = serde_json::to_string(&profile.webgl_vendor).unwrap_or_default(),
                renderer = serde_json::to_string(&profile.webgl_renderer).unwrap_or_default(),
            ),
        ),
    ]
}

/// Register evasion scripts and the user-agent override on `page`.
///
/// Individual script failures are logged; the call fails only if no script
/// could be registered or the user-agent override fails.
pub async fn inject(page: &Page, profile: &StealthProfile) -> Result<()> {
    let mut scripts: Vec<(&'static str, String)> = vec![
        ("navigator_webdriver", WEBDRIVER_JS.to_string()),
        ("chrome_runtime", CHROME_RUNTIME_JS.to_string()),
        ("navigator_plugins", PLUGINS_JS.to_string()),
    ];
    scripts.extend(profile_scripts(profile));

    let total = scripts.len();
    let mut injected = 0usize;
    for (name, source) in scripts {
        let params = cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams {
            source,
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        };
        match page.execute(params).await {
            Ok(_) => injected += 1,
            Err(e) => warn!("Failed to inject stealth script {name}: {e}"),
        }
    }

    if injected == 0 {
        return Err(anyhow::anyhow!("Failed to inject any of {total} stealth scripts"));
    }

    let version = page
        .execute(cdp::browser_protocol::browser::GetVersionParams {})
        .await?;
    page.execute(cdp::browser_protocol::network::SetUserAgentOverrideParams {
        user_agent: version.user_agent.replace("Headless", ""),
        accept_language: Some(profile.accept_language.clone()),
        platform: Some(profile.platform.clone()),
        user_agent_metadata: None,
    })
    .await?;

    debug!("Stealth injection complete: {injected}/{total} scripts active");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_values_are_json_quoted() {
        let profile = StealthProfile {
            webgl_vendor: "Acme \"GPU\"".to_string(),
            ..StealthProfile::default()
        };
        let scripts = profile_scripts(&profile);
        let webgl = &scripts.iter().find(|(n, _)| *n == "webgl_vendor").unwrap().1;
        assert!(webgl.contains(r#"return "Acme \"GPU\"";"#));
        let langs = &scripts[0].1;
        assert!(langs.contains(r#"["en-US","en"]"#));
    }
}
