//! Shared configuration constants for pricescrape
//!
//! Default values used by the config builder and the resolution engine so that
//! timeouts and limits are defined in exactly one place.

use std::time::Duration;

/// Default number of concurrently resolved tasks and pooled sessions
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Upper bound accepted for the concurrency budget
///
/// Every unit of concurrency is one open Chromium tab; beyond this the browser
/// process itself becomes the bottleneck.
pub const MAX_CONCURRENCY: usize = 64;

/// Timeout for `page.goto()` on a pooled session
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Wait applied after navigation so client-side rendering can settle
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Bounded wait for an explicit or site-specific selector to appear
pub const DEFAULT_SELECTOR_TIMEOUT: Duration = Duration::from_secs(6);

/// Bounded wait for a matching network response during navigation
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-provider timeout used by the external fetch service
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for direct JSON endpoint requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for the out-of-process renderer fallback
pub const DEFAULT_RENDERER_TIMEOUT: Duration = Duration::from_secs(60);

/// Characters of document kept in an outcome for diagnostics
pub const DEFAULT_SNIPPET_CHARS: usize = 300;

/// Currency symbol prefixed to bare amounts found in scripts and attributes
pub const DEFAULT_CURRENCY: &str = "$";

/// Node budget for recursive JSON price discovery
pub const JSON_SCAN_NODE_BUDGET: usize = 10_000;

/// Depth bound for recursive JSON price discovery
pub const JSON_SCAN_MAX_DEPTH: usize = 32;

/// How long a response capture keeps listening once the page has loaded
pub const CAPTURE_GRACE: Duration = Duration::from_secs(2);

/// Polling interval for selector waits
pub const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Chrome user agent string for stealth mode and direct HTTP requests
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
