//! Generic tier pipeline over an already-fetched document.
//!
//! Tiers run strictly in order against one HTML string and the first tier
//! that yields a canonical price wins:
//!
//! 1. explicit selector (when the task has one)
//! 2. semantic scan of price-like classes, ids, itemprops and meta tags
//! 3. embedded script scan (JSON-LD offers, then loose `price: n` assignments)
//! 4. fuzzy scan of visible text, then of individual text nodes
//!
//! Everything here is synchronous. `scraper::Html` is not `Send`, so callers
//! parse and scan inside one poll and never hold a document across an await.

pub mod fuzzy;
pub mod script;
pub mod selector;
pub mod semantic;

use crate::error::ResolveError;
use crate::outcome::{ExtractionOutcome, Tier};
use crate::price::CanonicalPrice;
use crate::utils::{DEFAULT_CURRENCY, DEFAULT_SNIPPET_CHARS};
use scraper::Html;
use tracing::{debug, trace};

/// Tier order used when a task has no vendor handler
pub const GENERIC_TIERS: &[Tier] = &[Tier::Selector, Tier::Semantic, Tier::Script, Tier::Fuzzy];

/// Inputs shared by every tier
#[derive(Debug, Clone, Copy)]
pub struct TierOptions<'a> {
    pub selector: Option<&'a str>,
    pub selector_only: bool,
    /// Vendor container selectors for [`Tier::SiteSelector`]
    pub site_selectors: &'a [&'a str],
    pub default_currency: &'a str,
    pub snippet_chars: usize,
}

impl Default for TierOptions<'_> {
    fn default() -> Self {
        Self {
            selector: None,
            selector_only: false,
            site_selectors: &[],
            default_currency: DEFAULT_CURRENCY,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

/// Run the generic tiers against `html`
#[must_use]
pub fn resolve(html: &str, options: &TierOptions<'_>) -> ExtractionOutcome {
    run_tiers(html, GENERIC_TIERS, options)
}

/// Run the given tiers, in order, against `html`.
///
/// A selector miss is non-terminal unless `selector_only` is set, in which
/// case later tiers are skipped and the miss is reported.
#[must_use]
pub fn run_tiers(html: &str, tiers: &[Tier], options: &TierOptions<'_>) -> ExtractionOutcome {
    let document = Html::parse_document(html);
    let mut reasons: Vec<String> = Vec::new();

    for &tier in tiers {
        match run_tier(&document, tier, options) {
            Ok(Some(price)) => {
                debug!(%tier, price = %price, "tier matched");
                return ExtractionOutcome::found(price, tier);
            }
            Ok(None) => {
                trace!(%tier, "tier found nothing");
                reasons.push(format!("{tier}: no price"));
            }
            Err(err) => {
                debug!(%tier, error = %err, "tier failed");
                let stop = tier == Tier::Selector && options.selector_only;
                reasons.push(format!("{tier}: {err}"));
                if stop {
                    break;
                }
            }
        }
    }

    let detail = if reasons.is_empty() {
        "no tiers ran".to_string()
    } else {
        reasons.join(", ")
    };
    ExtractionOutcome::miss()
        .with_error(detail)
        .with_snippet(html, options.snippet_chars)
}

fn run_tier(
    document: &Html,
    tier: Tier,
    options: &TierOptions<'_>,
) -> Result<Option<CanonicalPrice>, ResolveError> {
    match tier {
        Tier::Selector => match options.selector {
            Some(sel) => selector::scan(document, sel, options.default_currency).map(Some),
            None => Ok(None),
        },
        Tier::SiteSelector => Ok(selector::first_of(
            document,
            options.site_selectors,
            options.default_currency,
        )),
        Tier::Semantic => Ok(semantic::scan(document, options.default_currency)),
        Tier::Script => Ok(script::scan(document, options.default_currency)),
        Tier::Fuzzy => Ok(fuzzy::scan(document)),
        Tier::Endpoint | Tier::NetworkResponse | Tier::Renderer | Tier::None => Ok(None),
    }
}

/// Concatenated text of an element, whitespace collapsed
pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    crate::utils::collapse_whitespace(&raw)
}
