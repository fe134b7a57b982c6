//! Reference link check: confirm every name resolves on the external wiki.
//!
//! Each candidate page is fetched once with bounded concurrency. A page that
//! loads marks its own name `direct`; links on it that match the template mark
//! other candidates `in-link`. Names that still fail get an `alt` override so
//! the game stops emitting broken links.

use crate::config::Config;
use crate::link::{LinkBuilder, RefTemplate};
use crate::pokedex::{self, PokedexEntry};
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{error, info, warn};

pub const CACHE_FILE: &str = "check-ref.json";

static HREF_REGEX: OnceLock<Regex> = OnceLock::new();
static FORM_SUFFIX_REGEX: OnceLock<Regex> = OnceLock::new();
static REGIONAL_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();

/// Outcome for one name, stored as a plain string in the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CheckStatus {
    /// Not checked (yet)
    Pending,
    /// The name's own page loaded
    Direct,
    /// Another loaded page links to the name's page
    InLink,
    /// Fetch failed, with the HTTP status when there was one
    Invalid(Option<u16>),
}

impl CheckStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckStatus::Direct | CheckStatus::InLink)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pending => Ok(()),
            CheckStatus::Direct => f.write_str("direct"),
            CheckStatus::InLink => f.write_str("in-link"),
            CheckStatus::Invalid(None) => f.write_str("invalid"),
            CheckStatus::Invalid(Some(status)) => write!(f, "invalid {}", status),
        }
    }
}

impl FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(CheckStatus::Pending),
            "direct" => Ok(CheckStatus::Direct),
            "in-link" => Ok(CheckStatus::InLink),
            "invalid" => Ok(CheckStatus::Invalid(None)),
            other => other
                .strip_prefix("invalid ")
                .and_then(|code| code.parse().ok())
                .map(|code| CheckStatus::Invalid(Some(code)))
                .ok_or_else(|| format!("unknown check status `{}`", other)),
        }
    }
}

impl From<CheckStatus> for String {
    fn from(status: CheckStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for CheckStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

pub type CheckCache = BTreeMap<String, CheckStatus>;

#[derive(Debug)]
enum FetchError {
    Status(u16),
    Transport(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status(code) => write!(f, "HTTP {}", code),
            FetchError::Transport(e) => f.write_str(e),
        }
    }
}

/// Result of fetching one candidate page.
#[derive(Debug)]
struct PageOutcome {
    name: String,
    status: CheckStatus,
    /// Candidate names linked from the page
    linked: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefCheckSummary {
    pub fetched: usize,
    pub direct: usize,
    pub in_link: usize,
    pub invalid: usize,
    /// Overrides written during this run, empty ones included
    pub alt_added: usize,
    pub alt_removed: usize,
}

/// `href` values of every anchor in an HTML page.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let regex = HREF_REGEX.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
    });

    regex
        .captures_iter(html)
        .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)))
        .map(|m| m.as_str().replace("&amp;", "&"))
        .collect()
}

/// English fallbacks for a name without a page of its own: the base name
/// without a form suffix, then without a regional prefix.
pub fn fallback_names(name: &str) -> Vec<String> {
    let suffix = FORM_SUFFIX_REGEX.get_or_init(|| {
        Regex::new(r"(?i) [^ ]+ (forme?|mode|cloak|rider|style)$").unwrap()
    });
    let prefix = REGIONAL_PREFIX_REGEX
        .get_or_init(|| Regex::new(r"(?i)^(Alolan|Galarian|Hisuian|Darmanitan) ").unwrap());

    [suffix.replace(name, ""), prefix.replace(name, "")]
        .into_iter()
        .filter(|candidate| candidate != name)
        .map(|candidate| candidate.into_owned())
        .collect()
}

pub struct RefChecker {
    client: reqwest::Client,
    concurrency: usize,
    retry: RetryConfig,
}

impl RefChecker {
    pub fn new(concurrency: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .user_agent("Mozilla/5.0 (compatible; squirdle-ref-check)")
            .build()?;

        Ok(Self {
            client,
            concurrency: concurrency.max(1),
            retry: RetryConfig::ref_page(),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        with_retry_if(
            &self.retry,
            &format!("Ref page {}", url),
            || async {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| FetchError::Transport(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status.as_u16()));
                }
                response
                    .text()
                    .await
                    .map_err(|e| FetchError::Transport(e.to_string()))
            },
            |e| match e {
                FetchError::Status(code) => *code >= 500,
                FetchError::Transport(_) => true,
            },
        )
        .await
    }

    async fn check_page(&self, builder: &LinkBuilder, name: String) -> PageOutcome {
        let url = match Url::parse(&builder.make(&name)) {
            Ok(url) => url,
            Err(e) => {
                error!("{}: cannot build URL: {}", name, e);
                return PageOutcome {
                    name,
                    status: CheckStatus::Invalid(None),
                    linked: Vec::new(),
                };
            }
        };

        match self.fetch(&url).await {
            Ok(html) => {
                let origin = Url::parse(&url.origin().ascii_serialization()).ok();
                let linked = extract_hrefs(&html)
                    .iter()
                    .filter_map(|href| origin.as_ref()?.join(href).ok())
                    .filter_map(|absolute| builder.parse(absolute.as_str()))
                    .collect();
                PageOutcome {
                    name,
                    status: CheckStatus::Direct,
                    linked,
                }
            }
            Err(FetchError::Status(code)) => PageOutcome {
                name,
                status: CheckStatus::Invalid(Some(code)),
                linked: Vec::new(),
            },
            Err(e) => {
                error!("{}: {} ({})", name, e, url);
                PageOutcome {
                    name,
                    status: CheckStatus::Invalid(None),
                    linked: Vec::new(),
                }
            }
        }
    }

    /// Check `names` against `template`, updating its `alt` map and the cache.
    ///
    /// Names already recorded as successful in `cache` are not fetched again.
    pub async fn run(
        &self,
        lang: &str,
        template: &mut RefTemplate,
        cache: &mut CheckCache,
        names: &[String],
    ) -> RefCheckSummary {
        let builder = template.builder();
        let mut summary = RefCheckSummary::default();

        for name in names.iter().filter(|n| !n.is_empty()) {
            let entry = cache.entry(name.clone()).or_insert(CheckStatus::Pending);
            if !entry.is_success() {
                *entry = CheckStatus::Pending;
            }
        }

        let targets: Vec<String> = cache
            .iter()
            .filter(|(name, status)| {
                **status == CheckStatus::Pending
                    && template.alt.get(*name).map_or(true, |alt| alt.is_empty())
            })
            .map(|(name, _)| name.clone())
            .collect();

        info!(
            "[{}] Checking {} reference pages ({} at a time)",
            lang,
            targets.len(),
            self.concurrency
        );
        summary.fetched = targets.len();

        let total = targets.len();
        let mut done = 0usize;
        let outcomes: Vec<PageOutcome> = stream::iter(targets)
            .map(|name| self.check_page(&builder, name))
            .buffer_unordered(self.concurrency)
            .inspect(|_| {
                done += 1;
                if done % self.concurrency == 0 || done == total {
                    info!("[{}] {}/{} pages checked", lang, done, total);
                }
            })
            .collect()
            .await;

        for outcome in &outcomes {
            cache.insert(outcome.name.clone(), outcome.status.clone());
        }
        for linked in outcomes.iter().flat_map(|o| o.linked.iter()) {
            if let Some(status) = cache.get_mut(linked) {
                if !status.is_success() {
                    *status = CheckStatus::InLink;
                }
            }
        }

        for (name, status) in cache.iter() {
            if status.is_success() {
                if template.alt.remove(name).is_some() {
                    summary.alt_removed += 1;
                }
                continue;
            }
            if template.alt.get(name).is_some_and(|alt| !alt.is_empty()) {
                continue;
            }

            let replacement = if lang == "en" {
                fallback_names(name)
                    .into_iter()
                    .find(|candidate| cache.get(candidate).is_some_and(CheckStatus::is_success))
                    .unwrap_or_default()
            } else {
                String::new()
            };
            if !template.alt.contains_key(name) {
                summary.alt_added += 1;
            }
            template.alt.insert(name.clone(), replacement);
        }

        for status in cache.values() {
            match status {
                CheckStatus::Direct => summary.direct += 1,
                CheckStatus::InLink => summary.in_link += 1,
                CheckStatus::Invalid(_) => summary.invalid += 1,
                CheckStatus::Pending => {}
            }
        }

        summary
    }
}

pub fn cache_path(generated_dir: &Path, lang: &str) -> PathBuf {
    generated_dir.join(lang).join(CACHE_FILE)
}

pub fn load_cache(path: &Path) -> Result<CheckCache> {
    if !path.exists() {
        return Ok(CheckCache::new());
    }
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn save_cache(path: &Path, cache: &CheckCache) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(cache)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Names of every entry (forms included) in `lang`.
pub fn localized_names(entries: &[PokedexEntry], lang: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack: Vec<&PokedexEntry> = entries.iter().rev().collect();
    while let Some(entry) = stack.pop() {
        if let Some(name) = entry.name.get(lang) {
            names.push(name.to_string());
        }
        stack.extend(entry.forms.iter().rev());
    }
    names
}

/// Run the check for one language against the files named in `config`.
///
/// `cases` restricts the run to the given names instead of the whole dataset.
pub async fn check_ref(
    config: &Config,
    lang: &str,
    cases: Option<Vec<String>>,
) -> Result<RefCheckSummary> {
    let ref_path = RefTemplate::path(&config.translation_dir, lang);
    let mut template = RefTemplate::read(&ref_path)?;

    let cache_file = cache_path(&config.generated_dir, lang);
    let mut cache = load_cache(&cache_file)?;

    let names = match cases {
        Some(cases) => cases,
        None => localized_names(&pokedex::load_yaml(&config.pokedex_file)?, lang),
    };

    let checker = RefChecker::new(config.ref_check_concurrency)?;
    let summary = checker.run(lang, &mut template, &mut cache, &names).await;

    if summary.invalid > 0 {
        warn!("[{}] {} names have no working page", lang, summary.invalid);
    }

    template.save(&ref_path)?;
    save_cache(&cache_file, &cache)?;
    info!(
        "[{}] direct: {}, in-link: {}, invalid: {}, alt +{} -{}",
        lang,
        summary.direct,
        summary.in_link,
        summary.invalid,
        summary.alt_added,
        summary.alt_removed
    );

    Ok(summary)
}
