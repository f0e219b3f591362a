//! Request-time hub resolution.
//!
//! # Responsibilities
//! - Turn a hub path into Found, Redirect or NotFound
//! - Guard allow-list membership with a live population count
//! - Attach robots directive, canonical URL and related links
//!
//! # Design Decisions
//! - `assess` is the one code path deciding whether a key resolves and
//!   whether it is indexable; the sitemap calls it for every URL it emits
//! - A rejection read from a migrated cache entry is re-checked against a
//!   fresh computation before it becomes a 404
//! - Internal failures become NotFound, never an error response
//!
//! # Data Flow
//! ```text
//! path ─▶ parse_hub_path ─▶ assess(key) ─▶ query handling ─▶ HubOutcome
//!                              │
//!                              ├─▶ AllowListResolver (type min_count)
//!                              ├─▶ ProductRepository::live_count
//!                              └─▶ SeoContentStore + IndexabilityPolicy
//! ```

use std::sync::Arc;

use serde::Serialize;
use url::form_urlencoded;

use crate::catalog::content::SeoContentStore;
use crate::catalog::repository::ProductRepository;
use crate::catalog::types::ContentOverride;
use crate::config::{SiteConfig, ThresholdConfig};
use crate::facets::allow_list::AllowListResolver;
use crate::facets::hub_type::HubType;
use crate::facets::key::FacetKey;
use crate::facets::types::{AllowListSnapshot, ProductRef, SnapshotSource};
use crate::hub::path::parse_hub_path;
use crate::hub::related::{related_links, RelatedLink};
use crate::policy::{IndexabilityPolicy, NOINDEX_FOLLOW};

const PAGE_PARAM: &str = "page";

/// Why a request resolved to 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    UnparseablePath,
    NotAllowed,
    ZeroPopulation,
    ComputationError,
}

impl NotFoundReason {
    pub fn as_str(self) -> &'static str {
        match self {
            NotFoundReason::UnparseablePath => "unparseable_path",
            NotFoundReason::NotAllowed => "not_allowed",
            NotFoundReason::ZeroPopulation => "zero_population",
            NotFoundReason::ComputationError => "computation_error",
        }
    }
}

/// Result of checking one key against the allow-list and live inventory.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub key: FacetKey,
    pub in_stock: bool,
    /// Live population right now, restricted to in-stock when `in_stock`.
    pub population: u64,
    pub content: Option<ContentOverride>,
    pub indexable: bool,
    pub labels: Vec<String>,
    pub sample_refs: Vec<ProductRef>,
}

impl Assessment {
    pub fn path(&self, prefix: &str) -> String {
        self.key.path(prefix, self.in_stock)
    }
}

/// A hub request as seen by the resolver.
#[derive(Debug, Clone, Default)]
pub struct HubRequest {
    /// Full decoded path, including the hub prefix.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
}

impl HubRequest {
    pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            path: path.into(),
            query: query.filter(|q| !q.is_empty()),
        }
    }
}

/// Response model of a found hub.
#[derive(Debug, Clone, Serialize)]
pub struct HubPage {
    pub hub_type: HubType,
    #[serde(skip)]
    pub key: FacetKey,
    pub path: String,
    pub title: String,
    pub labels: Vec<String>,
    pub population: u64,
    pub indexable: bool,
    pub meta_robots: &'static str,
    pub canonical: String,
    pub in_stock: bool,
    pub page: u32,
    pub sample_refs: Vec<ProductRef>,
    pub related: Vec<RelatedLink>,
}

#[derive(Debug, Clone)]
pub enum HubOutcome {
    Found(Box<HubPage>),
    /// Permanent redirect to a path under the hub prefix.
    Redirect { location: String },
    NotFound {
        reason: NotFoundReason,
        hub_type: Option<HubType>,
    },
}

impl HubOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            HubOutcome::Found(_) => "found",
            HubOutcome::Redirect { .. } => "redirect",
            HubOutcome::NotFound { .. } => "not_found",
        }
    }
}

#[derive(Clone)]
pub struct HubResolver {
    allow_list: AllowListResolver,
    repository: Arc<dyn ProductRepository>,
    content: Arc<dyn SeoContentStore>,
    policy: IndexabilityPolicy,
    site: SiteConfig,
    related_links_cap: usize,
}

impl HubResolver {
    pub fn new(
        allow_list: AllowListResolver,
        repository: Arc<dyn ProductRepository>,
        content: Arc<dyn SeoContentStore>,
        site: SiteConfig,
    ) -> Self {
        let thresholds: &ThresholdConfig = allow_list.thresholds();
        let policy = IndexabilityPolicy::from_thresholds(thresholds);
        let related_links_cap = thresholds.related_links_cap;
        Self {
            allow_list,
            repository,
            content,
            policy,
            site,
            related_links_cap,
        }
    }

    pub fn allow_list(&self) -> &AllowListResolver {
        &self.allow_list
    }

    pub fn repository(&self) -> &Arc<dyn ProductRepository> {
        &self.repository
    }

    pub fn policy(&self) -> &IndexabilityPolicy {
        &self.policy
    }

    pub fn hub_prefix(&self) -> &str {
        &self.site.hub_prefix
    }

    /// Absolute URL for a path under the site.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.site.base_url.trim_end_matches('/'), path)
    }

    /// Content override for `key`; a store failure counts as no override.
    pub fn content_for(&self, key: &FacetKey) -> Option<ContentOverride> {
        match self.content.get(key) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Content store lookup failed");
                None
            }
        }
    }

    /// Decide whether `key` resolves and whether it is indexable.
    pub fn assess(&self, key: &FacetKey, in_stock: bool) -> Result<Assessment, NotFoundReason> {
        let hub_type = key.hub_type();
        let mut snapshot = self.snapshot(hub_type)?;

        if !is_member(&snapshot, key) && snapshot.source == SnapshotSource::Migrated {
            tracing::debug!(key = %key, "Re-checking rejection against a fresh allow-list");
            snapshot = self.allow_list.fresh_snapshot(hub_type).map_err(|e| {
                tracing::warn!(hub_type = %hub_type, error = %e, "Allow-list computation failed");
                NotFoundReason::ComputationError
            })?;
        }
        let Some(entry) = snapshot.entry(key).filter(|e| e.count >= hub_type.min_count()) else {
            return Err(NotFoundReason::NotAllowed);
        };
        let parent_admits = self.allow_list.parent_admits(key).map_err(|e| {
            tracing::warn!(hub_type = %hub_type, error = %e, "Parent allow-list computation failed");
            NotFoundReason::ComputationError
        })?;
        if !parent_admits {
            return Err(NotFoundReason::NotAllowed);
        }

        let population = self.repository.live_count(key, in_stock).map_err(|e| {
            tracing::warn!(key = %key, error = %e, "Live population count failed");
            NotFoundReason::ComputationError
        })?;
        if population == 0 {
            return Err(NotFoundReason::ZeroPopulation);
        }

        let content = self.content_for(key);
        let indexable = self.policy.is_indexable(key, population, content.as_ref());
        Ok(Assessment {
            key: key.clone(),
            in_stock,
            population,
            content,
            indexable,
            labels: snapshot.labels_for(key),
            sample_refs: entry.sample_refs.clone(),
        })
    }

    /// Resolve a request path (prefix included) and query string.
    pub fn resolve_path(&self, path: &str, query: Option<&str>) -> HubOutcome {
        self.resolve(&HubRequest::new(path, query.map(str::to_string)))
    }

    pub fn resolve(&self, request: &HubRequest) -> HubOutcome {
        let tail = request
            .path
            .strip_prefix(self.hub_prefix())
            .unwrap_or(&request.path);
        let parsed = match parse_hub_path(tail) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(path = %request.path, error = %e, "Unparseable hub path");
                return HubOutcome::NotFound {
                    reason: NotFoundReason::UnparseablePath,
                    hub_type: None,
                };
            }
        };

        let assessment = match self.assess(&parsed.key, parsed.in_stock) {
            Ok(assessment) => assessment,
            Err(reason) => {
                tracing::debug!(path = %request.path, reason = reason.as_str(), "Hub not found");
                return HubOutcome::NotFound {
                    reason,
                    hub_type: Some(parsed.key.hub_type()),
                };
            }
        };

        let canonical_path = assessment.path(self.hub_prefix());
        let query: Vec<(String, String)> = request
            .query
            .as_deref()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        if is_lone_first_page(&query) {
            return HubOutcome::Redirect {
                location: canonical_path,
            };
        }
        if request.path != canonical_path {
            let location = if query.is_empty() {
                canonical_path
            } else {
                format!("{}?{}", canonical_path, encode_query(&query))
            };
            return HubOutcome::Redirect { location };
        }

        HubOutcome::Found(Box::new(self.build_page(assessment, canonical_path, &query)))
    }

    /// Resolve the canonical, unpaginated URL of a key.
    pub fn resolve_key(&self, key: &FacetKey, in_stock: bool) -> HubOutcome {
        self.resolve_path(&key.path(self.hub_prefix(), in_stock), None)
    }

    fn build_page(&self, assessment: Assessment, path: String, query: &[(String, String)]) -> HubPage {
        let page = query
            .iter()
            .find(|(k, _)| k == PAGE_PARAM)
            .and_then(|(_, v)| page_number(v))
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let (indexable, meta_robots, canonical) = if query.is_empty() {
            (
                assessment.indexable,
                self.policy.meta_robots(assessment.indexable),
                self.absolute_url(&path),
            )
        } else {
            (
                false,
                NOINDEX_FOLLOW,
                format!("{}?{}", self.absolute_url(&path), encode_query(query)),
            )
        };

        let hub_type = assessment.key.hub_type();
        let related = related_links(self, &assessment.key, self.related_links_cap);
        HubPage {
            hub_type,
            title: hub_type.title(&assessment.labels, assessment.in_stock),
            key: assessment.key,
            path,
            labels: assessment.labels,
            population: assessment.population,
            indexable,
            meta_robots,
            canonical,
            in_stock: assessment.in_stock,
            page,
            sample_refs: assessment.sample_refs,
            related,
        }
    }

    fn snapshot(&self, hub_type: HubType) -> Result<AllowListSnapshot, NotFoundReason> {
        self.allow_list.snapshot(hub_type).map_err(|e| {
            tracing::warn!(hub_type = %hub_type, error = %e, "Allow-list computation failed");
            NotFoundReason::ComputationError
        })
    }
}

fn is_member(snapshot: &AllowListSnapshot, key: &FacetKey) -> bool {
    snapshot
        .entry(key)
        .is_some_and(|e| e.count >= key.hub_type().min_count())
}

fn page_number(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn is_lone_first_page(query: &[(String, String)]) -> bool {
    matches!(query, [(k, v)] if k == PAGE_PARAM && page_number(v) == Some(1))
}

fn encode_query(query: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish()
}
