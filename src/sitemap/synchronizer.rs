//! Sitemap synchronization.
//!
//! # Responsibilities
//! - Enumerate indexable hubs per hub type
//! - Render one `<urlset>` section per hub type plus a sitemap index
//! - Isolate failures to the section they happen in
//!
//! # Design Decisions
//! - Candidates are `allowed(max(HUB_INDEX_MIN, min_count))` plus the
//!   `allowed(min_count)` keys whose override qualifies; every candidate then
//!   goes through `HubResolver::assess`, the same code path a request takes,
//!   so no sitemap URL can 404 or resolve as noindex
//! - Emitted locs are canonical paths, which resolve without a redirect

use std::collections::BTreeSet;

use thiserror::Error;

use crate::config::SitemapConfig;
use crate::facets::hub_type::HubType;
use crate::facets::key::FacetKey;
use crate::facets::types::ComputationError;
use crate::hub::resolver::{Assessment, HubResolver, NotFoundReason};
use crate::observability::metrics;
use crate::sitemap::xml::{render_index, render_urlset, SitemapUrl};

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("unknown sitemap section {0:?}")]
    UnknownSection(String),

    #[error("allow-list for {hub_type} unavailable: {source}")]
    AllowList {
        hub_type: HubType,
        source: ComputationError,
    },

    #[error("assessment of {key} failed")]
    Assessment { key: FacetKey },
}

/// Rendered-ready content of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapSection {
    pub hub_type: HubType,
    pub name: String,
    pub urls: Vec<SitemapUrl>,
}

#[derive(Clone)]
pub struct SitemapSynchronizer {
    resolver: HubResolver,
    config: SitemapConfig,
}

impl SitemapSynchronizer {
    pub fn new(resolver: HubResolver, config: SitemapConfig) -> Self {
        Self { resolver, config }
    }

    /// Document name of a section, e.g. `sitemap-line-category.xml`.
    pub fn section_file(hub_type: HubType) -> String {
        format!("sitemap-{}.xml", hub_type.section_name())
    }

    /// Keys worth assessing for `hub_type`.
    pub fn candidates(&self, hub_type: HubType) -> Result<BTreeSet<FacetKey>, SitemapError> {
        let allow_list = self.resolver.allow_list();
        let policy = self.resolver.policy();
        let floor = hub_type.min_count();
        let wrap = |source| SitemapError::AllowList { hub_type, source };

        let mut keys = allow_list
            .allowed(hub_type, policy.hub_index_min().max(floor))
            .map_err(wrap)?;
        for key in allow_list.allowed(hub_type, floor).map_err(wrap)? {
            if keys.contains(&key) {
                continue;
            }
            if policy.override_qualifies(&key, self.resolver.content_for(&key).as_ref()) {
                keys.insert(key);
            }
        }
        Ok(keys)
    }

    /// Assessments of every indexable hub of `hub_type`, in-stock variants included.
    pub fn indexable(&self, hub_type: HubType) -> Result<Vec<Assessment>, SitemapError> {
        let mut out = Vec::new();
        for key in self.candidates(hub_type)? {
            let variants: &[bool] = if self.config.include_in_stock { &[false, true] } else { &[false] };
            for in_stock in variants {
                match self.resolver.assess(&key, *in_stock) {
                    Ok(assessment) if assessment.indexable => out.push(assessment),
                    Ok(_) => {}
                    Err(NotFoundReason::ComputationError) => {
                        return Err(SitemapError::Assessment { key: key.clone() })
                    }
                    Err(reason) => {
                        tracing::debug!(key = %key, in_stock = *in_stock, reason = reason.as_str(), "Candidate left out of sitemap");
                    }
                }
            }
        }
        Ok(out)
    }

    pub fn section(&self, hub_type: HubType) -> Result<SitemapSection, SitemapError> {
        let prefix = self.resolver.hub_prefix();
        let urls = self
            .indexable(hub_type)?
            .into_iter()
            .map(|a| {
                let lastmod = self
                    .resolver
                    .repository()
                    .last_modified(&a.key, a.in_stock)
                    .unwrap_or_else(|e| {
                        tracing::debug!(key = %a.key, error = %e, "No lastmod for sitemap entry");
                        None
                    });
                SitemapUrl {
                    loc: self.resolver.absolute_url(&a.path(prefix)),
                    lastmod,
                }
            })
            .collect();
        Ok(SitemapSection {
            hub_type,
            name: hub_type.section_name(),
            urls,
        })
    }

    /// Section for `hub_type`, or an empty one when building it failed.
    pub fn section_or_empty(&self, hub_type: HubType) -> SitemapSection {
        match self.section(hub_type) {
            Ok(section) => section,
            Err(e) => {
                tracing::warn!(section = %hub_type.section_name(), error = %e, "Skipping sitemap section");
                metrics::record_sitemap_section_error(&hub_type.section_name());
                SitemapSection {
                    hub_type,
                    name: hub_type.section_name(),
                    urls: Vec::new(),
                }
            }
        }
    }

    /// Every section; a broken hub type yields an empty section.
    pub fn build(&self) -> Vec<SitemapSection> {
        HubType::all().map(|t| self.section_or_empty(t)).collect()
    }

    /// XML of the section named `name` (the part between `sitemap-` and `.xml`).
    pub fn render_section(&self, name: &str) -> Result<String, SitemapError> {
        let hub_type =
            HubType::from_section_name(name).ok_or_else(|| SitemapError::UnknownSection(name.to_string()))?;
        let section = self.section_or_empty(hub_type);
        Ok(render_urlset(&section.urls, &self.config.changefreq, self.config.priority))
    }

    pub fn render_index(&self) -> String {
        let locs: Vec<String> = HubType::all()
            .map(|t| self.resolver.absolute_url(&format!("/{}", Self::section_file(t))))
            .collect();
        render_index(&locs)
    }
}
