use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::facets::hub_type::HubType;
use crate::facets::types::{ProductRef, SnapshotSource};
use crate::hub::resolver::HubOutcome;
use crate::hub::thin::{thin_hubs, ThinHub};
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct HubTypeStatus {
    pub hub_type: HubType,
    pub entries: usize,
    pub allowed: usize,
    pub source: Option<SnapshotSource>,
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub cache_enabled: bool,
    pub cache_disabled_by_failure: bool,
    pub hub_types: Vec<HubTypeStatus>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let services = &state.services;
    let hub_types = HubType::all()
        .map(|hub_type| match services.allow_list().snapshot(hub_type) {
            Ok(snapshot) => HubTypeStatus {
                hub_type,
                entries: snapshot.entries.len(),
                allowed: snapshot.allowed(hub_type.min_count()).len(),
                source: Some(snapshot.source),
            },
            Err(e) => {
                tracing::warn!(hub_type = %hub_type, error = %e, "Allow-list unavailable for status");
                HubTypeStatus {
                    hub_type,
                    entries: 0,
                    allowed: 0,
                    source: None,
                }
            }
        })
        .collect();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: services.uptime().as_secs(),
        cache_enabled: services.cache().is_some(),
        cache_disabled_by_failure: services.cache().is_some_and(|c| c.is_disabled()),
        hub_types,
    })
}

#[derive(Deserialize)]
pub struct AllowListQuery {
    pub min_count: Option<u64>,
}

#[derive(Serialize)]
pub struct AllowListItem {
    pub facet_key: String,
    pub path: String,
    pub count: u64,
    pub labels: Vec<String>,
    pub sample_refs: Vec<ProductRef>,
}

#[derive(Serialize)]
pub struct AllowListReport {
    pub hub_type: HubType,
    pub min_count: u64,
    pub source: SnapshotSource,
    pub computed_at: u64,
    pub entries: Vec<AllowListItem>,
}

pub async fn get_allow_list(
    State(state): State<AppState>,
    Path(hub_type): Path<String>,
    Query(query): Query<AllowListQuery>,
) -> Response {
    let hub_type: HubType = match hub_type.parse() {
        Ok(t) => t,
        Err(e) => return (StatusCode::NOT_FOUND, e).into_response(),
    };
    let min_count = query.min_count.unwrap_or_else(|| hub_type.min_count());
    let resolver = &state.services.resolver;

    match resolver.allow_list().snapshot(hub_type) {
        Ok(snapshot) => {
            let entries = snapshot
                .entries
                .iter()
                .filter(|e| e.count >= min_count)
                .map(|e| AllowListItem {
                    facet_key: e.key.facet_string(),
                    path: e.key.path(resolver.hub_prefix(), false),
                    count: e.count,
                    labels: snapshot.labels_for(&e.key),
                    sample_refs: e.sample_refs.clone(),
                })
                .collect();
            Json(AllowListReport {
                hub_type,
                min_count,
                source: snapshot.source,
                computed_at: snapshot.computed_at,
                entries,
            })
            .into_response()
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
    }
}

pub async fn get_thin_hubs(State(state): State<AppState>) -> Json<Vec<ThinHub>> {
    Json(thin_hubs(&state.services.resolver))
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

#[derive(Serialize, Default)]
pub struct ResolveReport {
    pub path: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_type: Option<HubType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_robots: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

pub async fn resolve(State(state): State<AppState>, Query(query): Query<ResolveQuery>) -> Json<ResolveReport> {
    let (path, raw_query) = match query.path.split_once('?') {
        Some((path, q)) => (path, Some(q)),
        None => (query.path.as_str(), None),
    };
    let outcome = state.services.resolver.resolve_path(path, raw_query);
    let mut report = ResolveReport {
        path: query.path.clone(),
        outcome: outcome.label(),
        ..Default::default()
    };
    match outcome {
        HubOutcome::Found(page) => {
            report.hub_type = Some(page.hub_type);
            report.population = Some(page.population);
            report.indexable = Some(page.indexable);
            report.meta_robots = Some(page.meta_robots);
            report.canonical = Some(page.canonical);
        }
        HubOutcome::Redirect { location } => report.location = Some(location),
        HubOutcome::NotFound { reason, hub_type } => {
            report.reason = Some(reason.as_str());
            report.hub_type = hub_type;
        }
    }
    Json(report)
}

#[derive(Deserialize)]
pub struct InvalidateQuery {
    pub hub_type: Option<String>,
}

#[derive(Serialize)]
pub struct InvalidateReport {
    pub invalidated: Vec<HubType>,
}

pub async fn invalidate_cache(State(state): State<AppState>, Query(query): Query<InvalidateQuery>) -> Response {
    let allow_list = state.services.allow_list();
    let invalidated = match query.hub_type.as_deref() {
        Some(name) => match name.parse::<HubType>() {
            Ok(hub_type) => {
                allow_list.invalidate(hub_type);
                vec![hub_type]
            }
            Err(e) => return (StatusCode::NOT_FOUND, e).into_response(),
        },
        None => {
            allow_list.invalidate_all();
            HubType::all().collect()
        }
    };
    tracing::info!(hub_types = invalidated.len(), "Allow-list cache invalidated");
    Json(InvalidateReport { invalidated }).into_response()
}
