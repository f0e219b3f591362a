//! Response building for hub and sitemap handlers.
//!
//! # Responsibilities
//! - Map `HubOutcome` to 200 / 301 / 404
//! - Emit robots and canonical headers for found hubs
//! - Add diagnostic headers when the client asked for them
//!
//! # Design Decisions
//! - 404 bodies are the bare string `404`; rendering is not our concern
//! - Redirects are 301, not axum's 308 `Redirect::permanent`

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::hub::resolver::HubOutcome;

pub const X_ROBOTS_TAG: &str = "x-robots-tag";
pub const X_DIAG_REASON: &str = "x-diag-reason";
pub const X_DIAG_HUB_TYPE: &str = "x-diag-hub-type";
pub const X_DIAG_POPULATION: &str = "x-diag-population";

fn set_header(response: &mut Response, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response.headers_mut().insert(HeaderName::from_static(name), value);
    }
}

pub fn hub_response(outcome: HubOutcome, diagnostics: bool) -> Response {
    match outcome {
        HubOutcome::Found(page) => {
            let robots = page.meta_robots;
            let link = format!("<{}>; rel=\"canonical\"", page.canonical);
            let hub_type = page.hub_type.name();
            let population = page.population.to_string();

            let mut response = (StatusCode::OK, Json(*page)).into_response();
            set_header(&mut response, X_ROBOTS_TAG, robots);
            if let Ok(value) = HeaderValue::from_str(&link) {
                response.headers_mut().insert(header::LINK, value);
            }
            if diagnostics {
                set_header(&mut response, X_DIAG_REASON, "found");
                set_header(&mut response, X_DIAG_HUB_TYPE, hub_type);
                set_header(&mut response, X_DIAG_POPULATION, &population);
            }
            response
        }
        HubOutcome::Redirect { location } => {
            let mut response = StatusCode::MOVED_PERMANENTLY.into_response();
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
            if diagnostics {
                set_header(&mut response, X_DIAG_REASON, "redirect");
            }
            response
        }
        HubOutcome::NotFound { reason, hub_type } => {
            let mut response = (StatusCode::NOT_FOUND, "404").into_response();
            if diagnostics {
                set_header(&mut response, X_DIAG_REASON, reason.as_str());
                if let Some(hub_type) = hub_type {
                    set_header(&mut response, X_DIAG_HUB_TYPE, hub_type.name());
                }
            }
            response
        }
    }
}

pub fn xml_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::hub_type::HubType;
    use crate::hub::resolver::NotFoundReason;

    #[test]
    fn test_redirect_is_301() {
        let response = hub_response(
            HubOutcome::Redirect {
                location: "/hub/line/x3000/".into(),
            },
            false,
        );
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/hub/line/x3000/");
    }

    #[test]
    fn test_not_found_diagnostics() {
        let outcome = HubOutcome::NotFound {
            reason: NotFoundReason::ZeroPopulation,
            hub_type: Some(HubType::LineEngine),
        };
        let plain = hub_response(outcome.clone(), false);
        assert_eq!(plain.status(), StatusCode::NOT_FOUND);
        assert!(plain.headers().get(X_DIAG_REASON).is_none());

        let diag = hub_response(outcome, true);
        assert_eq!(diag.headers()[X_DIAG_REASON], "zero_population");
        assert_eq!(diag.headers()[X_DIAG_HUB_TYPE], "line_engine");
    }
}
