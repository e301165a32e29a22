//! external-dns webhook HTTP 接口

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, web};
use privatezone_core::utils::with_deadline;
use privatezone_core::{Changes, Endpoint, Reconciler};
use tokio::sync::Mutex;

use crate::error::WebhookError;

/// Media type of every webhook request and response body.
pub const MEDIA_TYPE: &str = "application/external.dns.webhook+json;version=1";

/// Shared handler state.
pub struct AppState {
    reconciler: Reconciler,
    /// `POST /records` 串行执行
    apply_lock: Mutex<()>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(reconciler: Reconciler, request_timeout: Duration) -> Self {
        Self {
            reconciler,
            apply_lock: Mutex::new(()),
            request_timeout,
        }
    }
}

/// Register routes and body extractors on an actix service config.
pub fn configure(state: Arc<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let json = web::JsonConfig::default()
            .content_type_required(false)
            .content_type(|mime| {
                mime.subtype().as_str() == "json"
                    || mime.suffix().is_some_and(|s| s.as_str() == "json")
            });

        cfg.app_data(web::Data::from(state))
            .app_data(json)
            .route("/", web::get().to(negotiate))
            .route("/records", web::get().to(get_records))
            .route("/records", web::post().to(apply_changes))
            .route("/adjustendpoints", web::post().to(adjust_endpoints))
            .route("/healthz", web::get().to(healthz));
    }
}

fn webhook_json() -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder.insert_header((header::CONTENT_TYPE, MEDIA_TYPE));
    builder
}

/// `GET /`: domain filter negotiation
async fn negotiate(state: web::Data<AppState>) -> HttpResponse {
    webhook_json().json(state.reconciler.domain_filter())
}

/// `GET /records`
async fn get_records(state: web::Data<AppState>) -> Result<HttpResponse, WebhookError> {
    let endpoints = with_deadline(
        state.request_timeout,
        "records",
        state.reconciler.records(),
    )
    .await?;
    log::debug!("Returning {} endpoints", endpoints.len());
    Ok(webhook_json().json(endpoints))
}

/// `POST /records`
async fn apply_changes(
    state: web::Data<AppState>,
    changes: web::Json<Changes>,
) -> Result<HttpResponse, WebhookError> {
    let changes = changes.into_inner();
    with_deadline(state.request_timeout, "apply changes", async {
        let _guard = state.apply_lock.lock().await;
        state.reconciler.apply(changes).await
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// `POST /adjustendpoints`
async fn adjust_endpoints(
    state: web::Data<AppState>,
    endpoints: web::Json<Vec<Endpoint>>,
) -> HttpResponse {
    webhook_json().json(state.reconciler.adjust_endpoints(endpoints.into_inner()))
}

async fn healthz() -> HttpResponse {
    HttpResponse::Ok().insert_header(ContentType::plaintext()).body("ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use privatezone_core::test_utils::MockPrivateZoneApi;
    use privatezone_core::{DomainFilter, ReconcilerOptions};
    use privatezone_provider::ProviderError;

    async fn state_with(api: Arc<MockPrivateZoneApi>, options: ReconcilerOptions) -> Arc<AppState> {
        api.add_zone(Some("vpc-1"), 123, "example.com").await;
        let reconciler = Reconciler::new(
            api,
            ReconcilerOptions {
                vpc_id: Some("vpc-1".to_string()),
                ..options
            },
        )
        .unwrap();
        Arc::new(AppState::new(reconciler, Duration::from_secs(5)))
    }

    #[actix_web::test]
    async fn negotiation_returns_domain_filter() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let state = state_with(
            api,
            ReconcilerOptions {
                domain_filter: DomainFilter::new(["example.com"], ["skip.example.com"]),
                ..ReconcilerOptions::default()
            },
        )
        .await;
        let app = test::init_service(App::new().configure(configure(state))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            MEDIA_TYPE
        );
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["include"][0], "example.com");
        assert_eq!(body["exclude"][0], "skip.example.com");
    }

    #[actix_web::test]
    async fn records_are_listed() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let state = state_with(api.clone(), ReconcilerOptions::default()).await;
        api.add_record(123, "www", "A", "1.1.1.1", Some(300)).await;
        api.add_record(123, "www", "A", "1.1.1.2", Some(300)).await;
        let app = test::init_service(App::new().configure(configure(state))).await;

        let req = test::TestRequest::get().uri("/records").to_request();
        let endpoints: Vec<Endpoint> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].dns_name, "www.example.com");
        assert_eq!(endpoints[0].targets, vec!["1.1.1.1", "1.1.1.2"]);
        assert_eq!(endpoints[0].record_ttl, 300);
    }

    #[actix_web::test]
    async fn changes_are_applied() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let state = state_with(api.clone(), ReconcilerOptions::default()).await;
        api.add_record(123, "old", "A", "1.1.1.1", None).await;
        let app = test::init_service(App::new().configure(configure(state))).await;

        let body = r#"{
            "Create": [{"dnsName":"new.example.com","targets":["2.2.2.2"],"recordType":"A","recordTTL":60}],
            "UpdateOld": null,
            "UpdateNew": null,
            "Delete": [{"dnsName":"old.example.com","targets":["1.1.1.1"],"recordType":"A"}]
        }"#;
        let req = test::TestRequest::post()
            .uri("/records")
            .insert_header((header::CONTENT_TYPE, MEDIA_TYPE))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let records = api.records(123).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].host, "new");
        assert_eq!(records[0].ttl, Some(60));
    }

    #[actix_web::test]
    async fn remote_failure_is_500() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let state = state_with(api.clone(), ReconcilerOptions::default()).await;
        api.fail_on("batch_create_records", MockPrivateZoneApi::soft_error())
            .await;
        let app = test::init_service(App::new().configure(configure(state))).await;

        let req = test::TestRequest::post()
            .uri("/records")
            .set_json(Changes {
                create: vec![Endpoint::new(
                    "www.example.com",
                    "A",
                    0,
                    vec!["1.1.1.1".to_string()],
                )],
                ..Changes::default()
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "Zone");
    }

    #[actix_web::test]
    async fn zone_listing_failure_on_read_is_500() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let state = state_with(api.clone(), ReconcilerOptions::default()).await;
        api.fail_on(
            "list_private_zones",
            ProviderError::InvalidCredentials {
                provider: "mock".to_string(),
                raw_message: None,
            },
        )
        .await;
        let app = test::init_service(App::new().configure(configure(state))).await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/records").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn malformed_changes_are_400() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let state = state_with(api.clone(), ReconcilerOptions::default()).await;
        let app = test::init_service(App::new().configure(configure(state))).await;

        let req = test::TestRequest::post()
            .uri("/records")
            .insert_header((header::CONTENT_TYPE, MEDIA_TYPE))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(api.write_calls().await.is_empty());
    }

    #[actix_web::test]
    async fn endpoints_are_adjusted() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let state = state_with(
            api,
            ReconcilerOptions {
                domain_filter: DomainFilter::new(["example.com"], Vec::<String>::new()),
                ..ReconcilerOptions::default()
            },
        )
        .await;
        let app = test::init_service(App::new().configure(configure(state))).await;

        let req = test::TestRequest::post()
            .uri("/adjustendpoints")
            .set_json(vec![
                Endpoint::new("www.example.com.", "A", 0, vec!["1.1.1.1".to_string()]),
                Endpoint::new("www.other.org", "A", 0, vec!["2.2.2.2".to_string()]),
            ])
            .to_request();
        let adjusted: Vec<Endpoint> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(adjusted.len(), 1);
        assert_eq!(adjusted[0].dns_name, "www.example.com");
    }

    #[actix_web::test]
    async fn healthz_is_ok() {
        let api = Arc::new(MockPrivateZoneApi::new());
        let state = state_with(api, ReconcilerOptions::default()).await;
        let app = test::init_service(App::new().configure(configure(state))).await;

        let req = test::TestRequest::get().uri("/healthz").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "ok");
    }
}
