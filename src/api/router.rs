//! Route table.
//!
//! JSON API routes live under `/api`; the download, report-file, and
//! doctor-lookup routes sit at the root to match the paths the frontend
//! already uses. CORS is open (a browser app fronts this service) and
//! multipart uploads are capped at 20 MiB.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api::endpoints;
use crate::api::types::AppContext;

/// Upload cap for classification images.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the application router.
pub fn app_router(ctx: AppContext) -> Router {
    let reports_dir = ctx.config.reports_dir.clone();

    let api = Router::new()
        .route("/predict", post(endpoints::predict::classify))
        .route("/save-prescription", post(endpoints::prescription::save))
        .route("/health", get(endpoints::health::check));

    Router::new()
        .nest("/api", api)
        .route("/download/:doc_id", get(endpoints::download::fetch))
        .route("/find_doctors", get(endpoints::doctors::find))
        .with_state(ctx)
        .nest_service("/reports", ServeDir::new(reports_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::classifier::{Classifier, ClassifierError, MockModel};
    use crate::config::tests::test_config;
    use crate::db::{self, open_memory_database};
    use crate::disease::DiseaseLabel;
    use crate::geo::GeoClient;
    use crate::notify::TwilioClient;

    fn mock_classifier(winner: DiseaseLabel) -> Arc<Classifier> {
        Arc::new(Classifier::with_loader(
            PathBuf::from("unused.onnx"),
            Box::new(move |_| Ok(Arc::new(MockModel::predicting(winner)) as _)),
        ))
    }

    /// Context with a mock classifier, in-memory db, dead geo endpoints,
    /// and no messaging.
    fn test_context(dir: &Path) -> AppContext {
        AppContext {
            config: Arc::new(test_config(dir)),
            classifier: mock_classifier(DiseaseLabel::Eczema),
            db: Arc::new(Mutex::new(open_memory_database().unwrap())),
            geo: GeoClient::with_endpoints("http://127.0.0.1:9", "http://127.0.0.1:9"),
            twilio: None,
        }
    }

    fn test_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(16, 16, image::Rgb([120, 80, 60]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn multipart_request(uri: &str, field: &str, payload: &[u8]) -> Request<Body> {
        let boundary = "x-test-boundary-7f3a";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                 filename=\"skin.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn save_request_body() -> serde_json::Value {
        serde_json::json!({
            "name": "Ada Lovelace",
            "age": 36,
            "gender": "female",
            "whatsapp": "+4915112345678",
            "disease": "Eczema",
            "description": [
                "A chronic condition causing itchy, inflamed, and dry skin.",
                "Often triggered by allergens, stress, or environmental factors."
            ],
            "medication": "Topical corticosteroids.",
            "diet": "Omega-3-rich foods."
        })
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    /// Bind a stub upstream on an ephemeral port; returns its base URL.
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    // ── /api/predict ─────────────────────────────────────────

    #[tokio::test]
    async fn predict_without_image_field_returns_400_and_skips_inference() {
        let tmp = tempfile::tempdir().unwrap();
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();

        let mut ctx = test_context(tmp.path());
        ctx.classifier = Arc::new(Classifier::with_loader(
            PathBuf::from("unused.onnx"),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(MockModel::predicting(DiseaseLabel::Eczema)) as _)
            }),
        ));
        let app = app_router(ctx);

        let req = multipart_request("/api/predict", "photo", &test_png());
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "No image file provided");
        assert_eq!(loads.load(Ordering::SeqCst), 0, "model must not be touched");
    }

    #[tokio::test]
    async fn predict_returns_knowledge_base_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = test_context(tmp.path());
        ctx.classifier = mock_classifier(DiseaseLabel::Melanoma);
        let app = app_router(ctx);

        let req = multipart_request("/api/predict", "image", &test_png());
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["disease"], "Melanoma");
        assert_eq!(json["description"].as_array().unwrap().len(), 2);
        assert!(json["medication"].as_str().unwrap().contains("dermatologist"));
        assert!(!json["diet"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn predict_with_undecodable_image_returns_400() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_router(test_context(tmp.path()));

        let req = multipart_request("/api/predict", "image", b"not an image at all");
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn predict_with_unavailable_model_returns_500_generic() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = test_context(tmp.path());
        ctx.classifier = Arc::new(Classifier::with_loader(
            PathBuf::from("missing.onnx"),
            Box::new(|p| Err(ClassifierError::ModelNotFound(p.to_path_buf()))),
        ));
        let app = app_router(ctx);

        let req = multipart_request("/api/predict", "image", &test_png());
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "Prediction failed");
    }

    // ── /api/save-prescription ───────────────────────────────

    #[tokio::test]
    async fn save_prescription_persists_and_writes_local_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path());
        let app = app_router(ctx.clone());

        let req = json_request("/api/save-prescription", save_request_body());
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["message"], "Prescription saved");

        let id = json["id"].as_str().unwrap();
        uuid::Uuid::parse_str(id).expect("id should be a UUID");
        assert_eq!(
            json["pdf_url"].as_str().unwrap(),
            format!("http://localhost:5000/reports/{id}.pdf")
        );

        // Record round-trips through the store.
        let record = {
            let conn = ctx.db.lock().unwrap();
            db::get_prescription(&conn, id).unwrap().unwrap()
        };
        assert_eq!(record.patient.name, "Ada Lovelace");
        assert_eq!(record.prediction, "Eczema");
        assert!(!record.pdf_base64.is_empty());
        assert!(record.created_at.contains('T'));

        // Local copy exists and is a PDF.
        let file = std::fs::read(ctx.config.reports_dir.join(format!("{id}.pdf"))).unwrap();
        assert!(file.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn save_prescription_missing_field_returns_400() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_router(test_context(tmp.path()));

        let mut body = save_request_body();
        body.as_object_mut().unwrap().remove("disease");
        let response = app
            .oneshot(json_request("/api/save-prescription", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "Missing field: disease");
    }

    #[tokio::test]
    async fn save_succeeds_when_notification_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = test_context(tmp.path());

        // Provider that rejects every message.
        let stub = Router::new().route(
            "/2010-04-01/Accounts/AC0/Messages.json",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "provider exploded") }),
        );
        let base = spawn_stub(stub).await;
        ctx.twilio = Some(Arc::new(TwilioClient::with_base_url(
            &crate::config::TwilioConfig {
                account_sid: "AC0".into(),
                auth_token: "t".into(),
                from_number: "+15550000000".into(),
            },
            &base,
        )));
        let app = app_router(ctx);

        let response = app
            .oneshot(json_request("/api/save-prescription", save_request_body()))
            .await
            .unwrap();

        // Delivery failed, save still succeeded.
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert!(json["id"].is_string());
    }

    #[tokio::test]
    async fn save_without_contact_handle_skips_delivery() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_router(test_context(tmp.path()));

        let mut body = save_request_body();
        body.as_object_mut().unwrap().remove("whatsapp");
        let response = app
            .oneshot(json_request("/api/save-prescription", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // ── /download/:doc_id ────────────────────────────────────

    #[tokio::test]
    async fn download_returns_pdf_attachment() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path());
        let app = app_router(ctx.clone());

        let response = app
            .clone()
            .oneshot(json_request("/api/save-prescription", save_request_body()))
            .await
            .unwrap();
        let id = response_json(response).await["id"].as_str().unwrap().to_string();

        let req = Request::builder()
            .uri(format!("/download/{id}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers().get("Content-Disposition").unwrap(),
            &format!("attachment; filename=\"{id}.pdf\"")
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn download_unknown_id_returns_404() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_router(test_context(tmp.path()));

        let req = Request::builder()
            .uri("/download/00000000-0000-0000-0000-000000000000")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert_eq!(json["error"]["message"], "Document not found");
    }

    // ── /find_doctors ────────────────────────────────────────

    #[tokio::test]
    async fn find_doctors_requires_both_coordinates() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_router(test_context(tmp.path()));

        for uri in ["/find_doctors", "/find_doctors?lat=40.7", "/find_doctors?lon=-74.0"] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let json = response_json(response).await;
            assert_eq!(json["error"]["message"], "Latitude and longitude are required");
        }
    }

    #[tokio::test]
    async fn find_doctors_returns_area_and_capped_list() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = test_context(tmp.path());

        let nominatim = spawn_stub(Router::new().route(
            "/reverse",
            get(|| async {
                axum::Json(serde_json::json!({"display_name": "Manhattan, New York"}))
            }),
        ))
        .await;
        let elements: Vec<_> = (0..15)
            .map(|i| serde_json::json!({"tags": {"name": format!("Clinic {i}")}}))
            .collect();
        let overpass_body = serde_json::json!({"elements": elements});
        let overpass = spawn_stub(Router::new().route(
            "/",
            post(move || async move { axum::Json(overpass_body.clone()) }),
        ))
        .await;
        ctx.geo = GeoClient::with_endpoints(&nominatim, &overpass);
        let app = app_router(ctx);

        let req = Request::builder()
            .uri("/find_doctors?lat=40.7128&lon=-74.0060")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["area_name"], "Manhattan, New York");
        let doctors = json["doctors"].as_array().unwrap();
        assert_eq!(doctors.len(), 10);
        for doctor in doctors {
            assert!(doctor["name"].is_string());
            assert!(doctor["address"].is_string());
        }
    }

    #[tokio::test]
    async fn find_doctors_upstream_failure_returns_generic_500() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app_router(test_context(tmp.path()));

        let req = Request::builder()
            .uri("/find_doctors?lat=1&lon=2")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "UPSTREAM_FAILURE");
        assert_eq!(
            json["error"]["message"],
            "Failed to fetch data from OpenStreetMap APIs"
        );
    }

    // ── /reports and /api/health ─────────────────────────────

    #[tokio::test]
    async fn reports_dir_serves_saved_files() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path());
        let app = app_router(ctx.clone());

        let response = app
            .clone()
            .oneshot(json_request("/api/save-prescription", save_request_body()))
            .await
            .unwrap();
        let id = response_json(response).await["id"].as_str().unwrap().to_string();

        let req = Request::builder()
            .uri(format!("/reports/{id}.pdf"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let req = Request::builder()
            .uri("/reports/nope.pdf")
            .body(Body::empty())
            .unwrap();
        let response = app_router(ctx).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_lazy_model_state() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path());
        let app = app_router(ctx.clone());

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model_loaded"], false);
        assert!(!json["version"].as_str().unwrap().is_empty());

        // First prediction loads the model; health reflects it.
        let req = multipart_request("/api/predict", "image", &test_png());
        app.clone().oneshot(req).await.unwrap();

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let json = response_json(response).await;
        assert_eq!(json["model_loaded"], true);
    }
}
