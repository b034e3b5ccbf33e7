//! End-to-end scan pipeline tests against mocked HTTP services.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use plantify_lib::garden::{ListOrder, PlantRecord, SavedPlant, SqlitePlantStore};
use plantify_lib::scanner::normalizer::{normalize_image, DEFAULT_JPEG_QUALITY};
use plantify_lib::scanner::validation::DEFAULT_CARE_TIP;
use plantify_lib::scanner::{
    HealthStatus, ImageFile, ScanServices, ScanSession, ScanSettings, ScanStage,
};
use plantify_lib::services::{ApiKey, HttpAnalysisService, HttpUploadService, PlantStore};
use plantify_lib::ScanError;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(10);

struct CountingStore {
    creates: AtomicUsize,
}

#[async_trait]
impl PlantStore for CountingStore {
    async fn create(&self, _: &PlantRecord) -> Result<String, String> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok("unused".to_string())
    }

    async fn list(&self, _: ListOrder) -> Result<Vec<SavedPlant>, String> {
        Ok(Vec::new())
    }
}

fn leaf_webp() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 3) as u8, 120 + (y as u8), 40]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::WebP)
        .unwrap();
    buffer.into_inner()
}

async fn mount_upload(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_url": "https://cdn.example/u/leaf.jpg"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_analysis(server: &MockServer, body: serde_json::Value, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/llm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn http_services(server: &MockServer, store: Arc<dyn PlantStore>) -> ScanServices {
    ScanServices {
        uploader: Arc::new(
            HttpUploadService::new(format!("{}/files", server.uri()), ApiKey::Anonymous, TIMEOUT)
                .unwrap(),
        ),
        analyzer: Arc::new(
            HttpAnalysisService::new(format!("{}/llm", server.uri()), ApiKey::Anonymous, TIMEOUT)
                .unwrap(),
        ),
        store,
    }
}

#[tokio::test]
async fn test_webp_scan_converts_uploads_analyzes_and_saves() {
    let server = MockServer::start().await;
    mount_upload(&server, 1).await;

    let fenced = format!(
        "```json\n{}\n```",
        json!({
            "common_name": "Rubber Plant",
            "species_name": "Ficus elastica",
            "description": "Glossy oval leaves.",
            "health_status": "Needs Attention",
            "health_analysis": {
                "issues": [{"issue": "Leaf scorch", "description": "Brown patches", "confidence": 0.7}],
                "recommendations": ["Move away from direct afternoon sun"]
            },
            "care_tips": ["Wipe leaves monthly"]
        })
    );
    mount_analysis(&server, json!({ "response": fenced }), 1).await;

    let dir = TempDir::new().unwrap();
    let garden = Arc::new(SqlitePlantStore::new(dir.path().join("garden.db")));
    let mut session = ScanSession::new(http_services(&server, garden.clone()), ScanSettings::default());

    let file = ImageFile::new(leaf_webp(), "image/webp", "leaf.webp");
    let jpeg = normalize_image(&file, DEFAULT_JPEG_QUALITY).unwrap().bytes;
    let result = session.scan(file).await.unwrap();

    assert_eq!(result.common_name, "Rubber Plant");
    assert_eq!(result.health_status, HealthStatus::NeedsAttention);
    assert_eq!(result.image_url, "https://cdn.example/u/leaf.jpg");
    assert!(!result.was_repaired());

    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/files")
        .unwrap();
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("filename=\"leaf.jpg\""));
    assert!(body.contains("image/jpeg"));
    assert!(upload
        .body
        .windows(jpeg.len())
        .any(|window| window == jpeg.as_slice()));

    let analysis = requests.iter().find(|r| r.url.path() == "/llm").unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&analysis.body).unwrap();
    assert_eq!(sent["file_urls"], json!(["https://cdn.example/u/leaf.jpg"]));
    assert!(sent["response_json_schema"].is_object());

    let id = session.save().await.unwrap();
    assert_eq!(session.stage(), ScanStage::Saved);

    let saved = garden.list(ListOrder::NewestFirst).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, id);
    assert_eq!(saved[0].record.species_name, "Ficus elastica");
}

#[tokio::test]
async fn test_oversized_png_rejected_before_any_request() {
    let server = MockServer::start().await;
    mount_upload(&server, 0).await;
    mount_analysis(&server, json!({}), 0).await;

    let store = Arc::new(CountingStore {
        creates: AtomicUsize::new(0),
    });
    let mut session = ScanSession::new(http_services(&server, store), ScanSettings::default());

    let file = ImageFile::new(vec![0u8; 12 * 1024 * 1024], "image/png", "huge.png");
    let err = session.scan(file).await.unwrap_err();

    assert!(matches!(err, ScanError::FileTooLarge { .. }));
    assert_eq!(err.user_message(), "File too large - please use an image under 10MB");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_care_tips_filled_with_default() {
    let server = MockServer::start().await;
    mount_upload(&server, 1).await;
    mount_analysis(
        &server,
        json!({
            "common_name": "Aloe Vera",
            "species_name": "Aloe barbadensis miller",
            "description": "Succulent with gel-filled leaves.",
            "health_status": "Healthy",
            "health_analysis": {
                "issues": [{"issue": "None", "description": "Looks healthy", "confidence": 0.9}],
                "recommendations": ["Let soil dry out"]
            }
        }),
        1,
    )
    .await;

    let store = Arc::new(CountingStore {
        creates: AtomicUsize::new(0),
    });
    let mut session = ScanSession::new(http_services(&server, store), ScanSettings::default());

    let file = ImageFile::new(vec![0x89, b'P', b'N', b'G'], "image/png", "aloe.png");
    let result = session.scan(file).await.unwrap();

    assert_eq!(result.care_tips, vec![DEFAULT_CARE_TIP.to_string()]);
    assert_eq!(result.repaired_fields, vec!["care_tips".to_string()]);
    assert_eq!(result.health_analysis.recommendations, vec!["Let soil dry out".to_string()]);
}

#[tokio::test]
async fn test_missing_common_name_fails_and_never_saves() {
    let server = MockServer::start().await;
    mount_upload(&server, 1).await;
    mount_analysis(
        &server,
        json!({
            "species_name": "Ficus lyrata",
            "health_status": "Diseased"
        }),
        1,
    )
    .await;

    let store = Arc::new(CountingStore {
        creates: AtomicUsize::new(0),
    });
    let mut session = ScanSession::new(http_services(&server, store.clone()), ScanSettings::default());

    let file = ImageFile::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg", "fig.jpg");
    let err = session.scan(file).await.unwrap_err();

    assert!(matches!(err, ScanError::AnalysisIncomplete(_)));
    assert_eq!(session.stage(), ScanStage::Failed);

    assert!(session.save().await.is_err());
    assert_eq!(store.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_server_error_is_upload_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_analysis(&server, json!({}), 0).await;

    let store = Arc::new(CountingStore {
        creates: AtomicUsize::new(0),
    });
    let mut session = ScanSession::new(http_services(&server, store), ScanSettings::default());

    let file = ImageFile::new(vec![1, 2, 3], "image/png", "a.png");
    let err = session.scan(file).await.unwrap_err();
    assert!(matches!(err, ScanError::UploadFailed(_)));
}
