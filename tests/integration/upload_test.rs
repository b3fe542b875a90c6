//! The full upload pipeline against a scripted backend.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use cropsight_auth::MemoryTokenStore;
use cropsight_session::mock::MockTransport;
use cropsight_session::{Credentials, RequestBody, SessionManager};
use cropsight_uploads::mock::MockGeotagInspector;
use cropsight_uploads::{
    survey, BatchMetadata, Coordinates, ImageFile, NewBatch, UploadsApi,
};

fn mint_token(exp: i64) -> String {
    let claims = serde_json::json!({"exp": exp, "email": "a@b.com"});
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(b"backend-only-secret");
    encode(&header, &claims, &key).expect("failed to encode token")
}

async fn signed_in_session(transport: &MockTransport) -> Arc<SessionManager> {
    let manager = Arc::new(SessionManager::new(
        Arc::new(transport.clone()),
        Arc::new(MemoryTokenStore::new()),
    ));
    manager.initialize().await;
    transport.respond(
        200,
        serde_json::json!({
            "accessToken": mint_token(chrono::Utc::now().timestamp() + 3600),
            "refreshToken": "refresh-1",
        }),
    );
    manager
        .login(&Credentials {
            email: "a@b.com".to_string(),
            mobile_id: "u1".to_string(),
        })
        .await
        .unwrap();
    manager
}

fn picked_images(dir: &tempfile::TempDir, names: &[&str]) -> Vec<ImageFile> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            let mut file = File::create(&path).unwrap();
            file.write_all(name.as_bytes()).unwrap();
            ImageFile::new(*name, path)
        })
        .collect()
}

fn new_batch(images: Vec<ImageFile>) -> NewBatch {
    NewBatch {
        batch_name: "north-field".to_string(),
        crop_type: "Soybean".to_string(),
        preferred_language: "en".to_string(),
        metadata: BatchMetadata {
            selected_coordinates: Some(Coordinates {
                latitude: 11.02,
                longitude: 76.96,
            }),
            address: None,
        },
        images,
    }
}

#[test_log::test(tokio::test)]
async fn survey_then_upload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let images = picked_images(&dir, &["a.jpg", "b.jpg", "c.jpg", "notes.txt"]);

    // Survey warns about partial geotag coverage but never blocks.
    let inspector = MockGeotagInspector::new().tagged("a.jpg").tagged("b.jpg");
    let survey = survey(&inspector, &images).unwrap();
    assert_eq!(survey.summary.total_images, 3);
    assert_eq!(survey.summary.geotagged_count, 2);
    assert_eq!(survey.summary.geotag_percentage, 66.7);

    let transport = MockTransport::new();
    let session = signed_in_session(&transport).await;
    transport.respond(
        201,
        serde_json::json!({"message": "accepted", "batchId": "b42"}),
    );

    let receipt = UploadsApi::new(session)
        .upload_batch(&new_batch(images))
        .await
        .unwrap();

    assert_eq!(receipt.batch_id.as_deref(), Some("b42"));
}

#[tokio::test]
async fn upload_retries_once_after_a_401() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let session = signed_in_session(&transport).await;

    transport.respond(401, serde_json::json!({"message": "Token expired"}));
    transport.respond(
        200,
        serde_json::json!({
            "accessToken": mint_token(chrono::Utc::now().timestamp() + 7200),
        }),
    );
    transport.respond(200, serde_json::json!({"message": "accepted"}));

    let receipt = UploadsApi::new(session)
        .upload_batch(&new_batch(picked_images(&dir, &["a.jpg"])))
        .await
        .unwrap();

    assert_eq!(receipt.message.as_deref(), Some("accepted"));
    assert_eq!(transport.requests_to("/api/dashboard/upload-batch"), 2);
    assert_eq!(transport.requests_to("/api/auth/refresh"), 1);

    // The retried request carries the same multipart payload.
    let uploads: Vec<_> = transport
        .recorded_requests()
        .into_iter()
        .filter(|request| request.path == "/api/dashboard/upload-batch")
        .collect();
    for request in &uploads {
        let RequestBody::Multipart(form) = &request.body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.field("batchName"), Some("north-field"));
        assert!(form.file.is_some());
    }
}
