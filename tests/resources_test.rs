use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tomato_admin::domain::access::DetectionScope;
use tomato_admin::domain::model::{
    AdviceRequest, DetectionUpload, FeedbackCategory, FeedbackRequest, FeedbackResponseRequest,
    Role,
};
use tomato_admin::{ApiClient, DataLayer, MemorySessionStore, QueryCache, Resources};

fn resources(server: &MockServer) -> (DataLayer, Resources) {
    let client = ApiClient::new(
        &server.url("/api"),
        Duration::from_secs(5),
        Arc::new(MemorySessionStore::default()),
    )
    .unwrap();
    let layer = DataLayer::new(client, QueryCache::new(Duration::from_secs(60)));
    let resources = Resources::new(&layer);
    (layer, resources)
}

fn page_of(items: serde_json::Value) -> serde_json::Value {
    json!({ "data": items, "total": 1, "page": 1, "limit": 10, "totalPages": 1 })
}

#[tokio::test]
async fn test_advice_on_detection() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);

    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/advice/on-detection")
            .json_body(json!({
                "detectionId": "det-1",
                "prescription": "Remove infected leaves, spray copper weekly",
                "medicineId": "m1"
            }));
        then.status(201).json_body(json!({
            "data": {
                "id": "adv-1",
                "detectionId": "det-1",
                "prescription": "Remove infected leaves, spray copper weekly",
                "medicineId": "m1"
            }
        }));
    });

    let advice = resources
        .advice
        .create_on_detection(&AdviceRequest {
            detection_id: Some("det-1".to_string()),
            prescription: Some("Remove infected leaves, spray copper weekly".to_string()),
            medicine_id: Some("m1".to_string()),
        })
        .await?;

    assert_eq!(advice.id, "adv-1");
    create.assert();
    Ok(())
}

#[tokio::test]
async fn test_advice_requires_prescription() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);

    let any = server.mock(|when, then| {
        when.any_request();
        then.status(201);
    });

    let result = resources
        .advice
        .create_on_detection(&AdviceRequest {
            detection_id: Some("det-1".to_string()),
            ..Default::default()
        })
        .await;

    assert!(result.is_err());
    any.assert_hits(0);
    Ok(())
}

/// 有 adviceId 走 on-advice，沒有走 on-detection
#[tokio::test]
async fn test_feedback_routing() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);

    let on_detection = server.mock(|when, then| {
        when.method(POST).path("/api/feedback/on-detection").json_body(json!({
            "detectionId": "det-1",
            "category": "accuracy",
            "comment": "It was septoria, not early blight"
        }));
        then.status(201)
            .json_body(json!({ "id": "fb-1", "category": "accuracy", "status": "pending" }));
    });
    let on_advice = server.mock(|when, then| {
        when.method(POST).path("/api/feedback/on-advice");
        then.status(201)
            .json_body(json!({ "id": "fb-2", "adviceId": "adv-1" }));
    });

    let mut request = FeedbackRequest {
        detection_id: "det-1".to_string(),
        category: FeedbackCategory::Accuracy,
        comment: "It was septoria, not early blight".to_string(),
        advice_id: None,
    };
    let first = resources.feedback.submit(&request).await?;
    assert_eq!(first.id, "fb-1");

    request.advice_id = Some("adv-1".to_string());
    let second = resources.feedback.submit(&request).await?;
    assert_eq!(second.advice_id.as_deref(), Some("adv-1"));

    on_detection.assert();
    on_advice.assert();
    Ok(())
}

/// 回覆後 feedback 列表也要重新抓
#[tokio::test]
async fn test_feedback_response_invalidates_feedback() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);

    let feedback_list = server.mock(|when, then| {
        when.method(GET).path("/api/feedback");
        then.status(200)
            .json_body(page_of(json!([{ "id": "fb-1", "status": "pending" }])));
    });
    let respond = server.mock(|when, then| {
        when.method(POST)
            .path("/api/feedback-responses")
            .json_body(json!({ "feedbackId": "fb-1", "message": "Thanks, we retrained the model" }));
        then.status(201)
            .json_body(json!({ "id": "r-1", "feedbackId": "fb-1", "message": "Thanks, we retrained the model" }));
    });

    resources.feedback.page(1, 10).await?;
    resources.feedback.page(1, 10).await?;
    resources
        .feedback_responses
        .create(&FeedbackResponseRequest {
            feedback_id: "fb-1".to_string(),
            message: "Thanks, we retrained the model".to_string(),
        })
        .await?;
    resources.feedback.page(1, 10).await?;

    respond.assert();
    feedback_list.assert_hits(2);
    Ok(())
}

#[tokio::test]
async fn test_detection_scopes() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);

    let mine = server.mock(|when, then| {
        when.method(GET)
            .path("/api/detect/my")
            .query_param("page", "2")
            .query_param("limit", "5");
        then.status(200)
            .json_body(page_of(json!([{ "id": "det-mine", "confidence": 0.91 }])));
    });
    let all = server.mock(|when, then| {
        when.method(GET).path("/api/detect");
        then.status(200).json_body(json!([
            { "id": "det-1" },
            { "id": "det-2" }
        ]));
    });

    let my_page = resources.detections.list(DetectionScope::Mine, 2, 5).await?;
    assert_eq!(my_page.data[0].id, "det-mine");

    let every = resources.detections.list(DetectionScope::All, 1, 10).await?;
    assert_eq!(every.data.len(), 2);
    assert_eq!(every.total, 2);

    mine.assert();
    all.assert();
    Ok(())
}

#[tokio::test]
async fn test_detection_upload_is_multipart() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);
    let dir = TempDir::new()?;
    let image = dir.path().join("leaf.png");
    std::fs::write(&image, b"not-really-a-png")?;

    let upload = server.mock(|when, then| {
        when.method(POST)
            .path("/api/detect")
            .body_contains("filename=\"leaf.png\"")
            .body_contains("not-really-a-png")
            .body_contains("name=\"farmerId\"");
        then.status(201).json_body(json!({
            "data": { "id": "det-9", "farmerId": "farmer-1", "confidence": 0.87 }
        }));
    });

    let detection = resources
        .detections
        .detect(&DetectionUpload {
            image_path: Some(image),
            image_url: None,
            farmer_id: Some("farmer-1".to_string()),
        })
        .await?;

    assert_eq!(detection.id, "det-9");
    upload.assert();

    // 檔案和網址都沒有時不送出
    assert!(resources
        .detections
        .detect(&DetectionUpload::default())
        .await
        .is_err());
    Ok(())
}

#[tokio::test]
async fn test_manual_detection() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);

    let manual = server.mock(|when, then| {
        when.method(POST)
            .path("/api/detect/manual")
            .json_body(json!({ "imageUrl": "https://cdn.example.com/leaf.jpg" }));
        then.status(201).json_body(json!({ "id": "det-3" }));
    });

    let detection = resources
        .detections
        .detect_manual("https://cdn.example.com/leaf.jpg")
        .await?;

    assert_eq!(detection.id, "det-3");
    manual.assert();
    Ok(())
}

#[tokio::test]
async fn test_user_role_change_invalidates_list() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);

    let list = server.mock(|when, then| {
        when.method(GET).path("/api/auth/getAllUsers");
        then.status(200).json_body(page_of(json!([
            { "id": "u2", "email": "grower@tomato.test", "role": "FARMER" }
        ])));
    });
    let change = server.mock(|when, then| {
        when.method(PATCH)
            .path("/api/auth/changeUserRole/u2")
            .json_body(json!({ "role": "AGRONOMIST" }));
        then.status(200).json_body(json!({
            "success": true,
            "data": { "id": "u2", "email": "grower@tomato.test", "role": "AGRONOMIST" }
        }));
    });

    let users = resources.users.list(1, 10).await?;
    assert_eq!(users.data[0].role, Some(Role::Farmer));

    let updated = resources.users.change_role("u2", Role::Agronomist).await?;
    assert_eq!(updated.role, Some(Role::Agronomist));

    resources.users.list(1, 10).await?;

    change.assert();
    list.assert_hits(2);
    Ok(())
}

#[tokio::test]
async fn test_notification_endpoints() -> Result<()> {
    let server = MockServer::start();
    let (_, resources) = resources(&server);

    let for_user = server.mock(|when, then| {
        when.method(GET).path("/api/notifications/user/u2");
        then.status(200)
            .json_body(page_of(json!([{ "id": "n1", "title": "Advice ready", "isRead": false }])));
    });
    let read_all = server.mock(|when, then| {
        when.method(PATCH).path("/api/notifications/mark-all-read");
        then.status(200).json_body(json!({ "success": true }));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/api/notifications/n1/delete");
        then.status(200).json_body(json!({ "success": true }));
    });

    let page = resources.notifications.for_user("u2", 1, 10).await?;
    assert_eq!(page.data[0].title, "Advice ready");

    resources.notifications.mark_all_read().await?;
    resources.notifications.delete("n1").await?;

    for_user.assert();
    read_all.assert();
    delete.assert();
    Ok(())
}
