//! Integration tests for apps, reviews, votes, AI reviews and the dashboard

mod helpers;

use axum::http::StatusCode;
use helpers::{review_json, serve_page, TestApp};
use lumora_server::services::{ChatRole, LlmError};
use serde_json::{json, Value};

fn ratings(score: f64) -> Value {
    json!({
        "uiDesign": score, "uxFlow": score, "performance": score,
        "functionality": score, "innovation": score, "overall": score
    })
}

async fn publish(app: &TestApp, token: &str, app_id: &str) {
    let (status, _) = app
        .put(
            &format!("/api/apps/{}", app_id),
            Some(token),
            json!({"status": "published"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Apps
// =============================================================================

#[tokio::test]
async fn test_create_app_defaults() {
    let app = TestApp::new().await;
    let token = app.signup("Owner", "owner@example.com").await;

    let (status, body) = app
        .post(
            "/api/apps",
            Some(&token),
            json!({"name": "Taskly", "description": "Todo lists", "url": "  ", "targetAudience": ""}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "draft");
    assert!(body["url"].is_null());
    assert!(body["targetAudience"].is_null());
    assert_eq!(body["questions"], json!([]));
    assert_eq!(body["screenshots"], json!([]));
}

#[tokio::test]
async fn test_create_app_requires_session_and_fields() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/apps", None, json!({"name": "Taskly", "description": "Todo"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.signup("Owner", "owner@example.com").await;
    let (status, body) = app.post("/api/apps", Some(&token), json!({"name": "Taskly"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Name and description are required");
}

#[tokio::test]
async fn test_list_apps_published_vs_mine() {
    let app = TestApp::new().await;
    let token = app.signup("Owner", "owner@example.com").await;
    let draft_id = app.create_app(&token, "Draft App").await;
    let published_id = app.create_app(&token, "Live App").await;
    publish(&app, &token, &published_id).await;

    let (status, body) = app.get("/api/apps", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], published_id.as_str());
    assert_eq!(listed[0]["user"]["name"], "Owner");
    assert_eq!(listed[0]["reviewCount"], 0);
    assert_eq!(listed[0]["averageScore"], 0.0);

    let (status, body) = app.get("/api/apps?mine=true", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    // Newest first
    assert_eq!(ids, vec![published_id.as_str(), draft_id.as_str()]);

    let (status, _) = app.get("/api/apps?mine=true", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_app_detail_with_counts() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;

    app.post(
        &format!("/api/apps/{}/reviews", app_id),
        Some(&reviewer),
        json!({"ratings": ratings(6.0), "feedback": "Solid"}),
    )
    .await;
    app.chat.push_reply(review_json());
    app.request("POST", &format!("/api/apps/{}/ai-review", app_id), Some(&owner), None)
        .await;

    let (status, body) = app.get(&format!("/api/apps/{}", app_id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Taskly");
    assert_eq!(body["user"]["email"], "owner@example.com");
    assert_eq!(body["reviewCount"], 2);
    assert_eq!(body["aiReviewCount"], 1);
    assert_eq!(body["humanReviewCount"], 1);
    // AI overall (8+7+9+8+6+7)/6 = 7.5, human 6.0
    assert_eq!(body["averageScore"], 6.8);

    let (status, _) = app.get("/api/apps/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_app_partial_and_permissions() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let other = app.signup("Other", "other@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let uri = format!("/api/apps/{}", app_id);

    let (status, body) = app
        .put(&uri, Some(&owner), json!({"name": "Taskly Pro", "description": "", "url": null}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Taskly Pro");
    assert_eq!(body["description"], "Taskly helps teams ship faster");
    assert!(body["url"].is_null());
    assert_eq!(body["questions"], json!(["Is onboarding clear?"]));

    let (status, _) = app.put(&uri, Some(&owner), json!({"status": "retired"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put(&uri, Some(&other), json!({"name": "Hijacked"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.put("/api/apps/missing", Some(&owner), json!({"name": "X"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_app_cascades_reviews() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    app.post(
        &format!("/api/apps/{}/reviews", app_id),
        Some(&reviewer),
        json!({"ratings": ratings(7.0), "feedback": "Nice"}),
    )
    .await;

    let (status, _) = app.delete(&format!("/api/apps/{}", app_id), Some(&reviewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&format!("/api/apps/{}", app_id), Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "App deleted");

    let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(reviews, 0);
}

#[tokio::test]
async fn test_analyze_rejects_bad_urls() {
    let app = TestApp::new().await;
    let token = app.signup("Owner", "owner@example.com").await;

    let (status, _) = app.post("/api/apps/analyze", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/apps/analyze", Some(&token), json!({"url": "ftp://example.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/api/apps/analyze", Some(&token), json!({"url": "http://127.0.0.1:1/"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"]["message"],
        "Could not access that URL. Make sure it's publicly accessible."
    );
    assert_eq!(app.chat.request_count(), 0);
}

const LANDING_PAGE: &str = r#"<!doctype html>
<html><head>
<title> Taskly - Plan your day </title>
<meta name="description" content="The simplest to-do app for busy teams.">
<meta property="og:image" content="https://taskly.example/og.png">
</head>
<body><h1>Plan your day</h1><p>Shared lists for small teams.</p></body></html>"#;

#[tokio::test]
async fn test_analyze_creates_app_and_ai_review() {
    let app = TestApp::new().await;
    let token = app.signup("Owner", "owner@example.com").await;
    let url = serve_page(LANDING_PAGE).await;

    app.chat.push_reply(
        json!({
            "name": null,
            "description": "",
            "targetAudience": "Small teams that plan together",
            "questions": ["Is sharing a list obvious?", null]
        })
        .to_string(),
    );
    app.chat.push_reply(review_json());

    let (status, body) = app.post("/api/apps/analyze", Some(&token), json!({"url": url})).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let app_id = body["appId"].as_str().unwrap().to_string();

    let site_context = &app.chat.requests()[0].messages[1].content;
    assert!(site_context.contains("Page Title: Taskly - Plan your day"));
    assert!(site_context.contains("OG Image: https://taskly.example/og.png"));
    assert!(site_context.contains("Shared lists for small teams."));

    let (status, detail) = app.get(&format!("/api/apps/{}", app_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Taskly - Plan your day");
    assert_eq!(detail["description"], "The simplest to-do app for busy teams.");
    assert_eq!(detail["url"], url.as_str());
    assert_eq!(detail["targetAudience"], "Small teams that plan together");
    assert_eq!(detail["questions"], json!(["Is sharing a list obvious?"]));
    assert_eq!(detail["screenshots"], json!(["https://taskly.example/og.png"]));
    assert_eq!(detail["aiReviewCount"], 1);
    assert_eq!(detail["averageScore"], 7.5);
}

#[tokio::test]
async fn test_analyze_falls_back_to_host_and_survives_review_failure() {
    let app = TestApp::new().await;
    let token = app.signup("Owner", "owner@example.com").await;
    let url = serve_page("<p>Coming soon</p>").await;

    app.chat.push_reply(r#"{"description": null, "questions": []}"#);
    app.chat.push_error(LlmError::EmptyResponse);

    let (status, body) = app.post("/api/apps/analyze", Some(&token), json!({"url": url})).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let app_id = body["appId"].as_str().unwrap().to_string();
    assert_eq!(app.chat.request_count(), 2);

    let (_, detail) = app.get(&format!("/api/apps/{}", app_id), None).await;
    assert_eq!(detail["name"], "127.0.0.1");
    assert_eq!(detail["description"], "No description available.");
    assert_eq!(detail["screenshots"], json!([]));
    assert_eq!(detail["reviewCount"], 0);
}

#[tokio::test]
async fn test_analyze_model_failure_is_bad_gateway() {
    let app = TestApp::new().await;
    let token = app.signup("Owner", "owner@example.com").await;
    let url = serve_page(LANDING_PAGE).await;

    app.chat.push_reply("I could not read that site.");

    let (status, body) = app.post("/api/apps/analyze", Some(&token), json!({"url": url})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "AI_ERROR");

    let (_, apps) = app.get("/api/apps?mine=true", Some(&token)).await;
    assert_eq!(apps, json!([]));
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_create_review_computes_overall_score() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;

    let (status, body) = app
        .post(
            &format!("/api/apps/{}/reviews", app_id),
            Some(&reviewer),
            json!({
                "ratings": {"uiDesign": 9, "uxFlow": 8, "innovation": 8},
                "feedback": "Great flow",
                "suggestions": ["More shortcuts"]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["overallScore"], 8.3);
    assert_eq!(body["isAI"], false);
    assert_eq!(body["suggestions"], json!(["More shortcuts"]));
    assert!(body["ownerResponse"].is_null());
}

#[tokio::test]
async fn test_create_review_validation() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let uri = format!("/api/apps/{}/reviews", app_id);

    let cases = [
        json!({"ratings": {}, "feedback": "x"}),
        json!({"ratings": ratings(7.0), "feedback": "  "}),
        json!({"ratings": {"speed": 5}, "feedback": "x"}),
        json!({"ratings": {"uiDesign": 11}, "feedback": "x"}),
        json!({"ratings": {"uiDesign": 0.5}, "feedback": "x"}),
    ];
    for case in cases {
        let (status, _) = app.post(&uri, Some(&reviewer), case.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {}", case);
    }

    let (status, _) = app
        .post(
            "/api/apps/missing/reviews",
            Some(&reviewer),
            json!({"ratings": ratings(7.0), "feedback": "x"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_review_conflicts() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let uri = format!("/api/apps/{}/reviews", app_id);
    let review = json!({"ratings": ratings(7.0), "feedback": "Nice"});

    let (status, _) = app.post(&uri, Some(&reviewer), review.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post(&uri, Some(&reviewer), review).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "You have already reviewed this app");
}

#[tokio::test]
async fn test_list_reviews_with_reviewer_and_votes() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let first = app.signup("First", "first@example.com").await;
    let second = app.signup("Second", "second@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let uri = format!("/api/apps/{}/reviews", app_id);

    let (_, older) = app
        .post(&uri, Some(&first), json!({"ratings": ratings(5.0), "feedback": "Okay"}))
        .await;
    app.post(&uri, Some(&second), json!({"ratings": ratings(9.0), "feedback": "Great"}))
        .await;

    let older_id = older["id"].as_str().unwrap();
    app.post(
        &format!("{}/{}/vote", uri, older_id),
        Some(&owner),
        json!({"helpful": true}),
    )
    .await;

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["reviewer"]["name"], "Second");
    assert_eq!(reviews[0]["votes"], json!({"helpful": 0, "unhelpful": 0}));
    assert_eq!(reviews[1]["id"], older_id);
    assert_eq!(reviews[1]["votes"], json!({"helpful": 1, "unhelpful": 0}));
}

#[tokio::test]
async fn test_delete_review_only_by_author() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let other_app = app.create_app(&owner, "Other").await;

    let (_, review) = app
        .post(
            &format!("/api/apps/{}/reviews", app_id),
            Some(&reviewer),
            json!({"ratings": ratings(7.0), "feedback": "Nice"}),
        )
        .await;
    let review_id = review["id"].as_str().unwrap();

    let (status, _) = app
        .delete(&format!("/api/apps/{}/reviews/{}", app_id, review_id), Some(&owner))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .delete(&format!("/api/apps/{}/reviews/{}", other_app, review_id), Some(&reviewer))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .delete(&format!("/api/apps/{}/reviews/{}", app_id, review_id), Some(&reviewer))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_owner_response() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;

    let (_, review) = app
        .post(
            &format!("/api/apps/{}/reviews", app_id),
            Some(&reviewer),
            json!({"ratings": ratings(7.0), "feedback": "Nice"}),
        )
        .await;
    let uri = format!("/api/apps/{}/reviews/{}/respond", app_id, review["id"].as_str().unwrap());

    let (status, _) = app.put(&uri, Some(&owner), json!({"response": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put(&uri, Some(&reviewer), json!({"response": "Thanks!"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(&uri, Some(&owner), json!({"response": "  Thanks for the feedback!  "}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ownerResponse"], "Thanks for the feedback!");
    assert!(body["ownerRespondedAt"].is_string());

    let (_, reviews) = app.get(&format!("/api/apps/{}/reviews", app_id), None).await;
    assert_eq!(reviews[0]["ownerResponse"], "Thanks for the feedback!");
}

#[tokio::test]
async fn test_review_summary() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let uri = format!("/api/apps/{}/reviews/summary", app_id);

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalReviews"], 0);
    assert_eq!(body["averageScores"]["uiDesign"], 0.0);
    assert_eq!(body["overallAverage"], 0.0);

    app.post(
        &format!("/api/apps/{}/reviews", app_id),
        Some(&reviewer),
        json!({"ratings": {"uiDesign": 5, "uxFlow": 9}, "feedback": "Mixed"}),
    )
    .await;
    app.chat.push_reply(review_json());
    app.request("POST", &format!("/api/apps/{}/ai-review", app_id), Some(&owner), None)
        .await;

    let (_, body) = app.get(&uri, None).await;
    assert_eq!(body["totalReviews"], 2);
    assert_eq!(body["aiReviews"], 1);
    assert_eq!(body["humanReviews"], 1);
    assert_eq!(body["averageScores"]["uiDesign"], 6.5);
    assert_eq!(body["averageScores"]["uxFlow"], 8.0);
    assert_eq!(body["averageScores"]["performance"], 9.0);
    // (6.5 + 8 + 9 + 8 + 6 + 7) / 6 = 7.4167
    assert_eq!(body["overallAverage"], 7.4);
}

#[tokio::test]
async fn test_my_reviews_include_app() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    app.post(
        &format!("/api/apps/{}/reviews", app_id),
        Some(&reviewer),
        json!({"ratings": ratings(7.0), "feedback": "Nice"}),
    )
    .await;

    let (status, body) = app.get("/api/reviews/mine", Some(&reviewer)).await;

    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["app"], json!({"id": app_id, "name": "Taskly"}));
    assert_eq!(reviews[0]["reviewer"]["name"], "Reviewer");
}

// =============================================================================
// Votes
// =============================================================================

#[tokio::test]
async fn test_vote_upsert_and_rules() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let (_, review) = app
        .post(
            &format!("/api/apps/{}/reviews", app_id),
            Some(&reviewer),
            json!({"ratings": ratings(7.0), "feedback": "Nice"}),
        )
        .await;
    let uri = format!("/api/apps/{}/reviews/{}/vote", app_id, review["id"].as_str().unwrap());

    let (status, _) = app.post(&uri, Some(&owner), json!({"helpful": "yes"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post(&uri, Some(&reviewer), json!({"helpful": true})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&uri, Some(&owner), json!({"helpful": true})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vote"]["helpful"], true);

    // Changing the vote replaces it
    let (_, body) = app.post(&uri, Some(&owner), json!({"helpful": false})).await;
    assert_eq!(body["vote"]["helpful"], false);

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"helpful": 0, "unhelpful": 1}));

    let (status, _) = app
        .post(
            &format!("/api/apps/{}/reviews/missing/vote", app_id),
            Some(&owner),
            json!({"helpful": true}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// AI reviewer
// =============================================================================

#[tokio::test]
async fn test_ai_review_created_once() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let uri = format!("/api/apps/{}/ai-review", app_id);

    app.chat.push_reply(format!("```json\n{}\n```", review_json()));
    let (status, body) = app.request("POST", &uri, Some(&owner), None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isAI"], true);
    assert_eq!(body["reviewerId"], "ai-reviewer");
    assert_eq!(body["overallScore"], 7.5);
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);

    let request = app.chat.last_request().unwrap();
    assert_eq!(request.temperature, Some(0.7));
    assert_eq!(request.messages[0].role, ChatRole::System);
    assert!(request.messages[1].content.contains("Name: Taskly"));
    assert!(request.messages[1].content.contains("1. Is onboarding clear?"));

    let (status, _) = app.request("POST", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.chat.request_count(), 1);
}

#[tokio::test]
async fn test_ai_review_clamps_and_filters_ratings() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;

    app.chat.push_reply(
        json!({"ratings": {"uiDesign": 14, "uxFlow": -2, "speed": 9}, "suggestions": []}).to_string(),
    );
    let (status, body) = app
        .request("POST", &format!("/api/apps/{}/ai-review", app_id), Some(&owner), None)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ratings"], json!({"uiDesign": 10.0, "uxFlow": 1.0}));
    assert_eq!(body["feedback"], "AI review generated.");
}

#[tokio::test]
async fn test_ai_review_failures_return_bad_gateway() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let app_id = app.create_app(&owner, "Taskly").await;
    let uri = format!("/api/apps/{}/ai-review", app_id);

    app.chat.push_reply("I think this app is lovely.");
    let (status, body) = app.request("POST", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "AI_ERROR");

    app.chat.push_error(LlmError::Status {
        status: 429,
        body: "rate limited".to_string(),
    });
    let (status, _) = app.request("POST", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    // Unconfigured provider (empty script)
    let (status, body) = app.request("POST", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["message"], "AI provider not configured");

    let (status, _) = app
        .request("POST", "/api/apps/missing/ai-review", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_counts() {
    let app = TestApp::new().await;
    let owner = app.signup("Owner", "owner@example.com").await;
    let reviewer = app.signup("Reviewer", "reviewer@example.com").await;
    let first = app.create_app(&owner, "Taskly").await;
    let second = app.create_app(&owner, "Notely").await;
    let theirs = app.create_app(&reviewer, "Reviewer App").await;

    for (id, score) in [(&first, 6.0), (&second, 9.0)] {
        app.post(
            &format!("/api/apps/{}/reviews", id),
            Some(&reviewer),
            json!({"ratings": ratings(score), "feedback": "Reviewed"}),
        )
        .await;
    }
    app.post(
        &format!("/api/apps/{}/reviews", theirs),
        Some(&owner),
        json!({"ratings": ratings(4.0), "feedback": "Reviewed back"}),
    )
    .await;

    let (status, body) = app.get("/api/dashboard", Some(&owner)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appsCount"], 2);
    assert_eq!(body["reviewsReceived"], 2);
    assert_eq!(body["reviewsGiven"], 1);
    assert_eq!(body["averageScore"], 7.5);
    let recent = body["recentReviews"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["app"]["name"], "Notely");
    assert_eq!(recent[0]["reviewer"]["name"], "Reviewer");
}

#[tokio::test]
async fn test_dashboard_empty_user() {
    let app = TestApp::new().await;
    let token = app.signup("New", "new@example.com").await;

    let (status, body) = app.get("/api/dashboard", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appsCount"], 0);
    assert_eq!(body["averageScore"], 0.0);
    assert_eq!(body["recentReviews"], json!([]));
}
