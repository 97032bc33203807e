//! Integration tests for the deployment endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{request, TestApp, ALICE, BOB, CAROL, DAVE};
use portal_aicore::client::{operation, RecordedCall};
use portal_aicore::error::CREDENTIALS_NOT_CONFIGURED;
use portal_aicore::types::{ConfigurationRequest, Deployment, UpstreamDeploymentCreate};
use portal_aicore::RecordingClient;
use rstest::rstest;
use serde_json::json;
use tower::ServiceExt;

fn deployment(id: &str, status: &str) -> Deployment {
    Deployment {
        id: id.to_owned(),
        status: Some(status.to_owned()),
        configuration_id: Some("config-0".to_owned()),
        ..Deployment::default()
    }
}

#[tokio::test]
async fn create_from_existing_configuration() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/ai-core/deployments",
            ALICE,
            Some(json!({"configurationId": "config-1", "ttl": "1h"})),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["ttl"], "1h");
    assert_eq!(body["configurationId"], "config-1");
    assert_eq!(body["id"], "deployment-1");

    assert_eq!(
        app.calls().await,
        vec![RecordedCall::CreateDeployment {
            team: "alpha".to_owned(),
            request: UpstreamDeploymentCreate {
                configuration_id: "config-1".to_owned(),
                ttl: Some("1h".to_owned()),
            },
        }]
    );
}

#[tokio::test]
async fn blank_ttl_is_passed_through() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/ai-core/deployments",
            ALICE,
            Some(json!({"configurationId": "config-1", "ttl": " "})),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["ttl"], " ");
    assert!(matches!(
        &app.calls().await[0],
        RecordedCall::CreateDeployment { request, .. } if request.ttl.as_deref() == Some(" ")
    ));
}

#[tokio::test]
async fn create_with_new_configuration() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/ai-core/deployments",
            ALICE,
            Some(json!({
                "configurationRequest": {
                    "name": "my-llm-config",
                    "executableId": "aicore-llm",
                    "scenarioId": "foundation-models",
                    "parameterBindings": [{"key": "modelName", "value": "gpt-4o"}]
                },
                "ttl": "2h"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);

    let calls = app.calls().await;
    assert_eq!(calls.len(), 2);

    let RecordedCall::CreateConfiguration { request, .. } = &calls[0] else {
        panic!("expected configuration create first, got {:?}", calls[0]);
    };
    assert_eq!(request.name, "my-llm-config");
    assert_eq!(request.executable_id, "aicore-llm");
    assert_eq!(request.scenario_id, "foundation-models");
    assert_eq!(request.parameter_bindings.len(), 1);

    let RecordedCall::CreateDeployment { request, .. } = &calls[1] else {
        panic!("expected deployment create second, got {:?}", calls[1]);
    };
    assert_eq!(request.configuration_id, "config-1");
    assert_eq!(request.ttl.as_deref(), Some("2h"));
    assert_eq!(body["configurationId"], "config-1");
}

#[rstest]
#[case(json!({"ttl": "1h"}), "Either configurationId or configurationRequest must be provided")]
#[case(json!({"configurationId": ""}), "Either configurationId or configurationRequest must be provided")]
#[case(
    json!({
        "configurationId": "config-1",
        "configurationRequest": {"name": "n", "executableId": "e", "scenarioId": "s"}
    }),
    "ConfigurationId and configurationRequest cannot both be provided"
)]
#[case(json!({"configurationRequest": {"executableId": "e", "scenarioId": "s"}}), "name is required")]
#[case(json!({"configurationRequest": {"name": "n", "scenarioId": "s"}}), "executableId is required")]
#[case(json!({"configurationRequest": {"name": "n", "executableId": "e"}}), "scenarioId is required")]
#[tokio::test]
async fn invalid_create_is_rejected_before_upstream(
    #[case] body: serde_json::Value,
    #[case] message: &str,
) {
    let app = TestApp::new().await;

    let (status, response) = app
        .send(Method::POST, "/ai-core/deployments", ALICE, Some(body))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({"error": message}));
    assert!(app.calls().await.is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::new().await;

    let req = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/ai-core/deployments")
        .header("Authorization", format!("Bearer {}", common::token_for(ALICE)))
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.calls().await.is_empty());
}

#[tokio::test]
async fn failed_deployment_after_configuration_is_server_error() {
    let app = TestApp::with_client(RecordingClient::new().failing(
        operation::CREATE_DEPLOYMENT,
        400,
        "invalid ttl",
    ))
    .await;

    let (status, body) = app
        .send(
            Method::POST,
            "/ai-core/deployments",
            ALICE,
            Some(json!({
                "configurationRequest": {"name": "n", "executableId": "e", "scenarioId": "s"},
                "ttl": "forever"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "create deployment failed: upstream returned 400: invalid ttl"
    );

    // The configuration stays behind.
    let (_, configurations) = app
        .send(Method::GET, "/ai-core/configurations", ALICE, None)
        .await;
    assert_eq!(configurations["count"], 1);
}

#[rstest]
#[case(Method::GET, "/ai-core/deployments", None)]
#[case(Method::GET, "/ai-core/deployments/d1", None)]
#[case(Method::POST, "/ai-core/deployments", Some(json!({"configurationId": "config-1"})))]
#[case(Method::PATCH, "/ai-core/deployments/d1", Some(json!({"targetStatus": "STOPPED"})))]
#[case(Method::DELETE, "/ai-core/deployments/d1", None)]
#[case(Method::GET, "/ai-core/configurations", None)]
#[case(Method::GET, "/ai-core/models", None)]
#[case(Method::POST, "/ai-core/deployments", Some(json!({})))]
#[case(Method::PATCH, "/ai-core/deployments/d1", Some(json!({})))]
#[case(Method::POST, "/ai-core/configurations", Some(json!({})))]
#[case(Method::POST, "/ai-core/chat/inference", Some(json!({"deploymentId": "", "messages": []})))]
#[tokio::test]
async fn team_without_credentials_gets_fixed_message(
    #[case] method: Method,
    #[case] uri: &str,
    #[case] body: Option<serde_json::Value>,
) {
    let app = TestApp::new().await;

    let (status, response) = app.send(method, uri, CAROL, body).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["error"], CREDENTIALS_NOT_CONFIGURED);
    assert!(app.calls().await.is_empty());
}

#[tokio::test]
async fn caller_without_team_is_forbidden() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::GET, "/ai-core/deployments/d1", DAVE, None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "user is not assigned to any team");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/ai-core/deployments", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_groups_by_team() {
    let app = TestApp::with_client(
        RecordingClient::new()
            .with_deployment("alpha", deployment("d1", "RUNNING"))
            .with_deployment("beta", deployment("d2", "STOPPED")),
    )
    .await;

    let (status, body) = app
        .send(Method::GET, "/ai-core/deployments", ALICE, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["deployments"][0]["team"], "alpha");
    assert_eq!(body["deployments"][0]["deployments"][0]["id"], "d1");
    assert_eq!(body["deployments"][1]["team"], "beta");

    let (_, body) = app.send(Method::GET, "/ai-core/deployments", BOB, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["deployments"][0]["team"], "beta");
}

#[tokio::test]
async fn list_skips_teams_without_credentials() {
    let app = TestApp::with_client(
        RecordingClient::new().with_deployment("beta", deployment("d2", "RUNNING")),
    )
    .await;
    assert!(app.credentials.remove("alpha").await);

    let (status, body) = app
        .send(Method::GET, "/ai-core/deployments", ALICE, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deployments"].as_array().unwrap().len(), 1);
    assert_eq!(body["deployments"][0]["team"], "beta");
}

#[tokio::test]
async fn get_deployment() {
    let app = TestApp::with_client(
        RecordingClient::new().with_deployment("alpha", deployment("d1", "RUNNING")),
    )
    .await;

    let (status, body) = app
        .send(Method::GET, "/ai-core/deployments/d1", ALICE, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "RUNNING");

    let (status, body) = app
        .send(Method::GET, "/ai-core/deployments/missing", ALICE, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "get deployment failed: not found");
}

#[tokio::test]
async fn modify_deployment() {
    let app = TestApp::with_client(
        RecordingClient::new().with_deployment("alpha", deployment("d1", "RUNNING")),
    )
    .await;

    let (status, body) = app
        .send(
            Method::PATCH,
            "/ai-core/deployments/d1",
            ALICE,
            Some(json!({"targetStatus": "STOPPED", "configurationId": ""})),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["id"], "d1");
    assert_eq!(body["targetStatus"], "STOPPED");

    let calls = app.calls().await;
    let RecordedCall::UpdateDeployment { request, .. } = &calls[0] else {
        panic!("expected update call");
    };
    assert_eq!(request.target_status.as_deref(), Some("STOPPED"));
    assert_eq!(request.configuration_id, None);
}

#[tokio::test]
async fn empty_modification_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::PATCH, "/ai-core/deployments/d1", ALICE, Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Either targetStatus or configurationId must be provided"
    );
    assert!(app.calls().await.is_empty());
}

#[tokio::test]
async fn modify_unknown_deployment_is_not_found() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Method::PATCH,
            "/ai-core/deployments/missing",
            ALICE,
            Some(json!({"configurationId": "config-2"})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_deployment() {
    let app = TestApp::with_client(
        RecordingClient::new().with_deployment("alpha", deployment("d1", "STOPPED")),
    )
    .await;

    let (status, body) = app
        .send(Method::DELETE, "/ai-core/deployments/d1", ALICE, None)
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["id"], "d1");

    let (status, _) = app
        .send(Method::DELETE, "/ai-core/deployments/d1", ALICE, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case(Method::GET, None)]
#[case(Method::PATCH, Some(json!({"targetStatus": "STOPPED"})))]
#[case(Method::DELETE, None)]
#[tokio::test]
async fn encoded_path_in_deployment_id_is_rejected(
    #[case] method: Method,
    #[case] body: Option<serde_json::Value>,
) {
    let app = TestApp::new().await;

    let (status, response) = app
        .send(
            method,
            "/ai-core/deployments/..%2Fconfigurations%2Fc1",
            ALICE,
            body,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid deployment id");
    assert!(app.calls().await.is_empty());
}

#[tokio::test]
async fn create_configuration_on_its_own() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/ai-core/configurations",
            BOB,
            Some(json!({"name": "n", "executableId": "azure-openai", "scenarioId": "foundation-models"})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "config-1");
    assert_eq!(
        app.calls().await,
        vec![RecordedCall::CreateConfiguration {
            team: "beta".to_owned(),
            request: ConfigurationRequest {
                name: "n".to_owned(),
                executable_id: "azure-openai".to_owned(),
                scenario_id: "foundation-models".to_owned(),
                parameter_bindings: vec![],
            },
        }]
    );

    let (status, body) = app
        .send(
            Method::GET,
            "/ai-core/configurations?scenarioId=other",
            BOB,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}
