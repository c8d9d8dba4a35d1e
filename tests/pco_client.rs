//! Planning Center client against a mock server.

use patch_board::{AppSettings, PcoClient, PcoError, PlanSource};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn configured() -> AppSettings {
    AppSettings {
        pco_app_id: " app ".to_string(),
        pco_secret: "secret".to_string(),
        service_type_id: "42".to_string(),
        ..AppSettings::default()
    }
}

fn plan_page(id: &str) -> serde_json::Value {
    json!({
        "data": [{
            "type": "Plan",
            "id": id,
            "attributes": { "dates": "June 1, 2025", "plan_title": "Pentecost", "series_title": null }
        }]
    })
}

fn team_members() -> serde_json::Value {
    json!({
        "data": [
            {
                "type": "PlanPerson",
                "id": "pp1",
                "attributes": { "team_position_name": "Lead Vocal" },
                "relationships": {
                    "person": { "data": { "type": "Person", "id": "1" } },
                    "team": { "data": { "type": "Team", "id": "t1" } }
                }
            },
            {
                "type": "PlanPerson",
                "id": "pp2",
                "attributes": { "team_position_name": "Acoustic" },
                "relationships": {
                    "person": { "data": { "type": "Person", "id": "1" } },
                    "team": { "data": { "type": "Team", "id": "t2" } }
                }
            }
        ],
        "included": [
            { "type": "Person", "id": "1", "attributes": { "name": "Jane Doe", "photo_url": "http://img/1" } },
            { "type": "Team", "id": "t1", "attributes": { "name": "Vocals" } },
            { "type": "Team", "id": "t2", "attributes": { "name": "Band" } }
        ]
    })
}

#[tokio::test]
async fn service_types_use_basic_auth() {
    let server = MockServer::start().await;

    // "app:secret" after trimming
    Mock::given(method("GET"))
        .and(path("/service_types"))
        .and(query_param("per_page", "100"))
        .and(header("Authorization", "Basic YXBwOnNlY3JldA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "type": "ServiceType", "id": "42", "attributes": { "name": "Sunday" } },
                { "type": "ServiceType", "id": "43", "attributes": { "name": "Youth" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PcoClient::with_base_url(server.uri()).expect("client");
    let types = client.fetch_service_types(&configured()).await.expect("service types");

    assert_eq!(types.len(), 2);
    assert_eq!(types[1].id, "43");
    assert_eq!(types[1].name, "Youth");
}

#[tokio::test]
async fn missing_credentials_skip_the_network() {
    let server = MockServer::start().await;
    let client = PcoClient::with_base_url(server.uri()).expect("client");
    let settings = AppSettings {
        pco_secret: "   ".to_string(),
        ..configured()
    };

    assert!(client.fetch_service_types(&settings).await.expect("no error").is_empty());
    assert!(client.fetch_plan(&settings).await.expect("no error").is_none());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn rejected_credentials_surface_as_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service_types"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = PcoClient::with_base_url(server.uri()).expect("client");
    let err = client.fetch_service_types(&configured()).await.unwrap_err();

    assert!(matches!(err, PcoError::Status { status: 401, .. }), "got {:?}", err);
}

#[tokio::test]
async fn upcoming_plan_is_fetched_with_people_and_notes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service_types/42/plans"))
        .and(query_param("filter", "future"))
        .and(query_param("order", "sort_date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plan_page("900")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plans/900/team_members"))
        .and(query_param("include", "person,team"))
        .respond_with(ResponseTemplate::new(200).set_body_json(team_members()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plans/900/notes"))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "type": "PlanNote", "id": "n1", "attributes": { "content": "[MIC 1] Jane Doe" } },
                { "type": "PlanNote", "id": "n2", "attributes": { "content": null } }
            ]
        })))
        .mount(&server)
        .await;

    let client = PcoClient::with_base_url(server.uri()).expect("client");
    let plan = client.fetch_plan(&configured()).await.expect("plan").expect("some plan");

    assert_eq!(plan.id, "900");
    assert_eq!(plan.title, "Pentecost");
    assert_eq!(plan.series, "No Series");
    assert_eq!(plan.date, "June 1, 2025");
    assert_eq!(plan.people.len(), 2);
    assert_eq!(plan.people[1].team.as_deref(), Some("Band"));
    assert_eq!(plan.notes, vec!["[MIC 1] Jane Doe".to_string(), String::new()]);

    let people = patch_board::consolidate(&plan.people);
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].roles, vec!["Lead Vocal", "Vocals", "Acoustic", "Band"]);
}

#[tokio::test]
async fn falls_back_to_latest_past_plan_and_tolerates_missing_notes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service_types/42/plans"))
        .and(query_param("filter", "future"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/service_types/42/plans"))
        .and(query_param("order", "-sort_date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plan_page("800")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plans/800/team_members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(team_members()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plans/800/notes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PcoClient::with_base_url(server.uri()).expect("client");
    let plan = client.fetch_plan(&configured()).await.expect("plan").expect("some plan");

    assert_eq!(plan.id, "800");
    assert!(plan.notes.is_empty());
    assert_eq!(plan.people.len(), 2);
}

#[tokio::test]
async fn no_plans_at_all_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service_types/42/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let client = PcoClient::with_base_url(server.uri()).expect("client");
    assert!(client.fetch_plan(&configured()).await.expect("no error").is_none());
}

#[tokio::test]
async fn failed_membership_query_fails_the_plan() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service_types/42/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plan_page("900")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plans/900/team_members"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/plans/900/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = PcoClient::with_base_url(server.uri()).expect("client");
    let err = client.fetch_plan(&configured()).await.unwrap_err();

    assert!(matches!(err, PcoError::Status { status: 403, .. }), "got {:?}", err);
}
