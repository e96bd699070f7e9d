//! End-to-end tests over the reqwest transport against a wiremock server

mod common;

use std::time::Duration;

use common::{Pet, PetApi};
use typedrest::middleware::{RetryPolicy, TracingMiddleware};
use typedrest::{ApiClient, ApiRequest, ClientConfig, Error, Resource, TransportError};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pet_api(server: &MockServer) -> PetApi {
    common::init_tracing();
    let client = ApiClient::new(server.uri()).expect("Failed to build client");
    client.add_middleware(TracingMiddleware);
    PetApi::new(client)
}

#[tokio::test]
async fn test_get_pet_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::load_response_fixture("pet"))
                .insert_header("content-type", "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let pet = pet_api(&mock_server).get_pet_by_id(42).await.unwrap();

    assert_eq!(pet.id, 42);
    assert_eq!(pet.name, "Rex");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_not_found_is_unexpected_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/404"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"code":1,"type":"error","message":"Pet not found"}"#),
        )
        .mount(&mock_server)
        .await;

    let err = pet_api(&mock_server).get_pet_by_id(404).await.unwrap_err();

    let Error::UnexpectedResponse(response) = err else {
        panic!("expected unexpected response, got {err:?}");
    };
    assert_eq!(response.status, 404);
    assert!(response.body_text().contains("Pet not found"));
}

#[tokio::test]
async fn test_invalid_body_is_validation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"one"}"#))
        .mount(&mock_server)
        .await;

    let err = pet_api(&mock_server).get_pet_by_id(1).await.unwrap_err();
    assert!(err.is_validation(), "{err:?}");
}

#[tokio::test]
async fn test_query_headers_and_body_reach_the_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/findByStatus"))
        .and(query_param("status", "sold"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"username": "alice"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = pet_api(&mock_server);
    let pets = api.find_pets_by_status("sold").await.unwrap();
    assert!(pets.is_empty());

    api.client()
        .request_void(
            ApiRequest::post("/user")
                .json(&serde_json::json!({"username": "alice"}))
                .unwrap(),
        )
        .await
        .unwrap();

    mock_server.verify().await;
}

#[tokio::test]
async fn test_config_client_sends_auth_and_retries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/7"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("x-client", "petstore-tests"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pet/7"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::load_response_fixture("pet").replace("42", "7")),
        )
        .mount(&mock_server)
        .await;

    let config = ClientConfig {
        host: Some(mock_server.uri()),
        timeout: Duration::from_secs(5),
        default_headers: [("x-client".to_string(), "petstore-tests".to_string())].into(),
        bearer_token: Some(secrecy::SecretString::new("secret-token".into())),
        retry: Some(
            RetryPolicy::builder()
                .initial_delay(Duration::from_millis(5))
                .retry_on_status([503])
                .build(),
        ),
        ..Default::default()
    };

    let pet: Pet = PetApi::new(ApiClient::from_config(config).unwrap())
        .get_pet_by_id(7)
        .await
        .unwrap();
    assert_eq!(pet.id, 7);

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/inventory"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let config = ClientConfig {
        timeout: Duration::from_millis(50),
        ..ClientConfig::with_host(mock_server.uri())
    };
    let api = PetApi::new(ApiClient::from_config(config).unwrap());

    let err = api.get_inventory().await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Timeout(_))), "{err:?}");
    assert!(err.is_retryable());
}
