//! Common test utilities and helpers

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use typedrest::{
    ApiClient, ApiRequest, HttpRequest, HttpResponse, Resource, Result, Transport, TransportError,
    async_trait,
};

/// Route library logs to the test harness output (`RUST_LOG` filters them)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Load a response fixture
pub fn load_response_fixture(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = Path::new(manifest_dir)
        .join("tests")
        .join("fixtures")
        .join("responses")
        .join(format!("{}.json", name));

    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to load response fixture '{}' from {:?}: {}",
            name, path, e
        )
    })
}

/// 200 response carrying a fixture as its body
pub fn fixture_response(name: &str) -> HttpResponse {
    HttpResponse::with_status(200)
        .with_header("content-type", "application/json")
        .with_body(load_response_fixture(name))
}

type Scripted = std::result::Result<HttpResponse, TransportError>;

/// In-memory transport: replays scripted outcomes in order and records every request.
///
/// Once the script is exhausted it keeps answering with the fallback (200, empty body).
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_http(&self, request: HttpRequest) -> Scripted {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::with_status(200)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Client over `transport` with the example host
pub fn client_with(transport: &MockTransport) -> ApiClient {
    ApiClient::builder()
        .host("https://api.example.com")
        .transport(transport.clone())
        .build()
        .expect("Failed to build client")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: u64,
    pub name: String,
    pub category: Option<Category>,
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub status: Option<String>,
}

/// Thin per-resource wrapper, the shape generated wrappers take
#[derive(Clone)]
pub struct PetApi {
    client: ApiClient,
}

impl Resource for PetApi {
    fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl PetApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_pet_by_id(&self, pet_id: u64) -> Result<Pet> {
        self.client()
            .request(ApiRequest::get("/pet/{petId}").path_param("petId", pet_id))
            .await
    }

    pub async fn find_pets_by_status(&self, status: &str) -> Result<Vec<Pet>> {
        self.client()
            .request(ApiRequest::get("/pet/findByStatus").query("status", status))
            .await
    }

    pub async fn delete_pet(&self, pet_id: u64, api_key: Option<&str>) -> Result<()> {
        let mut request = ApiRequest::delete("/pet/{petId}").path_param("petId", pet_id);
        if let Some(api_key) = api_key {
            request = request.header("api_key", api_key);
        }
        self.client().request_void(request).await
    }

    pub async fn get_inventory(&self) -> Result<HashMap<String, i32>> {
        self.client()
            .request(ApiRequest::get("/store/inventory"))
            .await
    }

    #[cfg(feature = "blocking")]
    pub fn get_pet_by_id_sync(&self, pet_id: u64) -> Result<Pet> {
        self.client()
            .request_sync(ApiRequest::get("/pet/{petId}").path_param("petId", pet_id))
    }
}
