//! Base trait for per-resource API wrappers
//!
//! Wrappers are thin: each operation names a verb, a URL template and a result type and
//! hands them to the shared [`ApiClient`].
//!
//! ```rust,no_run
//! use serde::Deserialize;
//! use typedrest::{ApiClient, ApiRequest, Resource, Result};
//!
//! #[derive(Deserialize)]
//! pub struct Pet {
//!     pub id: u64,
//!     pub name: String,
//! }
//!
//! #[derive(Clone)]
//! pub struct PetApi {
//!     client: ApiClient,
//! }
//!
//! impl Resource for PetApi {
//!     fn client(&self) -> &ApiClient {
//!         &self.client
//!     }
//! }
//!
//! impl PetApi {
//!     pub async fn get_pet_by_id(&self, pet_id: u64) -> Result<Pet> {
//!         self.client()
//!             .request(ApiRequest::get("/pet/{petId}").path_param("petId", pet_id))
//!             .await
//!     }
//!
//!     pub async fn delete_pet(&self, pet_id: u64) -> Result<()> {
//!         self.client()
//!             .request_void(ApiRequest::delete("/pet/{petId}").path_param("petId", pet_id))
//!             .await
//!     }
//! }
//! ```

use crate::client::ApiClient;

/// Base trait for API resources.
pub trait Resource {
    /// Get a reference to the client.
    fn client(&self) -> &ApiClient;
}

impl Resource for ApiClient {
    fn client(&self) -> &ApiClient {
        self
    }
}
