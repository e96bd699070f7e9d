//! Request description handed to the client by resource wrappers

use std::fmt::Display;

use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method};
use serde::Serialize;
use typedrest_transport::HttpRequest;

use crate::error::{Error, Result};
use crate::path::{PathParams, resolve_url};

/// One API call before it is resolved against a host.
///
/// Holds the verb, the URL template and its parameters, plus pass-through options
/// (query, headers, body) that reach the transport unchanged.
///
/// # Example
///
/// ```rust
/// use typedrest::ApiRequest;
///
/// let request = ApiRequest::get("/pet/{petId}")
///     .path_param("petId", 42)
///     .query("fields", "name,status")
///     .header("accept", "application/json");
///
/// assert_eq!(request.template(), "/pet/{petId}");
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    template: String,
    path_params: PathParams,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl ApiRequest {
    /// Create a request for `method` against the URL template `template`.
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        Self {
            method,
            template: template.into(),
            path_params: PathParams::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `GET` request.
    pub fn get(template: impl Into<String>) -> Self {
        Self::new(Method::GET, template)
    }

    /// `POST` request.
    pub fn post(template: impl Into<String>) -> Self {
        Self::new(Method::POST, template)
    }

    /// `PUT` request.
    pub fn put(template: impl Into<String>) -> Self {
        Self::new(Method::PUT, template)
    }

    /// `PATCH` request.
    pub fn patch(template: impl Into<String>) -> Self {
        Self::new(Method::PATCH, template)
    }

    /// `DELETE` request.
    pub fn delete(template: impl Into<String>) -> Self {
        Self::new(Method::DELETE, template)
    }

    /// Set one placeholder value.
    pub fn path_param(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.path_params.insert(name, value);
        self
    }

    /// Replace all placeholder values.
    pub fn path_params(mut self, params: PathParams) -> Self {
        self.path_params = params;
        self
    }

    /// Append a query string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a header. Validated when the request is built.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as JSON and set `content-type: application/json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the value cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| Error::InvalidRequest(format!("Failed to serialize JSON body: {e}")))?;
        Ok(self.header("content-type", "application/json").body(bytes))
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL template as given.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder values.
    pub fn params(&self) -> &PathParams {
        &self.path_params
    }

    /// Resolve the template against `host` and produce the transport-level request.
    ///
    /// # Errors
    ///
    /// [`Error::PathTemplate`] when a placeholder has no value or the template is
    /// malformed, [`Error::InvalidRequest`] for an invalid header.
    pub fn build(self, host: Option<&str>) -> Result<HttpRequest> {
        let url = resolve_url(host, &self.template, &self.path_params)?;

        let mut request = HttpRequest::new(self.method, url);
        for (key, value) in self.headers {
            HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| Error::InvalidRequest(format!("Invalid header name '{key}'")))?;
            HeaderValue::from_str(&value).map_err(|_| {
                Error::InvalidRequest(format!("Invalid value for header '{key}'"))
            })?;
            request = request.with_header(key, value);
        }
        request.query = self.query;
        request.body = self.body;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathTemplateError;
    use assert_matches::assert_matches;

    #[test]
    fn test_build_resolves_url_and_keeps_options() {
        let request = ApiRequest::get("/pet/findByStatus")
            .query("status", "available")
            .header("Accept", "application/json")
            .build(Some("https://petstore.example.com/v2"))
            .unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "https://petstore.example.com/v2/pet/findByStatus");
        assert_eq!(
            request.query,
            vec![("status".to_string(), "available".to_string())]
        );
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_json_body_sets_content_type() {
        #[derive(Serialize)]
        struct NewPet<'a> {
            name: &'a str,
        }

        let request = ApiRequest::post("/pet")
            .json(&NewPet { name: "Rex" })
            .unwrap()
            .build(None)
            .unwrap();

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(&br#"{"name":"Rex"}"#[..]));
    }

    #[test]
    fn test_missing_path_param_fails_build() {
        let err = ApiRequest::delete("/pet/{petId}").build(None).unwrap_err();

        assert_matches!(
            err,
            Error::PathTemplate(PathTemplateError::MissingParameter { ref name, .. }) if name == "petId"
        );
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let err = ApiRequest::get("/store/inventory")
            .header("bad header", "x")
            .build(None)
            .unwrap_err();
        assert_matches!(err, Error::InvalidRequest(_));

        let err = ApiRequest::get("/store/inventory")
            .header("x-ok", "line\nbreak")
            .build(None)
            .unwrap_err();
        assert_matches!(err, Error::InvalidRequest(_));
    }

    #[test]
    fn test_json_serialization_failure() {
        use std::collections::HashMap;

        // Non-string map keys cannot be represented in JSON
        let mut body = HashMap::new();
        body.insert(vec![1u8], "value");

        let err = ApiRequest::post("/pet").json(&body).unwrap_err();
        assert_matches!(err, Error::InvalidRequest(_));
    }
}
