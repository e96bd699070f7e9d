//! Response decoding
//!
//! Only status 200 is decoded. Every other status, 2xx included, is handed back whole as
//! [`Error::UnexpectedResponse`].

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::debug;
use typedrest_transport::HttpResponse;

use crate::error::{Error, Result, UnexpectedResponse};

const OK: u16 = 200;

fn ensure_ok(response: HttpResponse) -> Result<HttpResponse> {
    if response.status == OK {
        Ok(response)
    } else {
        debug!(status = response.status, "Response status is not 200");
        Err(Error::UnexpectedResponse(UnexpectedResponse::from(response)))
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        let err = Error::validation::<T>(e);
        debug!(error = %err, "Response body failed validation");
        err
    })
}

/// Decode a 200 response body as `T`.
///
/// # Errors
///
/// [`Error::UnexpectedResponse`] for any status other than 200, [`Error::Validation`]
/// when the body does not conform to `T`.
pub fn decode_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let response = ensure_ok(response)?;
    debug!(
        target_type = std::any::type_name::<T>(),
        body_size = response.body.len(),
        "Decoding response body"
    );
    parse_body(&response.body)
}

/// Accept a 200 response without looking at its body.
///
/// # Errors
///
/// [`Error::UnexpectedResponse`] for any status other than 200.
pub fn expect_no_content(response: HttpResponse) -> Result<()> {
    ensure_ok(response).map(drop)
}

/// Decoded body together with the status and headers it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse<T> {
    parsed: T,
    status: u16,
    headers: HashMap<String, String>,
}

impl<T> RawResponse<T> {
    /// The decoded value.
    pub fn parsed(&self) -> &T {
        &self.parsed
    }

    /// Take the decoded value.
    pub fn into_parsed(self) -> T {
        self.parsed
    }

    /// HTTP status (always 200 for a decoded response).
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers, names lowercase.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Like [`decode_json`], keeping status and headers.
pub fn decode_raw<T: DeserializeOwned>(response: HttpResponse) -> Result<RawResponse<T>> {
    let response = ensure_ok(response)?;
    let parsed = parse_body(&response.body)?;
    Ok(RawResponse {
        parsed,
        status: response.status,
        headers: response.headers,
    })
}
