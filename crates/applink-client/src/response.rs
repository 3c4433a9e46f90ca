//! Transport-level response with a decoded body.

use bytes::Bytes;

/// Response body as decoded by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No body (e.g. `204 No Content`).
    Empty,
    /// Body decoded as JSON because the server labelled it JSON.
    Json(serde_json::Value),
    /// Raw body: non-JSON content types, or JSON that failed to decode.
    Bytes(Bytes),
}

impl ResponseBody {
    /// Decode a raw body given its `Content-Type`.
    ///
    /// JSON that does not parse is kept as raw bytes so the caller can decide
    /// how to report the shape mismatch.
    pub fn decode(content_type: Option<&str>, raw: Bytes) -> Self {
        if raw.is_empty() {
            return ResponseBody::Empty;
        }

        if content_type.is_some_and(is_json_content_type) {
            if let Ok(value) = serde_json::from_slice(&raw) {
                return ResponseBody::Json(value);
            }
        }

        ResponseBody::Bytes(raw)
    }

    /// Keep a raw body as-is.
    pub fn raw(raw: Bytes) -> Self {
        if raw.is_empty() {
            ResponseBody::Empty
        } else {
            ResponseBody::Bytes(raw)
        }
    }

    /// Returns true if there is no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    /// The raw bytes of the body, re-encoding JSON when needed.
    pub fn into_bytes(self) -> Bytes {
        match self {
            ResponseBody::Empty => Bytes::new(),
            ResponseBody::Json(value) => Bytes::from(value.to_string()),
            ResponseBody::Bytes(bytes) => bytes,
        }
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Status code plus decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: ResponseBody) -> Self {
        Self { status, body }
    }

    /// Create a JSON response.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::new(status, ResponseBody::Json(body))
    }

    /// Create a response with no body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, ResponseBody::Empty)
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
