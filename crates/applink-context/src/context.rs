//! The request-scoped client context.

use std::fmt;

use base64::Engine;
use heroku_applink_client::{ClientConfig, HttpTransport, Transport};
use heroku_applink_data_api::DataApi;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Name of the header carrying the encoded context.
pub const CLIENT_CONTEXT_HEADER: &str = "x-client-context";

/// The kind of org that made the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrgType {
    #[default]
    Salesforce,
    DataCloud,
    /// Pilot-era spelling still sent by some orgs.
    DataCloudLegacy,
}

impl OrgType {
    /// The wire name of the org type.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgType::Salesforce => "SalesforceOrg",
            OrgType::DataCloud => "DataCloudOrg",
            OrgType::DataCloudLegacy => "DatacloudOrg",
        }
    }

    /// Parse a wire name. Unknown names are treated as a Salesforce org.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "DataCloudOrg" => OrgType::DataCloud,
            "DatacloudOrg" => OrgType::DataCloudLegacy,
            _ => OrgType::Salesforce,
        }
    }
}

impl fmt::Display for OrgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The Salesforce user that made the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
}

/// The org that made the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Org {
    pub id: String,
    pub domain_url: String,
    pub user: User,
    pub org_type: OrgType,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClientContext {
    org_id: String,
    org_domain_url: String,
    user_context: RawUserContext,
    request_id: String,
    access_token: String,
    api_version: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    org_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserContext {
    user_id: String,
    username: String,
}

/// Everything known about the inbound AppLink request, plus a [`DataApi`]
/// authorized as the calling user.
///
/// Build one per request with [`ClientContext::from_header`] and pass it to
/// the handler explicitly.
///
/// ## Security
///
/// The access token is redacted in Debug output.
#[derive(Clone)]
pub struct ClientContext<T = HttpTransport> {
    pub org: Org,
    pub request_id: String,
    pub access_token: String,
    pub api_version: String,
    /// Namespace of the calling package; empty when unmanaged.
    pub namespace: String,
    pub data_api: DataApi<T>,
}

impl<T> fmt::Debug for ClientContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("org", &self.org)
            .field("request_id", &self.request_id)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ClientContext<T> {
    /// Decode the `x-client-context` header value.
    ///
    /// The value is base64 (standard alphabet) JSON. The returned context's
    /// [`DataApi`] sends its requests through `transport`; pass a clone of a
    /// shared [`HttpTransport`] to reuse one connection pool across requests.
    pub fn from_header(header: &str, transport: T) -> Result<Self> {
        let header = header.trim();
        if header.is_empty() {
            return Err(Error::invalid_header(format!(
                "{} not set",
                CLIENT_CONTEXT_HEADER
            )));
        }

        let decoded = base64::engine::general_purpose::STANDARD.decode(header)?;
        let raw: RawClientContext = serde_json::from_slice(&decoded)?;

        let org_type = raw
            .org_type
            .as_deref()
            .map(OrgType::from_wire)
            .unwrap_or_default();
        debug!(
            org_id = %raw.org_id,
            request_id = %raw.request_id,
            %org_type,
            "Decoded client context"
        );

        let data_api = DataApi::with_transport(
            raw.org_domain_url.clone(),
            raw.api_version.clone(),
            raw.access_token.clone(),
            transport,
        );

        Ok(Self {
            org: Org {
                id: raw.org_id,
                domain_url: raw.org_domain_url,
                user: User {
                    id: raw.user_context.user_id,
                    username: raw.user_context.username,
                },
                org_type,
            },
            request_id: raw.request_id,
            access_token: raw.access_token,
            api_version: raw.api_version,
            namespace: raw.namespace.unwrap_or_default(),
            data_api,
        })
    }
}

impl ClientContext<HttpTransport> {
    /// Decode the header and give the context its own HTTP transport.
    pub fn from_header_with_config(header: &str, config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)
            .map_err(heroku_applink_data_api::Error::from)?;
        Self::from_header(header, transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use heroku_applink_client::{HttpRequest, HttpResponse};
    use serde_json::json;

    struct NoopTransport;

    impl Transport for NoopTransport {
        async fn send(&self, _request: HttpRequest) -> heroku_applink_client::Result<HttpResponse> {
            Ok(HttpResponse::empty(204))
        }
    }

    fn encode(value: serde_json::Value) -> String {
        base64::engine::general_purpose::STANDARD.encode(value.to_string())
    }

    fn sample() -> serde_json::Value {
        json!({
            "requestId": "00Dxx0000000000EAA-4Y4W3Lw_LkoskcHdEaZze-uuid",
            "accessToken": "00Dxx!AQ0AQKn",
            "apiVersion": "62.0",
            "namespace": "acme",
            "orgId": "00Dxx0000000000EAA",
            "orgDomainUrl": "https://acme.my.salesforce.com",
            "userContext": {
                "userId": "005xx000001X8Uz",
                "username": "admin@acme.example"
            }
        })
    }

    #[test]
    fn test_from_header() {
        let context = ClientContext::from_header(&encode(sample()), NoopTransport).unwrap();

        assert_eq!(context.org.id, "00Dxx0000000000EAA");
        assert_eq!(context.org.domain_url, "https://acme.my.salesforce.com");
        assert_eq!(context.org.user.id, "005xx000001X8Uz");
        assert_eq!(context.org.user.username, "admin@acme.example");
        assert_eq!(context.org.org_type, OrgType::Salesforce);
        assert_eq!(context.request_id, "00Dxx0000000000EAA-4Y4W3Lw_LkoskcHdEaZze-uuid");
        assert_eq!(context.api_version, "62.0");
        assert_eq!(context.namespace, "acme");

        assert_eq!(context.data_api.org_domain_url(), "https://acme.my.salesforce.com");
        assert_eq!(context.data_api.api_version(), "62.0");
        assert_eq!(context.data_api.access_token(), "00Dxx!AQ0AQKn");
    }

    #[test]
    fn test_org_type_and_namespace_are_optional() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("namespace");
        value["orgType"] = json!("DataCloudOrg");

        let context = ClientContext::from_header(&encode(value), NoopTransport).unwrap();
        assert_eq!(context.org.org_type, OrgType::DataCloud);
        assert!(context.namespace.is_empty());
    }

    #[test]
    fn test_org_type_wire_names() {
        assert_eq!(OrgType::from_wire("SalesforceOrg"), OrgType::Salesforce);
        assert_eq!(OrgType::from_wire("DataCloudOrg"), OrgType::DataCloud);
        assert_eq!(OrgType::from_wire("DatacloudOrg"), OrgType::DataCloudLegacy);
        assert_eq!(OrgType::from_wire("SomethingNew"), OrgType::Salesforce);
        assert_eq!(OrgType::DataCloudLegacy.to_string(), "DatacloudOrg");
    }

    #[test]
    fn test_invalid_headers() {
        let cases = [
            String::new(),
            "not base64!".to_string(),
            base64::engine::general_purpose::STANDARD.encode("not json"),
            encode(json!({"orgId": "00D"})),
        ];
        for header in cases {
            let err = ClientContext::from_header(&header, NoopTransport).unwrap_err();
            assert!(matches!(err.kind, ErrorKind::InvalidHeader(_)));
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let context = ClientContext::from_header(&encode(sample()), NoopTransport).unwrap();
        let debug = format!("{:?}", context);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("AQ0AQKn"));
    }

    #[test]
    fn test_from_header_with_config() {
        let config = ClientConfig::builder().with_tracing(false).build();
        let context = ClientContext::from_header_with_config(&encode(sample()), config).unwrap();
        assert!(!context.data_api.transport().config().enable_tracing);
    }
}
