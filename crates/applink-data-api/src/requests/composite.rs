use std::collections::{HashMap, HashSet};

use heroku_applink_client::RequestMethod;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{data_url, is_success, RecordMutation, RestApiRequest};
use crate::error::{Error, ErrorKind, InnerSalesforceRestApiError, Result, SalesforceRestApiError};
use crate::parse::{error_from_response, json_kind};
use crate::reference_id::ReferenceId;

/// Id of the single graph in every request.
const GRAPH_ID: &str = "graph";

/// Response from a composite graph request.
#[derive(Debug, Clone, Deserialize)]
struct CompositeGraphResponse {
    graphs: Vec<GraphResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct GraphResult {
    #[serde(rename = "graphId", default)]
    graph_id: String,
    #[serde(rename = "graphResponse")]
    graph_response: GraphResponse,
    #[serde(rename = "isSuccessful", default)]
    is_successful: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
struct GraphResponse {
    #[serde(rename = "compositeResponse")]
    composite_response: Vec<CompositeSubresponse>,
}

/// Response from a single node of the graph.
#[derive(Debug, Clone, Deserialize)]
struct CompositeSubresponse {
    #[serde(default)]
    body: Value,
    #[serde(rename = "httpStatusCode")]
    http_status_code: u16,
    #[serde(rename = "referenceId")]
    reference_id: String,
}

/// `POST /composite/graph`: run several requests as one graph.
///
/// Sub-requests are sent in insertion order and may refer to records created
/// earlier in the graph through [`ReferenceId::placeholder`]. Each
/// sub-response is handed back to the sub-request that produced it, and the
/// results are returned keyed by reference id.
#[derive(Debug, Clone)]
pub struct CompositeGraphRestApiRequest<R = RecordMutation> {
    api_version: String,
    sub_requests: Vec<(ReferenceId, R)>,
}

impl<R: RestApiRequest> CompositeGraphRestApiRequest<R> {
    /// `api_version` is used for the sub-request URLs inside the graph.
    pub fn new(api_version: impl Into<String>, sub_requests: Vec<(ReferenceId, R)>) -> Self {
        Self {
            api_version: api_version.into(),
            sub_requests,
        }
    }

    pub fn len(&self) -> usize {
        self.sub_requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_requests.is_empty()
    }

    pub fn reference_ids(&self) -> impl Iterator<Item = &ReferenceId> {
        self.sub_requests.iter().map(|(reference_id, _)| reference_id)
    }

    fn sub_request(&self, reference_id: &str) -> Option<(&ReferenceId, &R)> {
        self.sub_requests
            .iter()
            .find(|(id, _)| id.id() == reference_id)
            .map(|(id, request)| (id, request))
    }
}

impl<R: RestApiRequest> RestApiRequest for CompositeGraphRestApiRequest<R> {
    type Output = HashMap<ReferenceId, R::Output>;

    fn url(&self, org_domain_url: &str, api_version: &str) -> String {
        data_url(org_domain_url, api_version, "composite/graph")
    }

    fn http_method(&self) -> RequestMethod {
        RequestMethod::Post
    }

    fn request_body(&self) -> Option<Value> {
        let composite_request: Vec<Value> = self
            .sub_requests
            .iter()
            .map(|(reference_id, request)| {
                let mut node = json!({
                    "method": request.http_method().as_str(),
                    "url": request.url("", &self.api_version),
                    "referenceId": reference_id.id(),
                });
                if let Some(body) = request.request_body() {
                    node["body"] = body;
                }
                node
            })
            .collect();

        Some(json!({
            "graphs": [{
                "graphId": GRAPH_ID,
                "compositeRequest": composite_request,
            }]
        }))
    }

    async fn process_response(&self, status: u16, body: Option<Value>) -> Result<Self::Output> {
        if !is_success(status) {
            return Err(error_from_response(status, body));
        }

        let body = match body {
            Some(body @ Value::Object(_)) => body,
            Some(other) => {
                return Err(Error::unexpected_payload(format!(
                    "expected a composite graph response object, got {}",
                    json_kind(&other)
                )))
            }
            None => {
                return Err(Error::unexpected_payload(
                    "expected a composite graph response object, got an empty body",
                ))
            }
        };

        let response: CompositeGraphResponse = serde_json::from_value(body).map_err(|e| {
            Error::with_source(
                ErrorKind::UnexpectedPayload(format!("malformed composite graph response: {}", e)),
                e,
            )
        })?;

        let graph = response
            .graphs
            .into_iter()
            .next()
            .ok_or_else(|| Error::unexpected_payload("composite graph response has no graphs"))?;
        debug!(
            graph_id = %graph.graph_id,
            is_successful = ?graph.is_successful,
            nodes = graph.graph_response.composite_response.len(),
            "Processing composite graph response"
        );

        let mut results = HashMap::with_capacity(self.sub_requests.len());
        let mut api_errors: Vec<InnerSalesforceRestApiError> = Vec::new();
        let mut failed = false;
        let mut seen = HashSet::with_capacity(self.sub_requests.len());

        for node in graph.graph_response.composite_response {
            let (reference_id, request) = self.sub_request(&node.reference_id).ok_or_else(|| {
                Error::unexpected_payload(format!(
                    "composite graph response references unknown referenceId '{}'",
                    node.reference_id
                ))
            })?;
            if !seen.insert(reference_id) {
                return Err(Error::unexpected_payload(format!(
                    "composite graph response repeats referenceId '{}'",
                    reference_id
                )));
            }

            let node_body = match node.body {
                Value::Null => None,
                body => Some(body),
            };

            match request.process_response(node.http_status_code, node_body).await {
                Ok(output) => {
                    results.insert(reference_id.clone(), output);
                }
                Err(Error {
                    kind: ErrorKind::RestApi(err),
                    ..
                }) => {
                    failed = true;
                    api_errors.extend(err.api_errors.into_iter().map(|api_error| {
                        if api_error.reference_id.is_some() {
                            api_error
                        } else {
                            api_error.with_reference_id(reference_id.clone())
                        }
                    }));
                }
                Err(err) => return Err(err),
            }
        }

        if failed {
            warn!(
                errors = api_errors.len(),
                "Composite graph reported sub-request errors"
            );
            return Err(SalesforceRestApiError::new(api_errors).into());
        }

        if let Some((missing, _)) = self
            .sub_requests
            .iter()
            .find(|(reference_id, _)| !results.contains_key(reference_id))
        {
            return Err(Error::unexpected_payload(format!(
                "composite graph response has no entry for referenceId '{}'",
                missing
            )));
        }

        Ok(results)
    }
}
