/*
 * Responsibility
 * - The inbound request as seen by the token pipeline (method, uri, headers, query, peer ip)
 * - Built once by the HTTP layer and passed explicitly; nothing downstream reads ambient state
 */
use std::net::{IpAddr, SocketAddr};

use axum::http::{HeaderMap, Method, Uri};

#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    client_ip: Option<IpAddr>,
}

impl InboundRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            uri,
            headers,
            query,
            client_ip: None,
        }
    }

    pub fn with_client_ip(mut self, client_ip: Option<IpAddr>) -> Self {
        self.client_ip = client_ip;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    // First value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client_ip
    }
}

/// Client IP as seen through proxies.
///
/// Priority:
/// 1. X-Forwarded-For (first entry)
/// 2. X-Real-IP
/// 3. socket peer address
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        return forwarded
            .to_str()
            .ok()
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok());
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        return real_ip.to_str().ok().and_then(|s| s.trim().parse().ok());
    }

    peer.map(|addr| addr.ip())
}
