//! Client IP address extractor.

use std::net::{IpAddr, SocketAddr};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};

use crate::app::AppState;

/// Header set by reverse proxies with the originating client address first.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Header set by some proxies with the single client address.
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// Best-effort client address of a request.
///
/// `None` when no usable address is available, which is the case for
/// in-process test requests without connection info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

/// Resolves the client address.
///
/// Proxy headers are only consulted when `trust_proxy_headers` is set;
/// otherwise they are client-controlled and the socket peer is used.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_proxy_headers: bool,
) -> Option<IpAddr> {
    let peer = || {
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    };

    if !trust_proxy_headers {
        return peer();
    }

    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            headers
                .get(REAL_IP_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        })
        .or_else(peer)
}

#[async_trait]
impl FromRequestParts<AppState> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(resolve_client_ip(
            &parts.headers,
            &parts.extensions,
            state.config.security.trust_proxy_headers,
        )))
    }
}
