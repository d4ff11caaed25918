// src/middleware/client_ip.rs

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};
use std::net::SocketAddr;

pub const UNKNOWN_IP: &str = "unknown";

// Endereço de origem da requisição, no melhor esforço.
// Atrás de proxy (Render, Vercel) o IP real vem no X-Forwarded-For.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

fn from_headers(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded.or_else(real_ip).map(str::to_string)
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = from_headers(&parts.headers)
            .or_else(|| {
                // Só existe quando o servidor sobe com `into_make_service_with_connect_info`
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        Ok(ClientIp(ip))
    }
}
