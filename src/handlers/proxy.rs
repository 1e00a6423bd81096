//! # Reverse Proxy Handler
//!
//! 인증 체인을 통과한 `/api/**` 요청을 `PROXY_UPSTREAM` 으로 그대로 전달합니다.
//! 메서드, 경로, 쿼리, 본문과 헤더(게이트웨이가 주입한 신원 헤더 포함)를 넘기고,
//! 업스트림의 상태 코드, 헤더, 본문을 그대로 돌려줍니다.

use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::errors::{AppError, AppResult, ErrorContext};

/// 연결 단위 헤더. 프록시 구간을 넘어 전달하지 않습니다.
const HOP_BY_HOP_HEADERS: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}

pub struct ProxyClient {
    client: reqwest::Client,
    upstream: String,
}

impl ProxyClient {
    pub fn new(upstream: impl Into<String>, timeout_seconds: u64) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("프록시 HTTP 클라이언트 생성 실패")?;

        Ok(Self {
            client,
            upstream: upstream.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    fn target_url(&self, req: &HttpRequest) -> String {
        match req.query_string() {
            "" => format!("{}{}", self.upstream, req.path()),
            query => format!("{}{}?{}", self.upstream, req.path(), query),
        }
    }

    pub async fn forward(&self, req: &HttpRequest, body: web::Bytes) -> AppResult<HttpResponse> {
        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
            .map_err(|e| AppError::ValidationError(format!("지원하지 않는 메서드: {}", e)))?;
        let url = self.target_url(req);

        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in req.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            if let (Ok(name), Ok(value)) = (
                reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes()),
                reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
            ) {
                headers.append(name, value);
            }
        }
        if let Some(peer) = req.connection_info().realip_remote_addr() {
            if let Ok(value) = reqwest::header::HeaderValue::from_str(peer) {
                headers.insert("x-forwarded-for", value);
            }
        }

        log::debug!("프록시 전달: {} {}", method, url);
        let upstream_response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("프록시 업스트림 요청 실패 ({}): {}", url, e);
                AppError::ExternalServiceError(format!("업스트림 요청 실패: {}", e))
            })?;

        let status = StatusCode::from_u16(upstream_response.status().as_u16())
            .map_err(|e| AppError::ExternalServiceError(format!("잘못된 업스트림 상태 코드: {}", e)))?;

        let mut response = HttpResponse::build(status);
        for (name, value) in upstream_response.headers() {
            if !is_hop_by_hop(name.as_str()) {
                response.append_header((name.as_str(), value.as_bytes().to_vec()));
            }
        }

        let bytes = upstream_response.bytes().await.map_err(|e| {
            log::error!("프록시 업스트림 응답 읽기 실패 ({}): {}", url, e);
            AppError::ExternalServiceError(format!("업스트림 응답 읽기 실패: {}", e))
        })?;

        Ok(response.body(bytes.to_vec()))
    }
}

/// `/api/{tail:.*}` 프록시 핸들러
pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    proxy: web::Data<ProxyClient>,
) -> Result<HttpResponse, AppError> {
    proxy.forward(&req, body).await
}
