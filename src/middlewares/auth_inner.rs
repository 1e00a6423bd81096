//! OpenApiAuth 인증 로직의 핵심적인 기능
use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::domain::models::auth::{AuthOptions, AuthRequest};
use crate::middlewares::chain::AuthChain;
use crate::utils::http_utils::TRUSTED_HEADERS;

/// 실제 인증 로직을 수행하는 서비스
pub struct OpenApiAuthService<S> {
    pub service: Rc<S>,
    pub chain: Arc<AuthChain>,
    pub options: AuthOptions,
}

impl<S, B> Service<ServiceRequest> for OpenApiAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let chain = self.chain.clone();
        let options = self.options;

        Box::pin(async move {
            // 신뢰 헤더는 게이트웨이만 설정할 수 있다
            for name in TRUSTED_HEADERS {
                req.headers_mut().remove(name);
            }

            let auth_request = AuthRequest::from_http(req.request(), options);
            let outcome = match chain.authenticate(&auth_request).await {
                Ok(outcome) => outcome,
                Err(failure) => {
                    log::warn!("인증 실패: {} {} - {}", auth_request.method, auth_request.path, failure);
                    let mut response = failure.error.error_response();
                    for cookie in &failure.cookies {
                        if let Err(e) = response.add_cookie(cookie) {
                            log::warn!("쿠키 설정 실패 ({}): {}", cookie.name(), e);
                        }
                    }
                    let (req, _) = req.into_parts();
                    return Ok(ServiceResponse::new(req, response).map_into_right_body());
                }
            };

            for (name, value) in outcome.identity.headers() {
                match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                    (Ok(name), Ok(value)) => {
                        req.headers_mut().insert(name, value);
                    }
                    _ => log::warn!("신원 헤더를 설정할 수 없습니다: {}", name),
                }
            }
            req.extensions_mut().insert(outcome.identity);

            let mut res = service.call(req).await?;
            for cookie in &outcome.cookies {
                if let Err(e) = res.response_mut().add_cookie(cookie) {
                    log::warn!("쿠키 설정 실패 ({}): {}", cookie.name(), e);
                }
            }
            Ok(res.map_into_left_body())
        })
    }
}
