//! OpenAPI 인증 미들웨어
//!
//! 라우트(스코프)별 [`AuthOptions`] 로 [`AuthChain`] 을 실행하고, 결과 신원을 요청에 주입합니다.

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, Result,
};

use crate::domain::models::auth::AuthOptions;
use crate::middlewares::auth_inner::OpenApiAuthService;
use crate::middlewares::chain::AuthChain;

/// 인증 미들웨어
///
/// ```rust,ignore
/// web::scope("/api/openapi/users")
///     .wrap(OpenApiAuth::new(chain.clone(), AuthOptions::login().with_token()))
/// ```
#[derive(Clone)]
pub struct OpenApiAuth {
    chain: Arc<AuthChain>,
    options: AuthOptions,
}

impl OpenApiAuth {
    pub fn new(chain: Arc<AuthChain>, options: AuthOptions) -> Self {
        Self { chain, options }
    }

    /// 인증 없이 통과시키되 외부에서 들어온 신뢰 헤더는 제거합니다.
    pub fn public(chain: Arc<AuthChain>) -> Self {
        Self::new(chain, AuthOptions::public())
    }

    pub fn login(chain: Arc<AuthChain>) -> Self {
        Self::new(chain, AuthOptions::login())
    }

    pub fn options(&self) -> AuthOptions {
        self.options
    }
}

impl<S, B> Transform<S, ServiceRequest> for OpenApiAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = OpenApiAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OpenApiAuthService {
            service: Rc::new(service),
            chain: self.chain.clone(),
            options: self.options,
        }))
    }
}
