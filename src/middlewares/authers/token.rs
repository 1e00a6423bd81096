use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::auth::AuthRequest;
use crate::errors::errors::AppError;
use crate::middlewares::authers::{AuthOutcome, AuthResult, Auther};
use crate::services::auth::TokenValidator;
use crate::utils::http_utils::bearer_token;

/// `Authorization: Bearer <token>` 인증
pub struct TokenAuther {
    validator: Arc<TokenValidator>,
}

impl TokenAuther {
    pub const WEIGHT: i32 = 100;

    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl Auther for TokenAuther {
    fn name(&self) -> &'static str {
        "token"
    }

    fn weight(&self) -> i32 {
        Self::WEIGHT
    }

    fn matches(&self, req: &AuthRequest) -> bool {
        req.options.check_token && req.authorization().and_then(bearer_token).is_some()
    }

    async fn check(&self, req: &AuthRequest) -> AuthResult<AuthOutcome> {
        let token = req
            .authorization()
            .and_then(bearer_token)
            .ok_or_else(|| AppError::AuthenticationError("Bearer 토큰이 없습니다".to_string()))?;

        let identity = self.validator.validate(token).await?;
        log::debug!(
            "토큰 인증 성공 - client: {:?}, user: {:?}",
            identity.client_id,
            identity.user_id
        );
        Ok(AuthOutcome::new(identity))
    }
}
