//! # 인증 체인
//!
//! 등록된 인증기를 weight 내림차순으로 정렬해 두고, 요청마다 **처음으로 `matches` 가 참인 인증기 하나**만
//! 실행합니다. 그 인증기가 실패하면 다음 인증기로 넘어가지 않고 요청은 거부됩니다.
//!
//! ```text
//! token(100) ─► basic(90) ─► login(50) ─► try-login(10)
//!      └──────── 첫 매치 ────────┘
//!                   │
//!                   ▼
//!        over-permission checkers (org-name …)
//! ```

use std::cmp::Reverse;
use std::sync::Arc;

use crate::domain::models::auth::AuthRequest;
use crate::errors::errors::AppError;
use crate::middlewares::authers::{AuthFailure, AuthOutcome, AuthResult, Auther, OverPermissionChecker};

pub struct AuthChain {
    authers: Vec<Arc<dyn Auther>>,
    checkers: Vec<Arc<dyn OverPermissionChecker>>,
}

impl AuthChain {
    /// weight 가 같으면 등록 순서를 유지합니다.
    pub fn new(mut authers: Vec<Arc<dyn Auther>>, mut checkers: Vec<Arc<dyn OverPermissionChecker>>) -> Self {
        authers.sort_by_key(|a| Reverse(a.weight()));
        checkers.sort_by_key(|c| Reverse(c.weight()));
        Self { authers, checkers }
    }

    pub fn authers(&self) -> &[Arc<dyn Auther>] {
        &self.authers
    }

    pub fn checkers(&self) -> &[Arc<dyn OverPermissionChecker>] {
        &self.checkers
    }

    /// (이름, weight) 목록. 시작 시 체인 구성을 출력하는 데 씁니다.
    pub fn describe(&self) -> (Vec<(&'static str, i32)>, Vec<(&'static str, i32)>) {
        (
            self.authers.iter().map(|a| (a.name(), a.weight())).collect(),
            self.checkers.iter().map(|c| (c.name(), c.weight())).collect(),
        )
    }

    /// 실패에도 응답에 실어야 할 쿠키가 있으면 [`AuthFailure`] 에 담겨 돌아옵니다.
    pub async fn authenticate(&self, req: &AuthRequest) -> AuthResult<AuthOutcome> {
        let Some(auther) = self.authers.iter().find(|a| a.matches(req)) else {
            if req.options.is_public() {
                return Ok(AuthOutcome::default());
            }
            log::debug!("일치하는 인증기 없음 - {} {}", req.method, req.path);
            return Err(AppError::AuthenticationError("인증 정보가 없습니다".to_string()).into());
        };

        log::debug!("인증기 선택: {} - {} {}", auther.name(), req.method, req.path);
        let mut outcome = auther.check(req).await.inspect_err(|e| {
            log::info!("인증 실패 ({}) - {} {}: {}", auther.name(), req.method, req.path, e);
        })?;

        for checker in self.checkers.iter().filter(|c| c.matches(req)) {
            if let Err(e) = checker.check(req, &mut outcome.identity).await {
                log::info!("권한 검사 실패 ({}) - {} {}: {}", checker.name(), req.method, req.path, e);
                return Err(AuthFailure::from(e).with_cookies(outcome.cookies));
            }
        }

        Ok(outcome)
    }
}
