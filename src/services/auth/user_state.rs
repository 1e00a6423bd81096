//! # 요청 단위 사용자 상태
//!
//! 로그인 사용자 정보는 단계적으로만 얻을 수 있습니다.
//!
//! ```text
//! Init ──load(cookies)──► GotCredential ──me(credential)──► GotUserInfo ──Org 헤더 + check_access──► GotScopeInfo
//! ```
//!
//! [`UserState`] 는 요청마다 하나 생성되며, 요청한 단계까지 앞 단계를 차례로 한 번씩만 계산하고
//! 결과를 보관합니다. 같은 요청 안에서 인증기와 핸들러가 여러 번 조회해도 업스트림 호출은 한 번입니다.

use std::sync::Arc;

use actix_web::cookie::Cookie;

use crate::domain::models::auth::{AuthRequest, RequestCookies};
use crate::domain::models::identity::{AuthCredential, UserInfo};
use crate::domain::models::org::ScopeInfo;
use crate::errors::errors::{AppError, AppResult};
use crate::services::auth::org_service::OrgDirectory;
use crate::services::identity::IdentityBackend;
use crate::utils::http_utils::ORG_HEADER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserStage {
    Init,
    GotCredential,
    GotUserInfo,
    GotScopeInfo,
}

pub struct UserState {
    backend: Arc<dyn IdentityBackend>,
    orgs: Arc<dyn OrgDirectory>,
    cookies: RequestCookies,
    host: String,
    org: Option<String>,

    stage: UserStage,
    credential: AuthCredential,
    refreshed_cookies: Vec<Cookie<'static>>,
    user: Option<UserInfo>,
    scope: Option<ScopeInfo>,
}

impl UserState {
    pub fn new(backend: Arc<dyn IdentityBackend>, orgs: Arc<dyn OrgDirectory>, request: &AuthRequest) -> Self {
        Self {
            backend,
            orgs,
            cookies: request.cookies.clone(),
            host: request.host.clone(),
            org: request.header(ORG_HEADER).map(str::to_string),
            stage: UserStage::Init,
            credential: AuthCredential::default(),
            refreshed_cookies: Vec::new(),
            user: None,
            scope: None,
        }
    }

    pub fn stage(&self) -> UserStage {
        self.stage
    }

    /// `target` 단계까지 진행합니다. 이미 도달한 단계는 다시 계산하지 않습니다.
    pub async fn advance_to(&mut self, target: UserStage) -> AppResult<()> {
        while self.stage < target {
            match self.stage {
                UserStage::Init => {
                    let loaded = self.backend.load(&self.cookies, &self.host).await?;
                    self.refreshed_cookies.extend(loaded.refreshed_cookies);
                    self.credential = loaded.credential;
                    self.stage = UserStage::GotCredential;
                }
                UserStage::GotCredential => {
                    if self.credential.is_empty() {
                        return Err(AppError::AuthenticationError("로그인이 필요합니다".to_string()));
                    }
                    let user = self.backend.me(&self.credential).await?;
                    log::debug!("사용자 확인 - user_id: {}", user.id);
                    self.user = Some(user);
                    self.stage = UserStage::GotUserInfo;
                }
                UserStage::GotUserInfo => {
                    let scope = self.load_scope().await?;
                    self.scope = Some(scope);
                    self.stage = UserStage::GotScopeInfo;
                }
                UserStage::GotScopeInfo => break,
            }
        }
        Ok(())
    }

    async fn load_scope(&self) -> AppResult<ScopeInfo> {
        let org_key = self
            .org
            .as_deref()
            .ok_or_else(|| AppError::ValidationError(format!("{} 헤더가 필요합니다", ORG_HEADER)))?;
        let user = self
            .user
            .as_ref()
            .ok_or_else(|| AppError::InternalError("사용자 정보가 로드되지 않았습니다".to_string()))?;

        let org = self
            .orgs
            .resolve(org_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("조직을 찾을 수 없습니다: {}", org_key)))?;

        self.orgs.check_access(&user.id, &org).await
    }

    /// 자격 증명. 쿠키가 없으면 `AuthenticationError`.
    pub async fn credential(&mut self) -> AppResult<&AuthCredential> {
        self.advance_to(UserStage::GotCredential).await?;
        if self.credential.is_empty() {
            return Err(AppError::AuthenticationError("로그인이 필요합니다".to_string()));
        }
        Ok(&self.credential)
    }

    pub async fn user_info(&mut self) -> AppResult<&UserInfo> {
        self.advance_to(UserStage::GotUserInfo).await?;
        self.user
            .as_ref()
            .ok_or_else(|| AppError::InternalError("사용자 정보가 로드되지 않았습니다".to_string()))
    }

    pub async fn scope_info(&mut self) -> AppResult<&ScopeInfo> {
        self.advance_to(UserStage::GotScopeInfo).await?;
        self.scope
            .as_ref()
            .ok_or_else(|| AppError::InternalError("조직 권한 정보가 로드되지 않았습니다".to_string()))
    }

    /// 사용자 정보까지 얻을 수 있으면 로그인 상태입니다.
    pub async fn is_login(&mut self) -> bool {
        match self.advance_to(UserStage::GotUserInfo).await {
            Ok(()) => true,
            Err(AppError::AuthenticationError(_)) => false,
            Err(e) => {
                log::error!("로그인 상태 확인 실패: {}", e);
                false
            }
        }
    }

    /// 진행 중 세션 연장/토큰 갱신으로 생긴 쿠키
    pub fn refreshed_cookies(&self) -> &[Cookie<'static>] {
        &self.refreshed_cookies
    }

    pub fn take_refreshed_cookies(&mut self) -> Vec<Cookie<'static>> {
        std::mem::take(&mut self.refreshed_cookies)
    }
}

/// 선택된 ID 백엔드와 조직 디렉터리를 묶어 요청별 [`UserState`] 를 만들어 줍니다.
#[derive(Clone)]
pub struct UserAuthFacade {
    backend: Arc<dyn IdentityBackend>,
    orgs: Arc<dyn OrgDirectory>,
}

impl UserAuthFacade {
    pub fn new(backend: Arc<dyn IdentityBackend>, orgs: Arc<dyn OrgDirectory>) -> Self {
        Self { backend, orgs }
    }

    pub fn backend(&self) -> &Arc<dyn IdentityBackend> {
        &self.backend
    }

    pub fn orgs(&self) -> &Arc<dyn OrgDirectory> {
        &self.orgs
    }

    pub fn state(&self, request: &AuthRequest) -> UserState {
        UserState::new(self.backend.clone(), self.orgs.clone(), request)
    }
}
