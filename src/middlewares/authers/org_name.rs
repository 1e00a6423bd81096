use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::auth::{AuthRequest, Identity};
use crate::errors::errors::{AppError, AppResult};
use crate::middlewares::authers::OverPermissionChecker;
use crate::services::auth::OrgDirectory;
use crate::utils::http_utils::ORG_HEADER;

/// 조직 이름 쿼리 파라미터
pub const ORG_NAME_QUERY: &str = "orgName";

/// 요청이 지목한 조직(`Org` 헤더 또는 `orgName` 쿼리)에 신원이 접근할 수 있는지 검사합니다.
///
/// - 토큰에 조직이 고정되어 있으면 지목한 조직과 같아야 합니다.
/// - 사용자 신원이면 조직 권한 서비스에서 접근 여부를 확인합니다.
/// - 통과하면 `Org-ID` 를 지목한 조직의 ID 로 설정합니다.
pub struct OrgNameChecker {
    orgs: Arc<dyn OrgDirectory>,
}

impl OrgNameChecker {
    pub const WEIGHT: i32 = 100;

    pub fn new(orgs: Arc<dyn OrgDirectory>) -> Self {
        Self { orgs }
    }

    fn requested_org(req: &AuthRequest) -> Option<String> {
        req.header(ORG_HEADER)
            .map(str::to_string)
            .or_else(|| req.query_param(ORG_NAME_QUERY).filter(|v| !v.trim().is_empty()))
    }
}

#[async_trait]
impl OverPermissionChecker for OrgNameChecker {
    fn name(&self) -> &'static str {
        "org-name"
    }

    fn weight(&self) -> i32 {
        Self::WEIGHT
    }

    fn matches(&self, req: &AuthRequest) -> bool {
        req.options.check_org && Self::requested_org(req).is_some()
    }

    async fn check(&self, req: &AuthRequest, identity: &mut Identity) -> AppResult<()> {
        let Some(requested) = Self::requested_org(req) else {
            return Ok(());
        };

        let org = self
            .orgs
            .resolve(&requested)
            .await?
            .ok_or_else(|| AppError::AuthorizationError(format!("조직에 접근할 수 없습니다: {}", requested)))?;

        if let Some(bound) = identity.org_id.as_deref() {
            if bound != org.id {
                log::warn!("토큰 조직 불일치 - token: {}, requested: {}", bound, org.id);
                return Err(AppError::AuthorizationError(format!("조직에 접근할 수 없습니다: {}", requested)));
            }
        }

        if let Some(user_id) = identity.user_id.as_deref() {
            let scope = self.orgs.check_access(user_id, &org).await?;
            if !scope.access {
                log::warn!("조직 권한 없음 - user_id: {}, org: {}", user_id, org.name);
                return Err(AppError::AuthorizationError(format!("조직에 접근할 수 없습니다: {}", requested)));
            }
        }

        identity.org_id = Some(org.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::auth::AuthOptions;
    use crate::domain::models::identity::UserInfo;
    use crate::services::auth::user_state::tests::StubOrgs;
    use actix_web::http::Method;

    fn checker() -> OrgNameChecker {
        OrgNameChecker::new(Arc::new(StubOrgs::default()))
    }

    fn user(id: &str) -> Identity {
        Identity::for_user(UserInfo { id: id.to_string(), ..Default::default() })
    }

    fn request() -> AuthRequest {
        AuthRequest::new(Method::GET, "/api/projects").with_options(AuthOptions::login().with_org_check())
    }

    #[test]
    fn test_matches_header_or_query() {
        let checker = checker();
        assert!(!checker.matches(&request()));
        assert!(checker.matches(&request().with_header("Org", "erda")));
        assert!(checker.matches(&request().with_query("orgName=erda")));
        assert!(!checker.matches(&request().with_query("orgName=")));
        assert!(!checker.matches(&request().with_options(AuthOptions::login()).with_header("Org", "erda")));
    }

    #[actix_web::test]
    async fn test_member_gets_org_id() {
        let mut identity = user("2");
        checker().check(&request().with_header("Org", "erda"), &mut identity).await.unwrap();
        assert_eq!(identity.org_id.as_deref(), Some("1"));
    }

    #[actix_web::test]
    async fn test_non_member_is_forbidden() {
        let mut identity = user("3");
        let err = checker().check(&request().with_query("orgName=erda"), &mut identity).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorizationError(_)));
        assert_eq!(identity.org_id, None);
    }

    #[actix_web::test]
    async fn test_unknown_org_is_forbidden() {
        let mut identity = user("2");
        let err = checker().check(&request().with_header("Org", "nope"), &mut identity).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorizationError(_)));
    }

    #[actix_web::test]
    async fn test_token_bound_to_other_org() {
        let mut identity = Identity::for_client("ak-1", "access-key");
        identity.org_id = Some("9".to_string());
        let err = checker().check(&request().with_header("Org", "erda"), &mut identity).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorizationError(_)));

        let mut client = Identity::for_client("ak-1", "access-key");
        checker().check(&request().with_header("Org", "1"), &mut client).await.unwrap();
        assert_eq!(client.org_id.as_deref(), Some("1"));
    }
}
