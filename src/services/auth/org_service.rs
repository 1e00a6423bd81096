//! 조직 조회와 조직 접근 권한 확인 (core-services)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::caching::TokenCache;
use crate::domain::models::org::{OrgInfo, ScopeInfo};
use crate::errors::errors::AppResult;
use crate::services::identity::upstream::{http_client, read_json, send_failed, CallKind, Envelope};
use crate::utils::http_utils::{INTERNAL_CLIENT_HEADER, USER_ID_HEADER};

#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// 조직 ID 또는 이름으로 조직을 찾습니다. 없으면 `None`.
    async fn resolve(&self, id_or_name: &str) -> AppResult<Option<OrgInfo>>;

    async fn check_access(&self, user_id: &str, org: &OrgInfo) -> AppResult<ScopeInfo>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccessResult {
    #[serde(default)]
    access: bool,
    #[serde(default)]
    roles: Vec<String>,
}

pub struct OrgClient {
    http: reqwest::Client,
    addr: String,
    orgs: TokenCache<OrgInfo>,
    access: TokenCache<ScopeInfo>,
}

impl OrgClient {
    pub fn new(addr: String, cache_capacity: usize, cache_ttl: Duration, timeout_seconds: u64) -> AppResult<Self> {
        Ok(Self {
            http: http_client(timeout_seconds)?,
            addr,
            orgs: TokenCache::new(cache_capacity, cache_ttl),
            access: TokenCache::new(cache_capacity, cache_ttl),
        })
    }
}

#[async_trait]
impl OrgDirectory for OrgClient {
    async fn resolve(&self, id_or_name: &str) -> AppResult<Option<OrgInfo>> {
        if let Some(org) = self.orgs.get(id_or_name) {
            return Ok(Some(org));
        }

        let response = self
            .http
            .get(format!("{}/api/orgs/{}", self.addr, urlencoding::encode(id_or_name)))
            .header(INTERNAL_CLIENT_HEADER, "openapi")
            .send()
            .await
            .map_err(|e| send_failed("조직 조회", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: Envelope<OrgInfo> = read_json(response, "조직 조회", CallKind::Client).await?;
        let Some(org) = envelope.into_result() else {
            return Ok(None);
        };

        self.orgs.insert(id_or_name.to_string(), org.clone());
        Ok(Some(org))
    }

    async fn check_access(&self, user_id: &str, org: &OrgInfo) -> AppResult<ScopeInfo> {
        let key = format!("{}:{}", user_id, org.id);
        if let Some(scope) = self.access.get(&key) {
            return Ok(scope);
        }

        let response = self
            .http
            .post(format!("{}/api/permissions/actions/access", self.addr))
            .header(INTERNAL_CLIENT_HEADER, "openapi")
            .header(USER_ID_HEADER, user_id)
            .json(&json!({
                "userID": user_id,
                "scope": {"type": "org", "id": org.id},
            }))
            .send()
            .await
            .map_err(|e| send_failed("조직 권한 확인", e))?;

        let envelope: Envelope<AccessResult> = read_json(response, "조직 권한 확인", CallKind::Client).await?;
        let scope = match envelope.into_result() {
            Some(result) => ScopeInfo {
                org_id: org.id.clone(),
                org_name: org.name.clone(),
                access: result.access,
                roles: result.roles,
            },
            None => ScopeInfo::denied(org),
        };
        self.access.insert(key, scope.clone());
        Ok(scope)
    }
}
