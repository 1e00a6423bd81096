use serde::{Deserialize, Serialize};

use crate::utils::string_utils::deserialize_string_id;

/// core-services 의 조직 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgInfo {
    #[serde(deserialize_with = "deserialize_string_id")]
    pub id: String,
    pub name: String,
}

/// 사용자의 조직 접근 권한 조회 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeInfo {
    pub org_id: String,
    pub org_name: String,
    pub access: bool,
    pub roles: Vec<String>,
}

impl ScopeInfo {
    pub fn denied(org: &OrgInfo) -> Self {
        Self {
            org_id: org.id.clone(),
            org_name: org.name.clone(),
            access: false,
            roles: Vec::new(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
