use chrono::Utc;
use serde::{Deserialize, Serialize};

fn default_token_type() -> String {
    "bearer".to_string()
}

fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// OAuth2 토큰 엔드포인트 응답
///
/// 업스트림 응답에는 `issued_at` 이 없으므로 역직렬화 시점을 발급 시각으로 기록합니다.
/// 세션 저장소에 다시 저장될 때는 기록된 값이 그대로 유지됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// 유효 기간(초). 0 이하이면 만료 시각이 없는 토큰입니다.
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default = "now_timestamp")]
    pub issued_at: i64,
}

impl OAuthToken {
    pub fn new(access_token: impl Into<String>, expires_in: i64) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in,
            refresh_token: None,
            scope: None,
            issued_at: now_timestamp(),
        }
    }

    /// 만료 시각 (unix seconds)
    pub fn expires_at(&self) -> Option<i64> {
        (self.expires_in > 0).then(|| self.issued_at + self.expires_in)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }

    /// 만료까지 `window` 초 이하로 남았는지
    pub fn needs_refresh(&self, now: i64, window: i64) -> bool {
        self.expires_at().is_some_and(|at| at - now <= window)
    }

    /// 만료까지 남은 시간(초). 만료 시각이 없으면 `None`.
    pub fn remaining_seconds(&self, now: i64) -> Option<i64> {
        self.expires_at().map(|at| (at - now).max(0))
    }
}
