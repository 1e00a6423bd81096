//! # 문자열 유틸리티
//!
//! 요청 DTO 정리와 해시 키 생성에 쓰이는 공통 문자열 함수들입니다.

use serde::Deserialize;
use sha2::{Digest, Sha256};

pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(clean_optional_string(opt))
}

/// 숫자 또는 문자열로 내려오는 업스트림 ID 를 문자열로 읽습니다.
pub fn deserialize_string_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

/// 사용자 ID. `null` 이나 빈 문자열은 신원으로 쓸 수 없으므로 거부합니다.
pub fn deserialize_user_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let id = deserialize_string_id(deserializer)?;
    if id.trim().is_empty() {
        return Err(serde::de::Error::custom("empty user id"));
    }
    Ok(id)
}

/// 비밀값(세션 ID, 인증 헤더)을 캐시/저장소 키로 쓰기 위한 SHA-256 hex
pub fn sha256_hex(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
