//! 로그인 / 콜백 요청 DTO

use serde::Deserialize;
use validator::Validate;

use crate::utils::string_utils::deserialize_optional_string;

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordLoginRequest {
    #[validate(length(min = 1, message = "사용자 이름을 입력해주세요"))]
    pub username: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 인가 코드 콜백 쿼리 (`?code=&redirect_uri=&referer=`)
#[derive(Debug, Deserialize, Validate)]
pub struct OAuthCallbackQuery {
    #[validate(length(min = 1, message = "Authorization code가 필요합니다"))]
    pub code: String,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub redirect_uri: Option<String>,

    /// 로그인 후 돌아갈 경로
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub referer: Option<String>,
}

impl OAuthCallbackQuery {
    /// 같은 사이트 안의 상대 경로만 리다이렉트 대상으로 허용합니다.
    ///
    /// 브라우저는 `\` 를 `/` 로 바꾸고 탭/개행을 버리므로 둘 다 포함되면 거부합니다.
    pub fn redirect_target(&self) -> String {
        match self.referer.as_deref() {
            Some(path) if is_local_path(path) => path.to_string(),
            _ => "/".to_string(),
        }
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(|c| c.is_ascii_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_login_validation() {
        let ok = PasswordLoginRequest { username: "dice".to_string(), password: "pw".to_string() };
        assert!(ok.validate().is_ok());

        let empty = PasswordLoginRequest { username: "".to_string(), password: "pw".to_string() };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_redirect_target() {
        let query = |referer: Option<&str>| OAuthCallbackQuery {
            code: "c".to_string(),
            redirect_uri: None,
            referer: referer.map(str::to_string),
        };

        assert_eq!(query(Some("/workBench/projects")).redirect_target(), "/workBench/projects");
        assert_eq!(query(None).redirect_target(), "/");
        assert_eq!(query(Some("https://evil.com")).redirect_target(), "/");
        assert_eq!(query(Some("//evil.com")).redirect_target(), "/");
        assert_eq!(query(Some("/\\evil.com")).redirect_target(), "/");
        assert_eq!(query(Some("/\t/evil.com")).redirect_target(), "/");
        assert_eq!(query(Some("/\n/evil.com")).redirect_target(), "/");
        assert_eq!(query(Some("/projects?tab=members")).redirect_target(), "/projects?tab=members");
    }
}
