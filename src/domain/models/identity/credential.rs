use actix_web::cookie::Cookie;

/// 요청 쿠키에서 읽어낸 인증 자격 증명
///
/// 백엔드마다 채우는 필드가 다릅니다.
/// - UC / IAM: 세션 ID 와 세션에 저장된 액세스 토큰
/// - UC 쿠키 패스스루, Kratos: 업스트림으로 그대로 전달할 쿠키(`name=value`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCredential {
    pub access_token: Option<String>,
    pub session_id: Option<String>,
    pub passthrough_cookie: Option<String>,
}

impl AuthCredential {
    pub fn from_session(session_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            session_id: Some(session_id.into()),
            passthrough_cookie: None,
        }
    }

    pub fn from_cookie(name: &str, value: &str) -> Self {
        Self {
            passthrough_cookie: Some(format!("{}={}", name, value)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.passthrough_cookie.is_none()
    }
}

/// `IdentityBackend::load` 결과
///
/// 세션을 연장하거나 토큰을 갱신했다면 응답에 실어 보낼 쿠키가 함께 돌아옵니다.
#[derive(Debug, Clone, Default)]
pub struct LoadedCredential {
    pub credential: AuthCredential,
    pub refreshed_cookies: Vec<Cookie<'static>>,
}

impl LoadedCredential {
    pub fn new(credential: AuthCredential) -> Self {
        Self { credential, refreshed_cookies: Vec::new() }
    }

    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.refreshed_cookies.push(cookie);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(AuthCredential::default().is_empty());
        assert!(!AuthCredential::from_session("sid", "at").is_empty());
        assert!(!AuthCredential::from_cookie("ory_kratos_session", "abc").is_empty());
    }

    #[test]
    fn test_passthrough_cookie_format() {
        let cred = AuthCredential::from_cookie("u_c_captain_local", "v1");
        assert_eq!(cred.passthrough_cookie.as_deref(), Some("u_c_captain_local=v1"));
        assert_eq!(cred.session_id, None);
    }
}
