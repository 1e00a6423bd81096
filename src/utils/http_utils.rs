//! HTTP 헤더 / 쿠키 헬퍼
//!
//! 게이트웨이가 주고받는 헤더 규약(`Authorization`, 신뢰 헤더)과 세션 쿠키 도메인 선택 규칙을 모아둡니다.

use actix_web::http::Method;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const USER_ID_HEADER: &str = "User-ID";
pub const ORG_ID_HEADER: &str = "Org-ID";
pub const CLIENT_ID_HEADER: &str = "Client-ID";
pub const CLIENT_NAME_HEADER: &str = "Client-Name";
pub const INTERNAL_CLIENT_HEADER: &str = "Internal-Client";
/// 클라이언트가 접근하려는 조직 (이름 또는 ID)
pub const ORG_HEADER: &str = "Org";

/// 게이트웨이만 설정할 수 있는 헤더. 외부 요청에 포함되어 있으면 인증 전에 제거됩니다.
pub const TRUSTED_HEADERS: [&str; 5] = [
    USER_ID_HEADER,
    ORG_ID_HEADER,
    CLIENT_ID_HEADER,
    CLIENT_NAME_HEADER,
    INTERNAL_CLIENT_HEADER,
];

/// `Authorization` 헤더 값에서 스킴을 대소문자 구분 없이 떼어냅니다.
fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let value = value.trim();
    let (head, rest) = value.split_once(' ')?;
    if head.eq_ignore_ascii_case(scheme) {
        let rest = rest.trim();
        (!rest.is_empty()).then_some(rest)
    } else {
        None
    }
}

pub fn bearer_token(value: &str) -> Option<&str> {
    strip_scheme(value, "Bearer")
}

/// `Basic base64(user:password)` 를 (user, password) 로 디코딩합니다.
pub fn basic_credentials(value: &str) -> Option<(String, String)> {
    let encoded = strip_scheme(value, "Basic")?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    if user.is_empty() {
        return None;
    }
    Some((user.to_string(), password.to_string()))
}

/// JWT 직렬화 형식(점으로 구분된 비어있지 않은 세 구간)인지 확인합니다.
pub fn is_jwt_format(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
}

pub fn strip_port(host: &str) -> &str {
    // IPv6 리터럴 "[::1]:8080"
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    host.split(':').next().unwrap_or(host)
}

/// 요청 호스트에 맞는 세션 쿠키 도메인을 고릅니다.
///
/// 호스트가 설정된 도메인과 같거나 그 하위 도메인이면 해당 도메인을 반환합니다.
/// 설정값의 선행 점(`.erda.cloud`)은 무시하며, 일치하는 도메인이 없으면 `None`(host-only 쿠키)입니다.
/// 여러 도메인이 일치하면 가장 긴(가장 구체적인) 도메인을 고릅니다.
pub fn session_domain(host: &str, domains: &[String]) -> Option<String> {
    let host = strip_port(host).trim().to_lowercase();
    if host.is_empty() {
        return None;
    }

    domains
        .iter()
        .map(|d| d.trim().trim_start_matches('.').to_lowercase())
        .filter(|d| !d.is_empty())
        .filter(|d| host == *d || host.ends_with(&format!(".{}", d)))
        .max_by_key(|d| d.len())
}

/// CSRF 검증이 필요 없는 메서드
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        let cases = [
            ("Bearer abc", Some("abc")),
            ("bearer abc", Some("abc")),
            ("  Bearer   abc  ", Some("abc")),
            ("Bearer ", None),
            ("Basic abc", None),
            ("abc", None),
        ];
        for (input, expected) in cases {
            assert_eq!(bearer_token(input), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_basic_credentials() {
        let header = format!("Basic {}", STANDARD.encode("admin:p@ss:word"));
        assert_eq!(
            basic_credentials(&header),
            Some(("admin".to_string(), "p@ss:word".to_string()))
        );

        let no_user = format!("Basic {}", STANDARD.encode(":secret"));
        assert_eq!(basic_credentials(&no_user), None);
        assert_eq!(basic_credentials("Basic !!notbase64!!"), None);
        assert_eq!(basic_credentials("Bearer abc"), None);
    }

    #[test]
    fn test_is_jwt_format() {
        assert!(is_jwt_format("aaa.bbb.ccc"));
        assert!(!is_jwt_format("aaa.bbb"));
        assert!(!is_jwt_format("aaa..ccc"));
        assert!(!is_jwt_format("0f6a1b2c3d4e"));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("erda.cloud:8080"), "erda.cloud");
        assert_eq!(strip_port("erda.cloud"), "erda.cloud");
        assert_eq!(strip_port("[::1]:8080"), "::1");
    }

    #[test]
    fn test_session_domain() {
        let domains = vec![
            ".erda.cloud".to_string(),
            "terminus.io".to_string(),
            "app.terminus.io".to_string(),
        ];
        let cases = [
            ("erda.cloud", Some("erda.cloud")),
            ("one.erda.cloud", Some("erda.cloud")),
            ("one.erda.cloud:443", Some("erda.cloud")),
            ("ONE.ERDA.CLOUD", Some("erda.cloud")),
            ("x.app.terminus.io", Some("app.terminus.io")),
            ("other.terminus.io", Some("terminus.io")),
            ("noterda.cloud", None),
            ("erda.cloud.evil.com", None),
            ("localhost:3000", None),
            ("", None),
        ];
        for (host, expected) in cases {
            assert_eq!(
                session_domain(host, &domains).as_deref(),
                expected,
                "host: {:?}",
                host
            );
        }

        assert_eq!(session_domain("erda.cloud", &[]), None);
    }

    #[test]
    fn test_is_safe_method() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::OPTIONS));
        assert!(!is_safe_method(&Method::POST));
        assert!(!is_safe_method(&Method::DELETE));
    }
}
