use std::collections::HashMap;

use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, COOKIE};
use actix_web::http::Method;
use actix_web::HttpRequest;

use crate::domain::models::auth::AuthOptions;

/// 요청의 `Cookie` 헤더를 이름으로 조회할 수 있게 펼친 값
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCookies(HashMap<String, String>);

impl RequestCookies {
    /// `a=1; b=2` 형식의 헤더 값들을 파싱합니다. 같은 이름이 여러 번 나오면 처음 값이 유지됩니다.
    pub fn parse<'a>(header_values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut cookies = HashMap::new();
        for raw in header_values {
            for pair in raw.split(';') {
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                cookies.entry(name.to_string()).or_insert_with(|| value.to_string());
            }
        }
        Self(cookies)
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::parse(headers.get_all(COOKIE).filter_map(|v| v.to_str().ok()))
    }

    /// 값이 비어있는 쿠키는 없는 것으로 취급합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

/// 인증기(Auther)와 권한 검사기가 보는 요청 스냅샷
///
/// actix 의 `ServiceRequest` 는 `Send` 가 아니므로 인증에 필요한 부분만 복사해 넘깁니다.
/// 헤더 주입이나 쿠키 설정 같은 부수 효과는 미들웨어가 결과를 받아 적용합니다.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub host: String,
    pub headers: HeaderMap,
    pub cookies: RequestCookies,
    pub options: AuthOptions,
}

impl AuthRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: String::new(),
            host: String::new(),
            headers: HeaderMap::new(),
            cookies: RequestCookies::default(),
            options: AuthOptions::public(),
        }
    }

    pub fn from_http(req: &HttpRequest, options: AuthOptions) -> Self {
        let headers = req.headers().clone();
        Self {
            method: req.method().clone(),
            path: req.path().to_string(),
            query: req.query_string().to_string(),
            host: req.connection_info().host().to_string(),
            cookies: RequestCookies::from_headers(&headers),
            headers,
            options,
        }
    }

    pub fn with_options(mut self, options: AuthOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// 잘못된 헤더 이름/값은 무시됩니다.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name, value);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name)
    }

    /// URL 디코딩된 쿼리 파라미터 (첫 번째 값)
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| urlencoding::decode(&value.replace('+', " ")).ok().map(|v| v.into_owned()))
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_cookies() {
        let cookies = RequestCookies::parse(["OPENAPISESSION=abc; other=1", "quoted=\"v\"; empty=; OPENAPISESSION=dup"]);

        assert_eq!(cookies.get("OPENAPISESSION"), Some("abc"));
        assert_eq!(cookies.get("other"), Some("1"));
        assert_eq!(cookies.get("quoted"), Some("v"));
        assert_eq!(cookies.get("empty"), None);
        assert_eq!(cookies.get("missing"), None);
    }

    #[test]
    fn test_query_param_decoding() {
        let req = AuthRequest::new(Method::GET, "/api/projects").with_query("orgName=my%20org&x=1&blank=&plus=a+b");

        assert_eq!(req.query_param("orgName").as_deref(), Some("my org"));
        assert_eq!(req.query_param("x").as_deref(), Some("1"));
        assert_eq!(req.query_param("plus").as_deref(), Some("a b"));
        assert_eq!(req.query_param("blank"), None);
        assert_eq!(req.query_param("nope"), None);
    }

    #[test]
    fn test_from_http_snapshot() {
        let http = TestRequest::post()
            .uri("/api/orgs?orgName=erda")
            .insert_header(("Host", "one.erda.cloud"))
            .insert_header(("Authorization", "Bearer t"))
            .insert_header(("Cookie", "OPENAPISESSION=sid"))
            .to_http_request();

        let req = AuthRequest::from_http(&http, AuthOptions::login());

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/api/orgs");
        assert_eq!(req.host, "one.erda.cloud");
        assert_eq!(req.authorization(), Some("Bearer t"));
        assert_eq!(req.cookie("OPENAPISESSION"), Some("sid"));
        assert_eq!(req.query_param("orgName").as_deref(), Some("erda"));
        assert!(req.options.check_login);
    }

    #[test]
    fn test_blank_header_is_absent() {
        let req = AuthRequest::new(Method::GET, "/").with_header("Org", "   ");
        assert_eq!(req.header("Org"), None);
    }
}
