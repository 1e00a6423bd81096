//! # Authentication Configuration Module
//!
//! ID 백엔드(UC, IAM, Kratos), 세션 쿠키, 토큰 검증, core-services 관련 설정을 관리합니다.
//!
//! 각 `*Config` 단위 구조체는 환경 변수를 읽어 `*Settings` 값 객체를 만듭니다.
//! 백엔드와 인증기(Auther)는 `*Settings` 만 받으므로 테스트에서는 환경 변수 없이 직접 구성할 수 있습니다.
//!
//! ## 필수 환경 변수 설정
//!
//! ### ID 백엔드 선택
//! ```bash
//! export IDENTITY_PROVIDER="uc"          # uc | iam | kratos
//! ```
//!
//! ### UC
//! ```bash
//! export UC_ADDR="http://uc:8080"
//! export UC_CLIENT_ID="dice"
//! export UC_CLIENT_SECRET="secret"
//! export UC_SESSION_COOKIE="u_c_captain_local"   # 선택: UC 자체 로그인 쿠키 패스스루
//! ```
//!
//! ### IAM
//! ```bash
//! export IAM_ADDR="http://iam:8080"
//! export IAM_CLIENT_ID="erda"
//! export IAM_CLIENT_SECRET="secret"
//! ```
//!
//! ### Kratos
//! ```bash
//! export KRATOS_PUBLIC_ADDR="http://kratos-public:4433"
//! export KRATOS_ADMIN_ADDR="http://kratos-admin:4434"
//! ```
//!
//! ### 세션 / CSRF
//! ```bash
//! export SESSION_COOKIE_NAME="OPENAPISESSION"
//! export SESSION_COOKIE_DOMAINS=".erda.cloud,.terminus.io"
//! export SESSION_MAX_AGE_SECONDS="43200"
//! export CSRF_ENABLED="true"
//! ```

use std::env;
use std::fmt;

use crate::config::data_config::split_list;

/// 사용할 ID 백엔드 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    Uc,
    Iam,
    Kratos,
}

impl IdentityProviderKind {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "uc" => Ok(IdentityProviderKind::Uc),
            "iam" => Ok(IdentityProviderKind::Iam),
            "kratos" => Ok(IdentityProviderKind::Kratos),
            _ => Err(format!("Unsupported identity provider: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProviderKind::Uc => "uc",
            IdentityProviderKind::Iam => "iam",
            IdentityProviderKind::Kratos => "kratos",
        }
    }
}

impl fmt::Display for IdentityProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct IdentityConfig;

impl IdentityConfig {
    /// `IDENTITY_PROVIDER` 값을 해석합니다. 잘못된 값이면 경고 후 UC 를 사용합니다.
    pub fn provider() -> IdentityProviderKind {
        let raw = env::var("IDENTITY_PROVIDER").unwrap_or_else(|_| "uc".to_string());
        IdentityProviderKind::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("{}, falling back to uc", e);
            IdentityProviderKind::Uc
        })
    }

    /// 업스트림 HTTP 호출 타임아웃 (초)
    pub fn http_timeout_seconds() -> u64 {
        env::var("IDENTITY_HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    }
}

#[derive(Debug, Clone)]
pub struct UcSettings {
    pub addr: String,
    pub client_id: String,
    pub client_secret: String,
    /// UC 가 직접 발급한 브라우저 쿠키 이름. 설정되면 해당 쿠키로 current-user 를 조회합니다.
    pub session_cookie: Option<String>,
}

pub struct UcConfig;

impl UcConfig {
    pub fn settings() -> UcSettings {
        UcSettings {
            addr: trim_addr(env::var("UC_ADDR").unwrap_or_else(|_| "http://localhost:8081".to_string())),
            client_id: env::var("UC_CLIENT_ID").unwrap_or_else(|_| "dice".to_string()),
            client_secret: secret_var("UC_CLIENT_SECRET"),
            session_cookie: env::var("UC_SESSION_COOKIE").ok().filter(|v| !v.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IamSettings {
    pub addr: String,
    pub client_id: String,
    pub client_secret: String,
}

pub struct IamConfig;

impl IamConfig {
    pub fn settings() -> IamSettings {
        IamSettings {
            addr: trim_addr(env::var("IAM_ADDR").unwrap_or_else(|_| "http://localhost:8082".to_string())),
            client_id: env::var("IAM_CLIENT_ID").unwrap_or_else(|_| "erda".to_string()),
            client_secret: secret_var("IAM_CLIENT_SECRET"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KratosSettings {
    pub public_addr: String,
    pub admin_addr: String,
    pub session_cookie: String,
}

pub struct KratosConfig;

impl KratosConfig {
    pub fn settings() -> KratosSettings {
        KratosSettings {
            public_addr: trim_addr(
                env::var("KRATOS_PUBLIC_ADDR").unwrap_or_else(|_| "http://localhost:4433".to_string()),
            ),
            admin_addr: trim_addr(
                env::var("KRATOS_ADMIN_ADDR").unwrap_or_else(|_| "http://localhost:4434".to_string()),
            ),
            session_cookie: env::var("KRATOS_SESSION_COOKIE")
                .unwrap_or_else(|_| "ory_kratos_session".to_string()),
        }
    }
}

/// 세션 쿠키 및 CSRF 설정
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// 쿠키를 발급할 수 있는 상위 도메인 목록
    pub domains: Vec<String>,
    pub max_age_seconds: i64,
    pub secure: bool,
    pub csrf_enabled: bool,
    pub csrf_cookie_name: String,
    pub csrf_header_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "OPENAPISESSION".to_string(),
            domains: Vec::new(),
            max_age_seconds: 43200,
            secure: false,
            csrf_enabled: true,
            csrf_cookie_name: "OPENAPI-CSRF-TOKEN".to_string(),
            csrf_header_name: "OPENAPI-CSRF-TOKEN".to_string(),
        }
    }
}

pub struct SessionConfig;

impl SessionConfig {
    pub fn settings() -> SessionSettings {
        let defaults = SessionSettings::default();
        SessionSettings {
            cookie_name: env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            domains: split_list(&env::var("SESSION_COOKIE_DOMAINS").unwrap_or_default()),
            max_age_seconds: env::var("SESSION_MAX_AGE_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i64| *v > 0)
                .unwrap_or(defaults.max_age_seconds),
            secure: bool_var("SESSION_COOKIE_SECURE", defaults.secure),
            csrf_enabled: bool_var("CSRF_ENABLED", defaults.csrf_enabled),
            csrf_cookie_name: env::var("CSRF_COOKIE_NAME").unwrap_or(defaults.csrf_cookie_name),
            csrf_header_name: env::var("CSRF_HEADER_NAME").unwrap_or(defaults.csrf_header_name),
        }
    }
}

/// Bearer 토큰 검증 설정
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// OAuth2 서버가 JWT 액세스 토큰 서명에 쓰는 HS256 비밀키. 없으면 JWT 토큰은 거부됩니다.
    pub jwt_secret: Option<String>,
    pub access_key_addr: String,
    pub cache_capacity: usize,
    pub cache_ttl_seconds: u64,
}

pub struct OAuth2ServerConfig;

impl OAuth2ServerConfig {
    pub fn settings() -> TokenSettings {
        let jwt_secret = env::var("OAUTH2_JWT_SECRET").ok().filter(|v| !v.is_empty());
        if jwt_secret.is_none() {
            log::warn!("OAUTH2_JWT_SECRET not set, JWT bearer tokens will be rejected");
        }
        TokenSettings {
            jwt_secret,
            access_key_addr: trim_addr(
                env::var("ACCESS_KEY_SERVICE_ADDR").unwrap_or_else(|_| "http://localhost:9093".to_string()),
            ),
            cache_capacity: env::var("TOKEN_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            cache_ttl_seconds: env::var("TOKEN_CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

pub struct CoreServicesConfig;

impl CoreServicesConfig {
    pub fn addr() -> String {
        trim_addr(env::var("CORE_SERVICES_ADDR").unwrap_or_else(|_| "http://localhost:9526".to_string()))
    }
}

fn trim_addr(addr: String) -> String {
    addr.trim().trim_end_matches('/').to_string()
}

fn secret_var(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        log::warn!("{} not set, using empty secret (not secure for production!)", key);
        String::new()
    })
}

fn bool_var(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
