//! OpenAPI 게이트웨이 인증 서비스 메인 애플리케이션
//!
//! 세션 저장소와 ID 백엔드를 초기화하고, 인증 체인을 구성한 뒤 Actix-web HTTP 서버를 구동합니다.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

use openapi_auth::caching::redis::RedisClient;
use openapi_auth::caching::TokenCache;
use openapi_auth::config::{
    CoreServicesConfig, Environment, IdentityConfig, OAuth2ServerConfig, ProxyConfig, RateLimitConfig, ServerConfig,
    SessionConfig, SessionSettings,
};
use openapi_auth::core::registry::ServiceLocator;
use openapi_auth::handlers::proxy::ProxyClient;
use openapi_auth::middlewares::authers::{
    Auther, BasicAuther, LoginAuther, OrgNameChecker, OverPermissionChecker, TokenAuther, TryLoginAuther,
};
use openapi_auth::middlewares::AuthChain;
use openapi_auth::repositories::sessions::{MemorySessionStore, SessionRepository, SessionStore};
use openapi_auth::routes::configure_all_routes;
use openapi_auth::services::auth::{OrgClient, TokenValidator, UserAuthFacade};
use openapi_auth::services::identity::build_backend;
use openapi_auth::services::sessions::{SessionService, SessionStoreHandle};
use openapi_auth::utils::display_terminal::print_auth_chain;

const MEMORY_STORE_URL: &str = "memory://";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 OpenAPI 인증 게이트웨이 시작중...");

    let environment = Environment::current();
    info!("Environment: {:?}", environment);

    let session_settings = SessionConfig::settings();
    if environment.is_production() && !session_settings.secure {
        warn!("운영 환경에서 SESSION_COOKIE_SECURE 가 꺼져 있습니다");
    }
    ServiceLocator::set(Arc::new(session_settings.clone()));
    initialize_session_store().await?;

    let sessions = ServiceLocator::get::<SessionService>();
    info!("✅ 세션 서비스 초기화 완료 (쿠키: {})", sessions.cookie_name());

    let (chain, facade) = build_auth_chain(sessions.clone(), session_settings)?;
    let proxy = ProxyClient::new(ProxyConfig::upstream(), ProxyConfig::timeout_seconds())
        .map_err(startup_error)?;
    info!("🔀 프록시 업스트림: {}", proxy.upstream());

    start_http_server(chain, facade, sessions, proxy).await
}

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    error!("초기화 실패: {}", e);
    std::io::Error::other(e.to_string())
}

/// 세션 저장소를 준비합니다
///
/// `REDIS_URL=memory://` 이면 프로세스 내 저장소를 쓰고, 아니면 Redis 에 연결한 뒤
/// `#[repository]` / `#[service]` 레지스트리를 초기화합니다.
async fn initialize_session_store() -> std::io::Result<()> {
    if RedisClient::url() == MEMORY_STORE_URL {
        info!("🧠 메모리 세션 저장소 사용 (프로세스 재시작 시 세션이 사라집니다)");
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        ServiceLocator::set(Arc::new(SessionStoreHandle::from_store(store)));
        return Ok(());
    }

    info!("📡 Redis 연결 중...");
    let redis_client = RedisClient::new().await.map_err(startup_error)?;
    ServiceLocator::set(Arc::new(redis_client));

    let store: Arc<dyn SessionStore> = ServiceLocator::get::<SessionRepository>();
    ServiceLocator::set(Arc::new(SessionStoreHandle::from_store(store)));

    ServiceLocator::initialize_all().await.map_err(startup_error)?;
    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");
    Ok(())
}

/// ID 백엔드, 조직 디렉터리, 토큰 검증기로 인증 체인을 구성합니다
fn build_auth_chain(
    sessions: Arc<SessionService>,
    session_settings: SessionSettings,
) -> std::io::Result<(Arc<AuthChain>, UserAuthFacade)> {
    let timeout = IdentityConfig::http_timeout_seconds();
    let token_settings = OAuth2ServerConfig::settings();
    let cache_capacity = token_settings.cache_capacity;
    let cache_ttl = Duration::from_secs(token_settings.cache_ttl_seconds);

    let backend = build_backend(IdentityConfig::provider(), sessions).map_err(startup_error)?;
    let orgs = Arc::new(
        OrgClient::new(CoreServicesConfig::addr(), cache_capacity, cache_ttl, timeout).map_err(startup_error)?,
    );
    let validator = Arc::new(TokenValidator::new(token_settings, timeout).map_err(startup_error)?);
    let facade = UserAuthFacade::new(backend.clone(), orgs.clone());

    let authers: Vec<Arc<dyn Auther>> = vec![
        Arc::new(TokenAuther::new(validator)),
        Arc::new(BasicAuther::new(backend, TokenCache::new(cache_capacity, cache_ttl))),
        Arc::new(LoginAuther::new(facade.clone(), session_settings)),
        Arc::new(TryLoginAuther::new(facade.clone())),
    ];
    let checkers: Vec<Arc<dyn OverPermissionChecker>> = vec![Arc::new(OrgNameChecker::new(orgs))];
    let chain = Arc::new(AuthChain::new(authers, checkers));

    let (auther_names, checker_names) = chain.describe();
    print_auth_chain(&auther_names, &checker_names);

    Ok((chain, facade))
}

/// HTTP 서버를 구성하고 실행합니다
///
/// Rate Limiting, CORS, 접근 로그 미들웨어를 앱 전체에 적용하고,
/// 라우트 그룹별 인증은 [`configure_all_routes`] 에서 적용합니다.
async fn start_http_server(
    chain: Arc<AuthChain>,
    facade: UserAuthFacade,
    sessions: Arc<SessionService>,
    proxy: ProxyClient,
) -> std::io::Result<()> {
    let bind_address = format!("{}:{}", ServerConfig::host(), ServerConfig::port());

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);

    let rate_limit_config = RateLimitConfig::load();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit_config.per_second)
        .burst_size(rate_limit_config.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| startup_error("잘못된 Rate Limiting 설정"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit_config.per_second,
        rate_limit_config.burst_size
    );

    let csrf_header = sessions.settings().csrf_header_name.clone();
    let facade = web::Data::new(facade);
    let sessions = web::Data::from(sessions);
    let proxy = web::Data::new(proxy);

    HttpServer::new(move || {
        App::new()
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(&csrf_header))
            .wrap(middleware::Logger::default())
            .app_data(facade.clone())
            .app_data(sessions.clone())
            .app_data(proxy.clone())
            .configure(|cfg| configure_all_routes(cfg, chain.clone()))
    })
    .bind(bind_address)?
    .workers(ServerConfig::workers())
    .run()
    .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    info!("Current profile: {}", profile);

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// `RUST_LOG` 기반 로깅 초기화 (기본값: "info,actix_web=info")
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
}

/// CORS 설정을 구성합니다
///
/// `CORS_ALLOWED_ORIGINS` 에 `*` 가 있으면 모든 Origin 을 허용합니다.
/// 세션 쿠키를 쓰므로 자격 증명을 허용하고, CSRF / `Org` 헤더를 받을 수 있어야 합니다.
fn configure_cors(csrf_header: &str) -> Cors {
    let origins = ServerConfig::allowed_origins();
    let mut cors = if origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    let mut allowed_headers = vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE];
    for name in [csrf_header, "Org"] {
        if let Ok(name) = header::HeaderName::from_bytes(name.as_bytes()) {
            allowed_headers.push(name);
        }
    }

    cors = cors
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(allowed_headers)
        .supports_credentials()
        .max_age(3600);
    cors
}
