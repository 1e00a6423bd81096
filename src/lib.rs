//! OpenAPI 게이트웨이 인증 서비스
//!
//! 외부 요청을 다운스트림 서비스로 넘기기 전에 "누가 요청했는가"를 결정하고,
//! 그 결과를 신뢰 헤더(`User-ID`, `Org-ID`, `Client-ID`, `Client-Name`)로 주입합니다.
//!
//! # Features
//!
//! - **가중치 인증 체인**: Bearer 토큰, Basic, 세션 로그인, 선택적 로그인. 첫 매치 인증기가 결정
//! - **조직 권한 검사**: `Org` 헤더 / `orgName` 쿼리에 대한 접근 확인
//! - **ID 백엔드**: UC, IAM, Kratos 중 설정으로 선택
//! - **세션**: Redis(또는 메모리) 세션 저장소, 슬라이딩 만료, CSRF 쿠키
//! - **리버스 프록시**: 인증된 요청을 `PROXY_UPSTREAM` 으로 전달
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← 라우트 그룹별 AuthOptions
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   OpenApiAuth   │ ← AuthChain: Auther + OverPermissionChecker
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Handlers/Proxy  │ ← 로그인, 현재 사용자, 다운스트림 전달
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← IdentityBackend, UserState, TokenValidator, OrgClient
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 세션 저장소 (Redis / 메모리)
//! └─────────────────┘
//! ```

pub mod core;
pub mod config;
pub mod caching;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod errors;
pub mod middlewares;
