//! # Core Framework Module
//!
//! 게이트웨이 프로세스의 공통 기반을 제공합니다.
//!
//! ## 모듈 구성
//!
//! ### [`registry`] - 의존성 주입 컨테이너
//! - **ServiceLocator**: 타입 기반 전역 싱글톤 컨테이너
//! - **자동 레지스트리**: `inventory` 기반 `#[service]` / `#[repository]` 등록
//! - **수동 등록**: Redis 클라이언트, 인증 체인 등 인프라 컴포넌트는 `ServiceLocator::set()`
//!
//! 에러 타입은 [`crate::errors`] 에 정의되어 있으며 여기서 재노출합니다.
//!
//! ## 사용 패턴
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crate::core::registry::ServiceLocator;
//!
//! ServiceLocator::set(Arc::new(redis_client));
//! ServiceLocator::initialize_all().await?;
//!
//! let sessions = ServiceLocator::get::<SessionService>();
//! ```

pub mod registry;

pub use crate::errors::errors::{AppError, AppResult, ErrorContext};
pub use registry::*;
