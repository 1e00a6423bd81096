//! 캐싱 계층 모듈
//!
//! # 주요 기능
//!
//! - [`redis`] - 세션 저장용 Redis 클라이언트 (JSON 직렬화, TTL)
//! - [`token_cache`] - 프로세스 내 TTL + LRU 캐시 (Bearer 토큰 검증 결과, 조직 조회 결과)
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use crate::caching::token_cache::TokenCache;
//!
//! let cache: TokenCache<Identity> = TokenCache::new(10_000, Duration::from_secs(60));
//! cache.insert("token-hash".to_string(), identity);
//! let hit = cache.get("token-hash");
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379  # 기본값, memory:// 이면 프로세스 내 세션 저장소 사용
//! TOKEN_CACHE_CAPACITY=10000
//! TOKEN_CACHE_TTL_SECONDS=60
//! ```

pub mod redis;
pub mod token_cache;

pub use token_cache::TokenCache;
