//! # Repository Layer
//!
//! 게이트웨이가 직접 소유하는 상태는 로그인 세션뿐입니다.
//! 운영 환경에서는 Redis([`sessions::SessionRepository`]), 개발/테스트에서는
//! 프로세스 메모리([`sessions::MemorySessionStore`])를 [`sessions::SessionStore`] 트레이트 뒤에 둡니다.

pub mod sessions;
