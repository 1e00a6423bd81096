//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`string_utils`] - 문자열 검증, 정리, 해시 키 유틸리티
//! - [`http_utils`] - 인증 헤더 파싱, 쿠키 도메인 선택 등 HTTP 헬퍼
//! - [`display_terminal`] - 터미널 출력 포맷팅 함수들

pub mod string_utils;
pub mod http_utils;
pub mod display_terminal;
