//! # Domain Models Module
//!
//! 인증 체인과 ID 백엔드가 공유하는 값 객체들입니다.
//!
//! ```text
//! models/
//! ├── identity/  ← UserInfo, OAuthToken, AuthCredential (백엔드 정규화 결과)
//! ├── auth/      ← AuthOptions, AuthRequest, Identity (체인 입력/출력)
//! └── org/       ← OrgInfo, ScopeInfo (조직 권한)
//! ```

pub mod auth;
pub mod identity;
pub mod org;

pub use auth::*;
pub use identity::*;
pub use org::*;
