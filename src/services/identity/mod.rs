//! # 사용자 ID 백엔드
//!
//! UC, IAM, Kratos 를 하나의 [`IdentityBackend`] 트레이트 뒤에 둡니다.
//! 어떤 백엔드를 쓸지는 `IDENTITY_PROVIDER` 로 시작 시점에 한 번 결정됩니다.
//!
//! ```text
//! IdentityBackend
//! ├── UcBackend      ─► 세션 저장소 + UC OAuth2 (form) + UC 쿠키 패스스루
//! ├── IamBackend     ─► 세션 저장소 + IAM OAuth2 (JSON) + 만료 임박 토큰 갱신
//! └── KratosBackend  ─► ory_kratos_session 쿠키 → whoami
//! ```

pub mod backend;
pub mod iam;
pub mod kratos;
pub mod session_backed;
pub mod uc;
pub mod upstream;

use std::sync::Arc;

pub use backend::IdentityBackend;
pub use iam::IamBackend;
pub use kratos::KratosBackend;
pub use uc::UcBackend;

use crate::config::{IamConfig, IdentityConfig, IdentityProviderKind, KratosConfig, UcConfig};
use crate::errors::errors::AppResult;
use crate::services::sessions::SessionService;

/// 설정된 ID 백엔드를 생성합니다.
pub fn build_backend(
    kind: IdentityProviderKind,
    sessions: Arc<SessionService>,
) -> AppResult<Arc<dyn IdentityBackend>> {
    let timeout = IdentityConfig::http_timeout_seconds();
    let backend: Arc<dyn IdentityBackend> = match kind {
        IdentityProviderKind::Uc => Arc::new(UcBackend::new(UcConfig::settings(), sessions, timeout)?),
        IdentityProviderKind::Iam => Arc::new(IamBackend::new(IamConfig::settings(), sessions, timeout)?),
        IdentityProviderKind::Kratos => Arc::new(KratosBackend::new(KratosConfig::settings(), timeout)?),
    };
    log::info!("🔐 Identity backend: {}", backend.kind());
    Ok(backend)
}
