/// 라우트별 인증 요구 사항
///
/// 모든 플래그가 꺼져 있으면 공개 라우트이며, 인증 체인은 신원 없이 요청을 통과시킵니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthOptions {
    /// 세션 로그인 필수
    pub check_login: bool,
    /// 세션이 있으면 사용자로 식별, 없어도 통과
    pub try_check_login: bool,
    /// `Authorization: Bearer` 토큰 허용
    pub check_token: bool,
    /// `Authorization: Basic` 허용
    pub check_basic_auth: bool,
    /// `Org` 헤더 / `orgName` 쿼리에 대한 조직 권한 검사
    pub check_org: bool,
}

impl AuthOptions {
    pub const fn public() -> Self {
        Self {
            check_login: false,
            try_check_login: false,
            check_token: false,
            check_basic_auth: false,
            check_org: false,
        }
    }

    pub const fn login() -> Self {
        Self { check_login: true, ..Self::public() }
    }

    pub const fn try_login() -> Self {
        Self { try_check_login: true, ..Self::public() }
    }

    pub const fn with_token(self) -> Self {
        Self { check_token: true, ..self }
    }

    pub const fn with_basic_auth(self) -> Self {
        Self { check_basic_auth: true, ..self }
    }

    pub const fn with_org_check(self) -> Self {
        Self { check_org: true, ..self }
    }

    pub fn is_public(&self) -> bool {
        !(self.check_login || self.try_check_login || self.check_token || self.check_basic_auth || self.check_org)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        assert!(AuthOptions::public().is_public());
        assert!(AuthOptions::default().is_public());

        let opts = AuthOptions::login().with_token().with_org_check();
        assert!(opts.check_login && opts.check_token && opts.check_org);
        assert!(!opts.check_basic_auth);
        assert!(!opts.is_public());

        assert!(!AuthOptions::public().with_org_check().is_public());
    }
}
