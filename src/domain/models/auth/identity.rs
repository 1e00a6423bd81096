use std::future::{ready, Ready};

use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;

use crate::domain::models::identity::UserInfo;
use crate::utils::http_utils::{CLIENT_ID_HEADER, CLIENT_NAME_HEADER, ORG_ID_HEADER, USER_ID_HEADER};

/// 인증 체인을 통과한 요청의 신원
///
/// 다운스트림으로는 신뢰 헤더(`User-ID`, `Org-ID`, `Client-ID`, `Client-Name`)로 전달되고,
/// 같은 프로세스의 핸들러에는 request extensions 로 전달됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Option<String>,
    pub org_id: Option<String>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: UserInfo) -> Self {
        Self {
            user_id: Some(user.id.clone()),
            user: Some(user),
            ..Default::default()
        }
    }

    pub fn for_client(client_id: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_name: Some(client_name.into()),
            ..Default::default()
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none() && self.client_id.is_none()
    }

    /// 다운스트림에 주입할 헤더 목록
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        [
            (USER_ID_HEADER, &self.user_id),
            (ORG_ID_HEADER, &self.org_id),
            (CLIENT_ID_HEADER, &self.client_id),
            (CLIENT_NAME_HEADER, &self.client_name),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name, v.clone())))
        .collect()
    }
}

/// 식별된 사용자 또는 클라이언트가 필요한 핸들러용 추출자
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub Identity);

impl FromRequest for RequestIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Identity>() {
            Some(identity) if !identity.is_anonymous() => ready(Ok(RequestIdentity(identity.clone()))),
            _ => ready(Err(actix_web::error::ErrorUnauthorized("인증되지 않은 요청입니다"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let identity = req
            .extensions()
            .get::<Identity>()
            .filter(|identity| !identity.is_anonymous())
            .cloned();
        ready(Ok(OptionalIdentity(identity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_headers_skip_empty_fields() {
        let mut identity = Identity::for_user(UserInfo { id: "2".to_string(), ..Default::default() });
        identity.org_id = Some("1".to_string());

        assert_eq!(
            identity.headers(),
            vec![(USER_ID_HEADER, "2".to_string()), (ORG_ID_HEADER, "1".to_string())]
        );
        assert!(Identity::anonymous().headers().is_empty());
    }

    #[test]
    fn test_client_identity() {
        let identity = Identity::for_client("pipeline", "Pipeline Bot");
        assert!(!identity.is_anonymous());
        assert_eq!(identity.user_id, None);
        assert_eq!(identity.headers().len(), 2);
    }

    #[actix_web::test]
    async fn test_extractors() {
        let req = TestRequest::default().to_http_request();
        assert!(RequestIdentity::extract(&req).await.is_err());
        assert!(OptionalIdentity::extract(&req).await.unwrap().0.is_none());

        req.extensions_mut().insert(Identity::for_client("c", "n"));
        let RequestIdentity(identity) = RequestIdentity::extract(&req).await.unwrap();
        assert_eq!(identity.client_id.as_deref(), Some("c"));
        assert!(OptionalIdentity::extract(&req).await.unwrap().0.is_some());
    }

    #[actix_web::test]
    async fn test_anonymous_identity_is_not_authenticated() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Identity::anonymous());
        assert!(RequestIdentity::extract(&req).await.is_err());
        assert!(OptionalIdentity::extract(&req).await.unwrap().0.is_none());
    }
}
