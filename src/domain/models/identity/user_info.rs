use serde::{Deserialize, Serialize};

/// 백엔드 종류와 무관한 공통 사용자 정보
///
/// UC, IAM, Kratos 의 응답은 각 백엔드에서 이 형태로 정규화됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub nick: String,
    pub avatar_url: String,
    pub phone: String,
    pub email: String,
}

impl UserInfo {
    /// 표시용 이름. 닉네임이 없으면 로그인 이름을 씁니다.
    pub fn display_name(&self) -> &str {
        if self.nick.is_empty() { &self.name } else { &self.nick }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let user = UserInfo {
            id: "1".to_string(),
            name: "dice".to_string(),
            avatar_url: "https://a/b.png".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["avatarUrl"], "https://a/b.png");
        assert_eq!(json["nick"], "");
    }

    #[test]
    fn test_display_name() {
        let mut user = UserInfo { name: "dice".to_string(), ..Default::default() };
        assert_eq!(user.display_name(), "dice");
        user.nick = "Dice".to_string();
        assert_eq!(user.display_name(), "Dice");
    }
}
