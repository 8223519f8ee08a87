use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Account details from `GET /api/users/me/`.
///
/// The field name for the role varies between deployments (`user_type`
/// server-side, `userType` in some gateway responses), so both spellings
/// are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default, alias = "userType")]
    pub user_type: Option<String>,
}

impl UserInfo {
    /// Role for navigation gating, defaulting to buyer when unset.
    pub fn role(&self) -> Role {
        self.user_type
            .as_deref()
            .map(Role::parse)
            .unwrap_or_default()
    }
}

/// Registration payload for `POST /api/users/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub user_type: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_both_field_spellings() {
        let snake: UserInfo = serde_json::from_str(
            r#"{"id":1,"username":"alice","email":"a@x.com","user_type":"farmer"}"#,
        )
        .unwrap();
        assert_eq!(snake.role(), Role::Farmer);

        let camel: UserInfo = serde_json::from_str(
            r#"{"id":2,"username":"bob","email":"b@x.com","userType":"buyer"}"#,
        )
        .unwrap();
        assert_eq!(camel.role(), Role::Buyer);

        let missing: UserInfo =
            serde_json::from_str(r#"{"id":3,"username":"eve","email":"e@x.com"}"#).unwrap();
        assert_eq!(missing.role(), Role::Buyer);
    }

    #[test]
    fn registration_serializes_role_lowercase() {
        let payload = NewUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1234567".to_string(),
            user_type: Role::Farmer,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["user_type"], "farmer");
    }
}
