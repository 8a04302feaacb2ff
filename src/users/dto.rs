use serde::{Deserialize, Serialize};

use super::repo_types::{ProfileUpdate, User};
use super::services::Registration;
use crate::auth::Role;
use crate::images::image_path;

/// Request body for registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl From<RegisterRequest> for Registration {
    fn from(r: RegisterRequest) -> Self {
        Self {
            email: r.email,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            role: r.role,
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl From<UpdateUserRequest> for ProfileUpdate {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

/// Public view of an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub image: Option<String>,
    pub role: Role,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            image: u.image_id.map(|id| image_path("users", id)),
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            phone: u.phone,
            role: u.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_accepts_username_alias() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"a@x.com","password":"password1","firstName":"A","role":"ADMIN"}"#,
        )
        .unwrap();
        assert_eq!(req.email, "a@x.com");
        assert_eq!(req.first_name, "A");
        assert_eq!(req.last_name, "");
        assert_eq!(req.role, Some(Role::Admin));
    }

    #[test]
    fn user_dto_hides_password_and_links_image() {
        let dto = UserDto::from(User {
            id: 3,
            email: "a@x.com".into(),
            password_hash: "secret-hash".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            phone: "+1".into(),
            image_id: Some(9),
            role: Role::User,
        });
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.contains("\"image\":\"/users/image/9\""));
        assert!(json.contains("\"firstName\":\"A\""));
        assert!(!json.contains("secret-hash"));
    }
}
