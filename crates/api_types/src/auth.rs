use serde::{Deserialize, Serialize};

use crate::user::UserView;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub language_preference: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response of signup and login.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub tokens: TokenPair,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenRefresh {
    pub refresh: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}
