use serde::{Deserialize, Serialize};

/// A registered console account as listed by `GET /api/auth/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

/// Body of a successful `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}
