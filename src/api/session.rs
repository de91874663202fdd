/// The logged-in user and their bearer token.
///
/// Created by a successful login, read by every protected call, cleared on
/// logout. Owned by the application state and passed down explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credentials: Option<(String, String)>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn establish(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            credentials: Some((username.into(), token.into())),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|(username, _)| username.as_str())
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|(_, token)| token.as_str())
    }

    pub fn clear(&mut self) {
        self.credentials = None;
    }
}
