use serde::Serialize;
use serde_json::{Map, Value};

/// Username/password pair posted to the login endpoint.
#[derive(Serialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload for the registration endpoint.
///
/// The backend validates `password2` against `password`; any further account
/// fields (email, first_name, phone, ...) go into `fields`.
#[derive(Serialize, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub password2: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Registration {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password = password.into();
        Registration {
            username: username.into(),
            password2: password.clone(),
            password,
            fields: Map::new(),
        }
    }

    /// Adds an extra account field to the payload.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registration_payload_flattens_fields() {
        let registration = Registration::new("adam", "hunter22")
            .with_field("email", "adam@example.com")
            .with_field("phone", "0301234");

        let body = serde_json::to_value(&registration).unwrap();
        assert_eq!(
            body,
            json!({
                "username": "adam",
                "password": "hunter22",
                "password2": "hunter22",
                "email": "adam@example.com",
                "phone": "0301234"
            })
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("adam", "hunter22");
        assert!(!format!("{:?}", credentials).contains("hunter22"));
    }
}
