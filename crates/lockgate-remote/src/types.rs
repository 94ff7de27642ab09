//! Wire types for the authentication service

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// A browser profile known to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProfile {
    /// Profile directory name, e.g. `Default` or `Profile 2`
    pub name: String,
    /// Account e-mail signed into the profile, if any
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilesResponse {
    #[serde(default)]
    pub chrome_profiles: Vec<RemoteProfile>,
    /// Profiles that already have a password configured
    #[serde(default)]
    pub app_profiles: Vec<String>,
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub password: &'a str,
    pub profile: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    Success,
    Guest,
    Other(String),
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Profile the service actually unlocked, which may differ from the hint
    #[serde(default)]
    pub profile_launched: Option<String>,
    /// Only a literal JSON `true` counts; the service may send `""` or `null`
    #[serde(default, deserialize_with = "strict_true")]
    pub different_profile: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    pub fn login_status(&self) -> LoginStatus {
        match self.status.as_str() {
            "success" => LoginStatus::Success,
            "guest" => LoginStatus::Guest,
            other => LoginStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("status", &self.status)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("profile_launched", &self.profile_launched)
            .field("different_profile", &self.different_profile)
            .field("message", &self.message)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub profile: Option<String>,
}

fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(matches!(value, serde_json::Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_status() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"status":"success","token":"abc","profile_launched":"Work","different_profile":true}"#,
        )
        .unwrap();
        assert_eq!(response.login_status(), LoginStatus::Success);
        assert!(response.different_profile);

        let response: LoginResponse = serde_json::from_str(r#"{"status":"guest"}"#).unwrap();
        assert_eq!(response.login_status(), LoginStatus::Guest);
        assert!(response.token.is_none());

        let response: LoginResponse = serde_json::from_str(r#"{"status":"denied"}"#).unwrap();
        assert_eq!(
            response.login_status(),
            LoginStatus::Other("denied".to_string())
        );
    }

    #[test]
    fn test_different_profile_requires_literal_true() {
        for raw in [r#""""#, "null", "1", r#""true""#, "false"] {
            let body = format!(r#"{{"status":"success","token":"t","different_profile":{raw}}}"#);
            let response: LoginResponse = serde_json::from_str(&body).unwrap();
            assert!(!response.different_profile, "{raw} should not count as true");
        }
    }

    #[test]
    fn test_profiles_tolerate_missing_email() {
        let response: ProfilesResponse = serde_json::from_str(
            r#"{"chrome_profiles":[{"name":"Default","path":"/p","email":null},{"name":"Profile 1","email":"a@b.com"}]}"#,
        )
        .unwrap();
        assert_eq!(response.chrome_profiles.len(), 2);
        assert_eq!(response.chrome_profiles[0].email, None);
        assert_eq!(response.chrome_profiles[1].email.as_deref(), Some("a@b.com"));
        assert!(response.app_profiles.is_empty());
    }
}
