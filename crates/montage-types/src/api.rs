use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// JWT claims issued on login and checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Generic --

/// Body of every plain success/failure reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// -- Auth --

/// Missing fields deserialize as empty strings so the handler can answer 400.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
}

// -- Images --

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub success: bool,
    pub images: Vec<String>,
}

// -- Videos --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    pub image_urls: Vec<String>,
    pub resolution: String,
    pub audio_mood: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoResponse {
    pub success: bool,
    pub video_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_video_request_uses_camel_case() {
        let req: CreateVideoRequest = serde_json::from_str(
            r#"{"imageUrls":["http://a/1.png","http://a/2.png"],"resolution":"720p","audioMood":"Epic"}"#,
        )
        .unwrap();
        assert_eq!(req.image_urls.len(), 2);
        assert_eq!(req.resolution, "720p");
        assert_eq!(req.audio_mood, "Epic");
    }

    #[test]
    fn signup_request_defaults_missing_fields() {
        let req: SignupRequest = serde_json::from_str(r#"{"username":"ana"}"#).unwrap();
        assert_eq!(req.username, "ana");
        assert!(req.password.is_empty());
    }

    #[test]
    fn credential_requests_ignore_extra_keys() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"ana","password":"pw","remember":true}"#).unwrap();
        assert_eq!(req.username, "ana");
        assert_eq!(req.password, "pw");

        let req: SignupRequest =
            serde_json::from_str(r#"{"username":"bo","password":"pw","email":"bo@example.com"}"#).unwrap();
        assert_eq!(req.username, "bo");
    }

    #[test]
    fn failure_status_serializes_message() {
        let body = serde_json::to_value(StatusResponse::failure("Username already exists")).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Username already exists");
    }
}
