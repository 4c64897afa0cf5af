use serde::Deserializer;

/// Reads a JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    let value = <Option<T> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Author reference embedded in posts and comments.
#[derive(Hash, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    pub id: u64,
    pub username: String,
}

/// The logged-in viewer, as returned by the login endpoint and kept in
/// durable storage between runs.
#[derive(Hash, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: u64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn as_user_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_liked: bool,
}

/// Client-side copy of a post. Only the like fields and the comment list
/// are ever changed locally; everything else is whatever the API sent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_liked: bool,
    #[serde(default)]
    pub comments: Option<Vec<Comment>>,
    #[serde(default)]
    pub comments_count: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    pub fn demo() -> Self {
        RegisterForm {
            username: "demo_user".into(),
            email: "demo@example.com".into(),
            password: "demopass123".into(),
            password2: "demopass123".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NewComment {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_defaults_missing_like_fields() {
        let post: Post = serde_json::from_str(
            r#"{"id": 7, "user": {"id": 1, "username": "ana"}, "content": "hi", "created_at": "2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(post.likes_count, 0);
        assert!(!post.is_liked);
        assert_eq!(post.comments, None);
        assert_eq!(post.image_url, None);
    }

    #[test]
    fn null_fields_read_as_missing() {
        let post: Post = serde_json::from_str(
            r#"{"id": 8, "user": null, "content": null, "likes_count": null, "is_liked": null, "created_at": null}"#,
        )
        .unwrap();

        assert_eq!(post.user, None);
        assert_eq!(post.content, "");
        assert_eq!(post.likes_count, 0);
        assert!(!post.is_liked);

        let comment: Comment = serde_json::from_str(r#"{"id": 1, "content": null}"#).unwrap();
        assert_eq!(comment.content, "");
    }

    #[test]
    fn identity_ignores_extra_login_fields() {
        let identity: Identity = serde_json::from_str(
            r#"{"id": 3, "username": "bo", "email": "bo@example.com", "message": "Login successful"}"#,
        )
        .unwrap();

        assert_eq!(identity.username, "bo");
        assert_eq!(identity.email.as_deref(), Some("bo@example.com"));
    }
}
