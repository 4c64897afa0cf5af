use std::sync::Arc;

use log::debug;
use reqwest::Url;
use serde_json::Value;

use crate::error::ClientError;
use crate::model::{Comment, Identity, LoginForm, NewComment, RegisterForm};
use crate::transport::{ApiRequest, ApiResponse, Transport};

pub const POSTS_PATH: &'static str = "/api/posts/";
pub const LOGIN_PATH: &'static str = "/api/posts/auth/login/";
pub const REGISTER_PATH: &'static str = "/api/posts/auth/register/";
pub const LOGOUT_PATH: &'static str = "/api/auth/logout/";

/// Typed endpoints of the feed API over any `Transport`.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base: Url,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, base: Url) -> Self {
        ApiClient { transport, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves a path or an absolute URL against the configured origin.
    pub fn resolve(&self, target: &str) -> Result<Url, ClientError> {
        self.base
            .join(target)
            .map_err(|e| ClientError::Format(format!("invalid url {target}: {e}")))
    }

    pub fn like_url(&self, post_id: u64) -> Result<Url, ClientError> {
        self.resolve(&format!("{POSTS_PATH}{post_id}/like/"))
    }

    pub fn comments_url(&self, post_id: u64) -> Result<Url, ClientError> {
        self.resolve(&format!("{POSTS_PATH}{post_id}/comments/"))
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let response = self.transport.execute(request).await?;
        check_status(response)
    }

    /// GETs `target` and parses the body as loose JSON.
    pub async fn get_value(&self, target: &str) -> Result<Value, ClientError> {
        let url = self.resolve(target)?;
        self.send(ApiRequest::get(url)).await?.json()
    }

    pub async fn posts_root(&self) -> Result<Value, ClientError> {
        self.get_value(POSTS_PATH).await
    }

    pub async fn login(&self, form: &LoginForm) -> Result<Identity, ClientError> {
        let url = self.resolve(LOGIN_PATH)?;
        let body = serde_json::to_value(form)?;
        self.send(ApiRequest::post(url, Some(body))).await?.json()
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<Value, ClientError> {
        let url = self.resolve(REGISTER_PATH)?;
        let body = serde_json::to_value(form)?;
        Ok(self
            .send(ApiRequest::post(url, Some(body)))
            .await?
            .json_value())
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let url = self.resolve(LOGOUT_PATH)?;
        self.send(ApiRequest::post(url, None)).await?;
        Ok(())
    }

    pub async fn like(&self, post_id: u64) -> Result<(), ClientError> {
        let url = self.like_url(post_id)?;
        self.send(ApiRequest::post(url, None)).await?;
        Ok(())
    }

    pub async fn unlike(&self, post_id: u64) -> Result<(), ClientError> {
        let url = self.like_url(post_id)?;
        self.send(ApiRequest::delete(url)).await?;
        Ok(())
    }

    pub async fn comments(&self, post_id: u64) -> Result<Vec<Comment>, ClientError> {
        let url = self.comments_url(post_id)?;
        self.send(ApiRequest::get(url)).await?.json()
    }

    pub async fn add_comment(&self, post_id: u64, content: &str) -> Result<Comment, ClientError> {
        let url = self.comments_url(post_id)?;
        let body = serde_json::to_value(NewComment {
            content: content.to_owned(),
        })?;
        self.send(ApiRequest::post(url, Some(body))).await?.json()
    }

    /// Raw GET used for media; the status is not interpreted.
    pub async fn fetch(&self, target: &str) -> Result<ApiResponse, ClientError> {
        let url = self.resolve(target)?;
        self.transport.execute(ApiRequest::get(url)).await
    }
}

/// Maps HTTP statuses onto the error taxonomy.
pub fn check_status(response: ApiResponse) -> Result<ApiResponse, ClientError> {
    let status = response.status;
    if (200..300).contains(&status) {
        return Ok(response);
    }

    let message = server_message(&response.json_value());
    debug!("request failed with {status}: {message:?}");

    match status {
        401 | 403 => Err(ClientError::Auth { status, message }),
        404 => Err(ClientError::NotFound { message }),
        status => Err(ClientError::Status { status, message }),
    }
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_owned)
}
