use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use percent_encoding::percent_decode_str;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::{CSRF_COOKIE_NAME, CSRF_HEADER_NAME};

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: Url) -> Self {
        ApiRequest {
            method: Method::GET,
            url,
            body: None,
        }
    }

    pub fn post(url: Url, body: Option<Value>) -> Self {
        ApiRequest {
            method: Method::POST,
            url,
            body,
        }
    }

    pub fn delete(url: Url) -> Self {
        ApiRequest {
            method: Method::DELETE,
            url,
            body: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as loose JSON; an empty or non-JSON body reads as `Null`.
    pub fn json_value(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

/// Executes requests against the remote API. Connection-level failures are
/// `ClientError::Transport`; any HTTP status is returned as a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// reqwest-backed transport. Cookies set by the API live in a shared jar
/// and ride along on every request; bodies get the anti-forgery header.
pub struct HttpTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ClientError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(HttpTransport { client, jar })
    }

    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    pub fn csrf_token(&self, url: &Url) -> Option<String> {
        let header = self.jar.cookies(url)?;
        cookie_value(header.to_str().ok()?, CSRF_COOKIE_NAME)
    }

    /// Builds the outgoing request. Only requests with a JSON body carry
    /// the anti-forgery header.
    pub fn build_request(&self, request: &ApiRequest) -> Result<reqwest::Request, ClientError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        if let Some(body) = &request.body {
            if let Some(token) = self.csrf_token(&request.url) {
                builder = builder.header(CSRF_HEADER_NAME, token);
            }
            builder = builder.json(body);
        }

        builder
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        debug!("{} {}", request.method, request.url);

        let outgoing = self.build_request(&request)?;
        let response = self
            .client
            .execute(outgoing)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        debug!("{} {} -> {}", request.method, request.url, status);

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Finds `name` in a `Cookie` header value (`a=1; b=2`) and percent-decodes
/// it. A value that does not decode to UTF-8 is returned as stored.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key != name {
            return None;
        }

        match percent_decode_str(value).decode_utf8() {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(e) => {
                warn!("cookie {} is not valid percent-encoded UTF-8: {}", name, e);
                Some(value.to_owned())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cookie_among_others() {
        let header = "sessionid=abc; csrftoken=tok123; theme=dark";
        assert_eq!(cookie_value(header, "csrftoken"), Some("tok123".into()));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn cookie_name_must_match_exactly() {
        assert_eq!(cookie_value("xcsrftoken=nope", "csrftoken"), None);
        assert_eq!(cookie_value("csrftoken=", "csrftoken"), Some(String::new()));
    }

    #[test]
    fn cookie_values_are_percent_decoded() {
        assert_eq!(
            cookie_value("csrftoken=a%2Bb%3Dc", "csrftoken"),
            Some("a+b=c".into())
        );
        assert_eq!(cookie_value("csrftoken=bad%FF", "csrftoken"), Some("bad%FF".into()));
    }

    fn transport_with_token(url: &Url) -> HttpTransport {
        let transport = HttpTransport::new().unwrap();
        transport
            .jar()
            .add_cookie_str("csrftoken=fromjar; Path=/", url);
        transport
    }

    #[test]
    fn csrf_header_rides_on_json_bodies() {
        let url = Url::parse("http://127.0.0.1:8000/api/posts/4/comments/").unwrap();
        let transport = transport_with_token(&url);

        let request = transport
            .build_request(&ApiRequest::post(url, Some(serde_json::json!({"content": "hi"}))))
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.headers()[CSRF_HEADER_NAME], "fromjar");
        assert_eq!(request.headers()[reqwest::header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn bodyless_requests_skip_csrf_header() {
        let url = Url::parse("http://127.0.0.1:8000/api/posts/4/like/").unwrap();
        let transport = transport_with_token(&url);

        let like = transport.build_request(&ApiRequest::post(url.clone(), None)).unwrap();
        assert!(like.headers().get(CSRF_HEADER_NAME).is_none());
        assert!(like.body().is_none());

        let unlike = transport.build_request(&ApiRequest::delete(url)).unwrap();
        assert_eq!(unlike.method(), &Method::DELETE);
        assert!(unlike.headers().get(CSRF_HEADER_NAME).is_none());
    }

    #[test]
    fn reads_csrf_token_from_jar() {
        let transport = HttpTransport::new().unwrap();
        let url = Url::parse("http://127.0.0.1:8000/api/posts/").unwrap();
        transport
            .jar()
            .add_cookie_str("csrftoken=fromjar; Path=/", &url);

        assert_eq!(transport.csrf_token(&url), Some("fromjar".into()));
    }

    #[test]
    fn non_json_body_reads_as_null() {
        let response = ApiResponse {
            status: 500,
            body: b"<html>oops</html>".to_vec(),
        };
        assert_eq!(response.json_value(), Value::Null);
        assert!(!response.is_success());
    }
}
