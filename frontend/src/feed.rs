use log::{debug, error, warn};
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::{ClientError, FeedError};
use crate::model::Post;

pub const UNEXPECTED_FORMAT: &'static str = "Unexpected API response format";
pub const INVALID_POSTS_FORMAT: &'static str = "Posts data format is invalid";

/// What the posts endpoint answered with.
#[derive(Debug, PartialEq)]
pub enum FeedShape {
    Posts(Vec<Value>),
    Envelope(String),
}

pub fn classify(body: Value) -> Result<FeedShape, ClientError> {
    match body {
        Value::Array(items) => Ok(FeedShape::Posts(items)),
        Value::Object(mut fields) => match fields.remove("posts") {
            Some(Value::String(url)) => Ok(FeedShape::Envelope(url)),
            _ => Err(ClientError::Format(UNEXPECTED_FORMAT.into())),
        },
        _ => Err(ClientError::Format(UNEXPECTED_FORMAT.into())),
    }
}

/// Entries that do not decode as a post are dropped from the feed.
fn parse_posts(items: Vec<Value>) -> Result<Vec<Post>, ClientError> {
    let posts = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Post>(item) {
            Ok(post) => Some(post),
            Err(e) => {
                warn!("skipping feed entry {}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(posts)
}

pub struct FeedLoader {
    api: ApiClient,
}

impl FeedLoader {
    pub fn new(api: ApiClient) -> Self {
        FeedLoader { api }
    }

    pub async fn fetch_feed(&self) -> Result<Vec<Post>, FeedError> {
        self.resolve().await.map_err(|err| {
            error!("error fetching posts: {}", err);
            FeedError::from(err)
        })
    }

    async fn resolve(&self) -> Result<Vec<Post>, ClientError> {
        let root = self.api.posts_root().await?;

        match classify(root)? {
            FeedShape::Posts(items) => parse_posts(items),
            FeedShape::Envelope(url) => {
                debug!("posts endpoint returned an envelope, following {}", url);

                match self.api.get_value(&url).await? {
                    Value::Array(items) => parse_posts(items),
                    other => {
                        error!("second feed request did not return an array: {}", other);
                        Err(ClientError::Format(INVALID_POSTS_FORMAT.into()))
                    }
                }
            }
        }
    }

    pub async fn load_view(&self) -> FeedView {
        FeedView::from(self.fetch_feed().await)
    }
}

/// The feed as the shell shows it.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedView {
    Loading,
    Loaded(Vec<Post>),
    Failed(FeedError),
}

impl FeedView {
    /// Posts to render; a failed load renders none.
    pub fn posts(&self) -> &[Post] {
        match self {
            FeedView::Loaded(posts) => posts,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.posts().is_empty()
    }
}

impl From<Result<Vec<Post>, FeedError>> for FeedView {
    fn from(result: Result<Vec<Post>, FeedError>) -> Self {
        match result {
            Ok(posts) => FeedView::Loaded(posts),
            Err(err) => FeedView::Failed(err),
        }
    }
}
