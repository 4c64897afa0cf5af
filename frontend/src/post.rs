//! Per-post interaction state: the like toggle, the comment section and
//! the image.
//!
//! Like/unlike is optimistic. A toggle flips local state on the spot and
//! hands back a `PendingLike` that owns its request, so the controller is
//! free again before anything is sent. Local state is never rolled back.
//! Rapid toggles each carry their own request and may resolve out of
//! order, leaving the server disagreeing with the local copy until the
//! feed is reloaded.

use log::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ValidationError};
use crate::image::ImageState;
use crate::model::{Comment, Post};
use crate::session::SessionContext;

pub const NO_COMMENTS_NOTICE: &'static str = "No comments available for this post.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Liked,
    NotLiked,
}

struct LikeRequest {
    api: ApiClient,
    post_id: u64,
    liked: bool,
}

/// Local like state right after a toggle, plus the request reporting it.
/// Nothing is sent until `confirm` is awaited.
#[must_use = "the like request is only sent by `confirm`"]
pub struct PendingLike {
    pub state: LikeState,
    pub likes_count: u64,
    request: Option<LikeRequest>,
}

impl PendingLike {
    pub fn sends_request(&self) -> bool {
        self.request.is_some()
    }

    /// What the API said; local state is already updated either way.
    pub async fn confirm(self) -> Result<(), ClientError> {
        let request = match self.request {
            Some(request) => request,
            None => return Ok(()),
        };

        let result = if request.liked {
            request.api.like(request.post_id).await
        } else {
            request.api.unlike(request.post_id).await
        };

        if let Err(err) = &result {
            warn!(
                "{} on post {} failed, keeping local state: {}",
                if request.liked { "like" } else { "unlike" },
                request.post_id,
                err
            );
        }
        result
    }
}

/// Comment cache. `Loaded(vec![])` means fetched and empty, which is not
/// the same as never fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentList {
    Unloaded,
    Loaded(Vec<Comment>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSource {
    Fetched,
    Embedded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentsToggle {
    Hidden,
    Shown { source: CommentSource, count: usize },
    Unavailable,
}

pub struct PostController {
    post: Post,
    comments: CommentList,
    comments_visible: bool,
    comments_disabled: bool,
    draft: String,
    image: ImageState,
    api: ApiClient,
    session: SessionContext,
}

impl PostController {
    pub fn new(post: Post, api: ApiClient, session: SessionContext) -> Self {
        PostController {
            post,
            comments: CommentList::Unloaded,
            comments_visible: false,
            comments_disabled: false,
            draft: String::new(),
            image: ImageState::NotLoaded,
            api,
            session,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn like_state(&self) -> LikeState {
        if self.post.is_liked {
            LikeState::Liked
        } else {
            LikeState::NotLiked
        }
    }

    pub fn likes_count(&self) -> u64 {
        self.post.likes_count
    }

    pub fn comments(&self) -> &CommentList {
        &self.comments
    }

    pub fn comments_visible(&self) -> bool {
        self.comments_visible
    }

    pub fn comments_disabled(&self) -> bool {
        self.comments_disabled
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn image(&self) -> ImageState {
        self.image
    }

    /// Comments the view should list right now.
    pub fn visible_comments(&self) -> &[Comment] {
        match (&self.comments, self.comments_visible) {
            (CommentList::Loaded(comments), true) => comments,
            _ => &[],
        }
    }

    fn set_liked(&mut self, liked: bool) {
        if liked == self.post.is_liked {
            return;
        }
        if liked {
            self.post.likes_count += 1;
        } else {
            self.post.likes_count = self.post.likes_count.saturating_sub(1);
        }
        self.post.is_liked = liked;
    }

    fn pending(&self, liked: Option<bool>) -> PendingLike {
        PendingLike {
            state: self.like_state(),
            likes_count: self.post.likes_count,
            request: liked.map(|liked| LikeRequest {
                api: self.api.clone(),
                post_id: self.post.id,
                liked,
            }),
        }
    }

    pub fn toggle_like(&mut self) -> PendingLike {
        match self.like_state() {
            LikeState::NotLiked => self.like(),
            LikeState::Liked => self.unlike(),
        }
    }

    /// `NotLiked -> Liked`. Sent whether or not anyone is logged in.
    /// Already liked: no request.
    pub fn like(&mut self) -> PendingLike {
        if self.post.is_liked {
            return self.pending(None);
        }

        self.set_liked(true);
        self.pending(Some(true))
    }

    /// `Liked -> NotLiked`. Not liked: no request.
    pub fn unlike(&mut self) -> PendingLike {
        if !self.post.is_liked {
            return self.pending(None);
        }

        self.set_liked(false);
        self.pending(Some(false))
    }

    /// Reveals the comment section, or hides it if it is already showing
    /// loaded comments.
    pub async fn load_comments(&mut self) -> CommentsToggle {
        if self.comments_visible && matches!(self.comments, CommentList::Loaded(_)) {
            self.comments_visible = false;
            return CommentsToggle::Hidden;
        }

        debug!("loading comments for post {}", self.post.id);
        let fetched = self.api.comments(self.post.id).await;
        match fetched {
            Ok(comments) => {
                let count = comments.len();
                self.comments = CommentList::Loaded(comments);
                self.comments_visible = true;
                CommentsToggle::Shown {
                    source: CommentSource::Fetched,
                    count,
                }
            }
            Err(err) => {
                warn!("error loading comments for post {}: {}", self.post.id, err);

                match &self.post.comments {
                    Some(embedded) => {
                        let count = embedded.len();
                        self.comments = CommentList::Loaded(embedded.clone());
                        self.comments_visible = true;
                        CommentsToggle::Shown {
                            source: CommentSource::Embedded,
                            count,
                        }
                    }
                    None => CommentsToggle::Unavailable,
                }
            }
        }
    }

    pub async fn add_comment(&mut self, text: &str) -> Result<Comment, ClientError> {
        self.set_draft(text);
        self.submit_comment().await
    }

    /// Posts the current draft. Session and text are checked before any
    /// request goes out; the draft is only cleared on success.
    pub async fn submit_comment(&mut self) -> Result<Comment, ClientError> {
        let identity = self.session.current().ok_or(ValidationError::NoSession)?;

        if self.draft.trim().is_empty() {
            return Err(ValidationError::EmptyComment.into());
        }

        if self.comments_disabled {
            return Err(ClientError::NotFound { message: None });
        }

        let created = self.api.add_comment(self.post.id, &self.draft).await;
        match created {
            Ok(mut comment) => {
                comment.user = Some(identity.as_user_ref());

                if let CommentList::Unloaded = self.comments {
                    self.comments = CommentList::Loaded(self.post.comments.clone().unwrap_or_default());
                }
                if let CommentList::Loaded(comments) = &mut self.comments {
                    comments.push(comment.clone());
                }

                self.draft.clear();
                Ok(comment)
            }
            Err(err) => {
                match &err {
                    ClientError::Auth { status, .. } => {
                        info!("comment rejected with {}, dropping session", status);
                        if let Err(e) = self.session.clear() {
                            warn!("could not clear stored session: {}", e);
                        }
                    }
                    ClientError::NotFound { .. } => {
                        warn!("comments endpoint missing, disabling comment input");
                        self.comments_disabled = true;
                    }
                    other => warn!("error adding comment to post {}: {}", self.post.id, other),
                }
                Err(err)
            }
        }
    }

    /// Fetches the image once. An errored image is never retried.
    pub async fn load_image(&mut self) -> ImageState {
        let url = match (&self.post.image_url, self.image) {
            (Some(url), ImageState::NotLoaded) => url.clone(),
            _ => return self.image,
        };

        match self.api.fetch(&url).await {
            Ok(response) if response.is_success() => self.image.on_load(),
            Ok(response) => {
                debug!("image {} answered {}", url, response.status);
                self.image.on_error();
            }
            Err(err) => {
                debug!("image {} failed: {}", url, err);
                self.image.on_error();
            }
        }
        self.image
    }
}

/// User-facing notice for a failed comment add.
pub fn comment_notice(err: &ClientError) -> &'static str {
    match err {
        ClientError::Validation(ValidationError::NoSession) => "Please login to comment!",
        ClientError::Validation(ValidationError::EmptyComment) => "Please enter a comment!",
        ClientError::Auth { .. } => "Please login to comment.",
        ClientError::NotFound { .. } => "Comments feature is not available yet.",
        _ => "Error adding comment. Please try again.",
    }
}
