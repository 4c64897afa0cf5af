use std::fmt::Write;

use chrono::DateTime;

use crate::feed::FeedView;
use crate::model::{Comment, Identity, UserRef};
use crate::post::{LikeState, PostController};
use crate::session::Presence;

pub const UNKNOWN_USER: &'static str = "Unknown User";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Feed,
    Login,
    Profile(u64),
}

impl Route {
    /// Unknown paths land on the feed.
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Route::Login,
            ["profile", user_id] => user_id.parse().map(Route::Profile).unwrap_or(Route::Feed),
            _ => Route::Feed,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Feed => "/".into(),
            Route::Login => "/login".into(),
            Route::Profile(user_id) => format!("/profile/{user_id}"),
        }
    }
}

pub fn avatar_initial(username: Option<&str>) -> char {
    username
        .and_then(|name| name.chars().next())
        .map(|c| c.to_uppercase().next().unwrap_or(c))
        .unwrap_or('U')
}

fn display_name(user: Option<&UserRef>) -> &str {
    user.map(|u| u.username.as_str()).unwrap_or(UNKNOWN_USER)
}

pub fn format_post_time(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.format("%B %-d, %Y at %I:%M %p").to_string())
        .unwrap_or_else(|_| raw.to_owned())
}

pub fn format_comment_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|_| raw.to_owned())
}

pub fn render_header(presence: &Presence) -> String {
    match presence {
        Presence::Authenticated(Identity { username, .. }) => {
            format!("Instagram | Home | Welcome, {username} | Logout")
        }
        Presence::Anonymous => "Instagram | Home | Login".into(),
    }
}

fn render_comment(out: &mut String, comment: &Comment) {
    let _ = writeln!(
        out,
        "  {}: {} ({})",
        display_name(comment.user.as_ref()),
        comment.content,
        format_comment_date(&comment.created_at)
    );
}

pub fn render_post(controller: &PostController) -> String {
    let post = controller.post();
    let author = display_name(post.user.as_ref());
    let mut out = String::new();

    let _ = writeln!(
        out,
        "[{}] {}",
        avatar_initial(post.user.as_ref().map(|u| u.username.as_str())),
        author
    );

    match controller.image().placeholder(post.image_url.is_some()) {
        Some(placeholder) => {
            let _ = writeln!(out, "({placeholder})");
        }
        None => {
            let _ = writeln!(out, "<image {}>", post.image_url.as_deref().unwrap_or_default());
        }
    }

    let heart = match controller.like_state() {
        LikeState::Liked => "♥",
        LikeState::NotLiked => "♡",
    };
    let _ = writeln!(out, "{heart} {} likes", controller.likes_count());
    let _ = writeln!(out, "{author} {}", post.content);

    if controller.comments_visible() {
        let comments = controller.visible_comments();
        let _ = writeln!(out, "Comments ({})", comments.len());
        if comments.is_empty() {
            let _ = writeln!(out, "  No comments yet. Be the first to comment!");
        }
        for comment in comments {
            render_comment(&mut out, comment);
        }
        if !controller.session().is_authenticated() {
            let _ = writeln!(out, "  Login to comment");
        }
    }

    let _ = writeln!(out, "{}", format_post_time(&post.created_at));
    out
}

pub fn render_feed(view: &FeedView, controllers: &[PostController]) -> String {
    match view {
        FeedView::Loading => "Loading posts...\n".into(),
        FeedView::Failed(err) => {
            format!("Error loading feed\n{}\nRetry by reloading the feed.\n", err.message)
        }
        FeedView::Loaded(posts) if posts.is_empty() => {
            "No posts found\nFollow some users or create your first post!\n".into()
        }
        FeedView::Loaded(_) => controllers
            .iter()
            .map(render_post)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_profile(user_id: u64) -> String {
    format!("User Profile\nUser ID: {user_id}\nProfile page coming soon!\n")
}
