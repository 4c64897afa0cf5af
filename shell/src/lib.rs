extern crate env_logger;
extern crate instafeed_frontend;
extern crate log;

pub mod cli;

use std::io::Write;
use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use instafeed_frontend::auth::{register_notice, AuthFlow, LOGIN_FAILED_NOTICE};
use instafeed_frontend::error::{ClientError, FeedError};
use instafeed_frontend::feed::FeedLoader;
use instafeed_frontend::model::RegisterForm;
use instafeed_frontend::post::{comment_notice, CommentsToggle, PostController, NO_COMMENTS_NOTICE};
use instafeed_frontend::session::{FileStorage, SessionContext};
use instafeed_frontend::transport::{HttpTransport, Transport};
use instafeed_frontend::view::{self, Route};
use instafeed_frontend::{ApiClient, ClientConfig};

use crate::cli::Command;

pub fn init_logger() {
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

pub const LOGOUT_STORAGE_NOTICE: &'static str =
    "Logged out for now, but the saved session could not be removed and will return next run.";

#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("{0}")]
    Feed(#[from] FeedError),

    #[error("post {0} is not in the feed")]
    PostNotFound(u64),
}

/// Routes commands to views and renders them as text.
pub struct Shell {
    api: ApiClient,
    session: SessionContext,
}

impl Shell {
    pub fn new(api: ApiClient, session: SessionContext) -> Self {
        Shell { api, session }
    }

    pub fn connect(config: &ClientConfig) -> Result<Self, ShellError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        let api = ApiClient::new(transport, config.api_base.clone());
        let session = SessionContext::from_storage(Arc::new(FileStorage::new(&config.storage_path)));

        info!("using API at {}", config.api_base);
        Ok(Shell::new(api, session))
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn header(&self) -> String {
        view::render_header(&self.session.presence())
    }

    pub async fn run(&self, command: Command) -> Result<String, ShellError> {
        let body = match command {
            Command::Feed => self.feed().await,
            Command::Open { path } => self.open(Route::parse(&path)).await,
            Command::Profile { user } => self.open(Route::Profile(user)).await,
            Command::Login { username, password } => self.login(&username, &password).await,
            Command::Register {
                demo,
                username,
                email,
                password,
            } => {
                let form = if demo {
                    RegisterForm::demo()
                } else {
                    let password = password.unwrap_or_default();
                    RegisterForm {
                        username: username.unwrap_or_default(),
                        email: email.unwrap_or_default(),
                        password2: password.clone(),
                        password,
                    }
                };
                self.register(&form).await
            }
            Command::Logout => self.logout().await,
            Command::Like { post } => self.like(post).await?,
            Command::Comments { post } => self.comments(post).await?,
            Command::Comment { post, text } => self.comment(post, &text).await?,
        };

        Ok(format!("{}\n\n{}", self.header(), body))
    }

    async fn open(&self, route: Route) -> String {
        match route {
            Route::Feed => self.feed().await,
            Route::Login => "Log in with `instafeed login <username> <password>`.\n\
                             Demo credentials: demo_user / demopass123\n"
                .into(),
            Route::Profile(user_id) => view::render_profile(user_id),
        }
    }

    fn controllers(&self, posts: &[instafeed_frontend::Post]) -> Vec<PostController> {
        posts
            .iter()
            .cloned()
            .map(|post| PostController::new(post, self.api.clone(), self.session.clone()))
            .collect()
    }

    async fn feed(&self) -> String {
        let feed_view = FeedLoader::new(self.api.clone()).load_view().await;
        let mut controllers = self.controllers(feed_view.posts());

        for controller in controllers.iter_mut() {
            controller.load_image().await;
        }

        view::render_feed(&feed_view, &controllers)
    }

    /// Reloads the feed and picks out one post to act on.
    async fn controller_for(&self, post_id: u64) -> Result<PostController, ShellError> {
        let posts = FeedLoader::new(self.api.clone()).fetch_feed().await?;

        posts
            .into_iter()
            .find(|post| post.id == post_id)
            .map(|post| PostController::new(post, self.api.clone(), self.session.clone()))
            .ok_or(ShellError::PostNotFound(post_id))
    }

    async fn login(&self, username: &str, password: &str) -> String {
        match AuthFlow::new(self.api.clone(), self.session.clone())
            .login(username, password)
            .await
        {
            Ok(_) => format!("Login successful!\n\n{}", self.feed().await),
            Err(_) => format!("{LOGIN_FAILED_NOTICE}\n"),
        }
    }

    async fn register(&self, form: &RegisterForm) -> String {
        match AuthFlow::new(self.api.clone(), self.session.clone())
            .register(form)
            .await
        {
            Ok(()) => format!(
                "User {} created! You can now log in with it.\n",
                form.username
            ),
            Err(err) => format!("{}\n", register_notice(&err)),
        }
    }

    async fn logout(&self) -> String {
        let notice = match AuthFlow::new(self.api.clone(), self.session.clone())
            .logout()
            .await
        {
            Ok(()) => String::new(),
            Err(ClientError::Storage(e)) => {
                warn!("saved session could not be removed: {}", e);
                format!("{LOGOUT_STORAGE_NOTICE} ({e})\n\n")
            }
            Err(e) => {
                info!("logout request failed, session cleared locally: {}", e);
                String::new()
            }
        };

        format!("{notice}{}", self.feed().await)
    }

    async fn like(&self, post_id: u64) -> Result<String, ShellError> {
        let mut controller = self.controller_for(post_id).await?;
        // the post keeps its optimistic state whatever the API answers
        controller.toggle_like().confirm().await.ok();
        Ok(view::render_post(&controller))
    }

    async fn comments(&self, post_id: u64) -> Result<String, ShellError> {
        let mut controller = self.controller_for(post_id).await?;

        let notice = match controller.load_comments().await {
            CommentsToggle::Unavailable => format!("{NO_COMMENTS_NOTICE}\n"),
            _ => String::new(),
        };

        Ok(format!("{notice}{}", view::render_post(&controller)))
    }

    async fn comment(&self, post_id: u64, text: &str) -> Result<String, ShellError> {
        let mut controller = self.controller_for(post_id).await?;
        controller.load_comments().await;

        match controller.add_comment(text).await {
            Ok(_) => Ok(view::render_post(&controller)),
            Err(err) if err.is_auth() => Ok(format!(
                "{}\n\n{}",
                comment_notice(&err),
                self.open(Route::Login).await
            )),
            Err(err) => Ok(format!(
                "{}\n\n{}",
                comment_notice(&err),
                view::render_post(&controller)
            )),
        }
    }
}
