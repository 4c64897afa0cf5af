use log::{info, warn};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::model::{Identity, LoginForm, RegisterForm};
use crate::session::SessionContext;

pub const LOGIN_FAILED_NOTICE: &'static str = "Login failed! Please check your credentials.";
pub const REGISTER_CONFLICT_NOTICE: &'static str = "User might already exist. Try logging in instead.";
pub const REGISTER_FAILED_NOTICE: &'static str = "Registration failed!";

/// The only writer of the session besides comment auth failures.
pub struct AuthFlow {
    api: ApiClient,
    session: SessionContext,
}

impl AuthFlow {
    pub fn new(api: ApiClient, session: SessionContext) -> Self {
        AuthFlow { api, session }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, ClientError> {
        let form = LoginForm {
            username: username.to_owned(),
            password: password.to_owned(),
        };

        let identity = self.api.login(&form).await.map_err(|e| {
            warn!("login for {} failed: {}", username, e);
            e
        })?;

        self.session.set(identity.clone())?;
        Ok(identity)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<(), ClientError> {
        self.api.register(form).await?;
        info!("registered {}", form.username);
        Ok(())
    }

    /// The local session goes away whatever the server says.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let remote = self.api.logout().await;
        if let Err(e) = &remote {
            warn!("logout request failed: {}", e);
        }

        self.session.clear()?;
        remote
    }
}

pub fn register_notice(err: &ClientError) -> &'static str {
    match err {
        ClientError::Status { status: 400, .. } => REGISTER_CONFLICT_NOTICE,
        _ => REGISTER_FAILED_NOTICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_on_register_means_conflict() {
        let err = ClientError::Status {
            status: 400,
            message: Some("Username already exists".into()),
        };
        assert_eq!(register_notice(&err), REGISTER_CONFLICT_NOTICE);
        assert_eq!(register_notice(&ClientError::NotFound { message: None }), REGISTER_FAILED_NOTICE);
    }
}
