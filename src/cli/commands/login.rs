use anyhow::{bail, Result};

use draftline::auth::{self, AuthPageProps, AuthenticationPage, EnvTokenAuthenticator};

use super::{Command, Session};

pub struct LoginCommand {
    pub host: String,
}

impl Command for LoginCommand {
    async fn execute(&self, session: &Session) -> Result<()> {
        let backend_config = &session.config.backend;
        let mut page = AuthenticationPage::new(AuthPageProps {
            base_url: backend_config.base_url.clone(),
            site_id: backend_config.site_id.clone(),
            provider: backend_config.auth_provider.clone(),
            in_progress: false,
        });
        println!("🔐 {}", page.render().button_label);

        page.set_in_progress(true);
        let mut credentials = None;
        page.handle_login(&self.host, &EnvTokenAuthenticator, |c| credentials = Some(c))
            .await;
        page.set_in_progress(false);

        let Some(credentials) = credentials else {
            let view = page.render();
            bail!("{}", view.error.unwrap_or_else(|| "Login failed".to_string()));
        };

        auth::login_user(
            session.workflow.backend(),
            session.dispatch(),
            &session.config.notifications,
            &credentials,
        )
        .await;

        match session.store.state().auth.user {
            Some(user) => {
                println!("✅ Logged in as {} ({})", user.login, user.backend_name);
                Ok(())
            }
            None => {
                session.report_notifications()?;
                bail!("Login failed")
            }
        }
    }
}
