//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::forms::RegistrationForm;
use blog_core::ports::{PasswordService, TokenService};
use blog_core::{BlogService, DomainError};
use blog_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use blog_infra::database::{DatabaseConnection, connect};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    pub token_service: Arc<dyn TokenService>,
    pub password_service: Arc<dyn PasswordService>,
    pub login_url: String,
    #[cfg(feature = "postgres")]
    pub db: Option<DatabaseConnection>,
}

impl AppState {
    /// Build the state from configuration. A configured database that cannot
    /// be reached falls back to the in-memory store.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let postgres = Self::postgres(config).await;
        #[cfg(not(feature = "postgres"))]
        let postgres: Option<Self> = None;

        let state = match postgres {
            Some(state) => {
                tracing::info!("Application state initialized (postgres)");
                state
            }
            None => {
                let store = Arc::new(InMemoryStore::new());
                let state = Self::assemble(BlogService::new(store.repositories()), config);
                tracing::info!("Application state initialized (in-memory)");
                state
            }
        };

        if let Err(e) = state.seed_admin(config).await {
            tracing::error!(error = %e, "Failed to provision admin account");
        }
        state
    }

    /// Create or promote the configured staff account, if any.
    pub async fn seed_admin(&self, config: &AppConfig) -> Result<(), DomainError> {
        let Some(admin) = &config.admin else {
            return Ok(());
        };

        let form = RegistrationForm {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
        };
        let user = self
            .blog
            .ensure_staff(&form, self.password_service.as_ref())
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "Admin account ready");
        Ok(())
    }

    #[cfg(feature = "postgres")]
    async fn postgres(config: &AppConfig) -> Option<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return None;
        };

        match connect(db_config).await {
            Ok(conn) => {
                let repos = blog_infra::postgres_repositories(conn.clone());
                let mut state = Self::assemble(BlogService::new(repos), config);
                state.db = Some(conn);
                Some(state)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                None
            }
        }
    }

    /// State over an existing in-memory store.
    #[cfg(test)]
    pub fn in_memory(store: &Arc<InMemoryStore>, config: &AppConfig) -> Self {
        Self::assemble(BlogService::new(store.repositories()), config)
    }

    fn assemble(blog: BlogService, config: &AppConfig) -> Self {
        Self {
            blog: Arc::new(blog),
            token_service: Arc::new(JwtTokenService::new(config.jwt.clone())),
            password_service: Arc::new(Argon2PasswordService::new()),
            login_url: config.login_url.clone(),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
