//! Auth Service
//!
//! Two kinds of account can log in: the single admin from the config file
//! (plaintext, id 0) and database users (bcrypt).

use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{hash_password, verify_password, AuthError, Claims, TokenService};
use crate::config::{persist_admin_password, AdminCredentials, Config};
use crate::domain::{require_text, DomainError};
use crate::error::AppError;
use crate::repository::{Db, UserRepository};

/// Id carried in tokens issued to the config-file admin
pub const ADMIN_USER_ID: i64 = 0;

pub struct AuthService {
    users: UserRepository,
    tokens: TokenService,
    admin: RwLock<Option<AdminCredentials>>,
    config_path: Option<PathBuf>,
    bcrypt_cost: u32,
    allow_registration: bool,
}

impl AuthService {
    pub fn new(db: Db, config: &Config) -> Self {
        Self {
            users: UserRepository::new(db),
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl_hours),
            admin: RwLock::new(config.admin.clone()),
            config_path: config.source.clone(),
            bcrypt_cost: config.bcrypt_cost,
            allow_registration: config.allow_registration,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        {
            let admin = self.admin.read().await;
            if let Some(admin) = admin.as_ref().filter(|a| a.username == username) {
                if admin.password != password {
                    warn!("Failed admin login for {}", username);
                    return Err(AuthError::InvalidCredentials.into());
                }
                info!("Admin {} logged in", username);
                return Ok(self.tokens.issue(ADMIN_USER_ID, username)?);
            }
        }

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password.to_string(), user.password).await? {
            warn!("Failed login for {}", username);
            return Err(AuthError::InvalidCredentials.into());
        }

        info!("User {} logged in", username);
        Ok(self.tokens.issue(user.id, &user.username)?)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<i64, AppError> {
        if !self.allow_registration {
            return Err(AuthError::RegistrationDisabled.into());
        }
        require_text("username", username)?;
        require_text("password", password)?;

        let reserved = self
            .admin
            .read()
            .await
            .as_ref()
            .is_some_and(|a| a.username == username);
        if reserved {
            return Err(DomainError::InvalidInput(format!(
                "Username {} is already taken",
                username
            ))
            .into());
        }

        let hash = hash_password(password.to_string(), self.bcrypt_cost).await?;
        let id = self.users.create(username, &hash).await?;
        info!("Registered user {} ({})", username, id);
        Ok(id)
    }

    pub async fn change_password(
        &self,
        claims: &Claims,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        require_text("newPassword", new_password)?;

        if claims.user_id == ADMIN_USER_ID {
            let mut admin = self.admin.write().await;
            if let Some(admin) = admin.as_mut().filter(|a| a.username == claims.username) {
                if admin.password != old_password {
                    return Err(AuthError::InvalidCredentials.into());
                }
                if let Some(path) = &self.config_path {
                    persist_admin_password(path, new_password)
                        .map_err(|e| AppError::Internal(e.to_string()))?;
                }
                admin.password = new_password.to_string();
                info!("Admin password changed");
                return Ok(());
            }
        }

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {}", claims.username)))?;

        if !verify_password(old_password.to_string(), user.password).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let hash = hash_password(new_password.to_string(), self.bcrypt_cost).await?;
        self.users.update_password(user.id, &hash).await?;
        info!("Password changed for {}", user.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::init_db;
    use std::path::Path;

    async fn service(admin: Option<AdminCredentials>, allow_registration: bool) -> AuthService {
        let db = init_db(Path::new(":memory:")).await.unwrap();
        let mut config = Config::default();
        config.jwt_secret = "test-secret".to_string();
        config.bcrypt_cost = 4;
        config.admin = admin;
        config.allow_registration = allow_registration;
        AuthService::new(db, &config)
    }

    fn admin() -> Option<AdminCredentials> {
        Some(AdminCredentials {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        })
    }

    #[tokio::test]
    async fn test_admin_login() {
        let auth = service(admin(), false).await;

        let token = auth.login("admin", "admin123").await.unwrap();
        let claims = auth.tokens().verify(&token).unwrap();
        assert_eq!(claims.user_id, ADMIN_USER_ID);
        assert_eq!(claims.username, "admin");

        assert!(matches!(
            auth.login("admin", "wrong").await,
            Err(AppError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_credentials() {
        let auth = service(None, true).await;
        assert!(matches!(
            auth.login("ghost", "pw").await,
            Err(AppError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service(admin(), true).await;

        let id = auth.register("alice", "wonderland").await.unwrap();
        let claims = auth
            .tokens()
            .verify(&auth.login("alice", "wonderland").await.unwrap())
            .unwrap();
        assert_eq!(claims.user_id, id);

        assert!(auth.register("alice", "again").await.is_err());
        assert!(auth.register("admin", "shadow").await.is_err());
    }

    #[tokio::test]
    async fn test_register_disabled() {
        let auth = service(None, false).await;
        assert!(matches!(
            auth.register("bob", "pw").await,
            Err(AppError::Auth(AuthError::RegistrationDisabled))
        ));
    }

    #[tokio::test]
    async fn test_change_password_for_user() {
        let auth = service(None, true).await;
        auth.register("carol", "first").await.unwrap();
        let token = auth.login("carol", "first").await.unwrap();
        let claims = auth.tokens().verify(&token).unwrap();

        assert!(auth.change_password(&claims, "nope", "second").await.is_err());
        auth.change_password(&claims, "first", "second").await.unwrap();

        assert!(auth.login("carol", "first").await.is_err());
        assert!(auth.login("carol", "second").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_admin_password_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "admin": { "username": "admin", "password": "admin123" } }"#)
            .unwrap();

        let db = init_db(Path::new(":memory:")).await.unwrap();
        let mut config = Config::from_file(&path, crate::config::RunMode::Dev).unwrap();
        config.jwt_secret = "test-secret".to_string();
        let auth = AuthService::new(db, &config);

        let claims = auth.tokens().verify(&auth.login("admin", "admin123").await.unwrap()).unwrap();
        auth.change_password(&claims, "admin123", "s3cret").await.unwrap();

        assert!(auth.login("admin", "s3cret").await.is_ok());
        let reloaded = Config::from_file(&path, crate::config::RunMode::Dev).unwrap();
        assert_eq!(reloaded.admin.unwrap().password, "s3cret");
    }
}
