use std::sync::Arc;

use crate::{
    auth::AuthService,
    config::Config,
    error::AppError,
    logo::LogoFetcher,
    repository::{init_db, Db, GroupRepository, ShortcutRepository, TodoRepository},
    storage::{build_store, ObjectStore},
};

pub struct AppState {
    pub config: Config,
    pub groups: GroupRepository,
    pub shortcuts: ShortcutRepository,
    pub todos: TodoRepository,
    pub auth: AuthService,
    pub store: Arc<dyn ObjectStore>,
    pub logos: LogoFetcher,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let db = init_db(&config.database_path).await?;
        let store = build_store(&config.storage)?;
        Self::from_parts(config, db, store)
    }

    pub fn from_parts(
        config: Config,
        db: Db,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Arc<Self>, AppError> {
        let logos = LogoFetcher::new(config.logo.clone(), store.clone())?;

        Ok(Arc::new(Self {
            groups: GroupRepository::new(db.clone()),
            shortcuts: ShortcutRepository::new(db.clone()),
            todos: TodoRepository::new(db.clone()),
            auth: AuthService::new(db, &config),
            store,
            logos,
            config,
        }))
    }
}
