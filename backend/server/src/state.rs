use std::sync::Arc;

use super::{
    config::Config,
    database::{ThoughtStore, init_store},
    error::StartupError,
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ThoughtStore>,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>, StartupError> {
        let config = Config::load()?;

        let store = init_store(&config.mongo_url).await?;

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn ThoughtStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
