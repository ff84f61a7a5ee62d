use std::sync::Arc;

use crate::{Config, ai::AiService, model::ModelManager};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    config: &'static Config,
    ai: Arc<AiService>,
}

impl AppState {
    pub fn new(mm: ModelManager, config: &'static Config, ai: Arc<AiService>) -> Self {
        Self { mm, config, ai }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn config(&self) -> &'static Config {
        self.config
    }

    pub fn ai(&self) -> &AiService {
        &self.ai
    }
}
