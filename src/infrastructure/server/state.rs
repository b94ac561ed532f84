use crate::application::settings::SettingsService;
use std::sync::Arc;

pub(crate) struct ServerState {
    service: Arc<SettingsService>,
}

impl ServerState {
    pub(crate) fn new(service: Arc<SettingsService>) -> Self {
        Self { service }
    }

    pub(crate) fn service(&self) -> Arc<SettingsService> {
        Arc::clone(&self.service)
    }
}
