use std::sync::Arc;

use crate::booking::{BookingWorkflow, Store};
use crate::config::Config;
use crate::notify::Dispatcher;

/// The shared storage backend, behind a trait object so either backend can serve.
pub type SharedStore = Arc<dyn Store>;

/// State handed to every HTTP handler.
pub struct AppState {
    pub store: SharedStore,
    pub workflow: BookingWorkflow<SharedStore>,
    pub config: Config,
}

impl AppState {
    /// Wires the workflow on top of `store` using the policy from `config`.
    pub fn new(store: SharedStore, dispatcher: Dispatcher, config: Config) -> Self {
        let workflow = BookingWorkflow::new(store.clone(), dispatcher, config.policy());
        Self {
            store,
            workflow,
            config,
        }
    }
}
