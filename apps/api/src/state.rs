use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::generator::IdeaGenerator;
use crate::ideas::enhancer::IdSource;
use crate::ideas::export::Clipboard;
use crate::ideas::session::IdeaSession;
use crate::persistence::PersistenceAdapter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single active session. Never locked across a generator call.
    pub session: Arc<Mutex<IdeaSession>>,
    /// Pluggable generator. Default: HttpIdeaGenerator against GENERATOR_URL.
    pub generator: Arc<dyn IdeaGenerator>,
    pub persistence: PersistenceAdapter,
    pub ids: Arc<dyn IdSource>,
    /// Present only when CLIPBOARD_COMMAND is set.
    pub clipboard: Option<Arc<dyn Clipboard>>,
    pub config: Config,
}
