use std::sync::Arc;

use crate::remote::{RemoteClient, ResumeOptimizer};
use crate::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    /// Remote backend client, used for sign-in. `None` when REMOTE_API_URL is unset.
    pub remote: Option<RemoteClient>,
    /// Pluggable optimizer. Default: the remote client. `None` means local scoring only.
    pub optimizer: Option<Arc<dyn ResumeOptimizer>>,
}
