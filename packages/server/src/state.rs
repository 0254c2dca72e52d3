use std::sync::Arc;

use common::MediaStore;

use crate::config::AppConfig;
use crate::store::BlogStore;

/// Process-wide shared dependencies, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub media: Arc<dyn MediaStore>,
    pub config: Arc<AppConfig>,
}
