use std::sync::Arc;

use crate::app::ingest::Ingestor;

#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
}
