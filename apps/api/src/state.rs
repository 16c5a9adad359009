use std::sync::Arc;

use crate::cache::ProfileCache;
use crate::consistency::CrossValidator;
use crate::matching::MappingTable;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Immutable after startup.
    pub mapping: Arc<MappingTable>,
    pub cross_validator: Arc<CrossValidator>,
    /// Postgres or in-memory, chosen by `CACHE_BACKEND`.
    pub cache: Arc<dyn ProfileCache>,
}
