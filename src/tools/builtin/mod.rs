//! Built-in handlers for the invocations the engine makes mid-run.

pub mod existing;
pub mod persist;
pub mod search;

pub use existing::ExistingWorkHandler;
pub use persist::PersistResultHandler;
pub use search::FetchResultsHandler;

use std::sync::Arc;

use crate::jobs::JobStore;
use crate::search::ResultSearch;
use crate::tools::registry::HandlerRegistry;

/// Build a registry with every built-in handler registered.
pub async fn default_registry(
    search: Arc<dyn ResultSearch>,
    store: Arc<JobStore>,
) -> HandlerRegistry {
    let registry = HandlerRegistry::new();
    registry
        .register(Arc::new(FetchResultsHandler::new(search)))
        .await;
    registry
        .register(Arc::new(ExistingWorkHandler::new(store)))
        .await;
    registry.register(Arc::new(PersistResultHandler)).await;
    registry
}
