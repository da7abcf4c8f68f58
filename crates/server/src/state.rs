use std::sync::Arc;

use coursedex_core::{Config, CourseCatalog, CourseStore, Ingestor, QueryService};

/// Shared application state
pub struct AppState {
    store: Arc<dyn CourseStore>,
    ingestor: Ingestor,
    query: QueryService,
}

impl AppState {
    pub fn new(
        config: &Config,
        catalog: Arc<dyn CourseCatalog>,
        store: Arc<dyn CourseStore>,
    ) -> Self {
        let ingestor = Ingestor::new(catalog, Arc::clone(&store), &config.ingest);
        let query = QueryService::new(Arc::clone(&store));

        Self {
            store,
            ingestor,
            query,
        }
    }

    pub fn store(&self) -> &dyn CourseStore {
        self.store.as_ref()
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    pub fn query(&self) -> &QueryService {
        &self.query
    }
}
