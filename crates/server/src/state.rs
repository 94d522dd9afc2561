use std::sync::Arc;
use velonet::{
    feed::{HttpFeed, StationFeed},
    stations::StationCache,
    store::GraphStore,
};

pub struct AppState<F: StationFeed = HttpFeed> {
    pub store: GraphStore,
    pub stations: StationCache<F>,
    pub access_token: Option<Arc<str>>,
}

impl<F: StationFeed> AppState<F> {
    pub fn new(store: GraphStore, stations: StationCache<F>) -> Self {
        Self {
            store,
            stations,
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.map(Into::into);
        self
    }
}
