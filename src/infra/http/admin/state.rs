use std::sync::Arc;

use crate::{application::repos::HealthRepo, cache::QueryCache};

#[derive(Clone)]
pub struct AdminState {
    pub cache: QueryCache,
    pub health: Arc<dyn HealthRepo>,
}
