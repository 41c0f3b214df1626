use std::sync::Arc;

use crate::analysis::CheckService;

#[derive(Clone)]
pub struct HandlerState {
    pub service: Arc<CheckService>,
}

impl HandlerState {
    pub fn new(service: Arc<CheckService>) -> Self {
        Self { service }
    }
}
