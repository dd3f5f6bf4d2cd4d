use std::sync::Arc;

use dog_flags::{FlagsApp, ToggleService};

#[derive(Clone)]
pub struct FlagsAxumState {
    pub service: Arc<dyn ToggleService>,
}

impl FlagsAxumState {
    pub fn new(app: &FlagsApp) -> Self {
        Self {
            service: app.service(),
        }
    }
}
