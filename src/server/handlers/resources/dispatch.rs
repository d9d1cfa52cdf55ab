use std::collections::HashMap;
use std::sync::Arc;

use crate::server::db::Database;
use crate::server::resource::KINDS;

use super::ResourceHandler;

/// Maps the path segment under `/api` to the handler of that kind.
pub struct Dispatcher {
    handlers: HashMap<&'static str, ResourceHandler>,
}

impl Dispatcher {
    pub fn new(db: Arc<Database>) -> Self {
        let mut handlers = HashMap::new();
        for kind in KINDS.iter().copied() {
            handlers.insert(kind.path, ResourceHandler::new(kind, db.clone()));
        }
        Self { handlers }
    }

    pub fn get(&self, path: &str) -> Option<&ResourceHandler> {
        self.handlers.get(path)
    }
}
