use crate::page::PageHandle;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Front of the page task this server controls
    pub page: PageHandle,
}

impl AppState {
    pub fn new(page: PageHandle) -> Self {
        Self { page }
    }
}
