use std::sync::Arc;

use crate::{prompts::PromptSource, trending::Clock};

/// Shared application state available to all Axum handlers via `State<AppState<S>>`.
///
/// Owned by the running server and handed to each request; nothing here is process-global.
pub struct AppState<S: PromptSource> {
    /// Where the prompt collection comes from
    pub prompts: Arc<S>,
    /// Source of "today" for the trending selection
    pub clock: Arc<dyn Clock>,
}

impl<S: PromptSource> AppState<S> {
    pub fn new(prompts: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            prompts: Arc::new(prompts),
            clock,
        }
    }
}

impl<S: PromptSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            prompts: Arc::clone(&self.prompts),
            clock: Arc::clone(&self.clock),
        }
    }
}
