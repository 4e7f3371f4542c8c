use std::sync::Arc;

use super::{config::test_config, model::ScriptedModel, store::StubStore};
use crate::{ai::Completion, app::AppContext, environment::Environment};

/// Context backed by an empty [`StubStore`] and a model with no script.
///
/// # Panics
/// Panics when the context cannot be assembled.
pub async fn get_app_context() -> AppContext {
    app_context_with(StubStore::default(), Vec::new())
}

/// Context backed by `store` and a model replaying `script`.
///
/// # Panics
/// Panics when the context cannot be assembled.
#[must_use]
pub fn app_context_with(store: StubStore, script: Vec<Completion>) -> AppContext {
    AppContext::assemble(
        Environment::Test,
        test_config(),
        Arc::new(store),
        Arc::new(ScriptedModel::new(script)),
    )
    .unwrap()
}
