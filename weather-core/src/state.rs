//! Explicit state container for a form session.
//!
//! Front ends mutate the query only by dispatching [`QueryAction`]s. Every
//! dispatch is followed by a notification to all subscribers, and the current
//! state can be pulled at any time with [`QueryStore::snapshot`].

use std::fmt;
use tracing::debug;

use crate::model::{QueryConfig, TimeFrameMode, TimeFrameValue, Variable};

/// One field-level mutation of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAction {
    SetLocation(String),
    ToggleVariable(Variable),
    SetTimeFrameMode(TimeFrameMode),
    SetTimeFrameValue(TimeFrameValue),
    ClearTimeFrameValue,
}

impl QueryAction {
    pub fn apply(&self, config: &mut QueryConfig) {
        match self {
            QueryAction::SetLocation(location) => config.set_location(location.as_str()),
            QueryAction::ToggleVariable(variable) => config.toggle_variable(*variable),
            QueryAction::SetTimeFrameMode(mode) => config.set_time_frame_mode(*mode),
            QueryAction::SetTimeFrameValue(value) => config.set_time_frame_value(*value),
            QueryAction::ClearTimeFrameValue => config.clear_time_frame_value(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&QueryConfig, &QueryAction)>;

/// Owns the [`QueryConfig`] of one form session.
#[derive(Default)]
pub struct QueryStore {
    config: QueryConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl QueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QueryConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Owned copy of the current state, e.g. to hand to the serializer.
    pub fn snapshot(&self) -> QueryConfig {
        self.config.clone()
    }

    pub fn is_export_ready(&self) -> bool {
        self.config.is_export_ready()
    }

    /// Apply `action`, then notify subscribers in subscription order.
    pub fn dispatch(&mut self, action: QueryAction) {
        action.apply(&mut self.config);
        debug!(?action, ready = self.config.is_export_ready(), "query updated");

        for (_, listener) in &mut self.listeners {
            listener(&self.config, &action);
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&QueryConfig, &QueryAction) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }
}

impl fmt::Debug for QueryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryStore")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
