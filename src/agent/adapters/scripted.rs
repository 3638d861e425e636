//! Scripted chat model for deterministic runs.

use crate::agent::ports::{
    AssistantTurn, ChatModel, ModelError, ModelResult, ToolCompletionRequest,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Chat model that replays queued turns in order.
///
/// Every request is recorded so tests can inspect the tools and messages the
/// agent sent. Once the queue is empty, requests fail with
/// [`ModelError::Exhausted`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedChatModel {
    state: Arc<Mutex<ScriptedState>>,
}

#[derive(Debug, Default)]
struct ScriptedState {
    turns: VecDeque<AssistantTurn>,
    requests: Vec<ToolCompletionRequest>,
}

impl ScriptedChatModel {
    /// Creates a model that will answer with `turns`.
    #[must_use]
    pub fn new(turns: impl IntoIterator<Item = AssistantTurn>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptedState {
                turns: turns.into_iter().collect(),
                requests: Vec::new(),
            })),
        }
    }

    /// Appends a turn to the script.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Transport`] when lock acquisition fails.
    pub fn push_turn(&self, turn: AssistantTurn) -> ModelResult<()> {
        self.lock()?.turns.push_back(turn);
        Ok(())
    }

    /// Returns every request received so far.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Transport`] when lock acquisition fails.
    pub fn requests(&self) -> ModelResult<Vec<ToolCompletionRequest>> {
        Ok(self.lock()?.requests.clone())
    }

    fn lock(&self) -> ModelResult<std::sync::MutexGuard<'_, ScriptedState>> {
        self.state
            .lock()
            .map_err(|err| ModelError::transport(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn ask_tool(&self, request: ToolCompletionRequest) -> ModelResult<AssistantTurn> {
        let mut state = self.lock()?;
        state.requests.push(request);
        state.turns.pop_front().ok_or(ModelError::Exhausted)
    }
}
