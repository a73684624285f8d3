//! Per-conversation ordering on top of the pipeline.
//!
//! Messages of one conversation are handled one at a time, in arrival
//! order; different conversations run concurrently. Each conversation owns
//! a FIFO async lock (tokio's `Mutex` queues waiters fairly), dropped from
//! the table once nobody holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pl_protocol::{IncomingMessage, Reply};

use crate::pipeline::Pipeline;

type ConversationLock = Arc<tokio::sync::Mutex<()>>;

pub struct ConversationDispatcher {
    pipeline: Arc<Pipeline>,
    conversations: Mutex<HashMap<String, ConversationLock>>,
}

impl ConversationDispatcher {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Handle `message` after every earlier message of its conversation.
    pub async fn submit(&self, message: IncomingMessage) -> Reply {
        let lock = self.conversation_lock(&message.conversation_id);
        let reply = {
            let _turn = lock.lock().await;
            self.pipeline.handle(&message).await
        };
        drop(lock);
        self.prune(&message.conversation_id);
        reply
    }

    /// Conversations with a message in flight or queued.
    pub fn pending_conversations(&self) -> usize {
        self.table().len()
    }

    fn conversation_lock(&self, conversation_id: &str) -> ConversationLock {
        self.table()
            .entry(conversation_id.to_string())
            .or_default()
            .clone()
    }

    fn prune(&self, conversation_id: &str) {
        let mut table = self.table();
        if table
            .get(conversation_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(conversation_id);
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<String, ConversationLock>> {
        // The table holds no invariants a panicking holder could break.
        self.conversations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
