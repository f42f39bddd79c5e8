//! Conversation storage.
//!
//! A store maps an opaque session id to one message log. Sessions are created
//! lazily and seeded with system messages on first reference. Each session sits
//! behind its own async mutex so one turn at a time can mutate it, while
//! different sessions never contend.

pub mod memory;
pub mod seed;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::agent::types::{Message, Session};

pub use memory::InMemoryConversationStore;
pub use seed::{build_seed_messages, SeedContext};

pub type SharedSession = Arc<Mutex<Session>>;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Return the session for `session_id`, seeding it from `seed` if unseen.
    /// Later calls for the same id ignore `seed`.
    async fn get_or_create(&self, session_id: &str, seed: &SeedContext) -> SharedSession;

    async fn get(&self, session_id: &str) -> Option<SharedSession>;

    /// Append to an existing session; returns false if the session is unknown.
    async fn append(&self, session_id: &str, message: Message) -> bool;

    async fn remove(&self, session_id: &str) -> bool;

    /// Drop sessions idle for longer than `ttl`, returning their ids.
    async fn evict_idle(&self, ttl: Duration) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
