use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::agent::types::{Message, Session};
use crate::budget::counter::language_from_locale;
use crate::store::seed::{build_seed_messages, SeedContext};
use crate::store::{ConversationStore, SharedSession};

/// Process-local store backed by a concurrent map of per-session locks.
#[derive(Default)]
pub struct InMemoryConversationStore {
    sessions: DashMap<String, SharedSession>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_or_create(&self, session_id: &str, seed: &SeedContext) -> SharedSession {
        let entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                let language = seed.locale.as_deref().and_then(language_from_locale);
                log::info!(
                    "[{}] Creating session (language: {})",
                    session_id,
                    language.as_deref().unwrap_or("unknown")
                );
                let mut session = Session::new(session_id).with_language(language);
                for message in build_seed_messages(seed, Utc::now()) {
                    session.add_message(message);
                }
                Arc::new(Mutex::new(session))
            });

        Arc::clone(entry.value())
    }

    async fn get(&self, session_id: &str) -> Option<SharedSession> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    async fn append(&self, session_id: &str, message: Message) -> bool {
        let Some(session) = self.get(session_id).await else {
            return false;
        };

        session.lock().await.add_message(message);
        true
    }

    async fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    async fn evict_idle(&self, ttl: Duration) -> Vec<String> {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return Vec::new();
        };
        let cutoff = Utc::now() - ttl;
        let mut evicted = Vec::new();

        // A session whose lock is held is mid-turn and never idle.
        self.sessions.retain(|session_id, session| match session.try_lock() {
            Ok(guard) if guard.last_active < cutoff => {
                evicted.push(session_id.clone());
                false
            }
            _ => true,
        });

        for session_id in &evicted {
            log::warn!("[{}] Evicted idle session", session_id);
        }

        evicted
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
