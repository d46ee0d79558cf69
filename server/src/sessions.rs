//! Per-session context: explanation history and the last generated cards.
//!
//! Sessions are keyed by the `X-Session-Id` header. Least recently used
//! sessions are evicted past `max_sessions` and least recently used topics
//! past `max_topics`. Each conversation keeps at most `max_turns` exchanges,
//! and a session idle for longer than the TTL is dropped on next access.

use chrono::{DateTime, Duration, Utc};
use lp_core::ChatMessage;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

use config::SessionConfig;

/// One user prompt and the reply it got.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Turn {
    user: String,
    assistant: String
}

#[derive(Debug)]
pub struct SessionContext {
    conversations: LruCache<String, VecDeque<Turn>>,
    last_card_descriptions: Vec<String>,
    touched_at: DateTime<Utc>
}

impl SessionContext {
    fn new(max_topics: NonZeroUsize, now: DateTime<Utc>) -> Self {
        Self {
            conversations: LruCache::new(max_topics),
            last_card_descriptions: Vec::new(),
            touched_at: now
        }
    }
}

pub struct SessionStore {
    sessions: Mutex<LruCache<String, SessionContext>>,
    max_topics: NonZeroUsize,
    max_turns: usize,
    ttl: Duration
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_limits(
            config.max_sessions,
            config.max_topics,
            config.max_turns,
            i64::try_from(config.ttl_seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX)
        )
    }

    pub fn with_limits(
        max_sessions: usize,
        max_topics: usize,
        max_turns: usize,
        ttl: Duration
    ) -> Self {
        let capacity = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            max_topics: NonZeroUsize::new(max_topics).unwrap_or(NonZeroUsize::MIN),
            max_turns: max_turns.max(1),
            ttl
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prior exchanges about `topic`, oldest first, as alternating messages.
    pub fn history(&self, session_id: &str, topic: &str) -> Vec<ChatMessage> {
        self.history_at(session_id, topic, Utc::now())
    }

    pub fn record_turn(&self, session_id: &str, topic: &str, user: String, assistant: String) {
        self.record_turn_at(session_id, topic, user, assistant, Utc::now());
    }

    pub fn set_card_descriptions(&self, session_id: &str, descriptions: Vec<String>) {
        let now = Utc::now();
        let mut sessions = self.sessions.lock();
        let context = self.live_entry(&mut sessions, session_id, now);
        context.last_card_descriptions = descriptions;
        context.touched_at = now;
    }

    pub fn card_descriptions(&self, session_id: &str) -> Vec<String> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock();
        match self.live(&mut sessions, session_id, now) {
            Some(context) => {
                context.touched_at = now;
                context.last_card_descriptions.clone()
            }
            None => Vec::new()
        }
    }

    fn history_at(&self, session_id: &str, topic: &str, now: DateTime<Utc>) -> Vec<ChatMessage> {
        let mut sessions = self.sessions.lock();
        let Some(context) = self.live(&mut sessions, session_id, now) else {
            return Vec::new();
        };
        context.touched_at = now;
        context
            .conversations
            .get(topic)
            .map(|turns| {
                turns
                    .iter()
                    .flat_map(|t| [ChatMessage::user(&t.user), ChatMessage::assistant(&t.assistant)])
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record_turn_at(
        &self,
        session_id: &str,
        topic: &str,
        user: String,
        assistant: String,
        now: DateTime<Utc>
    ) {
        let mut sessions = self.sessions.lock();
        let context = self.live_entry(&mut sessions, session_id, now);
        let turns = context
            .conversations
            .get_or_insert_mut(topic.to_string(), VecDeque::new);
        turns.push_back(Turn { user, assistant });
        while turns.len() > self.max_turns {
            turns.pop_front();
        }
        context.touched_at = now;
    }

    /// The session if present and not idle past the TTL; expired ones are
    /// removed.
    fn live<'a>(
        &self,
        sessions: &'a mut LruCache<String, SessionContext>,
        session_id: &str,
        now: DateTime<Utc>
    ) -> Option<&'a mut SessionContext> {
        let expired = sessions
            .peek(session_id)
            .is_some_and(|context| now - context.touched_at > self.ttl);
        if expired {
            tracing::debug!(session_id, "Session expired");
            sessions.pop(session_id);
            return None;
        }
        sessions.get_mut(session_id)
    }

    fn live_entry<'a>(
        &self,
        sessions: &'a mut LruCache<String, SessionContext>,
        session_id: &str,
        now: DateTime<Utc>
    ) -> &'a mut SessionContext {
        let expired = sessions
            .peek(session_id)
            .is_some_and(|context| now - context.touched_at > self.ttl);
        if expired {
            sessions.pop(session_id);
        }
        sessions.get_or_insert_mut(session_id.to_string(), || {
            SessionContext::new(self.max_topics, now)
        })
    }
}
