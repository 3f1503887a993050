use std::collections::HashMap;
use std::time::{Duration, Instant};

/// The question a user picked to answer, held between selecting it and
/// submitting the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerDraft {
    pub user_id: i64,
    pub question_id: i64,
    pub question: String,
}

/// Ephemeral in-memory store of answer drafts, keyed by a random token that
/// travels with the new-post form. Each user holds at most one draft, and
/// drafts expire after the configured TTL.
pub struct DraftStore {
    drafts: HashMap<String, (Instant, AnswerDraft)>,
    ttl: Duration,
}

impl DraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            drafts: HashMap::new(),
            ttl,
        }
    }

    /// Store a draft and return its token. Replaces any earlier draft by the same user.
    pub fn insert(&mut self, draft: AnswerDraft) -> String {
        self.clear_stale();
        self.drafts
            .retain(|_, (_, existing)| existing.user_id != draft.user_id);

        let token = uuid::Uuid::now_v7().to_string();
        self.drafts.insert(token.clone(), (Instant::now(), draft));
        token
    }

    /// Look up a live draft without consuming it. Drafts are only visible to
    /// the user who created them.
    pub fn get(&self, token: &str, user_id: i64) -> Option<AnswerDraft> {
        let (created, draft) = self.drafts.get(token)?;
        if created.elapsed() >= self.ttl || draft.user_id != user_id {
            return None;
        }
        Some(draft.clone())
    }

    /// Drop a draft once its answer has been published.
    pub fn remove(&mut self, token: &str) {
        self.drafts.remove(token);
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    fn clear_stale(&mut self) {
        let ttl = self.ttl;
        self.drafts.retain(|_, (t, _)| t.elapsed() < ttl);
    }
}
