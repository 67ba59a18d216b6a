use lru::LruCache;
use serenity::model::channel::Message;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Recent introduction posts, kept so delete reports can show what was said.
/// The gateway only sends ids on deletion.
///
/// Also remembers intro-channel deletions that arrived before anything was
/// recorded for the id, so a late create for that post is dropped.
#[derive(Clone)]
pub struct MessageCache {
    cache: Arc<Mutex<LruCache<u64, Message>>>,
    deleted: Arc<Mutex<LruCache<u64, ()>>>,
}

const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(cap) => cap,
    None => unreachable!(),
};

impl MessageCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(FALLBACK_CAPACITY);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(cap))),
            deleted: Arc::new(Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn insert(&self, message: Message) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.put(message.id.get(), message);
    }

    /// Remove and return a cached message.
    pub fn take(&self, message_id: u64) -> Option<Message> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.pop(&message_id)
    }

    pub fn mark_deleted(&self, message_id: u64) {
        let mut deleted = self.deleted.lock().unwrap_or_else(|e| e.into_inner());
        deleted.put(message_id, ());
    }

    /// Whether `message_id` was deleted before it was seen. Clears the mark.
    pub fn take_deleted(&self, message_id: u64) -> bool {
        let mut deleted = self.deleted.lock().unwrap_or_else(|e| e.into_inner());
        deleted.pop(&message_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::id::{MessageId, UserId};

    fn mock_message(id: u64) -> Message {
        let mut msg = Message::default();
        msg.id = MessageId::new(id);
        msg.author.id = UserId::new(1);
        msg.content = format!("Message {}", id);
        msg
    }

    #[test]
    fn test_take_removes() {
        let cache = MessageCache::new(10);
        cache.insert(mock_message(1));

        let taken = cache.take(1).unwrap();
        assert_eq!(taken.content, "Message 1");
        assert!(cache.take(1).is_none());
    }

    #[test]
    fn test_cache_lru() {
        let cache = MessageCache::new(2);
        cache.insert(mock_message(1));
        cache.insert(mock_message(2));
        cache.insert(mock_message(3));

        assert!(cache.take(1).is_none()); // Evicted
        assert!(cache.take(2).is_some());
        assert!(cache.take(3).is_some());
    }

    #[test]
    fn test_zero_capacity_falls_back() {
        let cache = MessageCache::new(0);
        cache.insert(mock_message(1));
        assert!(cache.take(1).is_some());
    }

    #[test]
    fn test_deleted_mark_is_single_use() {
        let cache = MessageCache::new(10);
        assert!(!cache.take_deleted(5));

        cache.mark_deleted(5);
        assert!(cache.take_deleted(5));
        assert!(!cache.take_deleted(5));
    }
}
