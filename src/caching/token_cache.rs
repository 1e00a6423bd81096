//! 프로세스 내 TTL + LRU 캐시
//!
//! Bearer 토큰 검증, Basic 인증, 조직 조회처럼 업스트림 왕복이 필요한 결과를 짧게 보관합니다.
//! 용량을 넘으면 가장 오래 사용되지 않은 항목부터 밀어내고, 만료된 항목은 조회 시점에 제거됩니다.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// 용량 제한과 항목별 TTL 을 가진 스레드 안전 캐시
pub struct TokenCache<V> {
    /// 용량이 0 이면 `None`
    inner: Option<Mutex<LruCache<String, CacheEntry<V>>>>,
    ttl: Duration,
}

fn purge_expired_entries<V>(entries: &mut LruCache<String, CacheEntry<V>>, now: Instant) -> usize {
    let expired: Vec<String> = entries
        .iter()
        .filter(|(_, e)| e.expires_at <= now)
        .map(|(k, _)| k.clone())
        .collect();
    for key in &expired {
        entries.pop(key);
    }
    expired.len()
}

impl<V: Clone> TokenCache<V> {
    /// `capacity` 가 0 이면 아무것도 저장하지 않습니다.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.inner.as_ref()?.lock().unwrap_or_else(PoisonError::into_inner);

        if entries.peek(key)?.expires_at <= Instant::now() {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    pub fn insert(&self, key: String, value: V) {
        self.insert_with_ttl(key, value, self.ttl);
    }

    /// 기본 TTL 과 `ttl` 중 짧은 쪽으로 저장합니다.
    pub fn insert_with_ttl(&self, key: String, value: V, ttl: Duration) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };
        if ttl.is_zero() {
            return;
        }

        let mut entries = inner.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        // 살아있는 항목이 밀려나기 전에 만료된 항목부터 비웁니다
        if !entries.contains(&key) && entries.len() >= entries.cap().get() {
            purge_expired_entries(&mut entries, now);
        }

        entries.put(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl.min(self.ttl),
            },
        );
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        let mut entries = self.inner.as_ref()?.lock().unwrap_or_else(PoisonError::into_inner);
        entries.pop(key).map(|e| e.value)
    }

    /// 만료된 항목을 모두 제거하고 제거된 개수를 반환합니다.
    pub fn purge_expired(&self) -> usize {
        match self.inner.as_ref() {
            Some(inner) => {
                let mut entries = inner.lock().unwrap_or_else(PoisonError::into_inner);
                purge_expired_entries(&mut entries, Instant::now())
            }
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.lock().unwrap_or_else(PoisonError::into_inner).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_get_after_insert() {
        let cache = TokenCache::new(4, Duration::from_secs(60));
        cache.insert("a".to_string(), 1);

        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_a_miss_and_removed() {
        let cache = TokenCache::new(4, Duration::from_millis(20));
        cache.insert("a".to_string(), 1);
        sleep(Duration::from_millis(40));

        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = TokenCache::new(2, Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        // a 를 최근 사용으로 갱신
        assert_eq!(cache.get("a"), Some(1));

        cache.insert("c".to_string(), 3);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = TokenCache::new(2, Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("a".to_string(), 10);

        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let cache = TokenCache::new(3, Duration::from_secs(60));
        for i in 0..100 {
            cache.insert(format!("k{}", i), i);
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("k99"), Some(99));
        assert_eq!(cache.get("k96"), None);
    }

    #[test]
    fn test_expired_entries_are_purged_before_eviction() {
        let cache = TokenCache::new(2, Duration::from_secs(60));
        cache.insert_with_ttl("short".to_string(), 1, Duration::from_millis(10));
        cache.insert("long".to_string(), 2);
        sleep(Duration::from_millis(30));

        cache.insert("new".to_string(), 3);
        assert_eq!(cache.get("long"), Some(2));
        assert_eq!(cache.get("new"), Some(3));
    }

    #[test]
    fn test_shorter_ttl_wins() {
        let cache = TokenCache::new(2, Duration::from_millis(20));
        cache.insert_with_ttl("a".to_string(), 1, Duration::from_secs(3600));
        sleep(Duration::from_millis(40));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = TokenCache::new(0, Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_and_purge() {
        let cache = TokenCache::new(4, Duration::from_millis(10));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.remove("a"), Some(1));

        sleep(Duration::from_millis(30));
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }
}
