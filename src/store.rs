use bytes::Bytes;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strum::Display;
use thiserror::Error as ThisError;
use tokio::sync::Notify;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

/// Deadlines further away than this are clamped, `Instant` arithmetic would overflow otherwise.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// The Store owns the whole key space: three disjoint namespaces (strings, lists and hashes)
/// plus the expiry index. All four structures live behind a single mutex, so every operation
/// sees and leaves them in a consistent state.
///
/// Expired keys are treated as absent by every operation, and removed either lazily when they
/// are touched or by a background task that wakes up at the next deadline.
///
/// The store is cheap to clone, clones share the same state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<InnerStore>,
}

impl Store {
    pub fn new() -> Store {
        let state = State {
            strings: HashMap::new(),
            lists: HashMap::new(),
            hashes: HashMap::new(),
            expirations: HashMap::new(),
            ttls: BTreeSet::new(),
        };

        let waker = Notify::new();
        let inner = Arc::new(InnerStore {
            state: Mutex::new(state),
            waker,
        });

        tokio::spawn({
            let inner = inner.clone();
            async move { remove_expired_keys(inner).await }
        });

        Self { inner }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// The namespace a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    String,
    List,
    Hash,
}

/// A value detached from the store, used to move entries around (RENAME) and to snapshot them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(Bytes),
    List(VecDeque<Bytes>),
    Hash(HashMap<Bytes, Bytes>),
}

/// A live entry copied out of the store, with its remaining time to live.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: Bytes,
    pub value: Value,
    pub ttl: Option<Duration>,
}

#[derive(Debug, ThisError, PartialEq)]
pub enum StoreError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR no such key")]
    NoSuchKey,
    #[error("ERR index out of range")]
    IndexOutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Side {
    Left,
    Right,
}

pub struct InnerStore {
    state: Mutex<State>,
    waker: Notify,
}

pub struct InnerStoreLocked<'a> {
    state: MutexGuard<'a, State>,
    waker: &'a Notify,
}

impl<'a> InnerStoreLocked<'a> {
    // Keys and expiry.

    /// Unconditionally stores a string, dropping whatever the key held before, expiry included.
    pub fn set(&mut self, key: Bytes, data: Bytes) {
        self.remove_entry(&key);
        self.state.strings.insert(key, data);
    }

    pub fn get(&mut self, key: &[u8]) -> Result<Option<Bytes>, StoreError> {
        self.evict_if_expired(key);

        match self.state.strings.get(key) {
            Some(data) => Ok(Some(data.clone())),
            None if self.contains(key) => Err(StoreError::WrongType),
            None => Ok(None),
        }
    }

    /// Removes the key from whichever namespace holds it. Returns whether a live key was removed.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        self.evict_if_expired(key);
        self.remove_entry(key)
    }

    pub fn exists(&mut self, key: &[u8]) -> bool {
        self.evict_if_expired(key);
        self.contains(key)
    }

    pub fn type_of(&mut self, key: &[u8]) -> Option<ValueType> {
        self.evict_if_expired(key);

        if self.state.strings.contains_key(key) {
            Some(ValueType::String)
        } else if self.state.lists.contains_key(key) {
            Some(ValueType::List)
        } else if self.state.hashes.contains_key(key) {
            Some(ValueType::Hash)
        } else {
            None
        }
    }

    /// Sets the key to expire `seconds` from now. A non-positive value deletes the key right
    /// away. Returns `false` when the key does not exist.
    pub fn expire(&mut self, key: &[u8], seconds: i64) -> bool {
        if !self.exists(key) {
            return false;
        }

        if seconds <= 0 {
            self.remove_entry(key);
            return true;
        }

        let ttl = Duration::from_secs(seconds as u64);
        self.set_ttl(Bytes::copy_from_slice(key), ttl);
        true
    }

    /// Removes the expiry of a key. Returns `true` only if the key had one.
    pub fn persist(&mut self, key: &[u8]) -> bool {
        self.evict_if_expired(key);
        self.clear_expiry(key)
    }

    /// Remaining time to live. `None` when the key does not exist, `Some(None)` when it exists
    /// without an expiry.
    pub fn ttl(&mut self, key: &[u8]) -> Option<Option<Duration>> {
        if !self.exists(key) {
            return None;
        }

        let now = Instant::now();
        Some(
            self.state
                .expirations
                .get(key)
                .map(|expires_at| expires_at.saturating_duration_since(now)),
        )
    }

    /// Moves value and expiry from `from` to `to`, replacing anything stored at `to`. Returns
    /// `false` when `from` does not exist.
    pub fn rename(&mut self, from: &[u8], to: Bytes) -> bool {
        if !self.exists(from) {
            return false;
        }

        if from == &to[..] {
            return true;
        }

        let expires_at = self.state.expirations.get(from).copied();
        let Some(value) = self.take(from) else {
            return false;
        };

        self.remove_entry(&to);
        self.insert(to.clone(), value);
        if let Some(expires_at) = expires_at {
            self.set_expires_at(to, expires_at);
        }

        true
    }

    /// Live keys across all namespaces, evaluated against the current time.
    pub fn keys(&self) -> Vec<Bytes> {
        let now = Instant::now();

        self.state
            .strings
            .keys()
            .chain(self.state.lists.keys())
            .chain(self.state.hashes.keys())
            .filter(|key| !self.is_expired_at(key, now))
            .cloned()
            .collect()
    }

    pub fn size(&self) -> usize {
        self.keys().len()
    }

    pub fn flush_all(&mut self) {
        self.state.strings.clear();
        self.state.lists.clear();
        self.state.hashes.clear();
        self.state.expirations.clear();
        self.state.ttls.clear();
    }

    // Lists.

    pub fn push(&mut self, key: Bytes, values: Vec<Bytes>, side: Side) -> Result<usize, StoreError> {
        self.check_type(&key, ValueType::List)?;

        if values.is_empty() {
            return self.llen(&key);
        }

        let list = self.state.lists.entry(key).or_default();
        for value in values {
            match side {
                Side::Left => list.push_front(value),
                Side::Right => list.push_back(value),
            }
        }

        Ok(list.len())
    }

    pub fn pop(&mut self, key: &[u8], side: Side) -> Result<Option<Bytes>, StoreError> {
        self.check_type(key, ValueType::List)?;

        let Some(list) = self.state.lists.get_mut(key) else {
            return Ok(None);
        };

        let value = match side {
            Side::Left => list.pop_front(),
            Side::Right => list.pop_back(),
        };

        if list.is_empty() {
            self.remove_entry(key);
        }

        Ok(value)
    }

    pub fn llen(&mut self, key: &[u8]) -> Result<usize, StoreError> {
        self.check_type(key, ValueType::List)?;
        Ok(self.state.lists.get(key).map_or(0, |list| list.len()))
    }

    pub fn lindex(&mut self, key: &[u8], index: i64) -> Result<Option<Bytes>, StoreError> {
        self.check_type(key, ValueType::List)?;

        let value = self.state.lists.get(key).and_then(|list| {
            resolve_index(index, list.len()).and_then(|index| list.get(index).cloned())
        });

        Ok(value)
    }

    pub fn lset(&mut self, key: &[u8], index: i64, value: Bytes) -> Result<(), StoreError> {
        self.check_type(key, ValueType::List)?;

        let list = self
            .state
            .lists
            .get_mut(key)
            .ok_or(StoreError::NoSuchKey)?;
        let index = resolve_index(index, list.len()).ok_or(StoreError::IndexOutOfRange)?;
        list[index] = value;

        Ok(())
    }

    /// Elements between `start` and `stop`, both inclusive. Negative indexes count from the
    /// tail, out of range indexes are clamped.
    pub fn lrange(&mut self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>, StoreError> {
        self.check_type(key, ValueType::List)?;

        let Some(list) = self.state.lists.get(key) else {
            return Ok(vec![]);
        };

        let len = list.len() as i64;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

        if start > stop || start >= len {
            return Ok(vec![]);
        }

        let values = list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect();

        Ok(values)
    }

    /// Removes up to `count` occurrences of `value`: from the head when positive, from the tail
    /// when negative and all of them when zero.
    pub fn lrem(&mut self, key: &[u8], count: i64, value: &[u8]) -> Result<usize, StoreError> {
        self.check_type(key, ValueType::List)?;

        let Some(list) = self.state.lists.get_mut(key) else {
            return Ok(0);
        };

        let limit = if count == 0 {
            usize::MAX
        } else {
            count.unsigned_abs() as usize
        };

        let mut removed = 0;
        if count >= 0 {
            let mut i = 0;
            while i < list.len() && removed < limit {
                if list[i] == value {
                    list.remove(i);
                    removed += 1;
                } else {
                    i += 1;
                }
            }
        } else {
            let mut i = list.len();
            while i > 0 && removed < limit {
                i -= 1;
                if list[i] == value {
                    list.remove(i);
                    removed += 1;
                }
            }
        }

        if list.is_empty() {
            self.remove_entry(key);
        }

        Ok(removed)
    }

    // Hashes.

    /// Sets the given fields, returns how many of them did not exist before.
    pub fn hset(&mut self, key: Bytes, pairs: Vec<(Bytes, Bytes)>) -> Result<usize, StoreError> {
        self.check_type(&key, ValueType::Hash)?;

        if pairs.is_empty() {
            return Ok(0);
        }

        let hash = self.state.hashes.entry(key).or_default();
        let mut added = 0;
        for (field, value) in pairs {
            if hash.insert(field, value).is_none() {
                added += 1;
            }
        }

        Ok(added)
    }

    pub fn hget(&mut self, key: &[u8], field: &[u8]) -> Result<Option<Bytes>, StoreError> {
        self.check_type(key, ValueType::Hash)?;

        let value = self
            .state
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field).cloned());

        Ok(value)
    }

    pub fn hexists(&mut self, key: &[u8], field: &[u8]) -> Result<bool, StoreError> {
        Ok(self.hget(key, field)?.is_some())
    }

    pub fn hdel(&mut self, key: &[u8], fields: &[Bytes]) -> Result<usize, StoreError> {
        self.check_type(key, ValueType::Hash)?;

        let Some(hash) = self.state.hashes.get_mut(key) else {
            return Ok(0);
        };

        let removed = fields
            .iter()
            .filter(|field| hash.remove(&field[..]).is_some())
            .count();

        if hash.is_empty() {
            self.remove_entry(key);
        }

        Ok(removed)
    }

    /// Field/value pairs ordered by field.
    pub fn hgetall(&mut self, key: &[u8]) -> Result<Vec<(Bytes, Bytes)>, StoreError> {
        self.check_type(key, ValueType::Hash)?;

        let mut pairs: Vec<(Bytes, Bytes)> = self
            .state
            .hashes
            .get(key)
            .map(|hash| {
                hash.iter()
                    .map(|(field, value)| (field.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        pairs.sort();

        Ok(pairs)
    }

    pub fn hlen(&mut self, key: &[u8]) -> Result<usize, StoreError> {
        self.check_type(key, ValueType::Hash)?;
        Ok(self.state.hashes.get(key).map_or(0, |hash| hash.len()))
    }

    // Snapshots.

    /// Copies every live entry out of the store.
    pub fn snapshot(&self) -> Vec<Entry> {
        let now = Instant::now();

        let strings = self
            .state
            .strings
            .iter()
            .map(|(key, data)| (key, Value::String(data.clone())));
        let lists = self
            .state
            .lists
            .iter()
            .map(|(key, list)| (key, Value::List(list.clone())));
        let hashes = self
            .state
            .hashes
            .iter()
            .map(|(key, hash)| (key, Value::Hash(hash.clone())));

        strings
            .chain(lists)
            .chain(hashes)
            .filter(|(key, _)| !self.is_expired_at(key, now))
            .map(|(key, value)| Entry {
                key: key.clone(),
                ttl: self
                    .state
                    .expirations
                    .get(key)
                    .map(|expires_at| expires_at.saturating_duration_since(now)),
                value,
            })
            .collect()
    }

    /// Replaces the whole content of the store.
    pub fn restore(&mut self, entries: Vec<Entry>) {
        self.flush_all();

        for entry in entries {
            self.remove_entry(&entry.key);
            self.insert(entry.key.clone(), entry.value);
            if let Some(ttl) = entry.ttl {
                self.set_ttl(entry.key, ttl);
            }
        }
    }

    pub fn remove_expired_keys(&mut self) -> Option<Instant> {
        let now = Instant::now();

        let expired_keys: Vec<(Instant, Bytes)> = self
            .state
            .ttls
            .iter()
            .take_while(|(expires_at, _)| expires_at <= &now)
            .cloned()
            .collect();

        for (_, key) in expired_keys {
            debug!(key = %String::from_utf8_lossy(&key), "Removing expired key");
            self.remove_entry(&key);
        }

        self.state
            .ttls
            .iter()
            .next()
            .map(|&(expires_at, _)| expires_at)
    }

    fn set_ttl(&mut self, key: Bytes, ttl: Duration) {
        let expires_at = Instant::now() + ttl.min(MAX_TTL);
        self.set_expires_at(key, expires_at);
    }

    fn set_expires_at(&mut self, key: Bytes, expires_at: Instant) {
        self.clear_expiry(&key);
        self.state.expirations.insert(key.clone(), expires_at);
        self.state.ttls.insert((expires_at, key.clone()));

        let next_to_expire = self.state.ttls.iter().next().map(|(_, key)| key);
        let expires_next = next_to_expire == Some(&key);
        if expires_next {
            self.waker.notify_one();
        }
    }

    fn clear_expiry(&mut self, key: &[u8]) -> bool {
        match self.state.expirations.remove_entry(key) {
            Some((key, expires_at)) => {
                self.state.ttls.remove(&(expires_at, key));
                true
            }
            None => false,
        }
    }

    fn is_expired_at(&self, key: &[u8], now: Instant) -> bool {
        self.state
            .expirations
            .get(key)
            .is_some_and(|expires_at| *expires_at <= now)
    }

    fn evict_if_expired(&mut self, key: &[u8]) {
        if self.is_expired_at(key, Instant::now()) {
            self.remove_entry(key);
        }
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.state.strings.contains_key(key)
            || self.state.lists.contains_key(key)
            || self.state.hashes.contains_key(key)
    }

    /// Fails when the key is live and belongs to a namespace other than `expected`.
    fn check_type(&mut self, key: &[u8], expected: ValueType) -> Result<(), StoreError> {
        match self.type_of(key) {
            Some(actual) if actual != expected => Err(StoreError::WrongType),
            _ => Ok(()),
        }
    }

    fn take(&mut self, key: &[u8]) -> Option<Value> {
        let value = if let Some(data) = self.state.strings.remove(key) {
            Value::String(data)
        } else if let Some(list) = self.state.lists.remove(key) {
            Value::List(list)
        } else if let Some(hash) = self.state.hashes.remove(key) {
            Value::Hash(hash)
        } else {
            return None;
        };

        self.clear_expiry(key);
        Some(value)
    }

    fn insert(&mut self, key: Bytes, value: Value) {
        match value {
            Value::String(data) => {
                self.state.strings.insert(key, data);
            }
            Value::List(list) if !list.is_empty() => {
                self.state.lists.insert(key, list);
            }
            Value::Hash(hash) if !hash.is_empty() => {
                self.state.hashes.insert(key, hash);
            }
            _ => {}
        }
    }

    fn remove_entry(&mut self, key: &[u8]) -> bool {
        self.take(key).is_some()
    }
}

impl Deref for Store {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl InnerStore {
    pub fn lock(&self) -> InnerStoreLocked<'_> {
        // Keep serving after a panicked holder.
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        InnerStoreLocked {
            state,
            waker: &self.waker,
        }
    }
}

type Key = Bytes;

pub struct State {
    strings: HashMap<Key, Bytes>,
    lists: HashMap<Key, VecDeque<Bytes>>,
    hashes: HashMap<Key, HashMap<Bytes, Bytes>>,
    expirations: HashMap<Key, Instant>,
    ttls: BTreeSet<(Instant, Key)>,
}

/// Maps a possibly negative index onto `0..len`.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

async fn remove_expired_keys(store: Arc<InnerStore>) {
    loop {
        let next_expiration = store.lock().remove_expired_keys();

        if let Some(next_expiration) = next_expiration {
            tokio::select! {
                _ = sleep_until(next_expiration) => {}
                _ = store.waker.notified() => {}
            }
        } else {
            store.waker.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time;
    use tokio::time::Duration;

    fn key(s: &str) -> Bytes {
        Bytes::copy_from_slice(s.as_bytes())
    }

    #[tokio::test]
    async fn ttl() {
        time::pause();

        let store = Store::new();

        {
            let mut store = store.lock();

            store.set(key("key1"), Bytes::from("value1"));
            store.expire(b"key1", 10);

            store.set(key("key2"), Bytes::from("value2"));
            store.expire(b"key2", 20);
        }

        assert_eq!(store.lock().keys().len(), 2);

        time::advance(Duration::from_secs(10)).await;
        time::sleep(Duration::from_millis(1)).await;

        assert_eq!(store.lock().keys().len(), 1);
        assert!(store.lock().exists(b"key2"));

        time::advance(Duration::from_secs(20)).await;
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(store.lock().keys().len(), 0);

        {
            let mut store = store.lock();

            store.push(key("key3"), vec![Bytes::from("a")], Side::Left).unwrap();
            store.expire(b"key3", 20);
        }

        assert_eq!(store.lock().keys().len(), 1);

        time::advance(Duration::from_secs(20)).await;
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(store.lock().keys().len(), 0);
        assert_eq!(store.lock().type_of(b"key3"), None);
    }

    #[tokio::test]
    async fn expired_keys_are_absent_before_the_sweep() {
        time::pause();

        let store = Store::new();
        let mut state = store.lock();

        state.set(key("foo"), Bytes::from("bar"));
        // The clock is paused and the lock is held, so the deadline is reached but the
        // background task cannot have removed anything.
        state.set_expires_at(key("foo"), Instant::now());

        assert_eq!(state.get(b"foo"), Ok(None));
        assert_eq!(state.type_of(b"foo"), None);
        assert!(state.keys().is_empty());
        assert!(!state.expire(b"foo", 5));
    }

    #[tokio::test]
    async fn set_then_get() {
        let store = Store::new();
        let mut state = store.lock();

        state.set(key("foo"), Bytes::from("bar"));

        assert_eq!(state.get(b"foo"), Ok(Some(Bytes::from("bar"))));
        assert_eq!(state.type_of(b"foo"), Some(ValueType::String));
    }

    #[tokio::test]
    async fn set_replaces_other_types_and_expiry() {
        let store = Store::new();
        let mut state = store.lock();

        state.push(key("foo"), vec![Bytes::from("a")], Side::Right).unwrap();
        state.expire(b"foo", 100);
        state.set(key("foo"), Bytes::from("bar"));

        assert_eq!(state.type_of(b"foo"), Some(ValueType::String));
        assert_eq!(state.ttl(b"foo"), Some(None));
        assert_eq!(state.llen(b"foo"), Err(StoreError::WrongType));
    }

    #[tokio::test]
    async fn get_on_other_type_is_an_error() {
        let store = Store::new();
        let mut state = store.lock();

        state
            .hset(key("h"), vec![(key("f"), key("v"))])
            .unwrap();

        assert_eq!(state.get(b"h"), Err(StoreError::WrongType));
        assert_eq!(
            state.push(key("h"), vec![key("x")], Side::Left),
            Err(StoreError::WrongType)
        );
    }

    #[tokio::test]
    async fn remove() {
        let store = Store::new();
        let mut state = store.lock();

        state.set(key("foo"), Bytes::from("bar"));
        state.expire(b"foo", 10);

        assert!(state.remove(b"foo"));
        assert!(!state.remove(b"foo"));
        assert_eq!(state.type_of(b"foo"), None);
        assert_eq!(state.get(b"foo"), Ok(None));
        assert!(state.state.expirations.is_empty());
        assert!(state.state.ttls.is_empty());
    }

    #[tokio::test]
    async fn expire_with_non_positive_ttl_deletes() {
        let store = Store::new();
        let mut state = store.lock();

        state.set(key("foo"), Bytes::from("bar"));

        assert!(state.expire(b"foo", 0));
        assert_eq!(state.get(b"foo"), Ok(None));
        assert!(!state.expire(b"missing", 10));
    }

    #[tokio::test]
    async fn rename_moves_value_and_expiry() {
        time::pause();

        let store = Store::new();
        let mut state = store.lock();

        state.set(key("a"), Bytes::from("1"));
        state.expire(b"a", 50);
        state.push(key("b"), vec![key("x")], Side::Left).unwrap();

        assert!(state.rename(b"a", key("b")));

        assert!(!state.exists(b"a"));
        assert_eq!(state.get(b"b"), Ok(Some(Bytes::from("1"))));
        assert_eq!(state.ttl(b"b"), Some(Some(Duration::from_secs(50))));
        assert!(!state.rename(b"a", key("c")));
    }

    #[tokio::test]
    async fn rename_onto_itself() {
        let store = Store::new();
        let mut state = store.lock();

        state.set(key("a"), Bytes::from("1"));

        assert!(state.rename(b"a", key("a")));
        assert_eq!(state.get(b"a"), Ok(Some(Bytes::from("1"))));
    }

    #[tokio::test]
    async fn flush_all() {
        let store = Store::new();
        let mut state = store.lock();

        state.set(key("a"), Bytes::from("1"));
        state.push(key("b"), vec![key("x")], Side::Left).unwrap();
        state.hset(key("c"), vec![(key("f"), key("v"))]).unwrap();
        state.expire(b"a", 10);

        state.flush_all();

        assert!(state.keys().is_empty());
        assert!(state.state.ttls.is_empty());
    }

    #[tokio::test]
    async fn list_operations() {
        let store = Store::new();
        let mut state = store.lock();

        assert_eq!(
            state.push(key("l"), vec![key("a"), key("b"), key("c")], Side::Left),
            Ok(3)
        );
        assert_eq!(state.push(key("l"), vec![key("d")], Side::Right), Ok(4));

        assert_eq!(
            state.lrange(b"l", 0, -1),
            Ok(vec![key("c"), key("b"), key("a"), key("d")])
        );
        assert_eq!(state.lrange(b"l", -2, 10), Ok(vec![key("a"), key("d")]));
        assert_eq!(state.lrange(b"l", 3, 1), Ok(vec![]));
        assert_eq!(state.lindex(b"l", -1), Ok(Some(key("d"))));
        assert_eq!(state.lindex(b"l", 4), Ok(None));

        assert_eq!(state.lset(b"l", 1, key("B")), Ok(()));
        assert_eq!(state.lset(b"l", 9, key("B")), Err(StoreError::IndexOutOfRange));
        assert_eq!(state.lset(b"nope", 0, key("B")), Err(StoreError::NoSuchKey));

        assert_eq!(state.pop(b"l", Side::Left), Ok(Some(key("c"))));
        assert_eq!(state.pop(b"l", Side::Right), Ok(Some(key("d"))));
        assert_eq!(state.llen(b"l"), Ok(2));
    }

    #[tokio::test]
    async fn popping_the_last_element_deletes_the_list() {
        let store = Store::new();
        let mut state = store.lock();

        state.push(key("l"), vec![key("a")], Side::Left).unwrap();
        state.expire(b"l", 10);

        assert_eq!(state.pop(b"l", Side::Right), Ok(Some(key("a"))));
        assert_eq!(state.type_of(b"l"), None);
        assert!(state.state.expirations.is_empty());
        assert_eq!(state.pop(b"l", Side::Right), Ok(None));
    }

    #[tokio::test]
    async fn lrem() {
        let store = Store::new();
        let mut state = store.lock();

        let values = ["a", "b", "a", "c", "a"].map(key).to_vec();
        state.push(key("l"), values, Side::Right).unwrap();

        assert_eq!(state.lrem(b"l", -1, b"a"), Ok(1));
        assert_eq!(
            state.lrange(b"l", 0, -1),
            Ok(vec![key("a"), key("b"), key("a"), key("c")])
        );
        assert_eq!(state.lrem(b"l", 1, b"a"), Ok(1));
        assert_eq!(
            state.lrange(b"l", 0, -1),
            Ok(vec![key("b"), key("a"), key("c")])
        );
        assert_eq!(state.lrem(b"l", 0, b"b"), Ok(1));
        assert_eq!(state.lrem(b"l", 0, b"a"), Ok(1));
        assert_eq!(state.lrem(b"l", 0, b"c"), Ok(1));
        assert!(!state.exists(b"l"));
    }

    #[tokio::test]
    async fn hash_operations() {
        let store = Store::new();
        let mut state = store.lock();

        assert_eq!(
            state.hset(key("h"), vec![(key("f1"), key("1")), (key("f2"), key("2"))]),
            Ok(2)
        );
        assert_eq!(state.hset(key("h"), vec![(key("f1"), key("one"))]), Ok(0));

        assert_eq!(state.hget(b"h", b"f1"), Ok(Some(key("one"))));
        assert_eq!(state.hget(b"h", b"nope"), Ok(None));
        assert_eq!(state.hexists(b"h", b"f2"), Ok(true));
        assert_eq!(state.hlen(b"h"), Ok(2));
        assert_eq!(
            state.hgetall(b"h"),
            Ok(vec![(key("f1"), key("one")), (key("f2"), key("2"))])
        );

        assert_eq!(state.hdel(b"h", &[key("f1"), key("nope")]), Ok(1));
        assert_eq!(state.hdel(b"h", &[key("f2")]), Ok(1));
        assert_eq!(state.type_of(b"h"), None);
    }

    #[tokio::test]
    async fn snapshot_and_restore() {
        time::pause();

        let store = Store::new();
        let entries = {
            let mut state = store.lock();
            state.set(key("s"), key("v"));
            state.expire(b"s", 30);
            state.push(key("l"), vec![key("a"), key("b")], Side::Right).unwrap();
            state.hset(key("h"), vec![(key("f"), key("v"))]).unwrap();
            state.set(key("gone"), key("v"));
            state.expire(b"gone", 1);
            state.snapshot()
        };

        // "gone" is still live at snapshot time.
        assert_eq!(entries.len(), 4);

        time::advance(Duration::from_secs(2)).await;
        let entries = store.lock().snapshot();
        assert_eq!(entries.len(), 3);

        let other = Store::new();
        other.lock().restore(entries);

        let mut state = other.lock();
        assert_eq!(state.get(b"s"), Ok(Some(key("v"))));
        assert_eq!(state.ttl(b"s"), Some(Some(Duration::from_secs(28))));
        assert_eq!(state.lrange(b"l", 0, -1), Ok(vec![key("a"), key("b")]));
        assert_eq!(state.hget(b"h", b"f"), Ok(Some(key("v"))));
        assert!(!state.exists(b"gone"));
    }
}
