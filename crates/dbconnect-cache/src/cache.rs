//! Weak connection cache keyed by request

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

/// Liveness predicate consulted on every cache read.
///
/// A connection that reports itself closed is never handed out again; the
/// next successful store for its key replaces it.
pub trait Liveness {
   fn is_closed(&self) -> bool;
}

/// Per-key state: the observed connection plus an in-flight construction guard.
struct Slot<C: ?Sized> {
   handle: Mutex<Option<Weak<C>>>,
   building: tokio::sync::Mutex<()>,
}

impl<C: ?Sized + Liveness> Slot<C> {
   fn new() -> Self {
      Self {
         handle: Mutex::new(None),
         building: tokio::sync::Mutex::new(()),
      }
   }

   fn live(&self) -> Option<Arc<C>> {
      self
         .handle
         .lock()
         .as_ref()?
         .upgrade()
         .filter(|conn| !conn.is_closed())
   }

   fn store(&self, conn: &Arc<C>) {
      *self.handle.lock() = Some(Arc::downgrade(conn));
   }
}

/// Cache of live connections that never owns them.
///
/// Entries hold a [`Weak`] handle, so a connection is freed as soon as the last
/// caller drops it; the entry then reads as a miss. Entries whose connection
/// reports [`Liveness::is_closed`] read as a miss too.
///
/// [`get_or_try_insert_with`](Self::get_or_try_insert_with) coordinates
/// concurrent misses: for a given key only one constructor runs at a time, and
/// callers arriving meanwhile wait for it and receive its connection. The map
/// lock is only held to find a key's slot, never while constructing.
///
/// # Example
///
/// ```
/// use dbconnect_cache::{ConnectionCache, Liveness};
/// use std::sync::Arc;
///
/// struct Conn;
///
/// impl Liveness for Conn {
///    fn is_closed(&self) -> bool {
///       false
///    }
/// }
///
/// let cache: ConnectionCache<String, Conn> = ConnectionCache::new();
/// let conn = Arc::new(Conn);
///
/// cache.put("main".to_string(), &conn);
/// assert!(Arc::ptr_eq(&cache.get(&"main".to_string()).unwrap(), &conn));
///
/// // The cache does not keep connections alive
/// drop(conn);
/// assert!(cache.get(&"main".to_string()).is_none());
/// ```
pub struct ConnectionCache<K, C: ?Sized> {
   slots: Mutex<HashMap<K, Arc<Slot<C>>>>,
}

impl<K, C> ConnectionCache<K, C>
where
   K: Eq + Hash + Clone,
   C: ?Sized + Liveness,
{
   pub fn new() -> Self {
      Self {
         slots: Mutex::new(HashMap::new()),
      }
   }

   /// Look up a live connection. Closed, dropped and absent entries are all misses.
   pub fn get(&self, key: &K) -> Option<Arc<C>> {
      let slot = self.slots.lock().get(key).cloned()?;
      let conn = slot.live();
      trace!(hit = conn.is_some(), "Connection cache lookup");
      conn
   }

   /// Observe `conn` under `key`, replacing whatever the entry held before.
   pub fn put(&self, key: K, conn: &Arc<C>) {
      let mut slots = self.slots.lock();
      Self::purge_locked(&mut slots);
      slots
         .entry(key)
         .or_insert_with(|| Arc::new(Slot::new()))
         .store(conn);
   }

   /// Return the live connection for `key`, or build one with `make` and store it.
   ///
   /// Concurrent callers for the same key wait for the caller that is already
   /// constructing; if that construction fails or is cancelled, the next waiter
   /// runs its own `make`. Errors from `make` are returned as-is and nothing is
   /// stored.
   ///
   /// Dead entries for other keys are purged on the way in, so the map only
   /// holds live connections and constructions in flight.
   pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, make: F) -> Result<Arc<C>, E>
   where
      F: FnOnce() -> Fut,
      Fut: Future<Output = Result<Arc<C>, E>>,
   {
      let slot = {
         let mut slots = self.slots.lock();
         Self::purge_locked(&mut slots);
         Arc::clone(
            slots
               .entry(key.clone())
               .or_insert_with(|| Arc::new(Slot::new())),
         )
      };

      if let Some(conn) = slot.live() {
         trace!("Connection cache hit");
         return Ok(conn);
      }

      let built = Self::build(&slot, make).await;
      if built.is_err() {
         self.discard_idle(&key, slot);
      }

      built
   }

   async fn build<F, Fut, E>(slot: &Slot<C>, make: F) -> Result<Arc<C>, E>
   where
      F: FnOnce() -> Fut,
      Fut: Future<Output = Result<Arc<C>, E>>,
   {
      let _building = slot.building.lock().await;

      // Whoever held the guard before us may have stored a connection
      if let Some(conn) = slot.live() {
         trace!("Connection constructed by a concurrent caller");
         return Ok(conn);
      }

      let conn = make().await?;
      slot.store(&conn);
      debug!("Stored new connection in cache");

      Ok(conn)
   }

   /// Drop `slot` from the map after a failed construction unless another
   /// caller is still waiting on it.
   fn discard_idle(&self, key: &K, slot: Arc<Slot<C>>) {
      let mut slots = self.slots.lock();
      let idle = slots
         .get(key)
         .is_some_and(|current| Arc::ptr_eq(current, &slot) && Arc::strong_count(&slot) == 2);

      if idle && slot.live().is_none() {
         slots.remove(key);
         trace!("Discarded entry after failed construction");
      }
   }

   /// Forget the entry for `key`. Returns whether an entry existed.
   ///
   /// The observed connection stops being shared. A construction already in
   /// flight for `key` keeps its entry, so its result is still shared with the
   /// callers waiting on it and no second construction starts.
   pub fn remove(&self, key: &K) -> bool {
      let mut slots = self.slots.lock();
      let Some(slot) = slots.get(key) else {
         return false;
      };

      if slot.building.try_lock().is_ok() {
         slots.remove(key);
      } else {
         slot.handle.lock().take();
         trace!("Entry under construction kept, cleared its handle");
      }

      true
   }

   /// Drop entries whose connection is gone or closed and that nobody is constructing.
   pub fn purge(&self) {
      Self::purge_locked(&mut self.slots.lock());
   }

   /// Number of entries currently holding a live connection.
   pub fn len(&self) -> usize {
      self
         .slots
         .lock()
         .values()
         .filter(|slot| slot.live().is_some())
         .count()
   }

   pub fn is_empty(&self) -> bool {
      self.len() == 0
   }

   fn purge_locked(slots: &mut HashMap<K, Arc<Slot<C>>>) {
      let before = slots.len();
      // A slot referenced outside the map is in use by a pending construction
      slots.retain(|_, slot| Arc::strong_count(slot) > 1 || slot.live().is_some());

      let purged = before - slots.len();
      if purged > 0 {
         trace!(purged, "Purged dead connection cache entries");
      }
   }
}

impl<K, C> Default for ConnectionCache<K, C>
where
   K: Eq + Hash + Clone,
   C: ?Sized + Liveness,
{
   fn default() -> Self {
      Self::new()
   }
}

impl<K, C: ?Sized> fmt::Debug for ConnectionCache<K, C> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("ConnectionCache")
         .field("entries", &self.slots.lock().len())
         .finish()
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

   #[derive(Default)]
   struct Conn {
      closed: AtomicBool,
   }

   impl Liveness for Conn {
      fn is_closed(&self) -> bool {
         self.closed.load(Ordering::SeqCst)
      }
   }

   #[test]
   fn test_put_replaces_closed_entry() {
      let cache: ConnectionCache<&str, Conn> = ConnectionCache::new();
      let first = Arc::new(Conn::default());
      cache.put("k", &first);

      first.closed.store(true, Ordering::SeqCst);
      assert!(cache.get(&"k").is_none());

      let second = Arc::new(Conn::default());
      cache.put("k", &second);
      assert!(Arc::ptr_eq(&cache.get(&"k").unwrap(), &second));
   }

   #[test]
   fn test_purge_keeps_live_entries() {
      let cache: ConnectionCache<&str, Conn> = ConnectionCache::new();
      let live = Arc::new(Conn::default());
      let dropped = Arc::new(Conn::default());

      cache.put("live", &live);
      cache.put("dropped", &dropped);
      drop(dropped);

      cache.purge();
      assert_eq!(cache.slots.lock().len(), 1);
      assert_eq!(cache.len(), 1);
   }

   #[test]
   fn test_remove() {
      let cache: ConnectionCache<&str, Conn> = ConnectionCache::new();
      let conn = Arc::new(Conn::default());
      cache.put("k", &conn);

      assert!(cache.remove(&"k"));
      assert!(!cache.remove(&"k"));
      assert!(cache.get(&"k").is_none());
   }

   #[test]
   fn test_works_with_trait_objects() {
      trait Handle: Liveness + Send + Sync {}
      impl Handle for Conn {}

      let cache: ConnectionCache<u32, dyn Handle> = ConnectionCache::new();
      let conn: Arc<dyn Handle> = Arc::new(Conn::default());
      cache.put(1, &conn);

      assert!(Arc::ptr_eq(&cache.get(&1).unwrap(), &conn));
   }

   #[tokio::test]
   async fn test_dead_and_failed_entries_do_not_accumulate() {
      let cache: ConnectionCache<String, Conn> = ConnectionCache::new();

      for i in 0..100 {
         let failed = cache
            .get_or_try_insert_with(format!("bad-{i}"), || async { Err::<Arc<Conn>, _>("unreachable host") })
            .await;
         assert!(failed.is_err());

         let conn = cache
            .get_or_try_insert_with(format!("db-{i}"), || async { Ok::<_, ()>(Arc::new(Conn::default())) })
            .await
            .unwrap();
         drop(conn);
      }

      // Only the last dropped entry remains until the next insert purges it
      assert!(cache.slots.lock().len() <= 1);
      assert_eq!(cache.len(), 0);
   }

   #[tokio::test]
   async fn test_closed_entries_are_purged_on_insert() {
      let cache: ConnectionCache<&str, Conn> = ConnectionCache::new();

      let first = cache
         .get_or_try_insert_with("a", || async { Ok::<_, ()>(Arc::new(Conn::default())) })
         .await
         .unwrap();
      first.closed.store(true, Ordering::SeqCst);

      let _second = cache
         .get_or_try_insert_with("b", || async { Ok::<_, ()>(Arc::new(Conn::default())) })
         .await
         .unwrap();

      assert!(!cache.slots.lock().contains_key("a"));
      assert_eq!(cache.slots.lock().len(), 1);
   }

   #[tokio::test]
   async fn test_failed_construction_keeps_entry_for_waiters() {
      let cache: ConnectionCache<&str, Conn> = ConnectionCache::new();
      let slot = Arc::clone(
         cache
            .slots
            .lock()
            .entry("k")
            .or_insert_with(|| Arc::new(Slot::new())),
      );

      let failed = cache
         .get_or_try_insert_with("k", || async { Err::<Arc<Conn>, _>("refused") })
         .await;
      assert!(failed.is_err());

      // `slot` stands in for a caller still waiting on the entry
      assert!(Arc::ptr_eq(cache.slots.lock().get("k").unwrap(), &slot));
   }

   #[tokio::test]
   async fn test_remove_during_construction_builds_once() {
      let cache = Arc::new(ConnectionCache::<&str, Conn>::new());
      let builds = Arc::new(AtomicUsize::new(0));
      let (release, gate) = tokio::sync::oneshot::channel::<()>();

      let builder = tokio::spawn({
         let cache = Arc::clone(&cache);
         let builds = Arc::clone(&builds);
         async move {
            cache
               .get_or_try_insert_with("k", || async move {
                  builds.fetch_add(1, Ordering::SeqCst);
                  let _ = gate.await;
                  Ok::<_, ()>(Arc::new(Conn::default()))
               })
               .await
         }
      });

      while cache
         .slots
         .lock()
         .get("k")
         .is_none_or(|slot| slot.building.try_lock().is_ok())
      {
         tokio::task::yield_now().await;
      }

      assert!(cache.remove(&"k"));

      let waiter = tokio::spawn({
         let cache = Arc::clone(&cache);
         let builds = Arc::clone(&builds);
         async move {
            cache
               .get_or_try_insert_with("k", || async move {
                  builds.fetch_add(1, Ordering::SeqCst);
                  Ok::<_, ()>(Arc::new(Conn::default()))
               })
               .await
         }
      });

      release.send(()).unwrap();
      let first = builder.await.unwrap().unwrap();
      let second = waiter.await.unwrap().unwrap();

      assert!(Arc::ptr_eq(&first, &second));
      assert_eq!(builds.load(Ordering::SeqCst), 1);
   }

   #[test]
   fn test_remove_idle_entry_drops_it() {
      let cache: ConnectionCache<&str, Conn> = ConnectionCache::new();
      let conn = Arc::new(Conn::default());
      cache.put("k", &conn);

      assert!(cache.remove(&"k"));
      assert!(cache.slots.lock().is_empty());
   }
}
