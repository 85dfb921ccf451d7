//! Driver invocation

use std::sync::Arc;

use dbconnect_dsn::ResolvedParams;
use tracing::{debug, trace};

use crate::connection::Connection;
use crate::driver::{ConnectArgs, ThreadPool};
use crate::error::{Error, Result};
use crate::registry::DriverEntry;

/// Build a connection through `entry`'s driver.
///
/// Absent (`null`) parameters are dropped first. A thread-pool argument is
/// only passed to drivers registered as thread-pool capable: `Some(n)` becomes
/// [`ThreadPool::Bounded`] and `None` [`ThreadPool::Unbounded`]. Other drivers
/// never see the hint. Driver failures come back as [`Error::Construction`].
pub async fn construct(
   entry: &DriverEntry,
   params: ResolvedParams,
   thread_count: Option<usize>,
) -> Result<Arc<dyn Connection>> {
   let thread_pool = if entry.supports_thread_pool() {
      Some(thread_pool(thread_count)?)
   } else {
      if thread_count.is_some_and(|n| n != 1) {
         trace!(driver = entry.name(), "Ignoring thread count for driver without thread pool");
      }
      None
   };

   let args = ConnectArgs {
      params: params.into_present(),
      thread_pool,
   };

   debug!(
      driver = entry.name(),
      params = args.params.len(),
      thread_pool = ?args.thread_pool,
      "Constructing connection"
   );

   entry
      .driver()
      .connect(args)
      .await
      .map_err(|source| Error::Construction {
         driver: entry.name().to_string(),
         source,
      })
}

fn thread_pool(thread_count: Option<usize>) -> Result<ThreadPool> {
   match thread_count {
      Some(0) => Err(Error::InvalidThreadCount),
      Some(n) => Ok(ThreadPool::Bounded(n)),
      None => Ok(ThreadPool::Unbounded),
   }
}
