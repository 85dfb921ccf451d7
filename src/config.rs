//! Resolver configuration

use serde::{Deserialize, Serialize};

/// Defaults applied by [`Resolver::resolve`](crate::Resolver::resolve).
///
/// # Examples
///
/// ```
/// use dbconnect::ResolverConfig;
///
/// // Use defaults
/// let config = ResolverConfig::default();
/// assert_eq!(config.default_thread_count, Some(1));
/// assert!(config.shared);
///
/// // Let thread-pool capable drivers size their own pools
/// let config = ResolverConfig {
///    default_thread_count: None,
///    ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
   /// Thread count handed to thread-pool capable drivers
   ///
   /// `None` means unbounded. Drivers without a thread pool ignore it.
   ///
   /// Default: 1
   pub default_thread_count: Option<usize>,

   /// Whether connections are reused across identical requests
   ///
   /// Default: true
   pub shared: bool,
}

impl Default for ResolverConfig {
   fn default() -> Self {
      Self {
         default_thread_count: Some(1),
         shared: true,
      }
   }
}

/// Per-call overrides for [`Resolver::resolve_with`](crate::Resolver::resolve_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
   pub thread_count: Option<usize>,
   pub shared: bool,
}

impl ResolveOptions {
   /// A private connection that is neither looked up in nor stored in the cache.
   pub fn unshared(self) -> Self {
      Self {
         shared: false,
         ..self
      }
   }

   pub fn with_thread_count(self, thread_count: Option<usize>) -> Self {
      Self {
         thread_count,
         ..self
      }
   }
}

impl From<&ResolverConfig> for ResolveOptions {
   fn from(config: &ResolverConfig) -> Self {
      Self {
         thread_count: config.default_thread_count,
         shared: config.shared,
      }
   }
}

impl Default for ResolveOptions {
   fn default() -> Self {
      (&ResolverConfig::default()).into()
   }
}
