//! Connection handles returned by drivers

use std::any::Any;
use std::fmt;

use dbconnect_cache::Liveness;

/// A live connection produced by a [`Driver`](crate::Driver).
///
/// The caller owns it through an `Arc<dyn Connection>`; the resolver's cache
/// only observes it and stops handing it out once it is dropped or reports
/// [`is_closed`](Self::is_closed).
pub trait Connection: Any + Send + Sync {
   /// Name of the driver that built this connection.
   fn driver(&self) -> &str;

   fn is_closed(&self) -> bool;

   /// Access the concrete connection type.
   ///
   /// ```
   /// use dbconnect::Connection;
   /// use std::any::Any;
   ///
   /// struct Dummy;
   ///
   /// impl Connection for Dummy {
   ///    fn driver(&self) -> &str {
   ///       "dummy"
   ///    }
   ///
   ///    fn is_closed(&self) -> bool {
   ///       false
   ///    }
   ///
   ///    fn as_any(&self) -> &dyn Any {
   ///       self
   ///    }
   /// }
   ///
   /// let conn: Box<dyn Connection> = Box::new(Dummy);
   /// assert!(conn.as_any().downcast_ref::<Dummy>().is_some());
   /// ```
   fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn Connection {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Connection").field("driver", &self.driver()).finish_non_exhaustive()
   }
}

impl Liveness for dyn Connection {
   fn is_closed(&self) -> bool {
      Connection::is_closed(self)
   }
}
