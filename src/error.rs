use serde::{Serialize, Serializer};

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type drivers report construction failures with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Structured error response.
#[derive(Serialize)]
struct ErrorResponse {
   code: &'static str,
   message: String,
}

/// Error types for connection resolution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// URI tokenizing or parameter matching failed.
   #[error(transparent)]
   Params(#[from] dbconnect_dsn::Error),

   /// A URI named more than one scheme (e.g. `postgresql+psycopg://`).
   #[error("URI has multiple schemes ({}); exactly one driver name is expected", .0.join("+"))]
   MultipleSchemes(Vec<String>),

   /// No driver is registered under the requested name.
   #[error("unsupported driver: {0}")]
   UnsupportedDriver(String),

   /// The request was neither a URI string nor a configuration mapping.
   #[error("cannot resolve a connection from {0}; expected a URI string or a configuration mapping")]
   InvalidRequestType(String),

   /// The driver failed to construct a connection.
   #[error("driver '{driver}' failed to connect: {source}")]
   Construction {
      driver: String,
      #[source]
      source: BoxError,
   },

   /// A driver was registered with a schema other than the one it declares.
   #[error("driver '{driver}' was registered with a schema that differs from the one it declares")]
   SchemaMismatch { driver: String },

   /// The same driver name was registered twice.
   #[error("driver '{0}' is already registered")]
   DuplicateDriver(String),

   /// A thread count of zero was requested.
   #[error("thread count must be at least 1")]
   InvalidThreadCount,
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> &'static str {
      match self {
         Error::Params(e) => e.error_code(),
         Error::MultipleSchemes(_) => "MULTIPLE_SCHEMES",
         Error::UnsupportedDriver(_) => "UNSUPPORTED_DRIVER",
         Error::InvalidRequestType(_) => "INVALID_REQUEST_TYPE",
         Error::Construction { .. } => "CONSTRUCTION_FAILED",
         Error::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
         Error::DuplicateDriver(_) => "DUPLICATE_DRIVER",
         Error::InvalidThreadCount => "INVALID_THREAD_COUNT",
      }
   }

   pub(crate) fn missing_driver_key() -> Self {
      Error::Params(dbconnect_dsn::Error::MissingParameter {
         name: "driver".to_string(),
         usage: "{\"driver\": \"<name>\", ...}".to_string(),
      })
   }
}

impl Serialize for Error {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      let response = ErrorResponse {
         code: self.error_code(),
         message: self.to_string(),
      };
      response.serialize(serializer)
   }
}
