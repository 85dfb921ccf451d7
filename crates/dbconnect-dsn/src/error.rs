//! Error types for dbconnect-dsn

/// Errors raised while tokenizing a URI or matching it against a driver schema.
///
/// Every matching failure carries the usage string of the driver it was matched
/// against, so the message always shows the caller what a valid URI looks like.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// The URI could not be tokenized.
   #[error("invalid URI: {0}")]
   InvalidUri(#[from] url::ParseError),

   /// A percent-encoded component does not decode to UTF-8.
   #[error("URI {component} is not valid percent-encoded UTF-8")]
   InvalidEncoding { component: &'static str },

   /// A required positional or keyword parameter was not supplied.
   #[error("URI must specify '{name}'. Expected format: {usage}")]
   MissingParameter { name: String, usage: String },

   /// The URI path has more segments than the schema has positional names.
   #[error("too many parts to path. Expected format: {usage}")]
   TooManyPathSegments { usage: String },

   /// The same parameter name was supplied by two sources.
   #[error("parameter '{name}' already provided as positional argument. Expected format: {usage}")]
   ParameterCollision { name: String, usage: String },

   /// The URI carries a component the driver has no use for (e.g. a port on an account URI).
   #[error("URI must not specify a {component}. Expected format: {usage}")]
   UnexpectedComponent {
      component: &'static str,
      usage: String,
   },

   /// A driver schema declaration is malformed.
   #[error("invalid driver schema: {0}")]
   InvalidSchema(String),
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> &'static str {
      match self {
         Error::InvalidUri(_) => "INVALID_URI",
         Error::InvalidEncoding { .. } => "INVALID_ENCODING",
         Error::MissingParameter { .. } => "MISSING_PARAMETER",
         Error::TooManyPathSegments { .. } => "TOO_MANY_PATH_SEGMENTS",
         Error::ParameterCollision { .. } => "PARAMETER_COLLISION",
         Error::UnexpectedComponent { .. } => "UNEXPECTED_COMPONENT",
         Error::InvalidSchema(_) => "INVALID_SCHEMA",
      }
   }
}
