pub mod body;
pub mod response;
pub mod transport;
pub mod types;

// Re-export commonly used types for convenient access
pub use body::Body;
pub use response::ResponseRecord;
pub use transport::{HttpTransport, OutboundRequest, RawResponse, Transport, TransportError};
pub use types::{Method, Status};
