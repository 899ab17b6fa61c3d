//! Backend endpoints, wire payloads and the transport seam used to reach them.
pub mod http;
pub mod payload;
pub mod resource;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

pub use http::HttpTransport;
pub use payload::{ErrorWrapper, Fetched, NameList, PieSlice, RawRecords, StatusRecord};
pub use resource::ResourceKind;
pub use transport::{HttpReply, Transport};
