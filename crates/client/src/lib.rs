pub mod analyzer;
pub mod client;
pub mod error;
pub mod poller;
pub mod request;
pub mod transport;

pub use analyzer::{AnalyzerDefinition, DeleteOutcome, DEFAULT_SCHEMA_NAME};
pub use client::{ClientBuilder, ContentUnderstandingClient};
pub use error::ClientError;
pub use poller::{operation_handle, Poller, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
pub use request::{Endpoints, Submission};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, MockTransport, Transport};

pub use tokio_util::sync::CancellationToken;
