pub mod credentials;
pub mod result;
pub mod status;
pub mod target;

pub use credentials::{ConfigError, Credentials, TokenFn, TokenProvider};
pub use result::AnalysisResult;
pub use status::{OperationHandle, OperationKind, OperationStatus};
pub use target::{InvalidTarget, SubmissionTarget};
