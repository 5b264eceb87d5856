pub mod credentials;
pub mod identifiers;
pub mod result_item;
pub mod submission;

pub use credentials::{Credentials, LoginResponse};
pub use identifiers::{EvalSessionId, EvaluationId, VideoId};
pub use result_item::{Relevance, ResultCard, ResultItem};
pub use submission::SubmitRequest;
