pub mod api;
pub mod authorization;
pub mod client;
pub mod error;
pub mod reconcile;
pub mod submission;

pub use api::{ActionStatus, Receipt, RelayMintRequest};
pub use authorization::AuthorizationSigner;
pub use client::RelayerClient;
pub use error::{Result, SdkError};
pub use reconcile::{JobFile, JobResult};
pub use submission::{Bundler, PipelineConfig, SubmissionOutcome, SubmissionPipeline};
