//! Thin client for the resume-generation backend, built on a zero-copy reqwest
//! wrapper with an in-memory mock transport for fully deterministic tests.

pub mod adapter;
pub mod config;
pub mod mock;
pub mod resume;

pub use reqwest::Method;

pub use adapter::{
    Client, ReqwestTransport, RestBytes, RestError, RestErrorKind, RestFuture, RestRequest,
    RestResponse, RestResult, RestTransport,
};
pub use config::{BASE_URL_ENV, ClientConfig};
pub use mock::{MockBehavior, MockBehaviorPlan, MockResponse, MockRestAdapter, MockRestStateSnapshot};
pub use resume::{GENERATE_RESUME_PATH, GenerateResumeRequest, GeneratedResume, ResumeService};
