use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sonic_rs::Value;
use tracing::{debug, instrument};

use crate::adapter::{Client, RestResponse, RestResult};
use crate::config::ClientConfig;

pub const GENERATE_RESUME_PATH: &str = "/api/v1/resume/generate";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResumeRequest<'a> {
    pub user_description: &'a str,
}

/// Response shape of the generate endpoint, for use with
/// [`ResumeService::generate_resume_as`].
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GeneratedResume {
    pub resume: String,
}

/// Calls the resume-generation backend. Every call is one POST; failures are
/// returned to the caller untouched and never retried.
#[derive(Clone)]
pub struct ResumeService {
    client: Client,
}

impl ResumeService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(Client::new(config))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the response body as the server sent it. A body that is not
    /// JSON comes back as a JSON string holding the raw text.
    #[instrument(skip_all, fields(description_len = description.len()))]
    pub async fn generate_resume(&self, description: &str) -> RestResult<Value> {
        let response = self.post_description(description).await?;
        Ok(decode_lenient(&response))
    }

    /// Same request as [`ResumeService::generate_resume`], with the body
    /// deserialized into `T`. A body that does not match is a parse error.
    #[instrument(skip_all, fields(description_len = description.len()))]
    pub async fn generate_resume_as<T>(&self, description: &str) -> RestResult<T>
    where
        T: DeserializeOwned,
    {
        self.post_description(description).await?.json::<T>()
    }

    async fn post_description(&self, description: &str) -> RestResult<RestResponse> {
        let payload = GenerateResumeRequest {
            user_description: description,
        };
        self.client.post_json(GENERATE_RESUME_PATH, &payload).await
    }
}

fn decode_lenient(response: &RestResponse) -> Value {
    match response.json::<Value>() {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "response body is not JSON, returning it as text");
            Value::from(&*response.text())
        }
    }
}
