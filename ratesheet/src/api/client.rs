//! HTTP client for the upload service.
//!
//! Sends a serialized table as the single `file` part of a
//! `multipart/form-data` POST to `{base_url}/upload`.
//!
//! ```rust,ignore
//! use ratesheet::{Config, Session, UploadClient};
//!
//! let client = UploadClient::new(&Config::from_env()?)?;
//! let submission = session.snapshot()?;
//! let result = client.submit(submission).await;
//! session.complete_submission(&result);
//! ```

use reqwest::multipart::{Form, Part};

use super::types::SubmitOutcome;
use crate::config::Config;
use crate::error::{SubmitError, SubmitResult};
use crate::store::Submission;

/// Upload service client
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    pub fn new(config: &Config) -> SubmitResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: config.upload_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload a snapshot.
    ///
    /// Any 2xx answer is a success; its JSON `message` (if any) becomes the
    /// outcome message. Anything else is a [`SubmitError`].
    pub async fn submit(&self, submission: Submission) -> SubmitResult<SubmitOutcome> {
        let payload = submission.payload;
        log::debug!(
            "POST {} ({}, {} bytes)",
            self.endpoint,
            payload.file_name,
            payload.bytes.len()
        );

        let part = Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.mime)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::debug!("Upload rejected with {}: {}", status, body);
            return Err(SubmitError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(SubmitOutcome::from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_endpoint_from_config() {
        let config = Config::new("http://localhost:8080/").unwrap();
        let client = UploadClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/upload");
    }

    #[test]
    fn test_client_with_timeout() {
        let config = Config::new("https://rates.example.com")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert!(UploadClient::new(&config).is_ok());
    }
}
