// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::entry::{Entry, ErrKind};
use crate::error::{Result, TargetError};
use crate::target::Target;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts each entry as a JSON document to a webhook.
#[derive(Debug, Clone)]
pub struct HttpTarget {
    name: String,
    endpoint: String,
    auth_token: String,
    client: Client,
}

impl HttpTarget {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(name, endpoint, DEFAULT_HTTP_TIMEOUT)
    }

    /// Fails when the HTTP client cannot be built, e.g. without a usable TLS backend.
    pub fn with_timeout(name: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            auth_token: String::new(),
            client,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    fn url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| TargetError::Validation(format!("{}: {e}", self.endpoint)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TargetError::Validation(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(TargetError::Validation(format!("{} has no host", self.endpoint)));
        }
        Ok(url)
    }
}

#[async_trait]
impl Target for HttpTarget {
    fn identify(&self) -> String {
        self.name.clone()
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn validate(&self) -> Result<()> {
        self.url().map(|_| ())
    }

    async fn send(&self, entry: &Entry, _kind: ErrKind) -> Result<()> {
        let mut request = self.client.post(self.url()?).json(entry);
        if !self.auth_token.is_empty() {
            request = request.bearer_auth(&self.auth_token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TargetError::Request(format!("{} answered {status}", self.endpoint)));
        }
        debug!(target_name = %self.name, %status, "entry delivered");
        Ok(())
    }
}
