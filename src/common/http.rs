use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use snafu::{IntoError, ResultExt};

use super::{Error, ProviderSnafu, RequestSnafu, ResponseSnafu, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Method {
    Read,
    Create,
    Update,
    Delete,
}

impl Method {
    fn verb(&self) -> &'static str {
        match self {
            Method::Read => "GET",
            Method::Create => "POST",
            Method::Update => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Read => "Read",
            Method::Create => "Create",
            Method::Update => "Update",
            Method::Delete => "Delete",
        })
    }
}

#[derive(serde::Deserialize)]
struct APIError {
    code: serde_json::Value,
    message: String,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: APIError,
}

/// A listing response split into its items and the link to the next page.
pub(crate) trait Paginated {
    type Item;

    fn into_page(self) -> (Vec<Self::Item>, Option<String>);
}

/// Blocking JSON client with bearer authentication, shared by the cloud backends.
pub(crate) struct ApiClient {
    agent: ureq::Agent,
    access_token: String,
    backend: &'static str,
}

impl ApiClient {
    pub fn new(backend: &'static str, access_token: String, timeout_secs: u64) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(timeout_secs))
                .build(),
            access_token,
            backend,
        }
    }

    fn send(
        &self,
        method: Method,
        url: &url::Url,
        headers: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> std::result::Result<ureq::Response, ureq::Error> {
        tracing::debug!(
            url = url.as_str(),
            method = method.verb(),
            backend = self.backend,
            "Sending request"
        );
        let mut req = self
            .agent
            .request_url(method.verb(), url)
            .set("Authorization", &format!("Bearer {}", self.access_token));
        for (header, value) in headers {
            req = req.set(header, value);
        }
        match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        }
    }

    /// Turns an HTTP error status into a readable error, keeping the API's
    /// own message where there is one.
    pub fn process_error(&self, method: Method, url: &url::Url, err: ureq::Error) -> Error {
        match err {
            ureq::Error::Status(status, resp) => {
                let message = match resp.into_json::<ErrorResponse>() {
                    Ok(body) => {
                        let code = match body.error.code {
                            serde_json::Value::String(code) => code,
                            code => code.to_string(),
                        };
                        format!("{code} {}", body.error.message)
                    }
                    Err(_) => status.to_string(),
                };
                ResponseSnafu {
                    message: format!("{} {method} {url} unsuccessful: {message}", self.backend),
                }
                .build()
            }
            err => RequestSnafu {
                url: url.as_str(),
                method: method.to_string(),
            }
            .into_error(err),
        }
    }

    pub fn to_body(&self, body: impl serde::Serialize) -> Result<serde_json::Value> {
        serde_json::to_value(body)
            .boxed_local()
            .context(ProviderSnafu {
                message: format!("{}: Failed to serialize request", self.backend),
            })
    }

    pub fn get<T: DeserializeOwned>(&self, url: &url::Url) -> Result<T> {
        self.send(Method::Read, url, &[], None)
            .map_err(|err| self.process_error(Method::Read, url, err))?
            .into_json()
            .boxed_local()
            .context(ProviderSnafu {
                message: format!("{}: Failed to deserialize response", self.backend),
            })
    }

    /// Follows pages until the response carries no next link. `next_url`
    /// turns that link into the URL of the following page.
    pub fn get_paginated<P, F>(&self, url: &url::Url, next_url: F) -> Result<Vec<P::Item>>
    where
        P: Paginated + DeserializeOwned,
        F: Fn(&url::Url, &str) -> Result<url::Url>,
    {
        let mut items = Vec::new();
        let mut page_url = url.clone();
        loop {
            let (mut page, next) = self.get::<P>(&page_url)?.into_page();
            items.append(&mut page);

            match next {
                Some(next) if !next.is_empty() => page_url = next_url(url, &next)?,
                _ => return Ok(items),
            }
        }
    }

    pub fn write(
        &self,
        method: Method,
        url: &url::Url,
        headers: &[(&str, &str)],
        body: impl serde::Serialize,
    ) -> Result<()> {
        let body = self.to_body(body)?;
        self.send(method, url, headers, Some(body))
            .map_err(|err| self.process_error(method, url, err))?;
        Ok(())
    }

    /// Like [`ApiClient::write`] but a 404 counts as success, for deletes
    /// of things which may already be gone.
    pub fn remove(
        &self,
        method: Method,
        url: &url::Url,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        match self.send(method, url, &[], body) {
            Ok(_) | Err(ureq::Error::Status(404, _)) => Ok(()),
            Err(err) => Err(self.process_error(method, url, err)),
        }
    }
}
