//! Shared request plumbing for calendar feeds.
//!
//! Every request carries the GData version and the session's auth header.
//! JSON submissions (POST/PUT) follow at most one `302` by re-sending the same
//! body to `Location`; reqwest's own redirect handling is disabled for them
//! since it would turn the retried POST into a GET.

use gcal_auth::{Session, GDATA_VERSION};
use reqwest::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{ClientBuilder, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::error::CalendarError;
use crate::options::ClientOptions;

pub(crate) struct Transport {
    /// Default redirect policy, used for GET.
    follow: reqwest::Client,
    /// Never follows redirects.
    manual: reqwest::Client,
}

/// Status and body of a completed exchange.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    async fn read(response: reqwest::Response) -> Result<Self, CalendarError> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response");
        Ok(Self { status, body })
    }

    /// Turn any status other than `expected` into an error.
    pub fn expect(self, expected: StatusCode) -> Result<Self, CalendarError> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(self.rejected())
        }
    }

    pub fn rejected(self) -> CalendarError {
        tracing::warn!(status = self.status.as_u16(), "unexpected response status");
        CalendarError::UnexpectedStatus {
            status: self.status.as_u16(),
            message: self.body,
        }
    }

    /// Expect `expected` and decode the body.
    pub fn json(self, expected: StatusCode) -> Result<Value, CalendarError> {
        decode_json(&self.expect(expected)?.body)
    }
}

pub(crate) fn decode_json(body: &str) -> Result<Value, CalendarError> {
    serde_json::from_str(body)
        .map_err(|e| CalendarError::InvalidResponse(format!("JSON parse error: {}", e)))
}

impl Transport {
    pub fn new(options: &ClientOptions) -> Result<Self, reqwest::Error> {
        if options.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled");
        }
        Ok(Self {
            follow: builder(options).build()?,
            manual: builder(options).redirect(Policy::none()).build()?,
        })
    }

    /// Client for the login POST.
    pub fn login_client(&self) -> reqwest::Client {
        self.manual.clone()
    }

    pub async fn get(
        &self,
        session: &Session,
        url: &str,
        headers: &[(HeaderName, String)],
    ) -> Result<Reply, CalendarError> {
        let response = with_headers(authed(&self.follow, Method::GET, url, session), headers)
            .send()
            .await?;
        Reply::read(response).await
    }

    pub async fn delete(
        &self,
        session: &Session,
        url: &str,
        headers: &[(HeaderName, String)],
    ) -> Result<Reply, CalendarError> {
        let response = with_headers(authed(&self.manual, Method::DELETE, url, session), headers)
            .send()
            .await?;
        Reply::read(response).await
    }

    /// Send a JSON body, following a single `302`.
    pub async fn submit(
        &self,
        session: &Session,
        method: Method,
        url: &str,
        body: String,
        headers: &[(HeaderName, String)],
    ) -> Result<Reply, CalendarError> {
        let response = self
            .json_request(session, method.clone(), url, &body, headers)
            .send()
            .await?;

        if response.status() != StatusCode::FOUND {
            return Reply::read(response).await;
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| CalendarError::InvalidResponse("302 without Location header".into()))?;
        let target = response
            .url()
            .join(location)
            .map_err(|e| CalendarError::InvalidResponse(format!("bad Location header: {}", e)))?;
        tracing::debug!(location = %target, "following redirect");

        let response = self
            .json_request(session, method, target.as_str(), &body, headers)
            .send()
            .await?;
        Reply::read(response).await
    }

    fn json_request(
        &self,
        session: &Session,
        method: Method,
        url: &str,
        body: &str,
        headers: &[(HeaderName, String)],
    ) -> RequestBuilder {
        with_headers(authed(&self.manual, method, url, session), headers)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_owned())
    }
}

fn builder(options: &ClientOptions) -> ClientBuilder {
    let builder = reqwest::Client::builder().danger_accept_invalid_certs(options.accept_invalid_certs);
    match options.timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}

fn authed(client: &reqwest::Client, method: Method, url: &str, session: &Session) -> RequestBuilder {
    client
        .request(method, url)
        .header("GData-Version", GDATA_VERSION)
        .header(AUTHORIZATION, session.authorization_header())
}

fn with_headers(request: RequestBuilder, headers: &[(HeaderName, String)]) -> RequestBuilder {
    headers
        .iter()
        .fold(request, |req, (name, value)| req.header(name.clone(), value.as_str()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn reply(status: u16, body: &str) -> Reply {
        Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_expected_status_decodes() {
        let value = reply(201, r#"{"data":{"id":"x"}}"#)
            .json(StatusCode::CREATED)
            .unwrap();
        assert_eq!(value["data"]["id"], "x");
    }

    #[test]
    fn test_other_status_is_rejection() {
        let err = reply(200, "{}").json(StatusCode::CREATED).unwrap_err();
        assert!(matches!(err, CalendarError::UnexpectedStatus { status: 200, .. }));
    }

    #[test]
    fn test_bad_json_is_invalid_response() {
        let err = reply(200, "<html>").json(StatusCode::OK).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidResponse(_)));
    }
}
