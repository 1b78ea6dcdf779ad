/*
 * SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */
use std::time::Duration;

use reqwest::{
    header::HeaderValue, header::ACCEPT, header::CONTENT_TYPE, header::LOCATION, Client as HttpClient,
    ClientBuilder as HttpClientBuilder, Method, StatusCode,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::model::message;
use crate::session::ManagementTarget;
use crate::{Connector, RedfishError, Transport};

pub const REDFISH_ENDPOINT: &str = "redfish/v1";
pub const SESSIONS_PATH: &str = "/redfish/v1/SessionService/Sessions/";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Whether the BMC's TLS certificate is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertPolicy {
    #[default]
    Validate,
    /// Accept self signed and otherwise invalid certificates. Most BMCs ship with one.
    AcceptInvalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// Create a Redfish session and send its X-Auth-Token
    #[default]
    Session,
    /// HTTP basic auth on every request
    Basic,
}

/// Per-batch connection settings handed to [`Connector::connect`].
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub cert_policy: CertPolicy,
    pub auth_method: AuthMethod,
    /// Overrides the pool timeout for every request on this connection
    pub timeout: Option<Duration>,
}

#[derive(Debug)]
pub struct RedfishClientPoolBuilder {
    timeout: Duration,
}

impl RedfishClientPoolBuilder {
    /// Overwrites the timeout that will be applied to every request
    pub fn timeout(mut self, timeout: Duration) -> RedfishClientPoolBuilder {
        self.timeout = timeout;
        self
    }

    pub fn build(&self) -> Result<RedfishClientPool, RedfishError> {
        let build = |accept_invalid_certs: bool| {
            HttpClientBuilder::new()
                .danger_accept_invalid_certs(accept_invalid_certs)
                .timeout(self.timeout)
                .build()
                .map_err(RedfishError::HttpClientBuild)
        };
        Ok(RedfishClientPool {
            validating: build(false)?,
            accepting_invalid: build(true)?,
        })
    }
}

/// Shared HTTP connection pools. Connecting through it opens a session against one BMC.
#[derive(Debug, Clone)]
pub struct RedfishClientPool {
    validating: HttpClient,
    accepting_invalid: HttpClient,
}

impl RedfishClientPool {
    /// Returns Builder for configuring a Redfish HTTP connection pool
    pub fn builder() -> RedfishClientPoolBuilder {
        RedfishClientPoolBuilder {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn http_client(&self, policy: CertPolicy) -> HttpClient {
        match policy {
            CertPolicy::Validate => self.validating.clone(),
            CertPolicy::AcceptInvalid => self.accepting_invalid.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Connector for RedfishClientPool {
    async fn connect(
        &self,
        target: &ManagementTarget,
        options: &ConnectOptions,
    ) -> Result<Box<dyn Transport>, RedfishError> {
        let mut client = RedfishHttpClient {
            target: target.clone(),
            http_client: self.http_client(options.cert_policy),
            timeout: options.timeout,
            auth: Auth::Basic,
        };
        if options.auth_method == AuthMethod::Session {
            client.auth = client.create_session().await?;
        }
        Ok(Box::new(client))
    }
}

#[derive(Debug, Clone)]
enum Auth {
    Basic,
    Token { token: String, location: String },
    LoggedOut,
}

/// A HTTP client which targets a single BMC
pub struct RedfishHttpClient {
    target: ManagementTarget,
    http_client: HttpClient,
    timeout: Option<Duration>,
    auth: Auth,
}

#[async_trait::async_trait]
impl Transport for RedfishHttpClient {
    async fn get_raw(&self, odata_id: &str) -> Result<Value, RedfishError> {
        let (_status_code, body, _) = self.req(Method::GET, odata_id, None).await?;
        body.ok_or(RedfishError::NoContent)
    }

    async fn set_raw(&self, odata_id: &str, patch: &Value) -> Result<Option<Value>, RedfishError> {
        let (_status_code, body, _) = self.req(Method::PATCH, odata_id, Some(patch)).await?;
        Ok(body)
    }

    async fn invoke_action(&self, target: &str, body: &Value) -> Result<(), RedfishError> {
        self.req(Method::POST, target, Some(body))
            .await
            .map(|_| ())
    }

    async fn disconnect(&mut self) -> Result<(), RedfishError> {
        let Auth::Token { token, location } = std::mem::replace(&mut self.auth, Auth::LoggedOut)
        else {
            return Ok(());
        };
        debug!("Closing Redfish session {location} on {}", self.target.host);
        self.send(Method::DELETE, &location, None, Some(&token))
            .await
            .map(|_| ())
    }
}

impl RedfishHttpClient {
    fn url(&self, api: &str) -> String {
        // host may carry its own scheme, e.g. a plain HTTP test server
        let base = match self.target.port {
            _ if self.target.host.contains("://") => {
                self.target.host.trim_end_matches('/').to_string()
            }
            Some(p) => format!("https://{}:{}", self.target.host, p),
            None => format!("https://{}", self.target.host),
        };
        if api.starts_with("http://") || api.starts_with("https://") {
            api.to_string()
        } else if api.starts_with('/') {
            format!("{base}{api}")
        } else {
            format!("{base}/{REDFISH_ENDPOINT}/{api}")
        }
    }

    // Logs in through the SessionService. The token comes back as a header,
    // the session resource (needed for logout) as Location, or the body's
    // @odata.id when Location is missing.
    async fn create_session(&self) -> Result<Auth, RedfishError> {
        let body = json!({
            "UserName": self.target.credential.username,
            "Password": self.target.credential.password,
        });
        let url = self.url(SESSIONS_PATH);
        let (_status, response, headers) = self
            .send(Method::POST, SESSIONS_PATH, Some(&body), None)
            .await
            .map_err(|e| match e {
                RedfishError::RequestRejected { status_code, .. } => {
                    RedfishError::Unauthorized {
                        host: self.target.host.clone(),
                        reason: format!("session creation returned HTTP {status_code}"),
                    }
                }
                e => e,
            })?;
        let token = header_str(&headers, AUTH_TOKEN_HEADER);
        let location = header_str(&headers, LOCATION.as_str()).or_else(|| {
            response
                .as_ref()
                .and_then(|r| r.get("@odata.id"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        match (token, location) {
            (Some(token), Some(location)) => {
                debug!("Opened Redfish session {location} on {}", self.target.host);
                Ok(Auth::Token { token, location })
            }
            (Some(_), None) => {
                warn!(
                    "Session created on {} without a location, it stays open until it times out",
                    self.target.host
                );
                Err(RedfishError::MissingHeader {
                    header: LOCATION.to_string(),
                    url,
                })
            }
            (None, location) => {
                // Without a token the session can still be removed with basic auth
                if let Some(location) = location {
                    if let Err(e) = self.send(Method::DELETE, &location, None, None).await {
                        warn!("Could not delete session {location} on {}: {e}", self.target.host);
                    }
                }
                Err(RedfishError::MissingHeader {
                    header: AUTH_TOKEN_HEADER.to_string(),
                    url,
                })
            }
        }
    }

    async fn req(
        &self,
        method: Method,
        api: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Option<Value>, reqwest::header::HeaderMap), RedfishError> {
        match &self.auth {
            Auth::Token { token, .. } => self.send(method, api, body, Some(token)).await,
            Auth::Basic => self.send(method, api, body, None).await,
            Auth::LoggedOut => Err(RedfishError::SessionClosed {
                host: self.target.host.clone(),
            }),
        }
    }

    // All the HTTP requests happen from here.
    async fn send(
        &self,
        method: Method,
        api: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<(StatusCode, Option<Value>, reqwest::header::HeaderMap), RedfishError> {
        let url = self.url(api);
        let body_enc = match body {
            Some(b) => Some(serde_json::to_string(b).map_err(|e| {
                RedfishError::JsonSerializeError {
                    url: url.clone(),
                    object_debug: format!("{b:?}"),
                    source: e,
                }
            })?),
            None => None,
        };
        debug!(
            "TX {} {} {}",
            method,
            url,
            body_enc.as_deref().unwrap_or_default()
        );

        let mut req_b = self
            .http_client
            .request(method.clone(), &url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match token {
            Some(t) => req_b = req_b.header(AUTH_TOKEN_HEADER, t),
            None if method != Method::POST || api != SESSIONS_PATH => {
                req_b = req_b.basic_auth(
                    &self.target.credential.username,
                    Some(&self.target.credential.password),
                );
            }
            None => {}
        }
        if let Some(t) = self.timeout {
            req_b = req_b.timeout(t);
        }
        if let Some(b) = body_enc {
            req_b = req_b.body(b);
        }
        let response = req_b.send().await.map_err(|e| RedfishError::NetworkError {
            url: url.clone(),
            source: e,
        })?;
        let status_code = response.status();
        let headers = response.headers().clone();
        // read the body even if not status 2XX, because BMCs give useful error messages as JSON
        let response_body = response
            .text()
            .await
            .map_err(|e| RedfishError::NetworkError {
                url: url.clone(),
                source: e,
            })?;
        let mut res = None;
        if !response_body.trim().is_empty() {
            debug!("RX {status_code} {response_body}");
            match serde_json::from_str::<Value>(&response_body) {
                Ok(v) => {
                    res = Some(v);
                }
                Err(e) if status_code.is_success() => {
                    return Err(RedfishError::JsonDeserializeError {
                        url,
                        body: response_body,
                        source: e,
                    });
                }
                // Error pages are often HTML, status code is what matters then
                Err(_) => {}
            }
        } else {
            debug!("RX {status_code}");
        }

        if !status_code.is_success() {
            return Err(status_error(
                &self.target.host,
                &method,
                url,
                status_code,
                res.as_ref(),
            ));
        }
        Ok((status_code, res, headers))
    }
}

fn status_error(
    host: &str,
    method: &Method,
    url: String,
    status_code: StatusCode,
    body: Option<&Value>,
) -> RedfishError {
    match status_code {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RedfishError::Unauthorized {
            host: host.to_string(),
            reason: format!("HTTP {status_code} at {url}"),
        },
        StatusCode::NOT_FOUND => RedfishError::NotFound { url },
        _ if *method == Method::GET => RedfishError::HTTPErrorCode { url, status_code },
        _ => RedfishError::RequestRejected {
            url,
            status_code,
            message_id: body.and_then(message::message_id),
        },
    }
}

fn header_str(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Credential;

    fn client(port: Option<u16>) -> RedfishHttpClient {
        RedfishHttpClient {
            target: ManagementTarget {
                host: "ilo-h1".to_string(),
                port,
                credential: Credential::new("admin", "secret"),
            },
            http_client: HttpClient::new(),
            timeout: None,
            auth: Auth::Basic,
        }
    }

    #[test]
    fn test_url_building() {
        let c = client(None);
        assert_eq!(
            c.url("/redfish/v1/Managers/1/"),
            "https://ilo-h1/redfish/v1/Managers/1/"
        );
        assert_eq!(c.url("Managers"), "https://ilo-h1/redfish/v1/Managers");
        let c = client(Some(8443));
        assert_eq!(
            c.url("/redfish/v1/"),
            "https://ilo-h1:8443/redfish/v1/"
        );
        assert_eq!(
            c.url("https://ilo-h1/redfish/v1/SessionService/Sessions/admin1/"),
            "https://ilo-h1/redfish/v1/SessionService/Sessions/admin1/"
        );
        let mut c = client(None);
        c.target.host = "http://127.0.0.1:8733/".to_string();
        assert_eq!(
            c.url("/redfish/v1/Managers/"),
            "http://127.0.0.1:8733/redfish/v1/Managers/"
        );
    }

    #[test]
    fn test_status_error_mapping() {
        let e = status_error(
            "h1",
            &Method::GET,
            "u".to_string(),
            StatusCode::UNAUTHORIZED,
            None,
        );
        assert!(matches!(e, RedfishError::Unauthorized { .. }));

        let e = status_error("h1", &Method::GET, "u".to_string(), StatusCode::NOT_FOUND, None);
        assert!(matches!(e, RedfishError::NotFound { .. }));

        let e = status_error(
            "h1",
            &Method::GET,
            "u".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
        );
        assert!(matches!(e, RedfishError::HTTPErrorCode { .. }));

        let body = json!({"error": {"@Message.ExtendedInfo": [{"MessageId": "iLO.2.15.PropertyNotWritableOrUnknown"}]}});
        let e = status_error(
            "h1",
            &Method::PATCH,
            "u".to_string(),
            StatusCode::BAD_REQUEST,
            Some(&body),
        );
        match e {
            RedfishError::RequestRejected { message_id, .. } => assert_eq!(
                message_id.as_deref(),
                Some("iLO.2.15.PropertyNotWritableOrUnknown")
            ),
            other => panic!("unexpected {other:?}"),
        }
    }
}
