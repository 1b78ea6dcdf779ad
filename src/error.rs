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
use reqwest::StatusCode;

use crate::model::InvalidValueError;

/// Coarse classification of a [`RedfishError`], used when turning a failed
/// host into a result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    /// Bad credential or unreachable management endpoint.
    Auth,
    /// Network or protocol failure mid-walk.
    Transport,
    /// An expected resource or link is absent.
    NotFound,
    /// The target rejected a mutation.
    Request,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RedfishError {
    #[error("Network error talking to BMC at {url}. {source}")]
    NetworkError { url: String, source: reqwest::Error },

    #[error("Could not build HTTP client. {0}")]
    HttpClientBuild(#[source] reqwest::Error),

    #[error("HTTP {status_code} at {url}. See debug logs for details.")]
    HTTPErrorCode {
        url: String,
        status_code: StatusCode,
    },

    #[error("Authentication against {host} failed: {reason}")]
    Unauthorized { host: String, reason: String },

    #[error("Resource {url} not found")]
    NotFound { url: String },

    #[error("No link {link} in resource {odata_id}")]
    MissingLink { link: String, odata_id: String },

    #[error("Request to {url} rejected with HTTP {status_code}: {}", .message_id.as_deref().unwrap_or("no extended info"))]
    RequestRejected {
        url: String,
        status_code: StatusCode,
        message_id: Option<String>,
    },

    #[error("Could not deserialize response from {url}. Body: {body}. {source}")]
    JsonDeserializeError {
        url: String,
        body: String,
        source: serde_json::Error,
    },

    #[error("Could not serialize request body for {url}. Obj: {object_debug}. {source}")]
    JsonSerializeError {
        url: String,
        object_debug: String,
        source: serde_json::Error,
    },

    #[error("Remote returned empty body")]
    NoContent,

    #[error("Missing header {header} in response from {url}")]
    MissingHeader { header: String, url: String },

    #[error("Missing key {key} in JSON at {url}")]
    MissingKey { key: String, url: String },

    #[error("Key {key} should be {expected_type} at {url}")]
    InvalidKeyType {
        key: String,
        expected_type: String,
        url: String,
    },

    #[error("Field {field} parse error at {url}: {err}")]
    InvalidValue {
        url: String,
        field: String,
        err: InvalidValueError,
    },

    #[error("Session to {host} is already closed")]
    SessionClosed { host: String },
}

impl RedfishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RedfishError::Unauthorized { .. } => ErrorKind::Auth,
            RedfishError::NotFound { .. }
            | RedfishError::MissingLink { .. }
            | RedfishError::MissingKey { .. } => ErrorKind::NotFound,
            RedfishError::RequestRejected { .. } => ErrorKind::Request,
            RedfishError::NetworkError { .. }
            | RedfishError::HttpClientBuild(_)
            | RedfishError::HTTPErrorCode { .. }
            | RedfishError::JsonDeserializeError { .. }
            | RedfishError::JsonSerializeError { .. }
            | RedfishError::NoContent
            | RedfishError::MissingHeader { .. }
            | RedfishError::InvalidKeyType { .. }
            | RedfishError::InvalidValue { .. }
            | RedfishError::SessionClosed { .. } => ErrorKind::Transport,
        }
    }
}
