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
use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::network::ConnectOptions;
use crate::{Connector, RedfishError, Transport};

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// The management controller a session is opened against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementTarget {
    /// Hostname or IP address of the iLO
    pub host: String,
    /// If absent the default HTTPS port 443 will be used
    pub port: Option<u16>,
    pub credential: Credential,
}

impl ManagementTarget {
    pub fn new(host: impl Into<String>, credential: Credential) -> Self {
        ManagementTarget {
            host: host.into(),
            port: None,
            credential,
        }
    }
}

/// Opens sessions with a fixed set of connection options.
pub struct SessionManager<C> {
    connector: C,
    options: ConnectOptions,
}

impl<C: Connector> SessionManager<C> {
    pub fn new(connector: C, options: ConnectOptions) -> Self {
        SessionManager { connector, options }
    }

    pub async fn open(&self, target: &ManagementTarget) -> Result<Session, RedfishError> {
        let transport = self.connector.connect(target, &self.options).await?;
        debug!("Connected to {}", target.host);
        Ok(Session {
            host: target.host.clone(),
            transport,
            closed: false,
        })
    }
}

/// An authenticated connection to one management controller.
///
/// Call [`Session::close`] when done. It is idempotent, and dropping an
/// unclosed session logs a warning because the BMC keeps the session slot
/// until it times out.
pub struct Session {
    host: String,
    transport: Box<dyn Transport>,
    closed: bool,
}

impl Session {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn get_raw(&self, odata_id: &str) -> Result<Value, RedfishError> {
        self.check_open()?;
        self.transport.get_raw(odata_id).await
    }

    pub async fn set_raw(&self, odata_id: &str, patch: &Value) -> Result<Option<Value>, RedfishError> {
        self.check_open()?;
        self.transport.set_raw(odata_id, patch).await
    }

    pub async fn invoke_action(&self, target: &str, body: &Value) -> Result<(), RedfishError> {
        self.check_open()?;
        self.transport.invoke_action(target, body).await
    }

    pub async fn close(&mut self) -> Result<(), RedfishError> {
        if self.closed {
            return Ok(());
        }
        // Mark closed first so a failed logout is not retried
        self.closed = true;
        debug!("Closing session to {}", self.host);
        self.transport.disconnect().await
    }

    fn check_open(&self) -> Result<(), RedfishError> {
        if self.closed {
            return Err(RedfishError::SessionClosed {
                host: self.host.clone(),
            });
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Session to {} dropped without close()", self.host);
        }
    }
}
