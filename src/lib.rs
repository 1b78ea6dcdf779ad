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
//! Out-of-band administration of HPE iLO management controllers over Redfish.
//!
//! A batch of hosts is processed one at a time: open a session, walk the
//! resource graph, check the firmware generation, read or change a setting,
//! close the session. Every host yields exactly one record.
use serde_json::Value;

pub mod batch;
mod error;
pub mod inventory;
pub mod jsonmap;
pub mod model;
pub mod mutator;
mod network;
pub mod session;
pub mod smtp;
pub mod version;
pub mod walker;

pub use batch::{BatchDriver, TargetAction, TargetContext, TargetState};
pub use error::{ErrorKind, RedfishError};
pub use inventory::{DriveInventoryAction, DriveInventoryRecord, DriveSummary};
pub use jsonmap::PropertyPath;
pub use model::{EnabledDisabled, ResourceNode};
pub use mutator::{ApplyOutcome, SettingsMutator, SettingsPatch};
pub use network::{
    AuthMethod, CertPolicy, ConnectOptions, RedfishClientPool, RedfishClientPoolBuilder,
    RedfishHttpClient, REDFISH_ENDPOINT,
};
pub use session::{Credential, ManagementTarget, Session, SessionManager};
pub use smtp::{Outcome, ResultRecord, SmtpSecureAction};
pub use version::{FirmwareVersion, VersionGate};
pub use walker::ResourceWalker;

/// Opens connections to management controllers.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Connect and authenticate. Fails with [`RedfishError::Unauthorized`] on bad
    /// credentials, network errors if the host is unreachable.
    async fn connect(
        &self,
        target: &ManagementTarget,
        options: &ConnectOptions,
    ) -> Result<Box<dyn Transport>, RedfishError>;
}

/// Raw access to one connected management controller. All calls will include one or more HTTP
/// network calls.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// GET the document at `odata_id`
    async fn get_raw(&self, odata_id: &str) -> Result<Value, RedfishError>;

    /// PATCH `patch` onto `odata_id`. Returns the response body, if there was one.
    async fn set_raw(&self, odata_id: &str, patch: &Value) -> Result<Option<Value>, RedfishError>;

    /// POST `body` to an action target
    async fn invoke_action(&self, target: &str, body: &Value) -> Result<(), RedfishError>;

    /// Log out. Further calls fail.
    async fn disconnect(&mut self) -> Result<(), RedfishError>;
}
