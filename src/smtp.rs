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
// AlertMail (SMTP) security settings of iLO 5 managers.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::batch::{TargetAction, TargetContext, TargetState};
use crate::jsonmap::PropertyPath;
use crate::model::{EnabledDisabled, ManagerNetworkProtocol, ResourceNode};
use crate::mutator::SettingsMutator;
use crate::version::VersionGate;
use crate::walker::ResourceWalker;
use crate::{ErrorKind, RedfishError};

pub const SMTP_SECURE_PROPERTY: &str = "Oem.Hpe.AlertMailSMTPSecureEnabled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Outcome", rename_all_fields = "PascalCase")]
pub enum Outcome {
    Read,
    Applied,
    DryRun,
    /// Unsupported hardware generation, nothing was written
    NotAttempted { reported_version: Option<String> },
    Failed { kind: ErrorKind, message: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Read => write!(f, "Read"),
            Outcome::Applied => write!(f, "Applied"),
            Outcome::DryRun => write!(f, "DryRun"),
            Outcome::NotAttempted { .. } => write!(f, "NotAttempted"),
            Outcome::Failed { kind, message } => write!(f, "Failed ({kind}): {message}"),
        }
    }
}

/// One per host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultRecord {
    pub hostname: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub smtp_secure_enabled: Option<EnabledDisabled>,
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpSecureAction {
    Read,
    Set {
        state: EnabledDisabled,
        dry_run: bool,
        send_test: bool,
    },
}

fn smtp_secure_path() -> Result<PropertyPath, RedfishError> {
    SMTP_SECURE_PROPERTY
        .parse()
        .map_err(|err| RedfishError::InvalidValue {
            url: String::new(),
            field: SMTP_SECURE_PROPERTY.to_string(),
            err,
        })
}

// The setting as the manager currently reports it. Managers that do not
// expose it are a NotFound failure, never a successful read of nothing.
fn current_state(node: &ResourceNode) -> Result<EnabledDisabled, RedfishError> {
    let settings: ManagerNetworkProtocol = node.to_typed()?;
    settings
        .alert_mail()
        .and_then(|mail| mail.smtp_secure_enabled)
        .map(EnabledDisabled::from)
        .ok_or_else(|| RedfishError::MissingKey {
            key: SMTP_SECURE_PROPERTY.to_string(),
            url: node.odata_id().to_string(),
        })
}

fn verified_state(value: &Value, url: &str) -> Result<EnabledDisabled, RedfishError> {
    value
        .as_bool()
        .map(EnabledDisabled::from)
        .ok_or_else(|| RedfishError::InvalidKeyType {
            key: SMTP_SECURE_PROPERTY.to_string(),
            expected_type: "boolean".to_string(),
            url: url.to_string(),
        })
}

#[async_trait::async_trait]
impl TargetAction for SmtpSecureAction {
    type Record = ResultRecord;

    async fn run(&self, ctx: &mut TargetContext<'_>) -> Result<ResultRecord, RedfishError> {
        let walker = ResourceWalker::new(ctx.session);
        let manager = walker.manager().await?;
        let hostname = ctx.hostname().to_string();

        if !ctx.gate.is_supported(&manager) {
            let reported_version = VersionGate::reported_version(&manager).map(str::to_string);
            info!("{hostname}: firmware {reported_version:?} is not supported, skipping");
            return Ok(ResultRecord {
                hostname,
                outcome: Outcome::NotAttempted { reported_version },
                smtp_secure_enabled: None,
                message_id: None,
            });
        }
        ctx.advance(TargetState::VersionChecked);

        let network_protocol = walker.network_protocol(&manager).await?;
        let current = current_state(&network_protocol)?;

        match self {
            SmtpSecureAction::Read => {
                ctx.advance(TargetState::ReadDone);
                Ok(ResultRecord {
                    hostname,
                    outcome: Outcome::Read,
                    smtp_secure_enabled: Some(current),
                    message_id: None,
                })
            }
            SmtpSecureAction::Set {
                state,
                dry_run,
                send_test,
            } => {
                debug!("{hostname}: AlertMailSMTPSecureEnabled is {current}, setting {state}");
                let path = smtp_secure_path()?;
                let mutator = SettingsMutator;
                let applied = mutator
                    .apply(ctx.session, &network_protocol, &path, (*state).into(), *dry_run)
                    .await?;
                ctx.advance(TargetState::WriteDone);
                if *send_test && !*dry_run {
                    mutator
                        .send_test_notification(ctx.session, &network_protocol)
                        .await;
                }
                let verified = verified_state(&applied.verified, network_protocol.odata_id())?;
                info!(
                    "{hostname}: AlertMailSMTPSecureEnabled now {verified} ({:?})",
                    applied.message_id
                );
                Ok(ResultRecord {
                    hostname,
                    outcome: if *dry_run {
                        Outcome::DryRun
                    } else {
                        Outcome::Applied
                    },
                    smtp_secure_enabled: Some(verified),
                    message_id: applied.message_id,
                })
            }
        }
    }

    fn failed(&self, hostname: &str, err: &RedfishError) -> ResultRecord {
        ResultRecord {
            hostname: hostname.to_string(),
            outcome: Outcome::Failed {
                kind: err.kind(),
                message: err.to_string(),
            },
            smtp_secure_enabled: None,
            message_id: match err {
                RedfishError::RequestRejected { message_id, .. } => message_id.clone(),
                _ => None,
            },
        }
    }
}
