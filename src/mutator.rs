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
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::jsonmap::PropertyPath;
use crate::model::{message, ResourceNode};
use crate::session::Session;
use crate::walker::ResourceWalker;
use crate::RedfishError;

const TEST_ALERT_ACTION: &str = "SendTestAlertMail";

/// A partial update: only `path` is sent, set to `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsPatch {
    pub target: String,
    pub path: PropertyPath,
    pub value: Value,
}

impl SettingsPatch {
    pub fn new(node: &ResourceNode, path: PropertyPath, value: Value) -> Self {
        SettingsPatch {
            target: node.odata_id().to_string(),
            path,
            value,
        }
    }

    pub fn document(&self) -> Value {
        self.path.to_patch(self.value.clone())
    }
}

/// What apply() observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// MessageId from the response's extended info. None for dry runs and empty responses.
    pub message_id: Option<String>,
    /// The value in effect after the call, read back from the service.
    pub verified: Value,
    pub dry_run: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SettingsMutator;

impl SettingsMutator {
    pub async fn apply(
        &self,
        session: &Session,
        node: &ResourceNode,
        path: &PropertyPath,
        value: Value,
        dry_run: bool,
    ) -> Result<ApplyOutcome, RedfishError> {
        let patch = SettingsPatch::new(node, path.clone(), value);
        let walker = ResourceWalker::new(session);

        let message_id = if dry_run {
            info!(
                "{}: dry run, would PATCH {} {} = {}",
                session.host(),
                patch.target,
                patch.path,
                patch.value
            );
            None
        } else {
            let response = session.set_raw(&patch.target, &patch.document()).await?;
            let message_id = response.as_ref().and_then(message::message_id);
            debug!(
                "{}: PATCH {} {} -> {:?}",
                session.host(),
                patch.target,
                patch.path,
                message_id
            );
            message_id
        };

        // Never trust the write, read the setting back. A missing property is an error.
        let refreshed = walker.fetch(&patch.target).await?;
        let verified = path
            .require(refreshed.attributes(), refreshed.odata_id())?
            .clone();
        if !dry_run && verified != patch.value {
            warn!(
                "{}: {} is {} after setting it to {}",
                session.host(),
                patch.path,
                verified,
                patch.value
            );
        }
        Ok(ApplyOutcome {
            message_id,
            verified,
            dry_run,
        })
    }

    /// Ask iLO to send a test AlertMail. Failures are logged and discarded.
    pub async fn send_test_notification(&self, session: &Session, node: &ResourceNode) {
        let target = test_alert_target(node);
        match session.invoke_action(&target, &json!({})).await {
            Ok(()) => info!("{}: test alert mail requested", session.host()),
            Err(e) => warn!("{}: test alert mail via {target} failed: {e}", session.host()),
        }
    }
}

fn test_alert_target(node: &ResourceNode) -> String {
    let advertised = node
        .attributes()
        .get("Oem")
        .and_then(|o| o.get("Hpe"))
        .and_then(|h| h.get("Actions"))
        .and_then(Value::as_object)
        .and_then(|actions| {
            actions
                .iter()
                .find(|(name, _)| name.ends_with(TEST_ALERT_ACTION))
                .and_then(|(_, action)| action.get("target"))
                .and_then(Value::as_str)
        });
    match advertised {
        Some(t) => t.to_string(),
        None => format!(
            "{}/Actions/Oem/Hpe/HpeiLOManagerNetworkProtocol.{TEST_ALERT_ACTION}/",
            node.odata_id().trim_end_matches('/')
        ),
    }
}
