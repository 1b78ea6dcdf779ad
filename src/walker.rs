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
use tracing::{debug, warn};

use crate::model::ResourceNode;
use crate::session::Session;
use crate::RedfishError;

pub const MANAGERS_PATH: &str = "/redfish/v1/Managers/";
pub const SYSTEMS_PATH: &str = "/redfish/v1/Systems/";

/// Resolves Redfish paths to documents and follows the links between them.
///
/// Nothing is cached, every call is a fresh GET.
pub struct ResourceWalker<'a> {
    session: &'a Session,
}

impl<'a> ResourceWalker<'a> {
    pub fn new(session: &'a Session) -> Self {
        ResourceWalker { session }
    }

    pub async fn fetch(&self, odata_id: &str) -> Result<ResourceNode, RedfishError> {
        let doc = self.session.get_raw(odata_id).await?;
        ResourceNode::from_json(odata_id, doc)
    }

    /// Fetch the resource `node` links to through the (dotted) property `link`.
    pub async fn follow(&self, node: &ResourceNode, link: &str) -> Result<ResourceNode, RedfishError> {
        let target = node.require_link(link)?;
        self.fetch(target).await
    }

    /// Only the first member of a collection is inspected. iLO exposes a
    /// single manager and a single system, other layouts are logged.
    pub async fn first_member(&self, collection: &ResourceNode) -> Result<ResourceNode, RedfishError> {
        let members = collection.members();
        let Some(first) = members.first() else {
            return Err(RedfishError::MissingLink {
                link: "Members".to_string(),
                odata_id: collection.odata_id().to_string(),
            });
        };
        if members.len() > 1 {
            warn!(
                "{} on {} has {} members, only {first} is inspected",
                collection.odata_id(),
                self.session.host(),
                members.len()
            );
        }
        self.fetch(first).await
    }

    pub async fn all_members(&self, collection: &ResourceNode) -> Result<Vec<ResourceNode>, RedfishError> {
        let mut out = Vec::new();
        for member in collection.members() {
            out.push(self.fetch(member).await?);
        }
        debug!("Fetched {} members of {}", out.len(), collection.odata_id());
        Ok(out)
    }

    /// managers collection → first member
    pub async fn manager(&self) -> Result<ResourceNode, RedfishError> {
        let managers = self.fetch(MANAGERS_PATH).await?;
        self.first_member(&managers).await
    }

    /// manager → NetworkProtocol
    pub async fn network_protocol(&self, manager: &ResourceNode) -> Result<ResourceNode, RedfishError> {
        self.follow(manager, "NetworkProtocol").await
    }

    /// systems collection → first member
    pub async fn system(&self) -> Result<ResourceNode, RedfishError> {
        let systems = self.fetch(SYSTEMS_PATH).await?;
        self.first_member(&systems).await
    }
}
