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

use tracing::{debug, info, warn};

use crate::session::{Credential, ManagementTarget, Session, SessionManager};
use crate::version::VersionGate;
use crate::{Connector, RedfishError};

/// Where a host is in its run. Every host ends in `Closed`, failures included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Init,
    Connected,
    VersionChecked,
    ReadDone,
    WriteDone,
    Closed,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Work done against one host while its session is open.
#[async_trait::async_trait]
pub trait TargetAction: Send + Sync {
    type Record: Send;

    async fn run(&self, ctx: &mut TargetContext<'_>) -> Result<Self::Record, RedfishError>;

    /// The record for a host whose session could not be opened or whose run failed.
    fn failed(&self, hostname: &str, err: &RedfishError) -> Self::Record;
}

/// Handed to a [`TargetAction`]: the open session, the version gate and the state tracker.
pub struct TargetContext<'a> {
    pub session: &'a Session,
    pub gate: &'a VersionGate,
    state: TargetState,
}

impl TargetContext<'_> {
    pub fn hostname(&self) -> &str {
        self.session.host()
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn advance(&mut self, next: TargetState) {
        debug!("{}: {} -> {next}", self.session.host(), self.state);
        self.state = next;
    }
}

/// Runs an action against many hosts, one after the other.
pub struct BatchDriver<C> {
    sessions: SessionManager<C>,
    gate: VersionGate,
}

impl<C: Connector> BatchDriver<C> {
    pub fn new(sessions: SessionManager<C>, gate: VersionGate) -> Self {
        BatchDriver { sessions, gate }
    }

    /// Same credential for every host. Returns one record per host, in input order.
    pub async fn run_hosts<A: TargetAction>(
        &self,
        hosts: &[String],
        credential: &Credential,
        action: &A,
    ) -> Vec<A::Record> {
        let targets: Vec<ManagementTarget> = hosts
            .iter()
            .map(|h| ManagementTarget::new(h.clone(), credential.clone()))
            .collect();
        self.run(&targets, action).await
    }

    pub async fn run<A: TargetAction>(&self, targets: &[ManagementTarget], action: &A) -> Vec<A::Record> {
        let mut records = Vec::with_capacity(targets.len());
        for target in targets {
            records.push(self.run_one(target, action).await);
        }
        records
    }

    async fn run_one<A: TargetAction>(&self, target: &ManagementTarget, action: &A) -> A::Record {
        let mut session = match self.sessions.open(target).await {
            Ok(s) => s,
            Err(e) => {
                warn!("{}: could not open session: {e}", target.host);
                return action.failed(&target.host, &e);
            }
        };

        let result = {
            let mut ctx = TargetContext {
                session: &session,
                gate: &self.gate,
                state: TargetState::Init,
            };
            ctx.advance(TargetState::Connected);
            let result = action.run(&mut ctx).await;
            if let Err(e) = &result {
                info!("{}: failed after {}: {e}", target.host, ctx.state());
            }
            result
        };

        if let Err(e) = session.close().await {
            warn!("{}: closing session failed: {e}", target.host);
        }
        debug!("{}: -> {}", target.host, TargetState::Closed);

        match result {
            Ok(record) => record,
            Err(e) => action.failed(&target.host, &e),
        }
    }
}
