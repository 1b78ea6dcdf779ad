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
// Physical drive inventory: Systems → first system → Storage → Drives.

use serde::Serialize;
use tracing::{debug, info};

use crate::batch::{TargetAction, TargetContext, TargetState};
use crate::model::storage::{Drive, Storage};
use crate::model::{ODataId, ResourceHealth};
use crate::walker::ResourceWalker;
use crate::{ErrorKind, RedfishError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DriveSummary {
    pub storage_id: String,
    pub drive_id: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub capacity_bytes: Option<u64>,
    pub media_type: Option<String>,
    pub protocol: Option<String>,
    pub location: Option<String>,
    pub health: Option<ResourceHealth>,
}

impl DriveSummary {
    fn new(storage_id: &str, drive: Drive) -> Self {
        let location = drive.location().map(str::to_string);
        let drive_id = drive
            .id
            .clone()
            .unwrap_or_else(|| ODataId::from(drive.odata_id.as_str()).last_segment().to_string());
        DriveSummary {
            storage_id: storage_id.to_string(),
            drive_id,
            model: drive.model.map(|m| m.trim().to_string()),
            serial_number: drive.serial_number.map(|s| s.trim().to_string()),
            capacity_bytes: drive.capacity_bytes,
            media_type: drive.media_type,
            protocol: drive.protocol,
            location,
            health: drive.status.and_then(|s| s.health),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DriveInventoryRecord {
    pub hostname: String,
    pub drives: Vec<DriveSummary>,
    pub error: Option<(ErrorKind, String)>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DriveInventoryAction;

#[async_trait::async_trait]
impl TargetAction for DriveInventoryAction {
    type Record = DriveInventoryRecord;

    async fn run(&self, ctx: &mut TargetContext<'_>) -> Result<DriveInventoryRecord, RedfishError> {
        let walker = ResourceWalker::new(ctx.session);
        let system = walker.system().await?;
        let storage_collection = walker.follow(&system, "Storage").await?;

        let mut drives = Vec::new();
        for node in walker.all_members(&storage_collection).await? {
            let storage: Storage = node.to_typed()?;
            let storage_id = storage
                .id
                .unwrap_or_else(|| ODataId::from(storage.odata_id).last_segment().to_string());
            debug!("{}: storage {storage_id} has {} drives", ctx.hostname(), storage.drives.len());
            for id in &storage.drives {
                let drive: Drive = walker.fetch(&id.odata_id).await?.to_typed()?;
                drives.push(DriveSummary::new(&storage_id, drive));
            }
        }
        ctx.advance(TargetState::ReadDone);
        info!("{}: {} physical drives", ctx.hostname(), drives.len());
        Ok(DriveInventoryRecord {
            hostname: ctx.hostname().to_string(),
            drives,
            error: None,
        })
    }

    fn failed(&self, hostname: &str, err: &RedfishError) -> DriveInventoryRecord {
        DriveInventoryRecord {
            hostname: hostname.to_string(),
            drives: Vec::new(),
            error: Some((err.kind(), err.to_string())),
        }
    }
}
