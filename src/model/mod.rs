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
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod manager;
pub mod message;
pub mod resource;
pub mod storage;

pub use manager::*;
pub use message::{ExtendedInfo, Message};
pub use resource::ResourceNode;

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ODataId {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl From<String> for ODataId {
    fn from(item: String) -> Self {
        ODataId { odata_id: item }
    }
}

impl From<&str> for ODataId {
    fn from(item: &str) -> Self {
        ODataId {
            odata_id: item.to_string(),
        }
    }
}

impl ODataId {
    // Last non-empty segment of the id. iLO ids end in a trailing slash.
    pub fn last_segment(&self) -> &str {
        self.odata_id
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

#[derive(
    Debug, Default, Serialize, Deserialize, Copy, Clone, Eq, PartialEq, clap::ValueEnum,
)]
pub enum EnabledDisabled {
    #[default]
    Enabled,
    Disabled,
}

impl EnabledDisabled {
    pub fn is_enabled(self) -> bool {
        self == EnabledDisabled::Enabled
    }
}

impl fmt::Display for EnabledDisabled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for EnabledDisabled {
    type Err = InvalidValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enabled" => Ok(Self::Enabled),
            "Disabled" => Ok(Self::Disabled),
            x => Err(InvalidValueError(format!(
                "Invalid EnabledDisabled value: {x}"
            ))),
        }
    }
}

// iLO models toggles such as AlertMailSMTPSecureEnabled as plain booleans.
impl From<EnabledDisabled> for serde_json::Value {
    fn from(val: EnabledDisabled) -> Self {
        serde_json::Value::Bool(val.is_enabled())
    }
}

impl From<bool> for EnabledDisabled {
    fn from(val: bool) -> Self {
        if val {
            EnabledDisabled::Enabled
        } else {
            EnabledDisabled::Disabled
        }
    }
}

#[derive(Debug)]
pub struct InvalidValueError(pub String);

impl std::error::Error for InvalidValueError {}

impl fmt::Display for InvalidValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceStatus {
    pub health: Option<ResourceHealth>,
    pub state: Option<String>,
}

/// Health of a disk drive, controller, etc
/// Defined in Resource_v1.xml
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq)]
pub enum ResourceHealth {
    #[serde(rename = "OK")]
    #[default]
    Ok,
    Warning,
    Critical,
}

impl fmt::Display for ResourceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_segment() {
        let id = ODataId::from("/redfish/v1/Managers/1/");
        assert_eq!(id.last_segment(), "1");
        let id = ODataId::from("/redfish/v1/Systems/1/Storage/DE00A000");
        assert_eq!(id.last_segment(), "DE00A000");
    }

    #[test]
    fn test_enabled_disabled() {
        assert_eq!(
            "Disabled".parse::<EnabledDisabled>().unwrap(),
            EnabledDisabled::Disabled
        );
        assert!("disabled".parse::<EnabledDisabled>().is_err());
        assert_eq!(
            serde_json::Value::from(EnabledDisabled::Enabled),
            serde_json::Value::Bool(true)
        );
        assert_eq!(EnabledDisabled::from(false), EnabledDisabled::Disabled);
    }
}
