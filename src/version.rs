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
use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use tracing::debug;
use version_compare::{compare_to, Cmp};

use crate::jsonmap::get_str;
use crate::model::{InvalidValueError, ResourceNode};

/// iLO generation whose SMTP settings this crate knows how to change.
pub const SUPPORTED_GENERATION: &str = "5";

const FIRMWARE_VERSION: &str = "FirmwareVersion";

fn revision_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "v2.72", "2.72", "v2.72b"
    RE.get_or_init(|| Regex::new(r"^v?(?P<revision>\d+(?:\.\d+)*)").expect("static regex"))
}

/// A manager firmware version as reported in `FirmwareVersion`, e.g. "iLO 5 v2.72".
///
/// The generation is the second whitespace separated token, kept verbatim.
/// Anything after the revision ("(Feb 2022)") is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub product: String,
    pub generation: String,
    pub revision: Option<String>,
}

impl FromStr for FirmwareVersion {
    type Err = InvalidValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let (Some(product), Some(generation)) = (tokens.next(), tokens.next()) else {
            return Err(InvalidValueError(format!(
                "Unrecognized firmware version: '{s}'"
            )));
        };
        let revision = tokens
            .next()
            .and_then(|t| revision_regex().captures(t))
            .map(|caps| caps["revision"].to_string());
        Ok(FirmwareVersion {
            product: product.to_string(),
            generation: generation.to_string(),
            revision,
        })
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.product, self.generation)?;
        if let Some(rev) = &self.revision {
            write!(f, " v{rev}")?;
        }
        Ok(())
    }
}

/// Decides whether a manager is a hardware generation we write to.
#[derive(Debug, Clone)]
pub struct VersionGate {
    supported_generation: String,
    minimum_revision: Option<String>,
}

impl Default for VersionGate {
    fn default() -> Self {
        VersionGate {
            supported_generation: SUPPORTED_GENERATION.to_string(),
            minimum_revision: None,
        }
    }
}

impl VersionGate {
    /// Also reject firmware of the supported generation older than `revision`, e.g. "2.10".
    pub fn with_minimum_revision(mut self, revision: impl Into<String>) -> Self {
        self.minimum_revision = Some(revision.into());
        self
    }

    /// The raw `FirmwareVersion` string of a manager node, if any.
    pub fn reported_version(node: &ResourceNode) -> Option<&str> {
        get_str(node.attributes(), FIRMWARE_VERSION, node.odata_id()).ok()
    }

    pub fn is_supported(&self, node: &ResourceNode) -> bool {
        let raw = match get_str(node.attributes(), FIRMWARE_VERSION, node.odata_id()) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("{e}");
                return false;
            }
        };
        match raw.parse::<FirmwareVersion>() {
            Ok(v) => self.is_supported_version(&v),
            Err(e) => {
                debug!("{}: {e}", node.odata_id());
                false
            }
        }
    }

    pub fn is_supported_version(&self, version: &FirmwareVersion) -> bool {
        if version.generation != self.supported_generation {
            return false;
        }
        let Some(minimum) = &self.minimum_revision else {
            return true;
        };
        match &version.revision {
            Some(rev) => matches!(
                compare_to(rev, minimum, Cmp::Ge),
                Ok(true)
            ),
            None => false,
        }
    }
}
