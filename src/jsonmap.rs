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
// jsonmap.rs
// Helpers for reading values out of Redfish JSON documents and for
// building the nested documents sent in partial updates.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::model::InvalidValueError;
use crate::RedfishError;

fn missing_key_error(key: &str, url: &str) -> RedfishError {
    RedfishError::MissingKey {
        key: key.to_string(),
        url: url.to_string(),
    }
}

fn invalid_type_error(key: &str, expected_type: &str, url: &str) -> RedfishError {
    RedfishError::InvalidKeyType {
        key: key.to_string(),
        expected_type: expected_type.to_string(),
        url: url.to_string(),
    }
}

// get_value retrieves a JSON value from a map, returning MissingKey
// error if the key is not found.
pub fn get_value<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    url: &str,
) -> Result<&'a Value, RedfishError> {
    map.get(key).ok_or_else(|| missing_key_error(key, url))
}

// get_str extracts a string value from a JSON map, returning appropriate
// errors if the key is missing or the value is not a string.
pub fn get_str<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    url: &str,
) -> Result<&'a str, RedfishError> {
    get_value(map, key, url)?
        .as_str()
        .ok_or_else(|| invalid_type_error(key, "string", url))
}

// get_object extracts an object from a JSON map.
pub fn get_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    url: &str,
) -> Result<&'a Map<String, Value>, RedfishError> {
    get_value(map, key, url)?
        .as_object()
        .ok_or_else(|| invalid_type_error(key, "object", url))
}

/// A dotted property path into a resource, e.g. `Oem.Hpe.AlertMailSMTPSecureEnabled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    pub fn parse(path: &str) -> Result<Self, InvalidValueError> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(InvalidValueError(format!(
                "Invalid property path: '{path}'"
            )));
        }
        Ok(PropertyPath { segments })
    }

    /// Read the value at this path. Reports which key is missing or which level is not an object.
    pub fn require<'a>(
        &self,
        map: &'a Map<String, Value>,
        url: &str,
    ) -> Result<&'a Value, RedfishError> {
        let (last, parents) = self
            .segments
            .split_last()
            .ok_or_else(|| missing_key_error("", url))?;
        let mut current = map;
        for key in parents {
            current = get_object(current, key, url)?;
        }
        get_value(current, last, url)
    }

    /// Build the minimal nested document that sets only the leaf of this path.
    pub fn to_patch(&self, value: Value) -> Value {
        self.segments
            .iter()
            .rev()
            .fold(value, |inner, key| {
                let mut m = Map::new();
                m.insert(key.clone(), inner);
                Value::Object(m)
            })
    }
}

impl FromStr for PropertyPath {
    type Err = InvalidValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyPath::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_str_success() {
        let value = json!({
            "FirmwareVersion": "iLO 5 v2.72",
            "Id": "1"
        });
        let map = value.as_object().unwrap();

        let result = get_str(map, "FirmwareVersion", "/redfish/v1/Managers/1/");
        assert_eq!(result.unwrap(), "iLO 5 v2.72");
    }

    #[test]
    fn test_get_str_missing_key() {
        let value = json!({"Id": "1"});
        let map = value.as_object().unwrap();

        let result = get_str(map, "FirmwareVersion", "/redfish/v1/Managers/1/");
        assert!(matches!(result, Err(RedfishError::MissingKey { .. })));
    }

    #[test]
    fn test_get_str_wrong_type() {
        let value = json!({"FirmwareVersion": 5});
        let map = value.as_object().unwrap();

        let result = get_str(map, "FirmwareVersion", "/redfish/v1/Managers/1/");
        assert!(matches!(result, Err(RedfishError::InvalidKeyType { .. })));
    }

    #[test]
    fn test_path_parse() {
        let p = PropertyPath::parse("Oem.Hpe.AlertMailSMTPSecureEnabled").unwrap();
        assert_eq!(p.to_string(), "Oem.Hpe.AlertMailSMTPSecureEnabled");

        assert!(PropertyPath::parse("").is_err());
        assert!(PropertyPath::parse("Oem..Leaf").is_err());
        assert!(PropertyPath::parse("Oem.Hpe.").is_err());
    }

    #[test]
    fn test_to_patch_builds_nested_document() {
        let p: PropertyPath = "Oem.Hpe.AlertMailSMTPSecureEnabled".parse().unwrap();
        assert_eq!(
            p.to_patch(json!(true)),
            json!({"Oem": {"Hpe": {"AlertMailSMTPSecureEnabled": true}}})
        );

        let single = PropertyPath::parse("HostName").unwrap();
        assert_eq!(single.to_patch(json!("h1")), json!({"HostName": "h1"}));
    }

    #[test]
    fn test_require() {
        let doc = json!({"Oem": {"Hpe": {"AlertMailSMTPSecureEnabled": false}}, "Id": "1"});
        let map = doc.as_object().unwrap();
        let p = PropertyPath::parse("Oem.Hpe.AlertMailSMTPSecureEnabled").unwrap();
        assert_eq!(p.require(map, "/np").unwrap(), &json!(false));

        let missing = PropertyPath::parse("Oem.Hpe.AlertMailEmail").unwrap();
        assert!(matches!(
            missing.require(map, "/np"),
            Err(RedfishError::MissingKey { key, .. }) if key == "AlertMailEmail"
        ));

        // Id is a string, so descending through it fails
        let through_leaf = PropertyPath::parse("Id.Nested").unwrap();
        assert!(matches!(
            through_leaf.require(map, "/np"),
            Err(RedfishError::InvalidKeyType { .. })
        ));
    }
}
