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
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// https://redfish.dmtf.org/schemas/v1/Message.v1_1_2.json
/// The message that the Redfish service returns.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub message: Option<String>,
    #[serde(default)]
    pub message_args: Vec<String>,
    pub message_id: String,
    pub resolution: Option<String>,
    pub severity: Option<String>,
}

/// The `@Message.ExtendedInfo` envelope. iLO returns it inside an `error`
/// object even for successful PATCH requests, other services put it at the top level.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct ExtendedInfo {
    #[serde(rename = "@Message.ExtendedInfo", default)]
    pub messages: Vec<Message>,
}

impl ExtendedInfo {
    pub fn from_response(body: &Value) -> Option<ExtendedInfo> {
        let envelope = match body.get("error") {
            Some(e) if e.get("@Message.ExtendedInfo").is_some() => e,
            _ => body,
        };
        envelope.get("@Message.ExtendedInfo")?;
        serde_json::from_value(envelope.clone()).ok()
    }

    /// MessageId of the first message, trimmed.
    pub fn message_id(&self) -> Option<String> {
        self.messages
            .first()
            .map(|m| m.message_id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}

pub fn message_id(body: &Value) -> Option<String> {
    ExtendedInfo::from_response(body).and_then(|info| info.message_id())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_ilo_error_envelope() {
        let body = json!({
            "error": {
                "code": "iLO.0.10.ExtendedInfo",
                "message": "See @Message.ExtendedInfo for more information.",
                "@Message.ExtendedInfo": [{"MessageId": "  iLO.2.15.Success \n"}]
            }
        });
        assert_eq!(message_id(&body).as_deref(), Some("iLO.2.15.Success"));
    }

    #[test]
    fn test_top_level_envelope() {
        let body = json!({
            "@Message.ExtendedInfo": [
                {"MessageId": "Base.1.4.Success", "Severity": "OK"},
                {"MessageId": "Base.1.4.Other"}
            ]
        });
        assert_eq!(message_id(&body).as_deref(), Some("Base.1.4.Success"));
    }

    #[test]
    fn test_no_envelope() {
        assert_eq!(message_id(&json!({"Id": "1"})), None);
        assert_eq!(message_id(&Value::Null), None);
        assert_eq!(
            message_id(&json!({"@Message.ExtendedInfo": [{"MessageId": "   "}]})),
            None
        );
    }
}
