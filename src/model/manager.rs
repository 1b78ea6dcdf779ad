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

/// Manager network services. iLO keeps its AlertMail (SMTP) settings under `Oem.Hpe`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerNetworkProtocol {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    pub id: Option<String>,
    #[serde(rename = "HostName")]
    pub host_name: Option<String>,
    #[serde(rename = "FQDN")]
    pub fqdn: Option<String>,
    pub oem: Option<NetworkProtocolOem>,
}

impl ManagerNetworkProtocol {
    pub fn alert_mail(&self) -> Option<&AlertMailSettings> {
        self.oem.as_ref().and_then(|o| o.hpe.as_ref())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkProtocolOem {
    pub hpe: Option<AlertMailSettings>,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AlertMailSettings {
    #[serde(rename = "AlertMailEnabled")]
    pub enabled: Option<bool>,
    #[serde(rename = "AlertMailEmail")]
    pub email: Option<String>,
    #[serde(rename = "AlertMailSenderDomain")]
    pub sender_domain: Option<String>,
    #[serde(rename = "AlertMailSMTPServer")]
    pub smtp_server: Option<String>,
    #[serde(rename = "AlertMailSMTPPort")]
    pub smtp_port: Option<u16>,
    #[serde(rename = "AlertMailSMTPSecureEnabled")]
    pub smtp_secure_enabled: Option<bool>,
    #[serde(rename = "AlertMailSMTPAuthEnabled")]
    pub smtp_auth_enabled: Option<bool>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_network_protocol_alert_mail() {
        let np: ManagerNetworkProtocol = serde_json::from_value(serde_json::json!({
            "@odata.id": "/redfish/v1/Managers/1/NetworkProtocol/",
            "HostName": "ilo-h1",
            "Oem": {"Hpe": {
                "AlertMailEnabled": true,
                "AlertMailEmail": "ops@example.com",
                "AlertMailSMTPPort": 25,
                "AlertMailSMTPSecureEnabled": false,
                "AlertMailSMTPServer": "smtp.example.com"
            }}
        }))
        .unwrap();
        let mail = np.alert_mail().unwrap();
        assert_eq!(mail.smtp_secure_enabled, Some(false));
        assert_eq!(mail.smtp_port, Some(25));
        assert_eq!(mail.smtp_auth_enabled, None);
    }
}
