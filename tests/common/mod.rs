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
// An in-memory fleet of fake iLOs implementing Connector/Transport.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use hpe_oob::{ConnectOptions, Connector, ManagementTarget, RedfishError, Transport};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};

pub const MANAGER: &str = "/redfish/v1/Managers/1/";
pub const NETWORK_PROTOCOL: &str = "/redfish/v1/Managers/1/NetworkProtocol/";
pub const PATCH_MESSAGE_ID: &str = "iLO.2.15.ResetRequired";

#[derive(Debug, Default)]
pub struct FakeHost {
    pub docs: HashMap<String, Value>,
    pub refuse_login: bool,
    pub fail_get: HashSet<String>,
    pub reject_patch: Option<String>,
    pub fail_actions: bool,
    pub fail_disconnect: bool,
    pub opened: u32,
    pub closed: u32,
    pub gets: Vec<String>,
    pub patches: Vec<(String, Value)>,
    pub actions: Vec<String>,
}

impl FakeHost {
    /// An iLO reporting `firmware` with AlertMailSMTPSecureEnabled = `secure`.
    pub fn ilo(firmware: &str, secure: bool) -> Self {
        let mut docs = HashMap::new();
        docs.insert(
            "/redfish/v1/Managers/".to_string(),
            json!({
                "@odata.id": "/redfish/v1/Managers/",
                "Members": [{"@odata.id": MANAGER}]
            }),
        );
        docs.insert(
            MANAGER.to_string(),
            json!({
                "@odata.id": MANAGER,
                "Id": "1",
                "FirmwareVersion": firmware,
                "NetworkProtocol": {"@odata.id": NETWORK_PROTOCOL}
            }),
        );
        docs.insert(
            NETWORK_PROTOCOL.to_string(),
            json!({
                "@odata.id": NETWORK_PROTOCOL,
                "Id": "NetworkProtocol",
                "Oem": {"Hpe": {
                    "AlertMailEnabled": true,
                    "AlertMailSMTPServer": "smtp.example.com",
                    "AlertMailSMTPSecureEnabled": secure,
                    "Actions": {
                        "#HpeiLOManagerNetworkProtocol.SendTestAlertMail": {
                            "target": "/redfish/v1/Managers/1/NetworkProtocol/Actions/Oem/Hpe/HpeiLOManagerNetworkProtocol.SendTestAlertMail/"
                        }
                    }
                }}
            }),
        );
        FakeHost {
            docs,
            ..Default::default()
        }
    }

    /// An iLO whose NetworkProtocol does not expose AlertMailSMTPSecureEnabled.
    pub fn without_smtp_secure(mut self) -> Self {
        if let Some(hpe) = self
            .docs
            .get_mut(NETWORK_PROTOCOL)
            .and_then(|np| np["Oem"]["Hpe"].as_object_mut())
        {
            hpe.remove("AlertMailSMTPSecureEnabled");
        }
        self
    }

    pub fn with_drives(mut self) -> Self {
        let storage = "/redfish/v1/Systems/1/Storage/DE00A000/";
        self.docs.insert(
            "/redfish/v1/Systems/".to_string(),
            json!({"Members": [{"@odata.id": "/redfish/v1/Systems/1/"}]}),
        );
        self.docs.insert(
            "/redfish/v1/Systems/1/".to_string(),
            json!({
                "@odata.id": "/redfish/v1/Systems/1/",
                "Storage": {"@odata.id": "/redfish/v1/Systems/1/Storage/"}
            }),
        );
        self.docs.insert(
            "/redfish/v1/Systems/1/Storage/".to_string(),
            json!({
                "@odata.id": "/redfish/v1/Systems/1/Storage/",
                "Members": [{"@odata.id": storage}]
            }),
        );
        self.docs.insert(
            storage.to_string(),
            json!({
                "@odata.id": storage,
                "Id": "DE00A000",
                "Drives": [
                    {"@odata.id": "/redfish/v1/Systems/1/Storage/DE00A000/Drives/0/"},
                    {"@odata.id": "/redfish/v1/Systems/1/Storage/DE00A000/Drives/1/"}
                ]
            }),
        );
        for (i, serial) in ["S1", "S2"].iter().enumerate() {
            let id = format!("/redfish/v1/Systems/1/Storage/DE00A000/Drives/{i}/");
            self.docs.insert(
                id.clone(),
                json!({
                    "@odata.id": id,
                    "Id": i.to_string(),
                    "Model": "VK000960GWJPE  ",
                    "SerialNumber": serial,
                    "CapacityBytes": 960197124096u64,
                    "MediaType": "SSD",
                    "Protocol": "SATA",
                    "PhysicalLocation": {"PartLocation": {"ServiceLabel": format!("Slot=12:Port=1I:Box=3:Bay={}", i + 1)}},
                    "Status": {"Health": "OK", "State": "Enabled"}
                }),
            );
        }
        // Some firmware omits the self link and Id on drives
        if let Some(drive) = self
            .docs
            .get_mut("/redfish/v1/Systems/1/Storage/DE00A000/Drives/1/")
            .and_then(Value::as_object_mut)
        {
            drive.remove("@odata.id");
            drive.remove("Id");
        }
        self
    }
}

#[derive(Clone, Default)]
pub struct FakeFleet {
    hosts: Arc<Mutex<HashMap<String, FakeHost>>>,
}

impl FakeFleet {
    pub fn add(&self, name: &str, host: FakeHost) {
        self.hosts.lock().unwrap().insert(name.to_string(), host);
    }

    /// Inspect or tweak a host.
    pub fn with<R>(&self, name: &str, f: impl FnOnce(&mut FakeHost) -> R) -> R {
        let mut hosts = self.hosts.lock().unwrap();
        f(hosts.get_mut(name).expect("unknown fake host"))
    }

    pub fn smtp_secure(&self, name: &str) -> Option<bool> {
        self.with(name, |h| {
            h.docs[NETWORK_PROTOCOL]["Oem"]["Hpe"]["AlertMailSMTPSecureEnabled"].as_bool()
        })
    }
}

#[async_trait::async_trait]
impl Connector for FakeFleet {
    async fn connect(
        &self,
        target: &ManagementTarget,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn Transport>, RedfishError> {
        let mut hosts = self.hosts.lock().unwrap();
        let unauthorized = || RedfishError::Unauthorized {
            host: target.host.clone(),
            reason: "session creation returned HTTP 401 Unauthorized".to_string(),
        };
        let host = hosts.get_mut(&target.host).ok_or_else(unauthorized)?;
        if host.refuse_login {
            return Err(unauthorized());
        }
        host.opened += 1;
        Ok(Box::new(FakeTransport {
            host: target.host.clone(),
            fleet: self.clone(),
        }))
    }
}

struct FakeTransport {
    host: String,
    fleet: FakeFleet,
}

fn merge(doc: &mut Value, patch: &Value) {
    match (doc, patch) {
        (Value::Object(d), Value::Object(p)) => {
            for (k, v) in p {
                merge(d.entry(k.clone()).or_insert(Value::Object(Map::new())), v);
            }
        }
        (d, p) => *d = p.clone(),
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn get_raw(&self, odata_id: &str) -> Result<Value, RedfishError> {
        self.fleet.with(&self.host, |h| {
            h.gets.push(odata_id.to_string());
            if h.fail_get.contains(odata_id) {
                return Err(RedfishError::HTTPErrorCode {
                    url: odata_id.to_string(),
                    status_code: StatusCode::INTERNAL_SERVER_ERROR,
                });
            }
            h.docs
                .get(odata_id)
                .cloned()
                .ok_or_else(|| RedfishError::NotFound {
                    url: odata_id.to_string(),
                })
        })
    }

    async fn set_raw(&self, odata_id: &str, patch: &Value) -> Result<Option<Value>, RedfishError> {
        self.fleet.with(&self.host, |h| {
            h.patches.push((odata_id.to_string(), patch.clone()));
            if let Some(message_id) = &h.reject_patch {
                return Err(RedfishError::RequestRejected {
                    url: odata_id.to_string(),
                    status_code: StatusCode::BAD_REQUEST,
                    message_id: Some(message_id.clone()),
                });
            }
            let doc = h.docs.get_mut(odata_id).ok_or_else(|| RedfishError::NotFound {
                url: odata_id.to_string(),
            })?;
            merge(doc, patch);
            Ok(Some(json!({
                "error": {
                    "code": "iLO.0.10.ExtendedInfo",
                    "@Message.ExtendedInfo": [{"MessageId": format!(" {PATCH_MESSAGE_ID}\n")}]
                }
            })))
        })
    }

    async fn invoke_action(&self, target: &str, _body: &Value) -> Result<(), RedfishError> {
        self.fleet.with(&self.host, |h| {
            h.actions.push(target.to_string());
            if h.fail_actions {
                return Err(RedfishError::RequestRejected {
                    url: target.to_string(),
                    status_code: StatusCode::BAD_REQUEST,
                    message_id: Some("iLO.2.15.AlertMailNotConfigured".to_string()),
                });
            }
            Ok(())
        })
    }

    async fn disconnect(&mut self) -> Result<(), RedfishError> {
        self.fleet.with(&self.host, |h| {
            h.closed += 1;
            if h.fail_disconnect {
                return Err(RedfishError::NotFound {
                    url: "/redfish/v1/SessionService/Sessions/x/".to_string(),
                });
            }
            Ok(())
        })
    }
}
