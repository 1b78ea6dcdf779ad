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
use std::{any::type_name, collections::BTreeMap};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::RedfishError;

// A snapshot of one Redfish resource as fetched from the service.
//
// Resources form a link graph: related resources are referenced by objects
// carrying an @odata.id, nested at any depth. Those are collected into `links`,
// keyed by the dotted path of the property that holds them. Arrays of links
// (collection Members, Links.ManagedBy, ...) are not part of `links`; use members().
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    odata_id: String,
    attributes: Map<String, Value>,
    links: BTreeMap<String, String>,
}

impl ResourceNode {
    pub fn from_json(url: &str, doc: Value) -> Result<Self, RedfishError> {
        let attributes = match doc {
            Value::Object(m) => m,
            other => {
                return Err(RedfishError::InvalidKeyType {
                    key: "@odata.id".to_string(),
                    expected_type: format!("object document, got {other}"),
                    url: url.to_string(),
                })
            }
        };
        let odata_id = attributes
            .get("@odata.id")
            .and_then(Value::as_str)
            .unwrap_or(url)
            .to_string();
        let mut links = BTreeMap::new();
        collect_links("", &attributes, &mut links);
        Ok(ResourceNode {
            odata_id,
            attributes,
            links,
        })
    }

    pub fn odata_id(&self) -> &str {
        &self.odata_id
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn link(&self, name: &str) -> Option<&str> {
        self.links.get(name).map(String::as_str)
    }

    pub fn require_link(&self, name: &str) -> Result<&str, RedfishError> {
        self.link(name).ok_or_else(|| RedfishError::MissingLink {
            link: name.to_string(),
            odata_id: self.odata_id.clone(),
        })
    }

    /// The `Members` of a collection resource, in the order the service listed them.
    pub fn members(&self) -> Vec<&str> {
        self.link_array("Members")
    }

    /// Every `@odata.id` in the array property `name`.
    pub fn link_array(&self, name: &str) -> Vec<&str> {
        self.attributes
            .get(name)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.get("@odata.id").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deserialize this snapshot into one of the typed models. Documents without
    /// an `@odata.id` get the path they were fetched from.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, RedfishError> {
        let mut doc = self.attributes.clone();
        doc.entry("@odata.id")
            .or_insert_with(|| Value::String(self.odata_id.clone()));
        serde_json::from_value(Value::Object(doc)).map_err(|e| {
            RedfishError::JsonDeserializeError {
                url: self.odata_id.clone(),
                body: format!("<{}>", type_name::<T>()),
                source: e,
            }
        })
    }
}

fn collect_links(prefix: &str, map: &Map<String, Value>, out: &mut BTreeMap<String, String>) {
    for (key, value) in map {
        let Value::Object(inner) = value else {
            continue;
        };
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(id) = inner.get("@odata.id").and_then(Value::as_str) {
            out.insert(path.clone(), id.to_string());
        }
        collect_links(&path, inner, out);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::storage::Drive;
    use crate::model::ManagerNetworkProtocol;

    fn manager_doc() -> Value {
        json!({
            "@odata.id": "/redfish/v1/Managers/1/",
            "@odata.type": "#Manager.v1_5_1.Manager",
            "Id": "1",
            "FirmwareVersion": "iLO 5 v2.72",
            "NetworkProtocol": {"@odata.id": "/redfish/v1/Managers/1/NetworkProtocol/"},
            "EthernetInterfaces": {"@odata.id": "/redfish/v1/Managers/1/EthernetInterfaces/"},
            "Links": {
                "ManagerForServers": [{"@odata.id": "/redfish/v1/Systems/1/"}],
                "ManagerInChassis": {"@odata.id": "/redfish/v1/Chassis/1/"}
            },
            "Oem": {"Hpe": {"Links": {
                "DateTimeService": {"@odata.id": "/redfish/v1/Managers/1/DateTime/"}
            }}}
        })
    }

    #[test]
    fn test_links_at_any_depth() {
        let node = ResourceNode::from_json("/redfish/v1/Managers/1/", manager_doc()).unwrap();
        assert_eq!(node.odata_id(), "/redfish/v1/Managers/1/");
        assert_eq!(
            node.link("NetworkProtocol"),
            Some("/redfish/v1/Managers/1/NetworkProtocol/")
        );
        assert_eq!(
            node.link("Links.ManagerInChassis"),
            Some("/redfish/v1/Chassis/1/")
        );
        assert_eq!(
            node.link("Oem.Hpe.Links.DateTimeService"),
            Some("/redfish/v1/Managers/1/DateTime/")
        );
        // arrays are not single links
        assert_eq!(node.link("Links.ManagerForServers"), None);
        assert!(matches!(
            node.require_link("VirtualMedia"),
            Err(RedfishError::MissingLink { .. })
        ));
    }

    #[test]
    fn test_members_and_fallback_id() {
        let node = ResourceNode::from_json(
            "/redfish/v1/Managers/",
            json!({"Members": [
                {"@odata.id": "/redfish/v1/Managers/1/"},
                {"@odata.id": "/redfish/v1/Managers/2/"}
            ]}),
        )
        .unwrap();
        assert_eq!(node.odata_id(), "/redfish/v1/Managers/");
        assert_eq!(
            node.members(),
            vec!["/redfish/v1/Managers/1/", "/redfish/v1/Managers/2/"]
        );
    }

    #[test]
    fn test_non_object_document() {
        assert!(ResourceNode::from_json("/x", json!([1, 2])).is_err());
    }

    #[test]
    fn test_to_typed() {
        let node = ResourceNode::from_json(
            "/redfish/v1/Managers/1/NetworkProtocol/",
            json!({
                "@odata.id": "/redfish/v1/Managers/1/NetworkProtocol/",
                "HostName": "ilo-h1",
                "Oem": {"Hpe": {"AlertMailSMTPSecureEnabled": true}}
            }),
        )
        .unwrap();
        let np: ManagerNetworkProtocol = node.to_typed().unwrap();
        assert_eq!(np.host_name.as_deref(), Some("ilo-h1"));
        assert_eq!(np.alert_mail().unwrap().smtp_secure_enabled, Some(true));
    }

    #[test]
    fn test_to_typed_without_odata_id() {
        let node = ResourceNode::from_json(
            "/redfish/v1/Systems/1/Storage/DE00A000/Drives/0/",
            json!({"Id": "0", "Model": "VK000960GWJPE"}),
        )
        .unwrap();
        let drive: Drive = node.to_typed().unwrap();
        assert_eq!(drive.odata_id, "/redfish/v1/Systems/1/Storage/DE00A000/Drives/0/");
        assert_eq!(drive.model.as_deref(), Some("VK000960GWJPE"));
    }
}
