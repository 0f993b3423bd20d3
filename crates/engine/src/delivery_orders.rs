//! Delivery-order records consumed by the e-manifest compiler.
//!
//! These are owned and mutated by the (external) CRUD layer; the compiler
//! only reads them, already filtered and materialized by its caller. Every
//! field is optional because the upstream forms enforce very little.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerDetail {
    pub container_no: Option<String>,
    pub gross_weight: Option<f64>,
    pub container_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryOrder {
    pub house_bl: Option<String>,
    pub mbl_number: Option<String>,
    pub container_details: Vec<ContainerDetail>,
    pub port_of_loading_code: Option<String>,
    pub port_of_discharge_code: Option<String>,
    pub shipper_name: Option<String>,
    pub shipper_address: Option<String>,
    pub consignee_name: Option<String>,
    pub consignee_address: Option<String>,
    pub notify_party_name: Option<String>,
    pub notify_party_address: Option<String>,
    pub no_of_packages: Option<i64>,
    pub gross_weight: Option<f64>,
    pub cbm: Option<f64>,
    pub description: Option<String>,
    pub marks_numbers: Option<String>,
    pub package_type_code: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub job_id: Option<String>,
}
