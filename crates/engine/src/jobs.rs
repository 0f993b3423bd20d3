//! Import-job records consumed by the e-manifest compiler.
//!
//! Only a job knows its containers' seal numbers; the compiler joins a
//! delivery order's chosen container against `containers` by `container_no`
//! to recover the seal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobContainer {
    pub container_no: Option<String>,
    pub seal_no: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    pub id: String,
    pub voyage: Option<String>,
    pub last_port_etd: Option<DateTime<Utc>>,
    pub mbl_number: Option<String>,
    pub port_discharge_code: Option<String>,
    pub eta_date_time: Option<DateTime<Utc>>,
    pub containers: Vec<JobContainer>,
}
