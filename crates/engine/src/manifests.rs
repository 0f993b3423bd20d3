//! The consolidated manifest aggregate.
//!
//! A `Manifest` is the customs-facing document listing every HBL on a single
//! voyage. Its `total_weight`/`total_cbm` rollups are derived from the
//! reference lines of every HBL and must match that sum after every mutating
//! operation. The HBL tree persists as one JSON column, so each mutation is
//! a single-document read-modify-write.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

use super::hbl::{Hbl, NewHbl};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: String,
    pub hbls: Vec<Hbl>,
    pub total_weight: f64,
    pub total_cbm: f64,
    pub created_at: DateTime<Utc>,
}

impl Manifest {
    /// Build a new manifest from creation payloads, assigning the manifest
    /// and per-HBL ids and computing the initial rollups. An empty HBL list
    /// is accepted and yields zero rollups.
    pub fn new(hbls: Vec<NewHbl>, created_at: DateTime<Utc>) -> Self {
        let hbls: Vec<Hbl> = hbls.into_iter().map(Hbl::from_new).collect();
        let (total_weight, total_cbm) = rollup(&hbls);
        Self {
            id: Uuid::new_v4().to_string(),
            hbls,
            total_weight,
            total_cbm,
            created_at,
        }
    }

    /// Re-sum the rollups over ALL HBLs, not just a modified one.
    pub fn recompute_rollups(&mut self) {
        let (total_weight, total_cbm) = rollup(&self.hbls);
        self.total_weight = total_weight;
        self.total_cbm = total_cbm;
    }
}

/// Sum weight/CBM over every reference line of every HBL. Absent measures
/// count as zero; a non-finite value never reaches the totals.
pub(crate) fn rollup(hbls: &[Hbl]) -> (f64, f64) {
    let mut total_weight = 0.0;
    let mut total_cbm = 0.0;
    for hbl in hbls {
        for line in &hbl.references {
            total_weight += line.weight.filter(|v| v.is_finite()).unwrap_or(0.0);
            total_cbm += line.cbm.filter(|v| v.is_finite()).unwrap_or(0.0);
        }
    }
    (total_weight, total_cbm)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "manifests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub hbls: Json,
    pub total_weight: f64,
    pub total_cbm: f64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn hbls_to_json(hbls: &[Hbl]) -> ResultEngine<Json> {
    serde_json::to_value(hbls)
        .map_err(|e| EngineError::InvalidDocument(format!("hbls not encodable: {e}")))
}

impl TryFrom<Model> for Manifest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let hbls: Vec<Hbl> = serde_json::from_value(model.hbls).map_err(|e| {
            EngineError::InvalidDocument(format!("manifest {}: bad hbls column: {e}", model.id))
        })?;
        Ok(Self {
            id: model.id,
            hbls,
            total_weight: model.total_weight,
            total_cbm: model.total_cbm,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<&Manifest> for ActiveModel {
    type Error = EngineError;

    fn try_from(manifest: &Manifest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: sea_orm::ActiveValue::Set(manifest.id.clone()),
            hbls: sea_orm::ActiveValue::Set(hbls_to_json(&manifest.hbls)?),
            total_weight: sea_orm::ActiveValue::Set(manifest.total_weight),
            total_cbm: sea_orm::ActiveValue::Set(manifest.total_cbm),
            created_at: sea_orm::ActiveValue::Set(manifest.created_at),
        })
    }
}
