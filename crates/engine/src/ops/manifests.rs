//! Manifest operations: bulk creation plus the two partial updates.
//!
//! Every mutating op is one read followed by one write on the manifest row.
//! Not-found and malformed-input errors are terminal; nothing is retried.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryOrder, TransactionTrait, prelude::*};
use tracing::{debug, info};

use crate::{
    ChargePatch, EngineError, HblPatch, Manifest, NewHbl, ResultEngine, manifests,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a manifest from a bulk HBL import.
    ///
    /// An empty list is accepted and yields zero rollups; the rollups are
    /// computed once here and the invariant (totals equal the sum over all
    /// reference lines) holds from the first write.
    pub async fn create_manifest(&self, hbls: Vec<NewHbl>) -> ResultEngine<Manifest> {
        let manifest = Manifest::new(hbls, Utc::now());
        info!(
            manifest_id = %manifest.id,
            hbls = manifest.hbls.len(),
            total_weight = manifest.total_weight,
            total_cbm = manifest.total_cbm,
            "creating manifest"
        );
        let entry = manifests::ActiveModel::try_from(&manifest)?;
        with_tx!(self, |db_tx| {
            entry.insert(&db_tx).await?;
            Ok(manifest)
        })
    }

    /// Replace the charge lists of reference lines within one HBL, located
    /// by `hbl_number` (first match wins when numbers are duplicated).
    ///
    /// Rollups are intentionally NOT recomputed: charges carry no weight or
    /// CBM, and the stored totals must not move under this operation.
    pub async fn update_hbl_charges(
        &self,
        manifest_id: &str,
        hbl_number: &str,
        patches: &[ChargePatch],
    ) -> ResultEngine<Manifest> {
        debug!(manifest_id, hbl_number, patches = patches.len(), "patching hbl charges");
        with_tx!(self, |db_tx| {
            let mut manifest = self.require_manifest(&db_tx, manifest_id).await?;
            let hbl = manifest
                .hbls
                .iter_mut()
                .find(|hbl| hbl.hbl_number == hbl_number)
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!(
                        "hbl {hbl_number} not exists in manifest {manifest_id}"
                    ))
                })?;
            hbl.apply_charge_patches(patches);

            let entry = manifests::ActiveModel {
                id: ActiveValue::Set(manifest.id.clone()),
                hbls: ActiveValue::Set(manifests::hbls_to_json(&manifest.hbls)?),
                ..Default::default()
            };
            entry.update(&db_tx).await?;
            Ok(manifest)
        })
    }

    /// Shallow-merge a patch onto one HBL, located by its internal id, then
    /// re-sum the rollups over every HBL in the manifest.
    pub async fn update_hbl(
        &self,
        manifest_id: &str,
        hbl_id: &str,
        patch: &HblPatch,
    ) -> ResultEngine<Manifest> {
        debug!(manifest_id, hbl_id, "updating hbl");
        with_tx!(self, |db_tx| {
            let mut manifest = self.require_manifest(&db_tx, manifest_id).await?;
            let hbl = manifest
                .hbls
                .iter_mut()
                .find(|hbl| hbl.id == hbl_id)
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!(
                        "hbl {hbl_id} not exists in manifest {manifest_id}"
                    ))
                })?;
            hbl.merge_patch(patch);
            manifest.recompute_rollups();

            let entry = manifests::ActiveModel {
                id: ActiveValue::Set(manifest.id.clone()),
                hbls: ActiveValue::Set(manifests::hbls_to_json(&manifest.hbls)?),
                total_weight: ActiveValue::Set(manifest.total_weight),
                total_cbm: ActiveValue::Set(manifest.total_cbm),
                ..Default::default()
            };
            entry.update(&db_tx).await?;
            Ok(manifest)
        })
    }

    /// Return a stored manifest.
    pub async fn manifest(&self, manifest_id: &str) -> ResultEngine<Manifest> {
        with_tx!(self, |db_tx| {
            self.require_manifest(&db_tx, manifest_id).await
        })
    }

    /// List all manifests, oldest first.
    pub async fn list_manifests(&self) -> ResultEngine<Vec<Manifest>> {
        with_tx!(self, |db_tx| {
            let models = manifests::Entity::find()
                .order_by_asc(manifests::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Manifest::try_from).collect()
        })
    }

    async fn require_manifest(
        &self,
        db: &DatabaseTransaction,
        manifest_id: &str,
    ) -> ResultEngine<Manifest> {
        let model = manifests::Entity::find_by_id(manifest_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!("manifest {manifest_id} not exists"))
            })?;
        Manifest::try_from(model)
    }
}
