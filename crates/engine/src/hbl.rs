//! House bill of lading records embedded in a [`Manifest`].
//!
//! An HBL is never addressable outside its parent manifest. Its reference
//! lines carry the weight/CBM measures that feed the manifest rollups and
//! the per-line charge list patched by the charge-update operation.
//!
//! [`Manifest`]: crate::Manifest

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A `{label, amount}` charge pair on a reference line. Amount defaults to 0
/// when the payload omits it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Charge {
    pub label: String,
    pub amount: f64,
}

/// A package-level reference line inside an HBL.
///
/// `weight` and `cbm` go through a tolerant deserializer: numbers and
/// numeric strings are accepted, anything else (including `null`) becomes
/// absent and aggregates as zero. A rollup never sees NaN.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceLine {
    pub ref_num: String,
    #[serde(deserialize_with = "measure")]
    pub weight: Option<f64>,
    #[serde(deserialize_with = "measure")]
    pub cbm: Option<f64>,
    #[serde(deserialize_with = "measure")]
    pub no_of_packages: Option<f64>,
    pub description: Option<String>,
    pub consignee_name: Option<String>,
    pub consignee_address: Option<String>,
    pub consignee_nic: Option<String>,
    pub consignee_phone: Option<String>,
    pub package_type: Option<String>,
    pub charges: Vec<Charge>,
}

/// An HBL as stored inside a manifest. `id` is the internal identifier
/// assigned at creation and used by the full-HBL update; `hbl_number` is the
/// business key used by the charge-patch operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hbl {
    pub id: String,
    pub hbl_number: String,
    pub shipper_name: Option<String>,
    pub shipper_address: Option<String>,
    pub notify_name: Option<String>,
    pub notify_address: Option<String>,
    pub references: Vec<ReferenceLine>,
}

/// Creation payload for an HBL: everything but the internal id, which the
/// engine assigns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewHbl {
    pub hbl_number: String,
    pub shipper_name: Option<String>,
    pub shipper_address: Option<String>,
    pub notify_name: Option<String>,
    pub notify_address: Option<String>,
    pub references: Vec<ReferenceLine>,
}

/// Partial update for a stored HBL.
///
/// Merge is shallow and explicit: a `Some` field overwrites the stored
/// field, an absent field leaves it untouched, and `references` replaces
/// the stored vector wholesale (never merged element-wise).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HblPatch {
    pub hbl_number: Option<String>,
    pub shipper_name: Option<String>,
    pub shipper_address: Option<String>,
    pub notify_name: Option<String>,
    pub notify_address: Option<String>,
    pub references: Option<Vec<ReferenceLine>>,
}

/// Charge replacement for one reference line, keyed by `ref_num`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChargePatch {
    pub ref_num: String,
    pub charges: Vec<Charge>,
}

impl Hbl {
    pub fn from_new(new: NewHbl) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            hbl_number: new.hbl_number,
            shipper_name: new.shipper_name,
            shipper_address: new.shipper_address,
            notify_name: new.notify_name,
            notify_address: new.notify_address,
            references: new.references,
        }
    }

    /// Shallow merge of a patch onto this HBL, field by field.
    pub fn merge_patch(&mut self, patch: &HblPatch) {
        if let Some(hbl_number) = &patch.hbl_number {
            self.hbl_number = hbl_number.clone();
        }
        if let Some(shipper_name) = &patch.shipper_name {
            self.shipper_name = Some(shipper_name.clone());
        }
        if let Some(shipper_address) = &patch.shipper_address {
            self.shipper_address = Some(shipper_address.clone());
        }
        if let Some(notify_name) = &patch.notify_name {
            self.notify_name = Some(notify_name.clone());
        }
        if let Some(notify_address) = &patch.notify_address {
            self.notify_address = Some(notify_address.clone());
        }
        if let Some(references) = &patch.references {
            self.references = references.clone();
        }
    }

    /// Replace the charges of every reference line matched by `ref_num`.
    ///
    /// Unmatched `ref_num`s are ignored, as are patches with an empty charge
    /// list. Weight/CBM are untouched by design: charges never feed rollups.
    pub fn apply_charge_patches(&mut self, patches: &[ChargePatch]) {
        for patch in patches {
            if patch.charges.is_empty() {
                continue;
            }
            if let Some(line) = self
                .references
                .iter_mut()
                .find(|line| line.ref_num == patch.ref_num)
            {
                line.charges = patch.charges.clone();
            }
        }
    }
}

/// Tolerant measure deserializer: JSON number or numeric string, anything
/// else becomes `None` so the rollup coerces it to zero.
fn measure<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_measure(&value))
}

fn coerce_measure(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
