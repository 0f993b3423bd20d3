//! Carico consolidation core: manifest aggregation plus the customs
//! e-manifest compiler.
//!
//! The [`Engine`] owns manifest creation and the two partial updates,
//! keeping the weight/CBM rollups consistent with the embedded HBL tree.
//! The [`emanifest`] module is a pure transform from delivery orders and
//! jobs to the customs XML document; it performs no I/O.

pub use delivery_orders::{ContainerDetail, DeliveryOrder};
pub use error::EngineError;
pub use hbl::{Charge, ChargePatch, Hbl, HblPatch, NewHbl, ReferenceLine};
pub use jobs::{Job, JobContainer};
pub use manifests::Manifest;
pub use ops::{Engine, EngineBuilder};

mod delivery_orders;
pub mod emanifest;
mod error;
mod hbl;
mod jobs;
mod manifests;
mod ops;

pub type ResultEngine<T> = Result<T, EngineError>;
