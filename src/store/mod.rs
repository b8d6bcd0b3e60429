// Vaultlink — Store Module
//
// Record storage lives in an external decentralized network; this module is
// the thin client over it: data model, typed errors, the `RecordStore` trait
// and its HTTP implementation.

mod client;
mod error;
mod models;

pub use client::{HttpRecordStore, RecordStore};
pub use error::StoreError;
pub use models::{
    composite_name, label_from_composite, owner_from_composite, Locator, Record, SecretValue,
    NAME_SEPARATOR,
};

#[cfg(test)]
pub use client::mock;
