// Vaultlink — Service Module
//
// Orchestration layer composing the identity provider, the record store
// client and the snapshot cache behind one uniform operation surface.

mod records;

pub use records::{RecordService, ServiceError};
