//! IRawStore: read-only access to the upstream append-only store.

use crate::errors::PitBridgeResult;
use crate::models::RawRecord;

/// Upstream raw store. Reads are strictly read-only; the engine never writes
/// back to raw input.
pub trait IRawStore: Send + Sync {
    /// All raw records of one source entity, in any order.
    fn read(&self, entity: &str) -> PitBridgeResult<Vec<RawRecord>>;

    /// Names of the entities this store can serve.
    fn entities(&self) -> Vec<String>;
}
