mod bridge_row;
mod event_row;
mod hook;
mod hooked_record;
mod interval;
mod policy;
mod raw_record;
mod value;
mod versioned_record;

pub use bridge_row::{BridgeRow, ForeignPit};
pub use event_row::EventRow;
pub use hook::{Hook, PitHook};
pub use hooked_record::HookedRecord;
pub use interval::{max_sentinel, min_sentinel, ValidityInterval};
pub use policy::{JoinPolicy, MalformedKeyPolicy, OrphanPolicy};
pub use raw_record::RawRecord;
pub use value::{ColumnType, Value};
pub use versioned_record::VersionedRecord;
