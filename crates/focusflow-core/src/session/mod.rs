mod ledger;
mod record;
mod recorder;

pub use ledger::{SessionFilter, SessionLedger};
pub use record::SessionRecord;
pub use recorder::SessionRecorder;
