//! Booking core: balance ledger, slot registry and the workflow tying them together.

mod error;
mod ledger;
pub mod memory;
mod registry;
pub mod schedule;
mod types;
mod workflow;

pub use error::{BookingError, ErrorKind, StoreError};
pub use ledger::BalanceLedger;
pub use memory::MemoryStore;
pub use registry::SlotRegistry;
pub use types::*;
pub use workflow::{BookingWorkflow, CancellationPolicy, DEFAULT_CANCELLATION_WINDOW_HOURS};

use crate::auth::IdentityStore;

/// Everything the service needs from a storage backend.
pub trait Store: BalanceLedger + SlotRegistry + IdentityStore + Send + Sync {}

impl<T: BalanceLedger + SlotRegistry + IdentityStore + Send + Sync + ?Sized> Store for T {}
