//! Event delivery adapters.
//!
//! - `InMemoryEventBus` - The in-process handler registry and publisher
//! - `OutboxDispatcher` - Scheduled worker draining the outbox

mod dispatcher;
mod in_memory;

pub use dispatcher::{BatchOutcome, OutboxDispatcher};
pub use in_memory::InMemoryEventBus;
