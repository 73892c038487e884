//! Opaque id generation for cost line items.
//!
//! Injected into the pricing functions so they stay referentially
//! transparent; ids identify line items for downstream editing and never
//! participate in total computation.

use uuid::Uuid;

/// Produces process-unique opaque ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Default generator backed by random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequentialIds(std::sync::atomic::AtomicU64);

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("item-{n}")
    }
}
