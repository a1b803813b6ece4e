// ============================================================================
// Order Domain - Business Logic for Orders and their Items
// ============================================================================
//
// - Value objects (OrderId, ItemRef, Order, OrderItem, OrderWithItems)
// - Lifecycle (OrderStatus state machine, OrderCommand, DoneFilter)
// - Errors (OrderError taxonomy)
//
// ============================================================================

pub mod value_objects;
pub mod lifecycle;
pub mod errors;

// Re-export for convenience
pub use value_objects::*;
pub use lifecycle::*;
pub use errors::*;
