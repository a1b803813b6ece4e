// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order lifecycle rules and the error taxonomy shared by storage, service
// and transport. Nothing in here knows about Postgres or HTTP.
//
// ============================================================================

pub mod order;
