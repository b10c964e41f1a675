mod identity_allocator;
mod join_coordinator;
mod ownership_table;

pub(crate) use identity_allocator::IdentityAllocator;
pub(crate) use join_coordinator::JoinCoordinator;
pub(crate) use ownership_table::OwnershipTable;
