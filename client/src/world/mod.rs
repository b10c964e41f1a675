mod pending_spawns;

pub(crate) use pending_spawns::PendingSpawns;
