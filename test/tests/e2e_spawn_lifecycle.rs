//! Spawn, echo binding and despawn across a live session

use replicant_client::ReplicantClientError;
use replicant_shared::{
    EndpointId, NetworkIdentity, Replicate, ReplicationError, ReplicationMessage,
    ReplicationMessageKind, SpawnHandle,
};
use replicant_test::{Marker, Position, TestSession};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn count_of(kinds: &[ReplicationMessageKind], kind: ReplicationMessageKind) -> usize {
    kinds.iter().filter(|delivered| **delivered == kind).count()
}

#[test]
fn client_spawn_binds_on_echo() {
    init_logger();
    let mut session = TestSession::new();
    let owner = session.join_client();
    let observer = session.join_client();
    let owner_endpoint = session.endpoint(owner);

    let handle = session
        .client(owner)
        .spawn(Position::new(1.0, 2.0))
        .unwrap();
    assert_eq!(session.client(owner).pending_spawn_count(), 1);
    assert_eq!(
        session
            .client(owner)
            .pending_replica::<Position>(&handle)
            .map(|position| position.x),
        Some(1.0)
    );

    session.settle();

    let identity = NetworkIdentity::new(1);
    assert_eq!(session.log(owner).spawn_bindings, vec![(handle, identity)]);
    assert!(session.log(owner).spawns.is_empty());
    assert_eq!(session.client(owner).pending_spawn_count(), 0);
    assert_eq!(session.client(owner).directory().len(), 1);

    assert_eq!(
        session.log(observer).spawns,
        vec![(identity, owner_endpoint)]
    );
    let mirrored = session
        .client(observer)
        .replica::<Position>(&identity)
        .unwrap();
    assert_eq!((mirrored.x, mirrored.y), (1.0, 2.0));

    assert_eq!(session.server.owner_of(&identity), Some(owner_endpoint));
    assert_eq!(session.server_log.spawns, vec![(identity, owner_endpoint)]);
}

#[test]
fn repeated_spawn_request_reuses_identity() {
    init_logger();
    let mut session = TestSession::new();
    let owner = session.join_client();
    let observer = session.join_client();
    let owner_endpoint = session.endpoint(owner);
    let observer_endpoint = session.endpoint(observer);
    session.hub.clear_deliveries();

    let handle = session.client(owner).spawn(Marker::new(4)).unwrap();
    session.client(owner).resend_pending_spawns();
    session.settle();

    assert_eq!(session.server.object_count(), 1);
    assert_eq!(session.server_log.spawns.len(), 1);
    assert!(session.server_log.errors.is_empty());

    // the repeat is answered to the requester only
    assert_eq!(
        count_of(
            &session.hub.kinds_delivered_to(owner_endpoint),
            ReplicationMessageKind::Spawned
        ),
        2
    );
    assert_eq!(
        count_of(
            &session.hub.kinds_delivered_to(observer_endpoint),
            ReplicationMessageKind::Spawned
        ),
        1
    );

    assert_eq!(
        session.log(owner).spawn_bindings,
        vec![(handle, NetworkIdentity::new(1))]
    );
    assert_eq!(session.client(owner).directory().len(), 1);
    assert_eq!(session.client(observer).directory().len(), 1);
}

#[test]
fn despawn_finalizes_everywhere_once() {
    init_logger();
    let mut session = TestSession::new();
    let owner = session.join_client();
    let observer = session.join_client();

    session.client(owner).spawn(Marker::new(7)).unwrap();
    session.settle();
    let identity = NetworkIdentity::new(1);

    session.client(owner).despawn(&identity).unwrap();
    // nothing changes until the authority confirms
    assert!(session.client(owner).directory().contains(&identity));
    session.settle();

    assert_eq!(session.server.object_count(), 0);
    assert_eq!(session.server.owner_of(&identity), None);

    let (despawned, replica) = &session.server_log.despawns[0];
    assert_eq!(*despawned, identity);
    assert!(replica.as_any().downcast_ref::<Marker>().unwrap().finalized);

    for index in [owner, observer] {
        assert!(!session.client(index).directory().contains(&identity));
        let despawns = &session.log(index).despawns;
        assert_eq!(despawns.len(), 1);
        let marker = despawns[0].1.as_any().downcast_ref::<Marker>().unwrap();
        assert!(marker.finalized);
        assert_eq!(marker.value, 7);
    }

    // the object is gone, so a second request never leaves the client
    assert_eq!(
        session.client(owner).despawn(&identity),
        Err(ReplicantClientError::Replication(
            ReplicationError::ObjectNotFound { identity }
        ))
    );
}

#[test]
fn repeated_despawned_is_applied_once() {
    init_logger();
    let mut session = TestSession::new();
    let owner = session.join_client();
    let observer = session.join_client();
    let observer_endpoint = session.endpoint(observer);

    session.client(owner).spawn(Marker::new(3)).unwrap();
    session.settle();
    let identity = NetworkIdentity::new(1);

    session.client(owner).despawn(&identity).unwrap();
    session.settle();
    assert_eq!(session.log(observer).despawns.len(), 1);

    session
        .hub
        .inject_to_client(observer_endpoint, &ReplicationMessage::Despawned { identity });
    session
        .hub
        .inject_to_client(observer_endpoint, &ReplicationMessage::Despawned { identity });
    session.settle();

    assert!(!session.client(observer).directory().contains(&identity));
    let despawns = &session.log(observer).despawns;
    assert_eq!(despawns.len(), 1);
    let marker = despawns[0].1.as_any().downcast_ref::<Marker>().unwrap();
    assert_eq!(marker.finalize_count, 1);
    assert!(session.log(observer).errors.is_empty());
    assert!(session.client(observer).is_connected());
}

#[test]
fn server_owned_objects_replicate_to_clients() {
    init_logger();
    let mut session = TestSession::new();
    let first = session.join_client();
    let second = session.join_client();

    let identity = session.server.spawn(Marker::new(3)).unwrap();
    session.settle();

    for index in [first, second] {
        assert_eq!(
            session.log(index).spawns,
            vec![(identity, EndpointId::AUTHORITY)]
        );
    }

    session
        .server
        .replica_mut::<Marker>(&identity)
        .unwrap()
        .value = 9;
    assert_eq!(session.server.send_update(&identity, 0).unwrap(), 1);
    session.settle();

    for index in [first, second] {
        assert_eq!(
            session
                .client(index)
                .replica::<Marker>(&identity)
                .map(|marker| marker.value),
            Some(9)
        );
        assert_eq!(session.log(index).updates, vec![(identity, 0)]);
    }

    session.server.despawn(&identity).unwrap();
    session.settle();
    for index in [first, second] {
        assert_eq!(session.log(index).despawned_identities(), vec![identity]);
    }
}

#[test]
fn unknown_type_spawn_request_is_dropped() {
    init_logger();
    let mut session = TestSession::new();
    let index = session.join_client();
    let endpoint = session.endpoint(index);
    session.hub.clear_deliveries();

    session.hub.inject(
        endpoint,
        &ReplicationMessage::SpawnRequest {
            handle: SpawnHandle::new(42),
            type_code: 99,
            state: Vec::new(),
        },
    );
    session.settle();

    assert_eq!(session.server.object_count(), 0);
    assert!(session.server_log.spawns.is_empty());
    assert!(session.hub.deliveries().is_empty());

    // the next spawn still gets the first identity
    session.client(index).spawn(Marker::new(1)).unwrap();
    session.settle();
    assert_eq!(
        session.server_log.spawns,
        vec![(NetworkIdentity::new(1), endpoint)]
    );
}
