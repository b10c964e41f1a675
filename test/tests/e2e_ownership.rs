//! Only an object's owner may update or despawn it

use replicant_client::ReplicantClientError;
use replicant_shared::{
    BitWriter, EndpointId, NetworkIdentity, ReplicationError, ReplicationMessage,
    ReplicationMessageKind, Serde,
};
use replicant_test::{Position, TestSession, LABEL, MOTION};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn motion_payload(x: f32, y: f32) -> Vec<u8> {
    let mut writer = BitWriter::new();
    x.ser(&mut writer);
    y.ser(&mut writer);
    writer.to_bytes()
}

/// Two clients, the first owning Position #1 at (1, 1)
fn session_with_owned_position() -> (TestSession, usize, usize, NetworkIdentity) {
    let mut session = TestSession::new();
    let owner = session.join_client();
    let other = session.join_client();
    session
        .client(owner)
        .spawn(Position::new(1.0, 1.0))
        .unwrap();
    session.settle();
    (session, owner, other, NetworkIdentity::new(1))
}

#[test]
fn owner_update_is_relayed_to_everyone_else() {
    init_logger();
    let (mut session, owner, other, identity) = session_with_owned_position();
    let owner_endpoint = session.endpoint(owner);
    session.hub.clear_deliveries();

    session
        .client(owner)
        .replica_mut::<Position>(&identity)
        .unwrap()
        .x = 4.0;
    let version = session.client(owner).send_update(&identity, MOTION).unwrap();
    assert_eq!(version, 1);
    session.settle();

    assert_eq!(session.server_log.updates, vec![(identity, MOTION)]);
    assert_eq!(
        session.server.replica::<Position>(&identity).unwrap().x,
        4.0
    );
    assert_eq!(session.log(other).updates, vec![(identity, MOTION)]);
    assert_eq!(
        session.client(other).replica::<Position>(&identity).unwrap().x,
        4.0
    );

    // the sender is not echoed its own update
    assert!(!session
        .hub
        .kinds_delivered_to(owner_endpoint)
        .contains(&ReplicationMessageKind::Update));
}

#[test]
fn local_calls_on_foreign_objects_fail() {
    init_logger();
    let (mut session, owner, other, identity) = session_with_owned_position();
    let owner_endpoint = session.endpoint(owner);
    let other_endpoint = session.endpoint(other);
    let not_owner = ReplicantClientError::Replication(ReplicationError::NotOwner {
        identity,
        requester: other_endpoint,
        owner: owner_endpoint,
    });

    assert_eq!(
        session.client(other).send_update(&identity, MOTION),
        Err(not_owner.clone())
    );
    assert_eq!(
        session.client(other).despawn(&identity),
        Err(not_owner.clone())
    );
    assert!(session
        .client(other)
        .replica_mut::<Position>(&identity)
        .is_err());

    // the server cannot touch client-owned objects either
    assert!(session.server.send_update(&identity, MOTION).is_err());
    assert!(session.server.despawn(&identity).is_err());
    assert_eq!(session.server.owner_of(&identity), Some(owner_endpoint));
}

#[test]
fn forged_update_from_non_owner_is_dropped() {
    init_logger();
    let (mut session, owner, other, identity) = session_with_owned_position();
    let other_endpoint = session.endpoint(other);
    session.hub.clear_deliveries();

    session.hub.inject(
        other_endpoint,
        &ReplicationMessage::Update {
            identity,
            channel: MOTION,
            version: 5,
            payload: motion_payload(99.0, 99.0),
        },
    );
    session.settle();

    assert!(session.server_log.updates.is_empty());
    assert_eq!(
        session.server.replica::<Position>(&identity).unwrap().x,
        1.0
    );
    assert_eq!(
        session.client(owner).replica::<Position>(&identity).unwrap().x,
        1.0
    );
    assert!(session.hub.deliveries().is_empty());

    // the owner's real version 1 still applies afterwards
    session.client(owner).send_update(&identity, MOTION).unwrap();
    session.settle();
    assert_eq!(session.server_log.updates, vec![(identity, MOTION)]);
}

#[test]
fn forged_despawn_from_non_owner_is_dropped() {
    init_logger();
    let (mut session, _owner, other, identity) = session_with_owned_position();
    let other_endpoint = session.endpoint(other);

    session
        .hub
        .inject(other_endpoint, &ReplicationMessage::DespawnRequest { identity });
    session.settle();

    assert_eq!(session.server.object_count(), 1);
    assert!(session.server_log.despawns.is_empty());
    assert!(session.client(other).directory().contains(&identity));
}

#[test]
fn authority_objects_are_owned_by_the_authority() {
    init_logger();
    let mut session = TestSession::new();
    let index = session.join_client();
    let endpoint = session.endpoint(index);
    let identity = session.server.spawn(Position::new(0.0, 0.0)).unwrap();
    session.settle();

    assert_eq!(session.server.owner_of(&identity), Some(EndpointId::AUTHORITY));
    assert_eq!(
        session.client(index).send_update(&identity, LABEL),
        Err(ReplicantClientError::Replication(
            ReplicationError::NotOwner {
                identity,
                requester: endpoint,
                owner: EndpointId::AUTHORITY,
            }
        ))
    );
}
