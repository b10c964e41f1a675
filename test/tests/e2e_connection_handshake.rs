//! Connect-time registry check and host designation

use replicant_client::{Client, ClientConfig, ReplicantClientError};
use replicant_server::{HostPolicy, ReplicantServerError, ServerConfig, SnapshotSource};
use replicant_shared::{
    ingest_channel, EndpointId, ReplicationError, ReplicationMessageKind, SyncStatus,
};
use replicant_test::{protocol, reordered_protocol, Position, TestSession};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn first_accepted_client_becomes_host() {
    init_logger();
    let mut session = TestSession::new();
    let first = session.join_client();
    let second = session.join_client();

    let host = session.endpoint(first);
    assert_eq!(host, EndpointId::new(1));
    assert_eq!(session.server.host(), Some(host));
    assert_eq!(
        session.server.endpoints(),
        vec![host, session.endpoint(second)]
    );
    assert_eq!(session.server_log.connections.len(), 2);

    for index in [first, second] {
        assert!(session.client(index).is_synced());
        assert_eq!(session.client(index).sync_status(), SyncStatus::Idle);
        assert_eq!(session.log(index).connections.len(), 1);
    }
}

#[test]
fn mismatched_registry_is_rejected() {
    init_logger();
    let mut session = TestSession::new();
    session.join_client();
    let late = session.add_client_with(ClientConfig::default(), reordered_protocol());
    session.settle();

    let rejected = EndpointId::new(2);
    assert_eq!(session.server_log.rejections.len(), 1);
    assert_eq!(session.server_log.rejections[0].0, rejected);
    assert_eq!(session.server.endpoints(), vec![EndpointId::new(1)]);
    assert!(!session.hub.is_linked(rejected));

    assert!(!session.client(late).is_connected());
    let failures = &session.log(late).connection_failures;
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("Type registry mismatch"));

    // no join was started for the rejected endpoint
    assert_eq!(
        session.hub.kinds_delivered_to(rejected),
        vec![ReplicationMessageKind::Rejected]
    );
    assert_eq!(session.server_log.snapshots_sent.len(), 1);
}

#[test]
fn spawning_before_connecting_fails() {
    init_logger();
    let (_sender, receiver) = ingest_channel();
    let mut client = Client::new(ClientConfig::default(), protocol(), receiver);

    let result = client.spawn(Position::new(0.0, 0.0));

    assert_eq!(
        result,
        Err(ReplicantClientError::Replication(
            ReplicationError::NotConnected
        ))
    );
    assert_eq!(client.pending_spawn_count(), 0);
}

#[test]
fn dedicated_server_has_no_host() {
    init_logger();
    let mut session = TestSession::with_config(ServerConfig {
        host_policy: HostPolicy::None,
        snapshot_source: SnapshotSource::Host,
    });
    let first = session.join_client();
    session.join_client();

    assert_eq!(session.server.host(), None);

    // without a host every join is served from the server's own directory
    let endpoint = session.endpoint(first);
    assert!(!session
        .hub
        .kinds_delivered_to(endpoint)
        .contains(&ReplicationMessageKind::SnapshotRequest));

    session.hub.drop_client(endpoint);
    session.settle();

    assert!(!session.server.is_halted());
    assert_eq!(session.server.endpoints(), vec![EndpointId::new(2)]);
}

#[test]
fn malformed_bytes_surface_as_server_error() {
    init_logger();
    let mut session = TestSession::new();
    let index = session.join_client();
    let endpoint = session.endpoint(index);

    session.hub.inject_bytes(endpoint, vec![0xFF, 0x01]);
    session.settle();

    assert!(session.server_log.errors.iter().any(|error| matches!(
        error,
        ReplicantServerError::MalformedMessage { endpoint: from, .. } if *from == endpoint
    )));
    assert_eq!(session.server.endpoints(), vec![endpoint]);
}
