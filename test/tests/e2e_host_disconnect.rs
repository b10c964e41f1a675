//! Losing the host ends the session

use replicant_client::ReplicantClientError;
use replicant_server::ReplicantServerError;
use replicant_shared::{EndpointId, NetworkIdentity, ReplicationError, ReplicationMessageKind};
use replicant_test::{Marker, TestSession};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn host_disconnect_halts_the_session() {
    init_logger();
    let mut session = TestSession::new();
    let host = session.join_client();
    let second = session.join_client();
    let third = session.join_client();
    session.client(second).spawn(Marker::new(1)).unwrap();
    session.server.spawn(Marker::new(2)).unwrap();
    session.settle();

    let host_endpoint = session.endpoint(host);
    let second_endpoint = session.endpoint(second);
    let third_endpoint = session.endpoint(third);
    session.hub.clear_deliveries();
    session.hub.drop_client(host_endpoint);
    session.settle();

    assert!(session.server.is_halted());
    assert_eq!(session.server_log.session_ended, Some(host_endpoint));
    assert!(session.server_log.errors.iter().any(|error| matches!(
        error,
        ReplicantServerError::Replication(ReplicationError::HostDisconnected { host })
            if *host == host_endpoint
    )));
    assert!(session.server.endpoints().is_empty());

    // no ownership moves to another endpoint
    assert_eq!(session.server.object_count(), 2);
    assert_eq!(
        session.server.owner_of(&NetworkIdentity::new(1)),
        Some(second_endpoint)
    );

    for (index, endpoint) in [(second, second_endpoint), (third, third_endpoint)] {
        assert_eq!(
            session.hub.kinds_delivered_to(endpoint),
            vec![ReplicationMessageKind::SessionEnded]
        );
        assert!(session.log(index).session_ended);
        assert!(!session.client(index).is_connected());
        assert!(session.client(index).is_session_ended());
        assert!(session.client(index).directory().is_empty());
    }

    assert_eq!(
        session.client(second).spawn(Marker::new(3)),
        Err(ReplicantClientError::Replication(
            ReplicationError::SessionHalted
        ))
    );
    assert!(matches!(
        session.server.spawn(Marker::new(4)),
        Err(ReplicantServerError::Replication(
            ReplicationError::SessionHalted
        ))
    ));
}

#[test]
fn connections_after_halt_are_refused() {
    init_logger();
    let mut session = TestSession::new();
    let host = session.join_client();
    let host_endpoint = session.endpoint(host);
    session.join_client();
    session.hub.drop_client(host_endpoint);
    session.settle();

    let late = session.add_client();
    session.settle();
    let late_endpoint = EndpointId::new(3);
    let reason = ReplicationError::SessionHalted.to_string();

    assert!(!session.client(late).is_connected());
    assert_eq!(session.log(late).connection_failures, vec![reason.clone()]);
    assert!(session.log(late).disconnections.is_empty());
    assert!(session.log(late).connections.is_empty());
    assert!(!session.hub.is_linked(late_endpoint));

    assert_eq!(session.server_log.connections.len(), 2);
    assert_eq!(session.server_log.rejections, vec![(late_endpoint, reason)]);
    assert!(session.server.endpoints().is_empty());
    assert_eq!(
        session.hub.kinds_delivered_to(late_endpoint),
        vec![ReplicationMessageKind::Rejected]
    );
}
