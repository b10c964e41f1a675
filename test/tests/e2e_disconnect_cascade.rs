//! A departing endpoint takes its objects with it

use replicant_shared::{NetworkIdentity, ReplicationMessageKind};
use replicant_test::{Marker, TestSession};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn identities(values: &[u64]) -> Vec<NetworkIdentity> {
    values.iter().copied().map(NetworkIdentity::new).collect()
}

#[test]
fn disconnect_despawns_owned_objects_in_ascending_order() {
    init_logger();
    let mut session = TestSession::new();
    let host = session.join_client();
    let leaver = session.join_client();
    let observer = session.join_client();

    // identities 1..=12, with the leaver owning 5, 9 and 12
    for value in 1..=12u64 {
        if [5, 9, 12].contains(&value) {
            session.client(leaver).spawn(Marker::new(value as u32)).unwrap();
        } else {
            session.server.spawn(Marker::new(value as u32)).unwrap();
        }
        session.settle();
    }
    let leaver_endpoint = session.endpoint(leaver);
    assert_eq!(session.server.object_count(), 12);
    assert_eq!(
        session.client(leaver).directory().owned_by(leaver_endpoint),
        identities(&[5, 9, 12])
    );

    session.hub.clear_deliveries();
    session.hub.drop_client(leaver_endpoint);
    session.settle();

    assert_eq!(
        session.server_log.despawned_identities(),
        identities(&[5, 9, 12])
    );
    assert_eq!(session.server.object_count(), 9);
    assert_eq!(session.server.endpoints().len(), 2);
    assert!(!session.server.is_halted());

    for index in [host, observer] {
        assert_eq!(
            session.log(index).despawned_identities(),
            identities(&[5, 9, 12])
        );
        assert_eq!(session.client(index).directory().len(), 9);
    }

    // nothing is sent to the endpoint that left
    assert!(session.hub.kinds_delivered_to(leaver_endpoint).is_empty());
    let despawns_sent = session
        .hub
        .deliveries()
        .iter()
        .filter(|delivery| delivery.message.kind() == ReplicationMessageKind::Despawned)
        .count();
    assert_eq!(despawns_sent, 6);

    // the leaver finalizes everything it knew about locally
    assert!(!session.client(leaver).is_connected());
    assert!(session.client(leaver).directory().is_empty());
    assert_eq!(session.log(leaver).despawns.len(), 12);
    assert_eq!(session.log(leaver).disconnections, vec![leaver_endpoint]);
}

#[test]
fn client_side_disconnect_is_seen_by_the_server() {
    init_logger();
    let mut session = TestSession::new();
    let _host = session.join_client();
    let leaver = session.join_client();
    session.client(leaver).spawn(Marker::new(1)).unwrap();
    session.settle();

    let leaver_endpoint = session.endpoint(leaver);
    session.client(leaver).disconnect();
    session.settle();

    assert_eq!(session.server_log.disconnections, vec![leaver_endpoint]);
    assert_eq!(session.server.object_count(), 0);
    assert_eq!(session.log(leaver).despawns.len(), 1);
}
