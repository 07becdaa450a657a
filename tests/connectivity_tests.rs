use rpunch::errors::AppError;
use rpunch::net::connectivity::{
    ConnectivityEvent, ConnectivityMonitor, ReachabilityCheck, StaticCheck, TcpCheck,
};
use std::net::TcpListener;
use std::time::Duration;

#[test]
fn test_only_transitions_produce_events() {
    let monitor = ConnectivityMonitor::new(false);
    let events = monitor.subscribe().unwrap();

    assert_eq!(monitor.report(false), None);
    assert_eq!(monitor.report(true), Some(ConnectivityEvent::Connected));
    assert_eq!(monitor.report(true), None);
    assert_eq!(monitor.report(false), Some(ConnectivityEvent::Disconnected));

    let seen: Vec<ConnectivityEvent> = events.try_iter().collect();
    assert_eq!(
        seen,
        vec![ConnectivityEvent::Connected, ConnectivityEvent::Disconnected]
    );
}

#[test]
fn test_every_subscriber_sees_the_edge() {
    let monitor = ConnectivityMonitor::new(false);
    let a = monitor.subscribe().unwrap();
    let b = monitor.subscribe().unwrap();

    monitor.report(true);

    assert_eq!(a.try_recv().ok(), Some(ConnectivityEvent::Connected));
    assert_eq!(b.try_recv().ok(), Some(ConnectivityEvent::Connected));
    assert!(monitor.is_connected());
}

#[test]
fn test_dropped_subscriber_does_not_block_others() {
    let monitor = ConnectivityMonitor::new(true);
    let gone = monitor.subscribe().unwrap();
    let kept = monitor.subscribe().unwrap();
    drop(gone);

    monitor.report(false);
    assert_eq!(kept.try_recv().ok(), Some(ConnectivityEvent::Disconnected));
}

#[test]
fn test_tcp_check_sees_a_listening_server() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let check = TcpCheck::for_server(&url, Duration::from_secs(1)).unwrap();
    assert!(check.is_reachable());
}

#[test]
fn test_tcp_check_rejects_bad_url() {
    let err = TcpCheck::for_server("not a url", Duration::from_secs(1))
        .err()
        .expect("invalid url");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn test_static_check() {
    assert!(!StaticCheck(false).is_reachable());
    assert!(StaticCheck(true).is_reachable());
}
