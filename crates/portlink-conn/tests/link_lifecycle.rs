//! End-to-end lifecycle tests driving real poll workers against scripted
//! ports.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use portlink_conn::{Conn, ConnConfig, ConnStatus, LinkEvent, SerialLink, POLL_DELAY};
use portlink_transport::{MockDriver, MockPortScript};

const WAIT: Duration = Duration::from_secs(3);

fn rig(name: &str, port: &str) -> (MockPortScript, mpsc::Receiver<LinkEvent>, Conn) {
    let driver = Arc::new(MockDriver::new());
    let script = driver.install(port);
    let (tx, rx) = mpsc::channel();
    let conn = Conn::new(ConnConfig::new(name, port), driver, Arc::new(tx)).unwrap();
    (script, rx, conn)
}

fn wait_until(mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    pred()
}

/// Block until the next value event, skipping status events on the way.
fn next_value(rx: &mpsc::Receiver<LinkEvent>) -> Option<String> {
    let deadline = Instant::now() + WAIT;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        match rx.recv_timeout(deadline - now) {
            Ok(LinkEvent::Value { text, .. }) => return Some(text),
            Ok(LinkEvent::Status { .. }) => continue,
            Err(_) => return None,
        }
    }
}

/// Assert no value event arrives within `window`.
fn assert_no_value_for(rx: &mpsc::Receiver<LinkEvent>, window: Duration) {
    let deadline = Instant::now() + window;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        match rx.recv_timeout(deadline - now) {
            Ok(LinkEvent::Value { text, .. }) => panic!("unexpected value {text:?}"),
            Ok(LinkEvent::Status { .. }) => continue,
            Err(_) => return,
        }
    }
}

#[test]
fn subscribe_polls_and_publishes_values() {
    let (script, rx, mut conn) = rig("alpha", "COM7");
    conn.connect().unwrap();
    conn.subscribe();

    script.feed(b"\x05first\x0d");
    assert_eq!(next_value(&rx).as_deref(), Some("first"));

    // A later frame rides a later poll run.
    script.feed(b"\x05second\x0d");
    assert_eq!(next_value(&rx).as_deref(), Some("second"));
    assert_eq!(conn.last_value().as_deref(), Some("second"));
}

#[test]
fn status_events_track_the_lifecycle() {
    let (script, rx, conn) = rig("alpha", "COM9");
    script.fail_open("busy");
    assert!(conn.connect().is_err());
    script.allow_open();
    conn.connect().unwrap();
    conn.disconnect();

    let statuses: Vec<ConnStatus> = rx
        .try_iter()
        .filter_map(|event| match event {
            LinkEvent::Status { status, .. } => Some(status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            ConnStatus::Initializing,
            ConnStatus::FailedToConnect,
            ConnStatus::Connected,
            ConnStatus::Disconnected,
        ]
    );
}

#[test]
fn unsubscribe_discards_stale_partial_input() {
    let (script, rx, mut conn) = rig("alpha", "COM7");
    conn.connect().unwrap();
    conn.subscribe();
    assert!(conn.is_subscribed());

    // Let the poller swallow the start of a frame, then stop watching.
    script.feed(b"\x05par");
    assert!(wait_until(|| script.pending() == 0));
    conn.unsubscribe();
    assert!(!conn.is_subscribed());

    // The tail of the old frame must not glue onto the new session.
    script.feed(b"tial\x0d\x05fresh\x0d");
    conn.subscribe();
    assert_eq!(next_value(&rx).as_deref(), Some("fresh"));
}

#[test]
fn polling_survives_read_failures() {
    let (script, rx, mut conn) = rig("alpha", "COM7");
    conn.connect().unwrap();
    conn.subscribe();

    script.fail_reads();
    script.feed(b"\x05ok\x0d");
    // A few poll runs abort on the scripted failure.
    thread::sleep(POLL_DELAY * 2);

    script.allow_reads();
    assert_eq!(next_value(&rx).as_deref(), Some("ok"));
    assert_eq!(conn.status(), ConnStatus::Connected);
}

#[test]
fn disconnect_pauses_delivery_until_reconnect() {
    let (script, rx, mut conn) = rig("alpha", "COM7");
    conn.connect().unwrap();
    conn.subscribe();

    script.feed(b"\x05live\x0d");
    assert_eq!(next_value(&rx).as_deref(), Some("live"));

    conn.disconnect();
    script.feed(b"\x05late\x0d");
    assert_no_value_for(&rx, POLL_DELAY * 2);
    // Nothing was consumed while the port was closed.
    assert_eq!(script.pending(), 6);

    conn.connect().unwrap();
    assert_eq!(next_value(&rx).as_deref(), Some("late"));
}

#[test]
fn unsubscribe_reaps_poller_and_keeps_port_open() {
    let driver = Arc::new(MockDriver::new());
    let script = driver.install("COM7");
    let (tx, rx) = mpsc::channel();
    let mut link = SerialLink::new(driver, Arc::new(tx));

    link.add_conn(ConnConfig::new("alpha", "COM7")).unwrap();
    link.subscribe("alpha").unwrap();
    assert!(link.conn("alpha").unwrap().is_subscribed());
    script.feed(b"\x05live\x0d");
    assert_eq!(next_value(&rx).as_deref(), Some("live"));

    link.unsubscribe("alpha").unwrap();
    assert!(!link.conn("alpha").unwrap().is_subscribed());
    assert!(script.is_open());

    // Nothing drains the port once the worker is reaped.
    script.feed(b"\x05late\x0d");
    assert_no_value_for(&rx, POLL_DELAY * 2);
    assert_eq!(script.pending(), 6);

    link.subscribe("alpha").unwrap();
    assert_eq!(next_value(&rx).as_deref(), Some("late"));
}

#[test]
fn remove_conn_reaps_poller_and_closes_port() {
    let driver = Arc::new(MockDriver::new());
    let script = driver.install("COM7");
    let (tx, rx) = mpsc::channel();
    let mut link = SerialLink::new(driver, Arc::new(tx));

    link.add_conn(ConnConfig::new("alpha", "COM7")).unwrap();
    link.subscribe("alpha").unwrap();
    script.feed(b"\x05live\x0d");
    assert_eq!(next_value(&rx).as_deref(), Some("live"));

    link.remove_conn("alpha").unwrap();
    assert!(!script.is_open());
    assert!(link.is_empty());

    script.feed(b"\x05ghost\x0d");
    assert_no_value_for(&rx, POLL_DELAY * 2);
}
