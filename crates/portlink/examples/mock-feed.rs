//! Scripted demo — polls framed values from an in-memory serial port.
//!
//! Run with:
//!   cargo run --example mock-feed

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use portlink::conn::{Conn, ConnConfig, LinkEvent};
use portlink::transport::MockDriver;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let driver = Arc::new(MockDriver::new());
    let script = driver.install("MOCK0");
    let (tx, rx) = mpsc::channel();

    let mut conn = Conn::new(ConnConfig::new("demo", "MOCK0"), driver, Arc::new(tx))?;
    conn.connect()?;
    conn.subscribe();

    // Pretend to be an instrument pushing one reading per frame.
    let feeder = thread::spawn(move || {
        for reading in ["21.4", "21.6", "21.9", "22.1"] {
            script.feed(format!("\x05{reading}\x0d").as_bytes());
            thread::sleep(Duration::from_millis(700));
        }
    });

    let mut seen = 0;
    while seen < 4 {
        match rx.recv_timeout(Duration::from_secs(5))? {
            LinkEvent::Value { conn: name, text } => {
                println!("{name}: {text}");
                seen += 1;
            }
            LinkEvent::Status { conn: name, status } => {
                eprintln!("{name} is now {status}");
            }
        }
    }

    feeder.join().ok();
    conn.unsubscribe();
    conn.disconnect();
    Ok(())
}
