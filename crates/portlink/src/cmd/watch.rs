use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use portlink_conn::{Conn, LinkEvent};
use portlink_transport::SystemDriver;

use crate::cmd::WatchArgs;
use crate::exit::{link_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let (tx, rx) = mpsc::channel();
    let config = args.line.to_config(&args.name, &args.port);
    let mut conn = Conn::new(config, Arc::new(SystemDriver::new()), Arc::new(tx))
        .map_err(|err| link_error("invalid configuration", err))?;
    conn.connect().map_err(|err| link_error("open failed", err))?;
    conn.subscribe();

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        // Short timeout so an interrupt is noticed between events.
        let event = match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => event,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        let is_value = matches!(event, LinkEvent::Value { .. });
        print_event(&event, format);

        if is_value {
            printed = printed.saturating_add(1);
            if let Some(count) = args.count {
                if printed >= count {
                    break;
                }
            }
        }
    }

    conn.unsubscribe();
    conn.disconnect();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
