use std::sync::Arc;

use portlink_conn::{Conn, NullSink};
use portlink_transport::SystemDriver;

use crate::cmd::SendArgs;
use crate::exit::{link_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let config = args.line.to_config("send", &args.port);
    let conn = Conn::new(config, Arc::new(SystemDriver::new()), Arc::new(NullSink))
        .map_err(|err| link_error("invalid configuration", err))?;
    conn.connect().map_err(|err| link_error("open failed", err))?;
    conn.send(&args.message, None, None)
        .map_err(|err| link_error("send failed", err))?;
    conn.disconnect();
    Ok(SUCCESS)
}
