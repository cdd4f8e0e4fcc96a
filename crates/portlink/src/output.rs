use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use portlink_conn::LinkEvent;
use portlink_transport::PortInfo;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(ports).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "TYPE", "MANUFACTURER", "PRODUCT"]);
            for port in ports {
                table.add_row(vec![
                    port.name.clone(),
                    port.kind.to_string(),
                    port.manufacturer.clone().unwrap_or_else(|| "-".to_string()),
                    port.product.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for port in ports {
                println!(
                    "{} type={} manufacturer={} product={}",
                    port.name,
                    port.kind,
                    port.manufacturer.as_deref().unwrap_or("-"),
                    port.product.as_deref().unwrap_or("-")
                );
            }
        }
        OutputFormat::Raw => {
            for port in ports {
                println!("{}", port.name);
            }
        }
    }
}

#[derive(Serialize)]
struct ValueOutput<'a> {
    event: &'static str,
    conn: &'a str,
    value: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    event: &'static str,
    conn: &'a str,
    status: &'a str,
    timestamp: String,
}

pub fn print_event(event: &LinkEvent, format: OutputFormat) {
    match event {
        LinkEvent::Value { conn, text } => print_value(conn, text, format),
        LinkEvent::Status { conn, status } => print_status(conn, status.as_str(), format),
    }
}

fn print_value(conn: &str, text: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ValueOutput {
                event: "value",
                conn,
                value: text,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CONN", "EVENT", "VALUE"])
                .add_row(vec![conn.to_string(), "value".to_string(), text.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("conn={conn} value={text}");
        }
        OutputFormat::Raw => {
            println!("{text}");
        }
    }
}

fn print_status(conn: &str, status: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatusOutput {
                event: "status",
                conn,
                status,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CONN", "EVENT", "VALUE"])
                .add_row(vec![
                    conn.to_string(),
                    "status".to_string(),
                    status.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("conn={conn} status={status}");
        }
        // Raw output carries values only, so it stays pipeable.
        OutputFormat::Raw => {}
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
