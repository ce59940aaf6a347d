use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
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

/// What one `send` invocation put on the wire.
#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct SendSummary {
    pub server: String,
    pub instance: String,
    pub strategy: String,
    pub workers: usize,
    pub messages: u64,
    pub payload_bytes: u64,
    pub datagrams: u64,
    pub wire_bytes: u64,
}

pub fn print_summary(summary: &SendSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "SERVER", "INSTANCE", "STRATEGY", "WORKERS", "MESSAGES", "BYTES", "DATAGRAMS",
                ])
                .add_row(vec![
                    summary.server.clone(),
                    summary.instance.clone(),
                    summary.strategy.clone(),
                    summary.workers.to_string(),
                    summary.messages.to_string(),
                    summary.payload_bytes.to_string(),
                    summary.datagrams.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sent {} message(s), {} bytes in {} datagram(s) ({} bytes on the wire) to {} instance={} strategy={} workers={}",
                summary.messages,
                summary.payload_bytes,
                summary.datagrams,
                summary.wire_bytes,
                summary.server,
                summary.instance,
                summary.strategy,
                summary.workers
            );
        }
    }
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
