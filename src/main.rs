//! `eventgrid-sink` - publish newline-delimited JSON events from stdin.
//!
//! Each input line is one event:
//!
//! ```text
//! {"subject":"/orders/1","eventType":"Order.Created","dataVersion":"1.0","data":{"total":3}}
//! ```
//!
//! Configuration comes from `EVENTGRID_SINK__*` environment variables.

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eventgrid_sink::adapters::EventGridSink;
use eventgrid_sink::config::{AppConfig, LogConfig};
use eventgrid_sink::domain::events::{EventPayload, EventRecord};
use eventgrid_sink::domain::foundation::{EventId, Timestamp};
use eventgrid_sink::ports::EventSink;

#[derive(Parser)]
#[command(
    name = "eventgrid-sink",
    about = "Publish newline-delimited JSON events to an Event Grid topic"
)]
struct Cli {
    /// Publish each line as its own request instead of one batch
    #[arg(long)]
    single: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

/// One line of input.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputEvent {
    subject: String,
    event_type: String,
    data_version: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    event_time: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl InputEvent {
    fn into_record(self) -> anyhow::Result<EventRecord> {
        let payload = EventPayload::from_json(&self.data)?;
        let mut record =
            EventRecord::new(self.subject, self.event_type, self.data_version, payload);

        if let Some(topic) = self.topic {
            record = record.with_topic(topic);
        }
        if let Some(event_time) = self.event_time {
            let parsed = Timestamp::parse_rfc3339(&event_time)
                .with_context(|| format!("invalid eventTime '{}'", event_time))?;
            record = record.with_event_time(parsed);
        }
        if let Some(id) = self.id {
            record = record.with_id(EventId::from_string(id));
        }

        Ok(record)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.log, cli.json_logs);
    config.validate().context("validating configuration")?;

    let records = read_records(BufReader::new(tokio::io::stdin())).await?;
    if records.is_empty() {
        tracing::warn!("No events on stdin; nothing to publish");
        return Ok(());
    }

    let sink = EventGridSink::from_config(&config.sink).context("building event sink")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; cancelling publish");
            on_interrupt.cancel();
        }
    });

    let result = publish(&sink, &records, cli.single, &cancel).await;
    sink.release();

    if result.is_ok() {
        tracing::info!(event_count = records.len(), "Done");
    }
    result
}

fn init_tracing(log: &LogConfig, json_override: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log.level.as_str().into());
    let json = json_override || log.json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn read_records<R>(reader: R) -> anyhow::Result<Vec<EventRecord>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut records = Vec::new();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let input: InputEvent = serde_json::from_str(&line)
            .with_context(|| format!("line {}: not a valid event", line_number))?;
        let record = input
            .into_record()
            .with_context(|| format!("line {}", line_number))?;
        records.push(record);
    }

    Ok(records)
}

async fn publish(
    sink: &EventGridSink,
    records: &[EventRecord],
    single: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    if !single {
        return sink
            .publish_batch(records, cancel)
            .await
            .context("publishing batch");
    }

    for (index, record) in records.iter().enumerate() {
        sink.publish(record, cancel)
            .await
            .with_context(|| format!("publishing event {}", index + 1))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventgrid_sink::domain::events::Publishable;

    #[tokio::test]
    async fn reads_one_record_per_line_and_skips_blank_lines() {
        let input = concat!(
            r#"{"subject":"/a","eventType":"Created","dataVersion":"1.0","data":{"n":1}}"#,
            "\n\n",
            r#"{"subject":"/b","eventType":"Created","dataVersion":"1.0","id":"e-2","topic":"t"}"#,
            "\n",
        );

        let records = read_records(input.as_bytes()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subject(), "/a");
        assert_eq!(records[0].payload().as_bytes(), br#"{"n":1}"#);
        assert_eq!(records[1].event_id().map(|id| id.as_str()), Some("e-2"));
        assert_eq!(records[1].topic(), Some("t"));
    }

    #[tokio::test]
    async fn reports_the_failing_line() {
        let input = "{\"subject\":\"/a\",\"eventType\":\"Created\",\"dataVersion\":\"1.0\"}\nnot json\n";

        let err = read_records(input.as_bytes()).await.unwrap_err();

        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn rejects_malformed_event_time() {
        let input = r#"{"subject":"/a","eventType":"Created","dataVersion":"1.0","eventTime":"yesterday"}"#;

        assert!(read_records(input.as_bytes()).await.is_err());
    }
}
