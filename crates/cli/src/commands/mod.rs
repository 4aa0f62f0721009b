pub mod probe;
pub mod query;
pub mod scan;

use hickory_proto::op::Message;
use hickory_proto::rr::Record;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            let text = text();
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        Ok(())
    }
}

/// Presentation-format view of one resource record.
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub name: String,
    pub ttl: u32,
    #[serde(rename = "type")]
    pub record_type: String,
    pub data: String,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name().to_utf8(),
            ttl: record.ttl(),
            record_type: record.record_type().to_string(),
            data: record.data().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseView {
    pub id: u16,
    pub rcode: String,
    pub truncated: bool,
    pub answers: Vec<RecordView>,
    pub authority: Vec<RecordView>,
}

impl From<&Message> for ResponseView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id(),
            rcode: message.response_code().to_string(),
            truncated: message.truncated(),
            answers: message.answers().iter().map(RecordView::from).collect(),
            authority: message.name_servers().iter().map(RecordView::from).collect(),
        }
    }
}

pub fn format_records(records: &[Record]) -> String {
    records
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
