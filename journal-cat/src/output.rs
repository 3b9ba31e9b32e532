use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use sd_journal::{Journal, JournalField, NativeOps};
use serde_json::{Map, Value as JsonValue, json};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Line,
    Json,
    JsonLine,
}

/// Fields printed when none are requested.
pub const DEFAULT_FIELDS: &[JournalField] = &[
    JournalField::Hostname,
    JournalField::SyslogIdentifier,
    JournalField::Pid,
    JournalField::Priority,
    JournalField::Message,
];

/// One entry, as read for printing.
#[derive(Debug)]
pub struct Entry {
    pub timestamp: DateTime<Utc>,
    pub cursor: Option<String>,
    pub fields: BTreeMap<String, Option<String>>,
}

impl Entry {
    pub fn read<O: NativeOps>(
        journal: &mut Journal<O>,
        fields: &[String],
        with_cursor: bool,
    ) -> Result<Self> {
        let timestamp = journal.timestamp()?;
        let cursor = if with_cursor {
            Some(journal.cursor()?.to_string())
        } else {
            None
        };

        let mut values = BTreeMap::new();
        if fields.is_empty() {
            let mut known: Vec<(JournalField, Option<String>)> =
                Vec::with_capacity(DEFAULT_FIELDS.len());
            journal.read_journal_fields(DEFAULT_FIELDS.iter().copied(), &mut known)?;
            values.extend(known.into_iter().map(|(f, v)| (f.name().to_owned(), v)));
        } else {
            journal
                .read_fields_as_strings(fields.iter().map(String::as_str), &mut values)
                .context("failed to read entry fields")?;
        }

        Ok(Self {
            timestamp,
            cursor,
            fields: values,
        })
    }

    fn to_json(&self) -> JsonValue {
        let mut obj = Map::new();
        obj.insert(
            "__REALTIME_TIMESTAMP".to_owned(),
            json!(self.timestamp.timestamp_micros().to_string()),
        );
        if let Some(cursor) = &self.cursor {
            obj.insert("__CURSOR".to_owned(), json!(cursor));
        }
        for (name, value) in &self.fields {
            if let Some(value) = value {
                obj.insert(name.clone(), json!(value));
            }
        }
        JsonValue::Object(obj)
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Line => println!("{}", self.line()),
            OutputFormat::Json => {
                let pretty = serde_json::to_string_pretty(&self.to_json())
                    .context("failed to serialize to JSON")?;
                println!("{pretty}");
            }
            OutputFormat::JsonLine => {
                let compact =
                    serde_json::to_string(&self.to_json()).context("failed to serialize to JSON")?;
                println!("{compact}");
            }
        }
        Ok(())
    }

    fn line(&self) -> String {
        let mut line = self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);
        for (name, value) in &self.fields {
            if let Some(value) = value {
                line.push(' ');
                line.push_str(name);
                line.push('=');
                line.push_str(value);
            }
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        let mut fields = BTreeMap::new();
        fields.insert("MESSAGE".to_owned(), Some("started".to_owned()));
        fields.insert("PRIORITY".to_owned(), None);
        Entry {
            timestamp: DateTime::from_timestamp_micros(1_500_000).unwrap(),
            cursor: Some("s=1".to_owned()),
            fields,
        }
    }

    #[test]
    fn line_skips_absent_fields() {
        assert_eq!(entry().line(), "1970-01-01T00:00:01.500000Z MESSAGE=started");
    }

    #[test]
    fn json_carries_timestamp_and_cursor() {
        let json = entry().to_json();
        assert_eq!(json["__REALTIME_TIMESTAMP"], "1500000");
        assert_eq!(json["__CURSOR"], "s=1");
        assert_eq!(json["MESSAGE"], "started");
        assert!(json.get("PRIORITY").is_none());
    }
}
