//! Terminal output: aligned geometry reports for people, `{status, data}` envelopes for scripts

use console::style;
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// JSON document written for every command
#[derive(Serialize)]
struct Envelope<'a, T> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

enum Note {
    Done(String),
    Info(String),
    Warning(String),
}

/// Human rendering of a command result: a titled block of aligned fields, then notes
pub struct Report {
    title: String,
    fields: Vec<(String, String)>,
    notes: Vec<Note>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), fields: Vec::new(), notes: Vec::new() }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Skipped when `value` is `None`
    pub fn field_opt(self, key: impl Into<String>, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// An (x, y) pair
    pub fn coords(self, key: impl Into<String>, (x, y): (f64, f64)) -> Self {
        self.field(key, format!("{} {}", x, y))
    }

    pub fn done(mut self, message: impl Display) -> Self {
        self.notes.push(Note::Done(message.to_string()));
        self
    }

    pub fn info(mut self, message: impl Display) -> Self {
        self.notes.push(Note::Info(message.to_string()));
        self
    }

    pub fn warning(mut self, message: impl Display) -> Self {
        self.notes.push(Note::Warning(message.to_string()));
        self
    }

    /// Warnings survive into JSON output; the other notes are terminal-only
    fn warnings(&self) -> Vec<String> {
        self.notes
            .iter()
            .filter_map(|note| match note {
                Note::Warning(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn print(&self) {
        println!("{}", style(&self.title).bold().underlined());

        let width = self.fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in &self.fields {
            println!("  {}  {}", style(format!("{:<width$}", key, width = width)).bold(), value);
        }

        for note in &self.notes {
            match note {
                Note::Done(message) => println!("{} {}", style("✓").green().bold(), message),
                Note::Info(message) => println!("{} {}", style("ℹ").blue().bold(), message),
                Note::Warning(message) => eprintln!("{} {}", style("⚠").yellow().bold(), message),
            }
        }
    }
}

pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Write `data` as a success envelope in JSON mode, `report` otherwise
    pub fn emit<T: Serialize>(&self, data: &T, report: Report) -> anyhow::Result<()> {
        if self.json {
            let envelope = Envelope {
                status: "success",
                data: Some(data),
                message: None,
                warnings: report.warnings(),
            };
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        } else {
            report.print();
        }
        Ok(())
    }

    /// Like [`emit`](Self::emit), with the human form rendered as a table
    pub fn emit_table<T: Serialize, R: Tabled>(
        &self,
        data: &T,
        title: &str,
        rows: Vec<R>,
    ) -> anyhow::Result<()> {
        if self.json {
            return self.emit(data, Report::new(title));
        }

        println!("{}", style(title).bold().underlined());
        if rows.is_empty() {
            println!("{}", style("(no values)").dim());
        } else {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        Ok(())
    }

    /// Failure message on stderr; a single error envelope in JSON mode
    pub fn error(&self, message: impl Display) {
        if self.json {
            let envelope: Envelope<'_, ()> = Envelope {
                status: "error",
                data: None,
                message: Some(message.to_string()),
                warnings: Vec::new(),
            };
            match serde_json::to_string_pretty(&envelope) {
                Ok(text) => eprintln!("{}", text),
                Err(_) => eprintln!("{{\"status\":\"error\"}}"),
            }
        } else {
            eprintln!("{} {}", style("✗").red().bold(), message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_warnings_reach_json() {
        let report = Report::new("Distance")
            .field("Method", "haversine")
            .info("informational")
            .warning("--crs is ignored")
            .done("saved");

        assert_eq!(report.warnings(), vec!["--crs is ignored".to_string()]);
    }

    #[test]
    fn test_field_opt_skips_none() {
        let report = Report::new("Geometry")
            .field_opt("Reprojected to", None::<String>)
            .coords("Point", (1.5, -2.0));

        assert_eq!(report.fields, vec![("Point".to_string(), "1.5 -2".to_string())]);
    }

    #[test]
    fn test_envelope_omits_empty_parts() {
        let data = serde_json::json!({"distance": 1.0});
        let envelope =
            Envelope { status: "success", data: Some(&data), message: None, warnings: Vec::new() };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["distance"], 1.0);
        assert!(value.get("message").is_none());
        assert!(value.get("warnings").is_none());
    }
}
