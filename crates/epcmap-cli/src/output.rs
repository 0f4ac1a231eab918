use crate::output_types::LayerOutput;
use console::{style, Color};
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Terminal writer for command results.
///
/// In JSON mode only the result envelope goes to stdout; notes are dropped
/// and warnings go to stderr as JSON objects.
pub struct OutputWriter {
    json: bool,
}

#[derive(Tabled)]
struct PaintRow {
    #[tabled(rename = "Feature")]
    feature_id: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn note(&self, message: impl Display) {
        if !self.json {
            println!("{} {}", style("ℹ").blue().bold(), message);
        }
    }

    pub fn warn(&self, message: impl Display) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "status": "warning", "message": message.to_string() }));
        } else {
            eprintln!("{} {}", style("⚠").yellow().bold(), message);
        }
    }

    /// Print `data` inside the `{"status": "success", "data": ...}` envelope
    pub fn emit<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let envelope = serde_json::json!({ "status": "success", "data": data });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        Ok(())
    }

    pub fn field(&self, key: impl Display, value: impl Display) {
        println!("{}: {}", style(key).bold(), value);
    }

    pub fn heading(&self, title: impl Display) {
        println!("\n{}", style(title).bold().underlined());
    }

    pub fn rows<T: Tabled>(&self, rows: Vec<T>) {
        if rows.is_empty() {
            println!("{}", style("(none)").dim());
            return;
        }
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    /// One paint layer: its entries as a table, then the fallback
    pub fn layer(&self, title: &str, layer: &LayerOutput) {
        self.heading(format!("{} ({})", title, layer.layer));
        self.rows(
            layer
                .entries
                .iter()
                .map(|e| PaintRow { feature_id: e.feature_id.clone(), value: e.value.clone() })
                .collect(),
        );
        self.field("Fallback", &layer.fallback);
    }

    /// A rating label tinted by its band, `none` when absent
    pub fn rating(&self, label: Option<&str>) -> String {
        let Some(label) = label else {
            return style("none").dim().to_string();
        };
        let colour = match label {
            "A" | "B" => Color::Green,
            "C" | "D" => Color::Yellow,
            "E" | "F" => Color::Color256(208),
            _ => Color::Red,
        };
        style(label).fg(colour).bold().to_string()
    }
}
