//! Text rendering for tables, bar charts and metrics

use colored::*;
use serde::Serialize;

use crate::config::OutputFormat;
use crate::error::{DashboardError, Result};

/// Shown instead of a number when there is nothing to compute it from
pub const NO_DATA: &str = "n/a (no data)";

/// Shown in place of a missing cell value
pub const MISSING: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnFormat {
    Text,
    Integer,
    /// Two-decimal fixed point
    Fixed2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub header: String,
    pub format: ColumnFormat,
}

impl Column {
    pub fn text(header: &str) -> Self {
        Self { header: header.to_string(), format: ColumnFormat::Text }
    }

    pub fn integer(header: &str) -> Self {
        Self { header: header.to_string(), format: ColumnFormat::Integer }
    }

    pub fn fixed2(header: &str) -> Self {
        Self { header: header.to_string(), format: ColumnFormat::Fixed2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn format(&self, format: ColumnFormat) -> String {
        match (self, format) {
            (Cell::Missing, _) => MISSING.to_string(),
            (Cell::Text(s), _) => s.clone(),
            (Cell::Integer(n), _) => n.to_string(),
            (Cell::Number(v), ColumnFormat::Fixed2) => format!("{:.2}", v),
            (Cell::Number(v), ColumnFormat::Integer) => format!("{:.0}", v),
            (Cell::Number(v), ColumnFormat::Text) => v.to_string(),
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Cell::Missing, Cell::Text)
    }
}

impl From<Option<u32>> for Cell {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Cell::Missing, |n| Cell::Integer(n as i64))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(title: impl Into<String>, columns: Vec<Column>) -> Self {
        Self { title: title.into(), columns, rows: Vec::new() }
    }

    /// Append a row; its width must match the column count
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DashboardError::Render(format!(
                "Row has {} cells but table '{}' has {} columns",
                row.len(),
                self.title,
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text for every row, formatted per column
    fn formatted_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.columns)
                    .map(|(cell, column)| cell.format(column.format))
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Text(String),
    Integer(i64),
    Number(f64),
    NoData,
}

impl MetricValue {
    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(MetricValue::NoData, MetricValue::Number)
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Integer(n) => write!(f, "{}", n),
            MetricValue::Number(v) => write!(f, "{:.2}", v),
            MetricValue::NoData => f.write_str(NO_DATA),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: MetricValue,
}

impl Metric {
    pub fn new(label: &str, value: MetricValue) -> Self {
        Self { label: label.to_string(), value }
    }
}

/// One block of a rendered view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    Metrics { metrics: Vec<Metric> },
    Table { table: Table },
    Chart { chart: BarChart },
    Notice { message: String },
}

/// Everything needed to print one dashboard view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub sections: Vec<Section>,
}

impl DashboardView {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), sections: Vec::new() }
    }

    pub fn metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.sections.push(Section::Metrics { metrics });
        self
    }

    pub fn table(mut self, table: Table) -> Self {
        self.sections.push(Section::Table { table });
        self
    }

    pub fn chart(mut self, chart: BarChart) -> Self {
        self.sections.push(Section::Chart { chart });
        self
    }

    pub fn notice(mut self, message: impl Into<String>) -> Self {
        self.sections.push(Section::Notice { message: message.into() });
        self
    }
}

/// Turns view models into terminal text or JSON
#[derive(Debug, Clone)]
pub struct Renderer {
    pub format: OutputFormat,
    pub color: bool,
    pub chart_width: usize,
}

impl Renderer {
    pub fn new(format: OutputFormat, color: bool, chart_width: usize) -> Self {
        Self { format, color, chart_width: chart_width.max(1) }
    }

    pub fn render(&self, view: &DashboardView) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
            OutputFormat::Table => Ok(self.render_text(view)),
        }
    }

    fn render_text(&self, view: &DashboardView) -> String {
        let mut out = String::new();
        out.push_str(&self.heading(&view.title, '='));
        for section in &view.sections {
            out.push('\n');
            match section {
                Section::Metrics { metrics } => out.push_str(&self.render_metrics(metrics)),
                Section::Table { table } => out.push_str(&self.render_table(table)),
                Section::Chart { chart } => out.push_str(&self.render_chart(chart)),
                Section::Notice { message } => {
                    out.push_str(&self.paint(message, |s| s.yellow()));
                    out.push('\n');
                }
            }
        }
        out
    }

    fn heading(&self, title: &str, underline: char) -> String {
        let rule: String = std::iter::repeat(underline).take(title.chars().count().max(3)).collect();
        format!("{}\n{}\n", self.paint(title, |s| s.cyan().bold()), rule)
    }

    pub fn render_metrics(&self, metrics: &[Metric]) -> String {
        let width = metrics.iter().map(|m| m.label.chars().count()).max().unwrap_or(0);
        let mut out = String::new();
        for metric in metrics {
            let value = metric.value.to_string();
            let value = match metric.value {
                MetricValue::NoData => self.paint(&value, |s| s.dimmed()),
                _ => self.paint(&value, |s| s.bold()),
            };
            out.push_str(&format!("  {:<width$}  {}\n", metric.label, value, width = width));
        }
        out
    }

    pub fn render_table(&self, table: &Table) -> String {
        let mut out = self.heading(&table.title, '-');
        if table.is_empty() {
            out.push_str(&self.paint("(no rows)", |s| s.dimmed()));
            out.push('\n');
            return out;
        }

        let rows = table.formatted_rows();
        let widths: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                rows.iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(column.header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = table
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| align(&column.header, width, column.format))
            .collect();
        out.push_str(&self.paint(header.join("  ").trim_end(), |s| s.bold()));
        out.push('\n');

        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');

        for row in rows {
            let line: Vec<String> = row
                .iter()
                .zip(&table.columns)
                .zip(&widths)
                .map(|((cell, column), &width)| align(cell, width, column.format))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }

    pub fn render_chart(&self, chart: &BarChart) -> String {
        let mut out = self.heading(&chart.title, '-');
        if chart.bars.is_empty() {
            out.push_str(&self.paint("(no data)", |s| s.dimmed()));
            out.push('\n');
            return out;
        }

        let label_width = chart.bars.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
        let max = chart.bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

        for (label, value) in &chart.bars {
            let length = if max > 0.0 && *value > 0.0 {
                ((value / max) * self.chart_width as f64).round() as usize
            } else {
                0
            };
            let bar = "█".repeat(length);
            out.push_str(&format!(
                "{:<label_width$}  {} {:.2}\n",
                label,
                self.paint(&bar, |s| s.green()),
                value,
                label_width = label_width
            ));
        }
        out
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn align(text: &str, width: usize, format: ColumnFormat) -> String {
    match format {
        ColumnFormat::Text => format!("{:<width$}", text, width = width),
        ColumnFormat::Integer | ColumnFormat::Fixed2 => format!("{:>width$}", text, width = width),
    }
}
