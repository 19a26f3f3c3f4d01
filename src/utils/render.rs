use crate::utils::error::{AdminError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    Tsv,
}

impl FromStr for OutputFormat {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            other => Err(AdminError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: table, json, csv, tsv".to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
        };
        f.write_str(name)
    }
}

/// 可以畫成表格的一列資料
pub trait Tabular {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

pub fn render_rows<T: Tabular + Serialize>(items: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Csv => render_delimited(items, b','),
        OutputFormat::Tsv => render_delimited(items, b'\t'),
        OutputFormat::Table => Ok(render_table(
            &T::headers(),
            &items.iter().map(Tabular::row).collect::<Vec<_>>(),
        )),
    }
}

/// 單筆資料：表格模式下以 key/value 兩欄呈現
pub fn render_record<T: Tabular + Serialize>(item: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = T::headers()
                .into_iter()
                .zip(item.row())
                .map(|(k, v)| vec![k.to_string(), v])
                .collect();
            Ok(render_table(&["FIELD", "VALUE"], &rows))
        }
        other => render_rows(std::slice::from_ref(item), other),
    }
}

fn render_delimited<T: Tabular>(items: &[T], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(T::headers())?;
    for item in items {
        writer.write_record(item.row())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AdminError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AdminError::validation(e.to_string()))
}

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }

    if rows.is_empty() {
        lines.push("(no rows)".to_string());
    }

    lines.join("\n")
}

/// 截斷過長文字，避免表格被描述欄位撐爆
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}

pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: u32,
        name: String,
    }

    impl Tabular for Row {
        fn headers() -> Vec<&'static str> {
            vec!["ID", "NAME"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.id.to_string(), self.name.clone()]
        }
    }

    fn sample() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                name: "Early blight".to_string(),
            },
            Row {
                id: 22,
                name: "Leaf mold, severe".to_string(),
            },
        ]
    }

    #[test]
    fn test_table_alignment() {
        let out = render_rows(&sample(), OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID  NAME");
        assert_eq!(lines[1], "--  -----------------");
        assert_eq!(lines[2], "1   Early blight");
        assert_eq!(lines[3], "22  Leaf mold, severe");
    }

    #[test]
    fn test_csv_quotes_commas() {
        let out = render_rows(&sample(), OutputFormat::Csv).unwrap();
        assert!(out.starts_with("ID,NAME\n"));
        assert!(out.contains("22,\"Leaf mold, severe\""));
    }

    #[test]
    fn test_tsv_and_json() {
        let out = render_rows(&sample(), OutputFormat::Tsv).unwrap();
        assert!(out.contains("1\tEarly blight"));

        let out = render_rows(&sample(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[1]["id"], 22);
    }

    #[test]
    fn test_empty_table() {
        let out = render_rows::<Row>(&[], OutputFormat::Table).unwrap();
        assert!(out.ends_with("(no rows)"));
    }

    #[test]
    fn test_truncate_and_format_parsing() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
