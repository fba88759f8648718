use colored::Colorize;
use itertools::Itertools;

use crate::screens::{OpenForm, PageExport};
use crate::table::form::FieldKind;
use crate::table::view::RenderedPage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Xml,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".xml") {
        return Some(OutputFormat::Xml);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{value}{}", " ".repeat(width.saturating_sub(len)))
}

/// Aligned table with header, rows and a pagination footer.
pub fn render_text(page: &RenderedPage, color: bool) -> String {
    let mut headers = page.headers.clone();
    headers.push("Actions".to_string());

    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|r| {
            let mut cells = r.cells.clone();
            cells.push(r.actions.join("/"));
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|i| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .chain(std::iter::once(&headers[i]))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let title = if color {
        page.title.bold().to_string()
    } else {
        page.title.clone()
    };
    out.push_str(&format!("{title}\n"));

    let header = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .join("  ");
    if color {
        out.push_str(&format!("{}\n", header.trim_end().cyan().bold()));
    } else {
        out.push_str(&format!("{}\n", header.trim_end()));
    }
    out.push_str(&format!(
        "{}\n",
        widths.iter().map(|w| "-".repeat(*w)).join("  ")
    ));

    if rows.is_empty() {
        out.push_str("(no records)\n");
    }
    for row in &rows {
        let line = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).join("  ");
        out.push_str(&format!("{}\n", line.trim_end()));
    }

    out.push('\n');
    out.push_str(&render_footer(page, color));
    out
}

fn render_footer(page: &RenderedPage, color: bool) -> String {
    let control = |label: &str, enabled: bool| -> String {
        match (enabled, color) {
            (true, _) => format!("[{label}]"),
            (false, true) => format!("[{label}]").dimmed().to_string(),
            (false, false) => format!("({label})"),
        }
    };
    let links = page
        .controls
        .pages
        .iter()
        .map(|l| match (l.active, color) {
            (true, true) => l.number.to_string().green().bold().to_string(),
            (true, false) => format!("*{}*", l.number),
            _ => l.number.to_string(),
        })
        .join(" ");

    let mut out = format!(
        "{} {} {}\n",
        control("prev", page.controls.previous_enabled),
        links,
        control("next", page.controls.next_enabled)
    );
    out.push_str(&format!(
        "Page {} of {} | {} of {} records | {} per page",
        page.page, page.total_pages, page.filtered, page.total, page.page_size
    ));
    if !page.filter.is_empty() {
        out.push_str(&format!(" | filter '{}'", page.filter));
    }
    out.push('\n');
    out
}

/// Labelled field values of one record, as shown by the view action.
pub fn render_fields(title: &str, fields: &[(&str, String)]) -> String {
    let width = fields
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = format!("{title}\n");
    for (label, value) in fields {
        out.push_str(&format!(":: {} : {}\n", pad(label, width), value));
    }
    out
}

pub fn render_form(form: &OpenForm<'_>) -> String {
    let mut out = format!("{}\n", form.spec.title);
    for field in form.spec.fields {
        let value = match field.kind {
            FieldKind::Checkbox if form.draft.flag(field.name) => "[x]".to_string(),
            FieldKind::Checkbox => "[ ]".to_string(),
            _ => form.draft.text(field.name),
        };
        let hint = match field.kind {
            FieldKind::Select(options) => format!(" ({})", options.join("|")),
            _ => String::new(),
        };
        let marker = if field.required { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {} [{}]{}: {}\n",
            field.label, field.name, hint, value
        ));
    }
    out
}

pub fn render_json(export: &PageExport) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(export).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn xml_tag(header: &str) -> String {
    let tag: String = header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .split_whitespace()
        .join("_")
        .to_lowercase();
    if tag.is_empty() || tag.starts_with(|c: char| c.is_ascii_digit()) {
        format!("field_{tag}")
    } else {
        tag
    }
}

pub fn render_xml(page: &RenderedPage) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str(&format!(
        "<page title=\"{}\" number=\"{}\" total_pages=\"{}\" page_size=\"{}\" filtered=\"{}\" total=\"{}\">\n",
        escape_xml(&page.title),
        page.page,
        page.total_pages,
        page.page_size,
        page.filtered,
        page.total
    ));
    out.push_str(&format!("  <filter>{}</filter>\n", escape_xml(&page.filter)));
    let tags: Vec<String> = page.headers.iter().map(|h| xml_tag(h)).collect();
    for row in &page.rows {
        out.push_str(&format!("  <row id=\"{}\">\n", row.id));
        for (tag, cell) in tags.iter().zip(&row.cells) {
            out.push_str(&format!("    <{tag}>{}</{tag}>\n", escape_xml(cell)));
        }
        out.push_str("  </row>\n");
    }
    out.push_str("</page>\n");
    out.into_bytes()
}
