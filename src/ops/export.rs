use chrono::{DateTime, TimeZone};

use crate::model::settings::ExportFormat;
use crate::ops::timestamp::file_stamp;

/// Prefix of every exported file name
pub const FILE_PREFIX: &str = "one-page-binder";

/// Per-export inputs besides the content itself
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions<'a> {
    /// Document title (print and markdown)
    pub title: &'a str,
    /// Pre-rendered timestamp line, when timestamps are enabled
    pub stamp: Option<&'a str>,
}

/// Render `content` (the page or a filtered view) in `format`.
pub fn render(format: ExportFormat, content: &str, opts: &ExportOptions<'_>) -> String {
    match format {
        ExportFormat::Text => content.to_string(),
        ExportFormat::Html => render_html(content, opts),
        ExportFormat::Print => render_print(content, opts),
        ExportFormat::Markdown => render_markdown(content, opts),
    }
}

/// `one-page-binder-<stamp>.<ext>`
pub fn export_filename<Tz>(format: ExportFormat, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}-{}.{}", FILE_PREFIX, file_stamp(at), format.extension())
}

fn render_html(content: &str, opts: &ExportOptions<'_>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(opts.title)));
    out.push_str("<style>\n");
    out.push_str("body { font-family: Arial, sans-serif; line-height: 1.6; margin: 40px; }\n");
    out.push_str(".timestamp { color: #666; font-style: italic; margin-bottom: 20px; }\n");
    out.push_str(".content { white-space: pre-wrap; }\n");
    out.push_str("</style>\n</head>\n<body>\n");
    if let Some(stamp) = opts.stamp {
        out.push_str(&format!("<div class=\"timestamp\">{}</div>\n", escape_html(stamp)));
    }
    out.push_str(&format!("<div class=\"content\">{}</div>\n", html_lines(content)));
    out.push_str("</body>\n</html>\n");
    out
}

fn render_print(content: &str, opts: &ExportOptions<'_>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(opts.title)));
    out.push_str("<style>\n");
    out.push_str(
        "body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
         line-height: 1.6; max-width: 8.5in; margin: 0 auto; padding: 1in; }\n",
    );
    out.push_str("@media print { body { margin: 0; padding: 1in; } }\n");
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_html(opts.title)));
    if let Some(stamp) = opts.stamp {
        out.push_str(&format!("<p class=\"timestamp\">{}</p>\n", escape_html(stamp)));
    }
    out.push_str(&format!("<div>{}</div>\n", html_lines(content)));
    out.push_str("<script>window.onload = function () { window.print(); };</script>\n");
    out.push_str("</body>\n</html>\n");
    out
}

fn render_markdown(content: &str, opts: &ExportOptions<'_>) -> String {
    let mut out = format!("# {}\n\n", opts.title);
    if let Some(stamp) = opts.stamp {
        out.push_str(&format!("_Exported {}_\n\n", stamp));
    }
    out.push_str(content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Escaped content with line breaks as `<br>`
fn html_lines(content: &str) -> String {
    escape_html(content).replace('\n', "<br>")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
