use chrono::{Local, TimeZone};
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::ServeError;
use crate::listing::{DirEntry, ListingSummary};

/// External template engine hook for rendered listings.
///
/// `bindings` is the JSON object described in [`template_bindings`]; the
/// engine is looked up by the injected implementation, not by name inside
/// this crate.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, bindings: &Value) -> Result<String, ServeError>;
}

/// Generate the primitive, self-contained default listing page.
///
/// One table row per entry: link, formatted size (blank for directories),
/// formatted last-modified timestamp.
pub fn generated_listing(entries: &[DirEntry], config: &Config) -> String {
    let mut page = String::from("<html><body><table>");
    for entry in entries {
        let size = match (entry.is_file, entry.size) {
            (true, Some(size)) => format_size(&config.size_format, size),
            _ => String::new(),
        };
        let timestamp = entry
            .modified
            .map(|modified| format_timestamp(&config.timestamp_format, modified))
            .unwrap_or_default();
        page.push_str(&format!(
            "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&entry.display_url),
            html_escape(&entry.name),
            size,
            timestamp,
        ));
    }
    page.push_str("</table></body></html>");
    page
}

/// The bindings handed to a [`TemplateRenderer`] in template mode.
///
/// `dirPath` is `dirUrl` with the mount prefix removed, so templates can
/// show a tree-relative location.
pub fn template_bindings(
    entries: &[DirEntry],
    summary: ListingSummary,
    dir_url: &str,
    mount: &str,
) -> Value {
    let dir_path = dir_url.strip_prefix(mount).unwrap_or(dir_url);
    json!({
        "dirUrl": dir_url,
        "dirPath": dir_path,
        "dirEntries": entries,
        "numDirs": summary.num_dirs,
        "numFiles": summary.num_files,
        "diskUsage": summary.disk_usage,
    })
}

/// Format an integer per the listing size pattern.
///
/// Implements the integer subset of decimal patterns: '0' sets the minimum
/// digit count, ',' enables grouping with the width of the last group, '#'
/// pads nothing. "#,000" renders 5 as "005" and 1234567 as "1,234,567".
pub fn format_size(pattern: &str, value: u64) -> String {
    let integer_pattern = pattern.split('.').next().unwrap_or(pattern);
    let grouping = integer_pattern.contains(',');
    let group_size = integer_pattern
        .rsplit(',')
        .next()
        .map(|group| group.chars().filter(|c| matches!(c, '#' | '0')).count())
        .unwrap_or(0);
    let min_digits = integer_pattern.chars().filter(|c| *c == '0').count();

    let mut digits = value.to_string();
    while digits.len() < min_digits {
        digits.insert(0, '0');
    }

    if !grouping || group_size == 0 {
        return digits;
    }

    let chars: Vec<char> = digits.chars().collect();
    let mut grouped = String::with_capacity(chars.len() + chars.len() / group_size);
    for (index, c) in chars.iter().enumerate() {
        let remaining = chars.len() - index;
        if index > 0 && remaining % group_size == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    grouped
}

/// Format an epoch-seconds timestamp with the configured strftime pattern,
/// in the server's local timezone.
pub fn format_timestamp(pattern: &str, epoch_secs: u64) -> String {
    Local
        .timestamp_opt(epoch_secs as i64, 0)
        .single()
        .map(|timestamp| timestamp.format(pattern).to_string())
        .unwrap_or_default()
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
