//! List helpers shared by every table-backed endpoint: free-text filtering,
//! page slicing, and CSV / key-list serialization for exports.

use serde::Serialize;

/// Case-insensitive substring filter over an entity-specific set of string
/// fields. An empty (or whitespace-only) query matches everything.
pub fn filter_rows<'a, T, F>(items: &'a [T], query: &str, fields: F) -> Vec<&'a T>
where
    F: Fn(&T) -> Vec<&str>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            fields(item)
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Navigation state for one page of a list. `start..end` is the index range
/// into the filtered list (end exclusive, clamped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
    #[serde(skip)]
    pub start: usize,
    #[serde(skip)]
    pub end: usize,
}

/// Compute pagination state. `page` is 1-based and clamped into the valid
/// range; `per_page` is treated as at least 1. An empty list yields zero
/// pages with both navigation flags false.
pub fn paginate(total_items: usize, page: usize, per_page: usize) -> PageInfo {
    let per_page = per_page.max(1);
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);

    PageInfo {
        page,
        per_page,
        total_items,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1 && total_pages > 0,
        start,
        end,
    }
}

pub fn page_slice<'a, T>(items: &'a [T], info: &PageInfo) -> &'a [T] {
    &items[info.start.min(items.len())..info.end.min(items.len())]
}

/// Serialize rows to CSV per RFC 4180: fields containing a comma, quote, CR
/// or LF are wrapped in quotes with embedded quotes doubled. Rows are joined
/// with CRLF and a header line comes first.
pub fn to_csv(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, header.iter().map(|s| *s));
    for row in rows {
        push_csv_row(&mut out, row.iter().map(|s| s.as_str()));
    }
    out
}

fn push_csv_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&csv_field(field));
    }
    out.push_str("\r\n");
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Newline-joined key list, one key per line with a trailing newline.
pub fn to_key_list(keys: &[String]) -> String {
    let mut out = keys.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
