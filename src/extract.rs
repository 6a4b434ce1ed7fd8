//! Field extraction engine
//!
//! Router firmware moves the same datum between plain table markup, form
//! inputs, and inline script constants across minor revisions. Each field is
//! described by a [`FieldDescriptor`] carrying an ordered list of strategies;
//! the first strategy that yields a non-empty value wins, and a field that no
//! strategy can resolve becomes the [`UNKNOWN`] sentinel instead of an error,
//! so snapshots are always structurally complete.

use regex::Regex;

/// Sentinel returned when no strategy can resolve a field.
pub const UNKNOWN: &str = "Unknown";

/// How to pick one row out of an embedded script array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelector {
    /// Take the first row.
    First,
    /// Take the first row whose cell at `column` equals `value`.
    CellEquals { column: usize, value: &'static str },
}

/// One way of locating a value inside a page.
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Table cell adjacent to a cell whose text contains `label`.
    LabeledCell { label: &'static str },
    /// `value` attribute of an `<input>` with the given `name`.
    InputValue { name: &'static str },
    /// Display text of the selected `<option>` inside a `<select>`.
    SelectedOption { name: &'static str },
    /// `value` attribute of the checked radio/checkbox with the given `name`.
    CheckedValue { name: &'static str },
    /// Positional cell of a row inside `var <name> = [ [...], ... ];`.
    ScriptArray {
        var: &'static str,
        row: RowSelector,
        column: usize,
    },
}

/// Static description of where one named value lives.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub strategies: &'static [Strategy],
    /// What the field resolves to when every strategy misses.
    pub fallback: &'static str,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, strategies: &'static [Strategy]) -> Self {
        Self {
            name,
            strategies,
            fallback: UNKNOWN,
        }
    }

    /// Numeric fields fall back to "0" so totals stay summable.
    pub const fn numeric(name: &'static str, strategies: &'static [Strategy]) -> Self {
        Self {
            name,
            strategies,
            fallback: "0",
        }
    }
}

/// Run the descriptor's strategies in order; never fails.
pub fn extract(html: &str, descriptor: &FieldDescriptor) -> String {
    for strategy in descriptor.strategies {
        let value = match *strategy {
            Strategy::LabeledCell { label } => labeled_cell(html, label),
            Strategy::InputValue { name } => input_value(html, name),
            Strategy::SelectedOption { name } => selected_option_text(html, name),
            Strategy::CheckedValue { name } => checked_value(html, name),
            Strategy::ScriptArray { var, row, column } => {
                script_array_cell(html, var, row, column)
            }
        };
        match value {
            Some(v) if !v.is_empty() => return v,
            _ => continue,
        }
    }
    descriptor.fallback.to_string()
}

/// Locate a `<td>`/`<th>` whose text contains `label`, return the next cell.
pub fn labeled_cell(html: &str, label: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<t[dh][^>]*>\s*(?:<[^>]+>\s*)*{}[^<]*(?:</[^>]+>\s*)*</t[dh]>\s*<t[dh][^>]*>(.*?)</t[dh]>"#,
        regex::escape(label)
    );
    let caps = Regex::new(&pattern).ok()?.captures(html)?;
    let text = clean_text(caps.get(1)?.as_str());
    (!text.is_empty()).then_some(text)
}

/// `value` attribute of an input, tolerant of attribute order.
pub fn input_value(html: &str, name: &str) -> Option<String> {
    // Try: <input ... name="xxx" ... value="yyy" ...>
    let pattern1 = format!(
        r#"(?i)<input[^>]*name=["']{}["'][^>]*value=["']([^"']*)["']"#,
        regex::escape(name)
    );
    if let Some(caps) = Regex::new(&pattern1).ok()?.captures(html) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    // Try reverse: <input ... value="yyy" ... name="xxx" ...>
    let pattern2 = format!(
        r#"(?i)<input[^>]*value=["']([^"']*)["'][^>]*name=["']{}["']"#,
        regex::escape(name)
    );
    Regex::new(&pattern2)
        .ok()?
        .captures(html)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

fn select_block<'a>(html: &'a str, name: &str) -> Option<&'a str> {
    let pattern = format!(
        r#"(?is)<select[^>]*name=["']{}["'][^>]*>(.*?)</select>"#,
        regex::escape(name)
    );
    let caps = Regex::new(&pattern).ok()?.captures(html)?;
    caps.get(1).map(|m| m.as_str())
}

/// Display text of the selected option of a `<select>`.
pub fn selected_option_text(html: &str, name: &str) -> Option<String> {
    let block = select_block(html, name)?;
    let caps = Regex::new(r#"(?is)<option[^>]*\bselected\b[^>]*>(.*?)(?:</option>|<option|$)"#)
        .ok()?
        .captures(block)?;
    let text = clean_text(caps.get(1)?.as_str());
    (!text.is_empty()).then_some(text)
}

/// `value` attribute of the selected option (what a form resubmission needs).
pub fn selected_option_value(html: &str, name: &str) -> Option<String> {
    let block = select_block(html, name)?;
    let re = Regex::new(r#"(?is)<option[^>]*value=["']([^"']*)["'][^>]*\bselected\b"#).ok()?;
    if let Some(caps) = re.captures(block) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    // selected attribute may precede value=
    Regex::new(r#"(?is)<option[^>]*\bselected\b[^>]*value=["']([^"']*)["']"#)
        .ok()?
        .captures(block)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

/// `value` of the checked radio/checkbox sharing `name`; a value-less checked
/// checkbox reads as "1", an unchecked one as "0".
pub fn checked_value(html: &str, name: &str) -> Option<String> {
    let tag_re = Regex::new(r"(?is)<input[^>]*>").ok()?;
    let name_re = Regex::new(&format!(
        r#"(?i)name=["']{}["']"#,
        regex::escape(name)
    ))
    .ok()?;
    let value_re = Regex::new(r#"(?i)value=["']([^"']*)["']"#).ok()?;
    let checked_re = Regex::new(r"(?i)\bchecked\b").ok()?;

    let mut saw_any = false;
    for tag in tag_re.find_iter(html) {
        let tag = tag.as_str();
        if !name_re.is_match(tag) {
            continue;
        }
        saw_any = true;
        if checked_re.is_match(tag) {
            return Some(
                value_re
                    .captures(tag)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| "1".to_string()),
            );
        }
    }
    saw_any.then(|| "0".to_string())
}

/// Parse `var <name> = [ ["a","b"], ["c","d"] ];` into rows of strings.
/// Also accepts the `new Array(new Array(...), ...)` spelling some firmware
/// revisions emit.
pub fn script_array(html: &str, var: &str) -> Vec<Vec<String>> {
    let pattern = format!(
        r#"(?is)var\s+{}\s*=\s*(?:\[|new\s+Array\s*\()(.*?)(?:\]\s*;|\)\s*;)"#,
        regex::escape(var)
    );
    let body = match Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(html))
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
    {
        Some(body) => body,
        None => return Vec::new(),
    };

    let row_re = match Regex::new(r"(?s)\[(.*?)\]|new\s+Array\s*\((.*?)\)") {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    let cell_re = match Regex::new(r#""([^"]*)"|'([^']*)'"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    row_re
        .captures_iter(&body)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|row| {
            cell_re
                .captures_iter(row.as_str())
                .filter_map(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn script_array_cell(html: &str, var: &str, row: RowSelector, column: usize) -> Option<String> {
    let rows = script_array(html, var);
    let picked = match row {
        RowSelector::First => rows.first(),
        RowSelector::CellEquals { column, value } => rows
            .iter()
            .find(|r| r.get(column).map(String::as_str) == Some(value)),
    }?;
    picked.get(column).cloned()
}

/// Strip tags, decode common entities, collapse whitespace.
pub fn clean_text(raw: &str) -> String {
    let no_tags = Regex::new(r"(?s)<[^>]*>")
        .map(|re| re.replace_all(raw, " ").into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let decoded = no_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Numeric parse that tolerates thousands separators and trailing units
/// ("12,345", "6,016 kbps"); failures become zero so totals stay summable.
pub fn parse_number(raw: &str) -> u64 {
    let cleaned = raw.trim().replace(',', "");
    let digits: String = cleaned.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Signed variant for dB figures (SNR margin, attenuation). Fractional parts
/// are truncated; the consoles only ever show one decimal of noise.
pub fn parse_signed(raw: &str) -> i64 {
    let cleaned = raw.trim().replace(',', "");
    let mut digits = String::new();
    for (i, c) in cleaned.chars().enumerate() {
        if c == '-' && i == 0 {
            digits.push(c);
        } else if c.is_ascii_digit() {
            digits.push(c);
        } else {
            break;
        }
    }
    digits.parse().unwrap_or(0)
}
