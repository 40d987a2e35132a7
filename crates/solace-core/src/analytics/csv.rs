//! Minimal RFC 4180 style quoting for the analytics log.

/// Quotes a field when it holds a delimiter, quote or line break; inner quotes are doubled.
pub(crate) fn escape_field(s: &str) -> String {
    let needs_quote = s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r');
    if !needs_quote {
        return s.to_string();
    }
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub(crate) fn encode_record(fields: &[&str]) -> String {
    let mut line = fields.iter().map(|f| escape_field(f)).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

/// Splits `raw` into records. A record ends at a newline outside quotes; anything after
/// the last such newline is an unfinished append and is dropped.
pub(crate) fn parse_records(raw: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    records
}
