//! Display and formatting helpers shared by the engine and the CLI

/// Insert thousands separators into a plain decimal string.
///
/// Accepts an optional leading `-` and an optional fractional part, which is
/// left untouched: `"-1234567.50"` becomes `"-1,234,567.50"`.
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(pos) => (&unsigned[..pos], &unsigned[pos..]),
        None => (unsigned, ""),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push(',');
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let grouped: String = grouped.chars().rev().collect();
    format!("{}{}{}", sign, grouped, frac_part)
}

/// Shorten a display name to at most `max_chars` characters, ending in `…`.
///
/// Works on characters rather than bytes so multi-byte names are never split.
/// The input is borrowed; callers keep the full name.
pub fn truncate_display(name: &str, max_chars: usize) -> String {
    let count = name.chars().count();
    if count <= max_chars {
        return name.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = name.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Neutralise spreadsheet formula injection in free-text export cells.
///
/// Text starting with `=`, `+`, `-`, `@`, tab or carriage return is prefixed
/// with a single quote. Numeric columns must not be passed through here.
pub fn sanitize_cell(content: &str) -> String {
    match content.chars().next() {
        Some('=') | Some('+') | Some('-') | Some('@') | Some('\t') | Some('\r') => {
            format!("'{}", content)
        }
        _ => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number("-1234567.50"), "-1,234,567.50");
        assert_eq!(format_number("3500.00"), "3,500.00");
        assert_eq!(format_number("-85.50"), "-85.50");
    }

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("Vacation", 10), "Vacation");
        assert_eq!(truncate_display("Emergency Fund", 10), "Emergency…");
        assert_eq!(truncate_display("Épargne été", 5), "Épar…");
        assert_eq!(truncate_display("abc", 0), "");
    }

    #[test]
    fn test_sanitize_cell() {
        assert_eq!(sanitize_cell("=SUM(A1:A2)"), "'=SUM(A1:A2)");
        assert_eq!(sanitize_cell("@home"), "'@home");
        assert_eq!(sanitize_cell("Groceries"), "Groceries");
        assert_eq!(sanitize_cell(""), "");
    }
}
