//! Small formatting helpers.

use num_format::{Locale, ToFormattedString};

/// "23,456.78" style: thousands separators, two decimals.
pub fn fmt_price(x: f64) -> String {
    let cents = (x * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!(
        "{}{}.{:02}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// Drawdown ratio as a percentage, e.g. -0.1234 -> "-12.34%".
pub fn fmt_pct(x: f64) -> String {
    format!("{:.2}%", x * 100.0)
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

/// Print first two chars, then mask the rest (for logs only).
pub fn mask_user(u: &str) -> String {
    let mut cs = u.chars();
    let a = cs.next().unwrap_or('*');
    let b = cs.next().unwrap_or('*');
    format!("{}{}****", a, b)
}
