/// Cut `s` to at most `width` characters, marking the cut with `…`.
pub fn truncate_ellipsis(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width == 1 {
        return "…".to_string();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Kilometres with two decimals, e.g. `12.34 km`.
pub fn fmt_km(km: f64) -> String {
    format!("{km:.2} km")
}

/// Whole currency units with thousands separators, e.g. `MK12,345`.
pub fn fmt_money(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if whole < 0 { "-" } else { "" };
    format!("MK{sign}{grouped}")
}
