// Display formatting for market values

const COMPACT_UNITS: [(f64, &str); 5] = [
    (1e12, "T"),
    (1e9, "B"),
    (1e6, "M"),
    (1e3, "K"),
    (1.0, ""),
];

/// Dollar price. Values of at least one dollar get two decimals and thousands
/// separators, smaller values keep four significant digits.
pub fn price(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1.0 || abs == 0.0 {
        return format!("{sign}${}", with_separators(abs, 2));
    }
    // Rounding may carry into the next digit, e.g. 0.99999 or 0.0099999
    let rounded = round_to(abs, small_price_decimals(abs));
    if rounded >= 1.0 {
        return format!("{sign}${}", with_separators(rounded, 2));
    }
    let decimals = small_price_decimals(rounded);
    format!("{sign}${abs:.decimals$}")
}

// Decimals for four significant digits, capped at 12
fn small_price_decimals(value: f64) -> usize {
    let text = format!("{value:.12}");
    let zeros = text
        .trim_start_matches("0.")
        .chars()
        .take_while(|&c| c == '0')
        .count();
    (zeros + 4).min(12)
}

fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Signed percentage with two decimals.
pub fn percent(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    format!("{value:+.2}%")
}

/// Large dollar amounts abbreviated to T / B / M / K.
pub fn compact_usd(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    let mut idx = COMPACT_UNITS
        .iter()
        .position(|&(scale, _)| abs >= scale)
        .unwrap_or(COMPACT_UNITS.len() - 1);
    let mut scaled = round_to(abs / COMPACT_UNITS[idx].0, 2);
    // 999.999 rounds to 1000.00, which belongs to the next unit
    if scaled >= 1000.0 && idx > 0 {
        idx -= 1;
        scaled = round_to(abs / COMPACT_UNITS[idx].0, 2);
    }
    format!("{sign}${scaled:.2}{}", COMPACT_UNITS[idx].1)
}

fn with_separators(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, chr) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(chr);
    }
    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
