/// Groups the integer part of `value` with commas: `1234567.8` -> `1,234,568`.
pub fn thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn usd(value: f64) -> String {
    format!("${}", thousands(value))
}

/// Compact currency used on chart axes and bar labels, e.g. `$150K`.
pub fn usd_thousands(value: f64) -> String {
    format!("${:.0}K", value / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(150000.4), "150,000");
        assert_eq!(thousands(1234567.8), "1,234,568");
        assert_eq!(thousands(-4200.0), "-4,200");
    }

    #[test]
    fn test_currency_formats() {
        assert_eq!(usd(150000.0), "$150,000");
        assert_eq!(usd_thousands(150000.0), "$150K");
        assert_eq!(usd_thousands(87499.0), "$87K");
    }
}
