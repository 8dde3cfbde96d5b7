/// Group digits in threes: `1234567` -> `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Money rounded to whole units with thousands separators
pub fn format_amount(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(value.abs().round() as u64))
}

/// Revenue in millions, the unit the revenue charts use
pub fn format_millions(value: f64) -> String {
    format!("{:.2}M", value / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(16008872), "16,008,872");
    }

    #[test]
    fn test_format_amount_rounds() {
        assert_eq!(format_amount(1234.56), "1,235");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn test_format_millions() {
        assert_eq!(format_millions(1_500_000.0), "1.50M");
    }
}
