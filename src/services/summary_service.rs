use crate::models::CoinSummary;
use crate::services::scale_service::round2;

/// Insert `,` between groups of three digits in the integer part of `number`
pub fn group_thousands(number: &str) -> String {
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Caption posted under the chart
pub fn format_caption(summary: &CoinSummary) -> String {
    let market_cap = group_thousands(&format!("{}", summary.market_cap.trunc() as i64));
    let volume = group_thousands(&format!("{}", round2(summary.volume_24h)));

    format!(
        "💰 Price: **${}**\n📊 Marketcap: **${}**\n📈 Volume: **${}**",
        summary.price, market_cap, volume
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("1234567.89"), "1,234,567.89");
        assert_eq!(group_thousands("-12345.5"), "-12,345.5");
    }

    #[test]
    fn test_format_caption() {
        let caption = format_caption(&CoinSummary {
            price: 0.00001234,
            market_cap: 12345678.9,
            volume_24h: 98765.4321,
        });

        assert!(caption.contains("Price: **$0.00001234**"));
        assert!(caption.contains("Marketcap: **$12,345,678**"));
        assert!(caption.contains("Volume: **$98,765.43**"));
        assert_eq!(caption.lines().count(), 3);
    }
}
