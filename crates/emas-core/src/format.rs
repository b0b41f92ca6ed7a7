//! Display-string formatting.
//!
//! Pure functions producing the pre-rendered fields of the wire format.
//! Everything here is deterministic and free of shared state; the store
//! calls into this module while holding its write lock, so nothing may
//! block.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::types::Trend;

/// Indonesian weekday names, Monday first.
const WEEKDAYS: [&str; 7] = [
    "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu",
];

/// Profit projection tiers: (capital, principal) pairs in rupiah.
pub const PROFIT_TIERS: [(i64, i64); 4] = [
    (20_000_000, 19_314_000),
    (30_000_000, 28_980_000),
    (40_000_000, 38_652_000),
    (50_000_000, 48_325_000),
];

/// Group a rupiah amount with `.` thousands separators.
pub fn format_rupiah(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        out.push(c);
        let remaining = digits.len() - i - 1;
        if remaining > 0 && remaining % 3 == 0 {
            out.push('.');
        }
    }
    out
}

/// Render the signed delta line for a rate update.
pub fn diff_display(diff: i64, status: Trend) -> String {
    match status {
        Trend::Up => format!("🚀+{}", format_rupiah(diff)),
        Trend::Down => format!("🔻-{}", format_rupiah(-diff)),
        Trend::Flat => "➖tetap".to_string(),
    }
}

/// Render the buy/sell/delta summary line.
pub fn transaction_display(buy: &str, sell: &str, diff: &str) -> String {
    format!("Harga Beli: {buy} Jual: {sell} {diff}")
}

/// Render the weekday/time line for a rate update.
///
/// Falls back to the raw timestamp with the marker appended when the
/// provider timestamp does not parse as `%Y-%m-%d %H:%M:%S`.
pub fn waktu_display(created_at: &str, status: Trend) -> String {
    match NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S") {
        Ok(ts) => {
            let day = WEEKDAYS[ts.weekday().num_days_from_monday() as usize];
            format!(
                "{day} {:02}:{:02}:{:02} {status}",
                ts.hour(),
                ts.minute(),
                ts.second()
            )
        }
        Err(_) => format!("{created_at}{status}"),
    }
}

/// Render the profit projection for one purchase tier.
///
/// `capital` buys `capital / buy` grams; selling those grams back at the
/// current selling rate is compared against the tier principal. The gram
/// valuation is truncated to whole rupiah before the comparison.
pub fn profit_display(buy: i64, sell: i64, capital: i64, principal: i64) -> String {
    let gram = capital as f64 / buy as f64;
    let value = (gram * sell as f64) as i64 - principal;
    let gram_str = format!("{gram:.4}");
    if value > 0 {
        format!("+{}🟢➺{gram_str}gr", format_rupiah(value))
    } else if value < 0 {
        format!("-{}🔴➺{gram_str}gr", format_rupiah(-value))
    } else {
        format!("{}➖➺{gram_str}gr", format_rupiah(0))
    }
}

/// Render an elapsed-minutes duration.
pub fn format_duration(total_minutes: i64) -> String {
    if total_minutes <= 0 {
        return "0 menit".to_string();
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours == 0 {
        format!("{minutes} menit")
    } else if minutes == 0 {
        format!("{hours} jam")
    } else {
        format!("{hours} jam {minutes} menit")
    }
}

/// Escape annotation text for the dashboard: paired spaces become
/// non-breaking, single line breaks become `<br>`.
pub fn escape_info_text(text: &str) -> String {
    text.replace("  ", "&nbsp;&nbsp;").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah_grouping() {
        assert_eq!(format_rupiah(0), "0");
        assert_eq!(format_rupiah(999), "999");
        assert_eq!(format_rupiah(1000), "1.000");
        assert_eq!(format_rupiah(50000), "50.000");
        assert_eq!(format_rupiah(1_500_000), "1.500.000");
        assert_eq!(format_rupiah(1_048_325_000), "1.048.325.000");
    }

    #[test]
    fn test_diff_display() {
        assert_eq!(diff_display(50_000, Trend::Up), "🚀+50.000");
        assert_eq!(diff_display(-30_000, Trend::Down), "🔻-30.000");
        assert_eq!(diff_display(0, Trend::Flat), "➖tetap");
    }

    #[test]
    fn test_transaction_display() {
        assert_eq!(
            transaction_display("1.000.000", "970.000", "🚀+50.000"),
            "Harga Beli: 1.000.000 Jual: 970.000 🚀+50.000"
        );
    }

    #[test]
    fn test_waktu_display_weekday() {
        // 2024-05-06 is a Monday.
        assert_eq!(
            waktu_display("2024-05-06 09:05:07", Trend::Up),
            "Senin 09:05:07 🚀"
        );
        // 2024-05-12 is a Sunday.
        assert_eq!(
            waktu_display("2024-05-12 23:59:59", Trend::Flat),
            "Minggu 23:59:59 ➖"
        );
    }

    #[test]
    fn test_waktu_display_fallback() {
        assert_eq!(waktu_display("baru saja", Trend::Down), "baru saja🔻");
    }

    #[test]
    fn test_profit_display() {
        // 20jt at buy 1jt is exactly 20 grams.
        assert_eq!(
            profit_display(1_000_000, 970_000, 20_000_000, 19_314_000),
            "+86.000🟢➺20.0000gr"
        );
        assert_eq!(
            profit_display(1_000_000, 900_000, 20_000_000, 19_314_000),
            "-1.314.000🔴➺20.0000gr"
        );
        assert_eq!(
            profit_display(1_000_000, 965_700, 20_000_000, 19_314_000),
            "0➖➺20.0000gr"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(-5), "0 menit");
        assert_eq!(format_duration(0), "0 menit");
        assert_eq!(format_duration(45), "45 menit");
        assert_eq!(format_duration(120), "2 jam");
        assert_eq!(format_duration(135), "2 jam 15 menit");
    }

    #[test]
    fn test_escape_info_text() {
        assert_eq!(
            escape_info_text("buka  lagi\nbesok"),
            "buka&nbsp;&nbsp;lagi<br>besok"
        );
    }
}
