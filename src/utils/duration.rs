use chrono::{NaiveTime, TimeDelta, Timelike};

/// 解析使用者輸入的時間長度字串（"HH:mm:ss" 或 "HH:mm"）。
///
/// 此函式永不回傳錯誤：無法解讀的輸入一律視為「未提供」（`None`）。
/// 超出慣例範圍的分量（例如 `"25:99"`）不做邊界檢查，直接以帶號
/// 時間長度運算合併為 26 小時 39 分。
pub fn parse_flexible_duration(input: Option<&str>) -> Option<TimeDelta> {
    let text = input?.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(delta) = parse_clock_time(text) {
        return Some(delta);
    }

    parse_components(text)
}

/// 標準時刻解析：僅接受 0-23 時、0-59 分/秒的字串。
fn parse_clock_time(text: &str) -> Option<TimeDelta> {
    let time = NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()?;

    combine(
        i64::from(time.hour()),
        i64::from(time.minute()),
        i64::from(time.second()),
    )
}

/// 寬鬆解析：以 ':' 切割後將各分量當作帶號整數合併。
fn parse_components(text: &str) -> Option<TimeDelta> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() < 2 {
        return None;
    }

    let hours: i64 = parts[0].trim().parse().ok()?;
    let minutes: i64 = parts[1].trim().parse().ok()?;
    // 第三段解析失敗時視為 0 秒，而不是整體視為未提供
    let seconds: i64 = parts
        .get(2)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);

    combine(hours, minutes, seconds)
}

fn combine(hours: i64, minutes: i64, seconds: i64) -> Option<TimeDelta> {
    let total = TimeDelta::try_hours(hours)?
        .checked_add(&TimeDelta::try_minutes(minutes)?)?
        .checked_add(&TimeDelta::try_seconds(seconds)?)?;
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(value: i64) -> TimeDelta {
        TimeDelta::minutes(value)
    }

    #[test]
    fn test_parses_full_clock_format() {
        assert_eq!(
            parse_flexible_duration(Some("00:05:00")),
            Some(minutes(5))
        );
        assert_eq!(
            parse_flexible_duration(Some("01:30:15")),
            Some(TimeDelta::hours(1) + minutes(30) + TimeDelta::seconds(15))
        );
    }

    #[test]
    fn test_parses_hours_minutes_format() {
        assert_eq!(parse_flexible_duration(Some("00:05")), Some(minutes(5)));
        assert_eq!(
            parse_flexible_duration(Some("02:00")),
            Some(TimeDelta::hours(2))
        );
    }

    #[test]
    fn test_absent_input_is_absent() {
        assert_eq!(parse_flexible_duration(None), None);
        assert_eq!(parse_flexible_duration(Some("")), None);
        assert_eq!(parse_flexible_duration(Some("   ")), None);
    }

    #[test]
    fn test_out_of_range_components_combine_arithmetically() {
        assert_eq!(
            parse_flexible_duration(Some("25:99")),
            Some(TimeDelta::hours(26) + minutes(39))
        );
        assert_eq!(
            parse_flexible_duration(Some("00:90")),
            Some(TimeDelta::hours(1) + minutes(30))
        );
        assert_eq!(
            parse_flexible_duration(Some("24:00")),
            Some(TimeDelta::hours(24))
        );
    }

    #[test]
    fn test_negative_components_are_signed() {
        assert_eq!(parse_flexible_duration(Some("-1:30")), Some(minutes(-30)));
        assert_eq!(
            parse_flexible_duration(Some("0:-10")),
            Some(minutes(-10))
        );
    }

    #[test]
    fn test_unusable_input_is_absent() {
        assert_eq!(parse_flexible_duration(Some("abc")), None);
        assert_eq!(parse_flexible_duration(Some("abc:def")), None);
        assert_eq!(parse_flexible_duration(Some("5")), None);
        assert_eq!(parse_flexible_duration(Some("10:")), None);
    }

    #[test]
    fn test_unparseable_seconds_segment_contributes_zero() {
        assert_eq!(
            parse_flexible_duration(Some("10:30:xx")),
            Some(TimeDelta::hours(10) + minutes(30))
        );
    }

    #[test]
    fn test_whitespace_around_components_is_trimmed() {
        assert_eq!(
            parse_flexible_duration(Some(" 10 : 30 ")),
            Some(TimeDelta::hours(10) + minutes(30))
        );
    }

    #[test]
    fn test_overflowing_components_are_absent() {
        let huge = format!("{}:00", i64::MAX);
        assert_eq!(parse_flexible_duration(Some(&huge)), None);
        assert_eq!(
            parse_flexible_duration(Some("9223372036854775807:9223372036854775807")),
            None
        );
    }
}
