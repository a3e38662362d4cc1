// ==========================================
// 产线驾驶舱 - 班次时间窗解析
// ==========================================
// 职责: 将班次的 "HH:mm[:ss]" 起止时刻 + 参考日期换算为具体时间
// 红线: 跨午夜判定只有一条规则: 开始秒数 > 结束秒数
// 红线: 不读取系统时钟，参考日期/时刻一律由调用方传入
// ==========================================

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use tracing::warn;

use crate::domain::{ShiftDateRange, ShiftWindow};
use crate::engine::error::{EngineError, EngineResult};

/// 工厂默认时区偏移（分钟）: America/Mexico_City，UTC-6，无夏令时
pub const DEFAULT_PLANT_UTC_OFFSET_MINUTES: i32 = -360;

/// 数据库中扫码时间戳的存储格式（UTC）
pub const SCAN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 由分钟偏移构造工厂时区；偏移越界时退回 UTC
pub fn plant_timezone(offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_minutes * 60).unwrap_or_else(|| {
        warn!(offset_minutes, "工厂时区偏移越界，退回 UTC");
        Utc.fix()
    })
}

/// 当前工厂本地时间
///
/// 仅供边界层（命令行/请求入口）确定参考时刻使用，引擎内部不调用
pub fn plant_now(tz: FixedOffset) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}

// ==========================================
// 时刻字符串解析
// ==========================================

/// 解析班次时刻字符串
///
/// 格式: `H|HH[:mm[:ss]]`，小时 0-23，分钟/秒 0-59（两位数字）
pub fn parse_time_of_day(input: &str) -> EngineResult<NaiveTime> {
    let malformed = || EngineError::MalformedTimeString {
        input: input.to_string(),
    };

    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() > 3 {
        return Err(malformed());
    }

    let hour = digits(parts[0], 1, 2, 23).ok_or_else(malformed)?;
    let minute = match parts.get(1) {
        Some(raw) => digits(raw, 2, 2, 59).ok_or_else(malformed)?,
        None => 0,
    };
    let second = match parts.get(2) {
        Some(raw) => digits(raw, 2, 2, 59).ok_or_else(malformed)?,
        None => 0,
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(malformed)
}

fn digits(raw: &str, min_len: usize, max_len: usize, max_value: u32) -> Option<u32> {
    if raw.len() < min_len || raw.len() > max_len || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|v| *v <= max_value)
}

/// 解析时刻，格式错误时按 00:00:00 处理
fn time_or_midnight(input: &str) -> NaiveTime {
    parse_time_of_day(input).unwrap_or_else(|e| {
        warn!(error = %e, "班次时刻无法解析，按 00:00:00 处理");
        NaiveTime::default()
    })
}

/// 班次时刻对应的小时
///
/// 将时刻与参考日期组合为工厂时区的具体时间后取小时；格式错误时返回 0。
/// 工厂时区为固定偏移，结果总是等于时刻本身的小时，与参考日期和偏移量无关。
pub fn resolve_shift_hour(input: &str, reference_date: NaiveDate, tz: FixedOffset) -> u32 {
    match parse_time_of_day(input) {
        Ok(time) => {
            let local = reference_date.and_time(time);
            tz.from_local_datetime(&local)
                .single()
                .map(|dt| dt.hour())
                .unwrap_or_else(|| time.hour())
        }
        Err(e) => {
            warn!(error = %e, "班次时刻无法解析，小时按 0 处理");
            0
        }
    }
}

/// 自午夜起的秒数；格式错误时返回 0
pub fn seconds_since_midnight(input: &str) -> u32 {
    time_or_midnight(input).num_seconds_from_midnight()
}

/// 班次是否跨越午夜
pub fn crosses_midnight(start: &str, end: &str) -> bool {
    seconds_since_midnight(start) > seconds_since_midnight(end)
}

// ==========================================
// 班次起止时间
// ==========================================

/// 班次开始时间: 班次开始日 + 开始时刻
pub fn resolve_shift_start_datetime(shift_start_date: NaiveDate, start: &str) -> NaiveDateTime {
    shift_start_date.and_time(time_or_midnight(start))
}

/// 班次结束时间
///
/// 跨午夜时结束时间落在 班次开始日 + 1 天，否则与开始同日
pub fn resolve_shift_end_datetime(
    shift_start_date: NaiveDate,
    start: &str,
    end: &str,
) -> NaiveDateTime {
    let end_date = if crosses_midnight(start, end) {
        shift_start_date + Duration::days(1)
    } else {
        shift_start_date
    };
    end_date.and_time(time_or_midnight(end))
}

/// 班次时间窗对应的具体起止时间
pub fn resolve_shift_date_range(window: &ShiftWindow) -> ShiftDateRange {
    ShiftDateRange {
        start: resolve_shift_start_datetime(window.reference_date, &window.start_time_of_day),
        end: resolve_shift_end_datetime(
            window.reference_date,
            &window.start_time_of_day,
            &window.end_time_of_day,
        ),
    }
}

/// 参考时刻所属班次实例的开始日
///
/// 跨午夜班次在午夜之后（结束时刻之前）观察时，班次开始于前一天
pub fn resolve_shift_start_date(start: &str, end: &str, reference_at: NaiveDateTime) -> NaiveDate {
    let date = reference_at.date();
    if crosses_midnight(start, end) && reference_at.time() < time_or_midnight(end) {
        date - Duration::days(1)
    } else {
        date
    }
}

/// 参考时刻所属的班次时间窗
pub fn shift_window_at(start: &str, end: &str, reference_at: NaiveDateTime) -> ShiftWindow {
    ShiftWindow::new(start, end, resolve_shift_start_date(start, end, reference_at))
}

/// 参考时刻是否处于班次进行中 `[start, end)`
pub fn is_in_progress(start: &str, end: &str, reference_at: NaiveDateTime) -> bool {
    let range = resolve_shift_date_range(&shift_window_at(start, end, reference_at));
    range.start <= reference_at && reference_at < range.end
}

/// 班次覆盖的小时标签（含首尾）
///
/// 不跨午夜: start..=end；跨午夜: start..=23 后接 0..=end
pub fn shift_hours(start_hour: u32, end_hour: u32) -> Vec<u32> {
    if start_hour <= end_hour {
        (start_hour..=end_hour).collect()
    } else {
        (start_hour..24).chain(0..=end_hour).collect()
    }
}

// ==========================================
// 扫码时间戳换算
// ==========================================

/// 扫码时间戳可接受的输入格式（与 SQLite datetime() 可识别的形式一致）
const SCAN_TIMESTAMP_INPUT_FORMATS: &[&str] = &[
    SCAN_TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// 解析数据库中的 UTC 时间戳
///
/// 支持空格或 `T` 分隔、省略秒、小数秒、`Z` 或 `±HH:MM` 时区后缀、仅日期
pub fn parse_scan_timestamp(raw_utc: &str) -> EngineResult<NaiveDateTime> {
    let trimmed = raw_utc.trim();
    let invalid = || EngineError::InvalidTimestamp {
        raw: raw_utc.to_string(),
    };
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let body = trimmed.strip_suffix(['Z', 'z']).unwrap_or(trimmed);
    for format in SCAN_TIMESTAMP_INPUT_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(body, format) {
            return Ok(naive);
        }
        let with_offset = format!("{}%:z", format);
        if let Ok(dt) = DateTime::parse_from_str(body, &with_offset) {
            return Ok(dt.naive_utc());
        }
    }

    NaiveDate::parse_from_str(body, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)
}

/// 将数据库中的 UTC 时间戳换算为工厂本地时间
pub fn to_plant_local(raw_utc: &str, tz: FixedOffset) -> EngineResult<NaiveDateTime> {
    let naive = parse_scan_timestamp(raw_utc)?;
    Ok(Utc.from_utc_datetime(&naive).with_timezone(&tz).naive_local())
}

/// 将工厂本地时间换算为数据库中的 UTC 时间戳字符串
pub fn to_utc_string(local: NaiveDateTime, tz: FixedOffset) -> String {
    let utc = local - Duration::seconds(i64::from(tz.local_minus_utc()));
    utc.format(SCAN_TIMESTAMP_FORMAT).to_string()
}
