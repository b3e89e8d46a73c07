use anyhow::{Context, Result, bail};
use time::{OffsetDateTime, UtcOffset};

const NANOS_PER_MICRO: i128 = 1_000;

/// Parses a replay `timestampUsec` value (decimal microseconds since the
/// unix epoch) without going through floating point.
pub fn parse_timestamp_usec(raw: &str) -> Result<u64> {
    if raw.is_empty() {
        bail!("timestampUsec is empty");
    }
    if !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        bail!("timestampUsec must contain only ASCII digits: {raw:?}");
    }

    let micros = raw
        .parse::<u64>()
        .with_context(|| format!("timestampUsec does not fit in u64: {raw}"))?;
    to_datetime(micros)?;
    Ok(micros)
}

pub fn format_timestamp_usec(raw: &str) -> Result<String> {
    let micros = parse_timestamp_usec(raw)?;
    format_unix_us(micros)
}

pub fn format_unix_us(timestamp_unix_us: u64) -> Result<String> {
    let dt = to_datetime(timestamp_unix_us)?;
    Ok(format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}Z",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.microsecond()
    ))
}

fn to_datetime(timestamp_unix_us: u64) -> Result<OffsetDateTime> {
    let nanos = i128::from(timestamp_unix_us) * NANOS_PER_MICRO;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map(|dt| dt.to_offset(UtcOffset::UTC))
        .with_context(|| {
            format!("timestampUsec is outside the representable range: {timestamp_unix_us}")
        })
}
