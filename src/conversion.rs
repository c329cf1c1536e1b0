//! Timestamp conversion helpers.
//!
//! FFmpeg reports unknown timestamps as `AV_NOPTS_VALUE`; everything here
//! turns that sentinel into `None` before doing arithmetic.

use ffmpeg_next::Rational;

/// FFmpeg's internal time base for container-level values (microseconds).
pub const MICROSECONDS_PER_SECOND: i64 = 1_000_000;

/// `None` for FFmpeg's "no timestamp" sentinel, `Some(value)` otherwise.
pub fn known_timestamp(value: i64) -> Option<i64> {
    (value != ffmpeg_sys_next::AV_NOPTS_VALUE).then_some(value)
}

/// Rescale a container duration in microseconds into `time_base` units.
///
/// Returns `None` for a degenerate time base.
pub fn microseconds_to_stream_timestamp(microseconds: i64, time_base: Rational) -> Option<i64> {
    let numerator = i128::from(time_base.numerator());
    let denominator = i128::from(time_base.denominator());
    if numerator <= 0 || denominator <= 0 {
        return None;
    }
    let scaled =
        i128::from(microseconds) * denominator / (numerator * i128::from(MICROSECONDS_PER_SECOND));
    i64::try_from(scaled).ok()
}

/// Rescale a timestamp from `time_base` units to seconds.
pub fn timestamp_to_seconds(timestamp: i64, time_base: Rational) -> f64 {
    if time_base.denominator() == 0 {
        return 0.0;
    }
    timestamp as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_unknown() {
        assert_eq!(known_timestamp(ffmpeg_sys_next::AV_NOPTS_VALUE), None);
        assert_eq!(known_timestamp(0), Some(0));
        assert_eq!(known_timestamp(-3), Some(-3));
    }

    #[test]
    fn microseconds_rescale_into_mpeg_ticks() {
        // Two seconds at 1/90000.
        assert_eq!(
            microseconds_to_stream_timestamp(2_000_000, Rational::new(1, 90_000)),
            Some(180_000)
        );
        // Two seconds at 1/1000 (Matroska).
        assert_eq!(
            microseconds_to_stream_timestamp(2_000_000, Rational::new(1, 1_000)),
            Some(2_000)
        );
    }

    #[test]
    fn degenerate_time_base_is_rejected() {
        assert_eq!(microseconds_to_stream_timestamp(1_000, Rational::new(0, 1)), None);
        assert_eq!(microseconds_to_stream_timestamp(1_000, Rational::new(1, 0)), None);
        assert_eq!(timestamp_to_seconds(10, Rational::new(1, 0)), 0.0);
    }

    #[test]
    fn timestamp_to_seconds_uses_time_base() {
        assert!((timestamp_to_seconds(45_000, Rational::new(1, 90_000)) - 0.5).abs() < 1e-9);
        assert!((timestamp_to_seconds(25, Rational::new(1, 25)) - 1.0).abs() < 1e-9);
    }
}
