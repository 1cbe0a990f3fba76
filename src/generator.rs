use serde::Serialize;

/// Finite, deterministic sequence of positive sample values driving the
/// scalar telemetry readings.
///
/// For `x = 0..limit` with `y = 1, 3, 5, ...` each term is `x + y*x`, with a
/// raw zero coerced to `1` so downstream reciprocals stay defined. The
/// sequence is consumed in order and is not restartable.
#[derive(Debug, Clone)]
pub struct ScalarSequence {
    x: u64,
    y: u64,
    limit: u64,
}

impl ScalarSequence {
    /// Sequence producing exactly `limit` values.
    pub fn new(limit: u64) -> Self {
        Self { x: 0, y: 1, limit }
    }
}

impl Iterator for ScalarSequence {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.x >= self.limit {
            return None;
        }

        let raw = self.x + self.y * self.x;
        let value = if raw == 0 { 1 } else { raw };

        self.x += 1;
        self.y += 2;

        Some(value as f64)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.limit - self.x) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScalarSequence {}

/// One synthetic temperature/humidity/pressure reading derived from a
/// sample value. The formulas are a toy nonlinear decay curve with no
/// physical meaning; they are fixed for output compatibility.
#[derive(Debug, Clone, Serialize)]
pub struct Reading {
    /// Rendered with one decimal place
    pub temperature: String,
    /// Relative humidity, percent
    pub humidity: i64,
    /// Atmospheric pressure, hPa
    pub pressure: i64,
}

impl Reading {
    /// Derive a reading from one sample value. The value must be nonzero;
    /// the sequence guarantees this.
    pub fn from_value(value: f64) -> Self {
        Self {
            temperature: format!("{:.1}", 15.0 + 10.0 / value),
            humidity: (55.0 + value / 20.0).floor() as i64,
            pressure: (1040.0 - 0.3 * value).floor() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_deterministic() {
        let values: Vec<f64> = ScalarSequence::new(5).collect();
        assert_eq!(values, vec![1.0, 4.0, 12.0, 24.0, 40.0]);
    }

    #[test]
    fn sequence_is_finite() {
        assert_eq!(ScalarSequence::new(10).count(), 10);
        assert_eq!(ScalarSequence::new(0).count(), 0);
    }

    #[test]
    fn zero_term_is_coerced_to_one() {
        let first = ScalarSequence::new(1).next().unwrap();
        assert_eq!(first, 1.0);
    }

    #[test]
    fn reading_formulas_match_reference_values() {
        let reading = Reading::from_value(1.0);
        assert_eq!(reading.temperature, "25.0");

        let reading = Reading::from_value(7.0);
        assert_eq!(reading.humidity, 55);

        let reading = Reading::from_value(13.0);
        assert_eq!(reading.pressure, 1036);
    }

    #[test]
    fn readings_decay_toward_baseline() {
        let temps: Vec<f64> = ScalarSequence::new(10)
            .map(|v| 15.0 + 10.0 / v)
            .collect();
        for pair in temps.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }
}
