/// Forwards progress to a caller callback, keeping it within `[0, 1]` and non-decreasing.
pub struct ProgressTracker<'a> {
    sink: &'a mut dyn FnMut(f64),
    last: Option<f64>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a mut dyn FnMut(f64)) -> Self {
        Self { sink, last: None }
    }

    /// Report overall progress. Values below the last report are raised to it, and repeats
    /// are not forwarded.
    pub fn report(&mut self, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let value = self.last.map_or(value, |last| value.max(last));
        if self.last == Some(value) {
            return;
        }
        self.last = Some(value);
        (self.sink)(value);
    }

    /// Report `fraction` of a stage that spans `[start, end]` of the whole run.
    pub fn stage(&mut self, start: f64, end: f64, fraction: f64) {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.report(start + (end - start) * fraction);
    }

    /// Make sure the last value the caller saw is exactly `1.0`.
    pub fn finish(&mut self) {
        self.report(1.0);
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/progress.rs"]
mod tests;
