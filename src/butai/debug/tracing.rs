use std::time::Duration;
use std::time::Instant;

pub fn timed<T>(tag: &str, body: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = body();
    log::trace!("run of {} {:?}", tag, start.elapsed());
    result
}

/// Averages how long a recurring block takes and logs it every few seconds.
pub struct Tracer {
    last_report: Instant,
    report_every: Duration,
    average: Option<Duration>,
    tag: String,
}

impl Tracer {
    pub fn new(tag: &str, report_every: Duration) -> Self {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        Self {
            last_report: Instant::now(),
            report_every,
            average: None,
            tag: tag.to_owned(),
        }
    }

    pub fn average(&self) -> Option<Duration> {
        self.average
    }

    pub fn run<T>(&mut self, body: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = body();
        let dur = start.elapsed();
        self.average = Some(match self.average {
            Some(avg) => (avg + dur) / 2,
            None => dur,
        });
        if self.last_report.elapsed() >= self.report_every {
            self.last_report = Instant::now();
            log::debug!("run of {} {:?}", self.tag, self.average.unwrap_or(dur));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracer_passes_results_through() {
        let mut tracer = Tracer::new("sum", Duration::from_secs(60));
        assert_eq!(tracer.run(|| 2 + 2), 4);
        assert!(tracer.average().is_some());
        assert_eq!(timed("mul", || 3 * 3), 9);
    }
}
