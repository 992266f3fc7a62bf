// indicatif is not used here because it cannot output progress to non-tty
use {
    std::time::Instant,
    tracing::info,
};

pub struct Progress {
    message: String,
    started_at: Instant,
    reported_at: Instant,
    total_processed: u64,
}

impl Progress {
    pub fn new(message: String) -> Self {
        Self {
            message,
            started_at: Instant::now(),
            reported_at: Instant::now(),
            total_processed: 0,
        }
    }

    pub fn update(&mut self, processed: u64) -> bool {
        self.total_processed += processed;

        let now = Instant::now();
        if (now - self.reported_at).as_millis() >= 10_000 {
            self.reported_at = now;
            self.report(now);
            true
        } else {
            false
        }
    }

    pub fn finish(&self) {
        self.report(Instant::now());
    }

    fn report(&self, now: Instant) {
        let elapsed = (now - self.started_at).as_secs_f32().max(f32::EPSILON);
        let rate = (self.total_processed as f32) / elapsed;
        info!("{}: {} total ({:.2}/second)", self.message, self.total_processed, rate);
    }
}
