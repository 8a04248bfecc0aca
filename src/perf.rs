#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Logs the wall time between construction and drop at debug level.
pub struct Scope<'a> {
    label: &'a str,
    start: f64,
}

impl<'a> Scope<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            start: now_ms(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        now_ms() - self.start
    }
}

impl<'a> Drop for Scope<'a> {
    fn drop(&mut self) {
        log::debug!("[perf] {}: {:.3} ms", self.label, self.elapsed_ms());
    }
}
