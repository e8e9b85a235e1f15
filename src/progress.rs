use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{
    HumanBytes, HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle,
};
use url::Url;

pub struct Progress {
    enabled: bool,
    start: Instant,

    // UI
    mp: Option<MultiProgress>,
    stage: ProgressBar,
    sections: ProgressBar,
    http: ProgressBar,

    // Counters
    sections_done: AtomicU64,

    http_in_flight: AtomicU64,
    http_done: AtomicU64,
    http_failed: AtomicU64,
    http_bytes: AtomicU64,

    last_http_label: Mutex<String>,
}

impl Progress {
    pub fn new(enabled: bool) -> Arc<Self> {
        let start = Instant::now();

        if !enabled {
            return Arc::new(Self::with_bars(
                false,
                start,
                None,
                ProgressBar::hidden(),
                ProgressBar::hidden(),
                ProgressBar::hidden(),
            ));
        }

        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

        let stage = mp.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]") {
            stage.set_style(style);
        }
        stage.enable_steady_tick(Duration::from_millis(80));
        stage.set_message("Preparando");

        let sections = mp.add(ProgressBar::new(0));
        if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
            sections.set_style(style.progress_chars("##-"));
        }
        sections.set_message("secciones");

        let http = mp.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            http.set_style(style);
        }
        http.enable_steady_tick(Duration::from_millis(120));

        Arc::new(Self::with_bars(true, start, Some(mp), stage, sections, http))
    }

    fn with_bars(
        enabled: bool,
        start: Instant,
        mp: Option<MultiProgress>,
        stage: ProgressBar,
        sections: ProgressBar,
        http: ProgressBar,
    ) -> Self {
        Self {
            enabled,
            start,
            mp,
            stage,
            sections,
            http,
            sections_done: AtomicU64::new(0),
            http_in_flight: AtomicU64::new(0),
            http_done: AtomicU64::new(0),
            http_failed: AtomicU64::new(0),
            http_bytes: AtomicU64::new(0),
            last_http_label: Mutex::new(String::new()),
        }
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn add_section(&self, label: &str) {
        if self.enabled {
            self.sections.inc_length(1);
            self.sections.set_message(format!("cargando {label}"));
        }
    }

    pub fn section_done(&self, label: &str, ok: bool) {
        self.sections_done.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.sections.inc(1);
            let status = if ok { "lista" } else { "con error" };
            self.sections.set_message(format!("{label} {status}"));
        }
    }

    pub fn sections_done(&self) -> u64 {
        self.sections_done.load(Ordering::Relaxed)
    }

    pub fn http_start(&self, url: &Url) {
        self.http_in_flight.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.set_last_label(format!("GET {url}"));
            self.refresh_http();
        }
    }

    pub fn http_ok(&self, url: &Url, bytes: usize) {
        self.http_in_flight.fetch_sub(1, Ordering::Relaxed);
        self.http_done.fetch_add(1, Ordering::Relaxed);
        self.http_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        if self.enabled {
            self.set_last_label(format!("GET {url} ok {bytes}B"));
            self.refresh_http();
        }
    }

    pub fn http_err(&self, url: &Url) {
        self.http_in_flight.fetch_sub(1, Ordering::Relaxed);
        self.http_failed.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.set_last_label(format!("GET {url} failed"));
            self.refresh_http();
        }
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.refresh_http();
        self.stage.finish_with_message("Listo");
        self.sections.finish_and_clear();
        self.http.finish_and_clear();
        if let Some(mp) = &self.mp {
            let _ = mp.println(format!("Done in {}", HumanDuration(self.start.elapsed())));
        }
    }

    fn set_last_label(&self, label: String) {
        if let Ok(mut last) = self.last_http_label.lock() {
            *last = label;
        }
    }

    fn refresh_http(&self) {
        let in_flight = self.http_in_flight.load(Ordering::Relaxed);
        let done = self.http_done.load(Ordering::Relaxed);
        let failed = self.http_failed.load(Ordering::Relaxed);
        let bytes = self.http_bytes.load(Ordering::Relaxed);
        let last = self
            .last_http_label
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        self.http.set_message(format!(
            "HTTP: done {done} | failed {failed} | in-flight {in_flight} | {bytes} | {last}",
            bytes = HumanBytes(bytes),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_progress_still_counts_sections() {
        let progress = Progress::new(false);
        progress.add_section("regiones");
        progress.add_section("departamentos");
        progress.section_done("regiones", true);
        progress.section_done("departamentos", false);
        assert_eq!(progress.sections_done(), 2);
        progress.finish();
    }
}
