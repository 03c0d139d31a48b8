//! Generation monitor
//!
//! The remote application shows a stop affordance (a "Stop generating"
//! button or a stop icon) while it produces a response. Watching that
//! affordance appear and disappear is the only completion signal there is.

use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cdp::{Page, Result};

/// Default check for a visible stop affordance
pub const DEFAULT_PROBE_SCRIPT: &str = r#"(function() {
    const buttons = Array.from(document.querySelectorAll('button, div[role="button"]'));
    const stop = buttons.find(b => {
        const text = (b.innerText || b.title || "").toLowerCase();
        return text.includes('stop generating') || text === 'stop';
    });
    if (stop && stop.offsetParent !== null) return true;
    const icon = document.querySelector('.codicon-debug-stop, .codicon-stop-circle');
    return !!(icon && icon.offsetParent !== null);
})()"#;

pub trait GenerationProbe {
    fn stop_affordance_visible(&self) -> Result<bool>;
}

/// Evaluates a boolean script on a page; anything but `true` is "not visible"
pub struct ScriptProbe<'a> {
    page: &'a Page,
    script: &'a str,
}

impl<'a> ScriptProbe<'a> {
    pub fn new(page: &'a Page, script: &'a str) -> Self {
        Self { page, script }
    }
}

impl GenerationProbe for ScriptProbe<'_> {
    fn stop_affordance_visible(&self) -> Result<bool> {
        Ok(self.page.evaluate(self.script)?.as_bool().unwrap_or(false))
    }
}

impl GenerationProbe for Page {
    fn stop_affordance_visible(&self) -> Result<bool> {
        ScriptProbe::new(self, DEFAULT_PROBE_SCRIPT).stop_affordance_visible()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    Unknown,
    Generating,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    /// Generation was observed and then ended
    Completed,
    /// Nothing was observed within the grace period
    Idle,
    TimedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    /// How long to wait for generation to show up at all
    pub grace: Duration,
    pub timeout: Duration,
    pub probe_script: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            grace: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
            probe_script: DEFAULT_PROBE_SCRIPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationMonitor {
    config: MonitorConfig,
}

impl GenerationMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Single poll
    pub fn status(&self, probe: &dyn GenerationProbe) -> GenerationState {
        match probe.stop_affordance_visible() {
            Ok(true) => GenerationState::Generating,
            Ok(false) => GenerationState::Idle,
            Err(e) => {
                tracing::warn!(error = %e, "Generation probe failed");
                GenerationState::Unknown
            }
        }
    }

    /// Block until generation completes, never starts, or the timeout hits.
    ///
    /// Probe errors count as "not visible".
    pub fn wait(&self, probe: &dyn GenerationProbe) -> WaitOutcome {
        let started = Instant::now();
        let mut seen = false;

        while started.elapsed() < self.config.timeout {
            let visible = match probe.stop_affordance_visible() {
                Ok(visible) => visible,
                Err(e) => {
                    tracing::warn!(error = %e, "Generation probe failed");
                    false
                }
            };

            if visible {
                if !seen {
                    tracing::debug!(elapsed = ?started.elapsed(), "Generation started");
                }
                seen = true;
            } else if seen {
                tracing::info!(elapsed = ?started.elapsed(), "Generation completed");
                return WaitOutcome::Completed;
            } else if started.elapsed() > self.config.grace {
                tracing::info!(grace = ?self.config.grace, "No generation observed");
                return WaitOutcome::Idle;
            }

            let remaining = self.config.timeout.saturating_sub(started.elapsed());
            thread::sleep(self.config.poll_interval.min(remaining));
        }

        tracing::warn!(timeout = ?self.config.timeout, "Generation wait timed out");
        WaitOutcome::TimedOut
    }

    /// `status` with the configured probe script
    pub fn page_status(&self, page: &Page) -> GenerationState {
        self.status(&ScriptProbe::new(page, &self.config.probe_script))
    }

    /// `wait` with the configured probe script
    pub fn wait_for_page(&self, page: &Page) -> WaitOutcome {
        self.wait(&ScriptProbe::new(page, &self.config.probe_script))
    }
}
