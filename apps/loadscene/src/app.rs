//! Application state and poll scheduler.
//!
//! Two periodic tasks share one loop: a presence check against the process
//! probe every five seconds, and the locate/tail/classify/switch pipeline on
//! the configured interval. Both run on the same task, so they never overlap
//! each other or a reconfiguration.

use std::path::PathBuf;
use std::time::Duration;

use loadscene_log_watch::{LogWatcher, TransitionEvent};
use loadscene_presence::ProcessProbe;
use loadscene_scenes::{SceneActuator, SceneSwitcher, SwitchOutcome};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// Period of the companion app presence check.
pub const PRESENCE_INTERVAL: Duration = Duration::from_secs(5);

/// Owns every piece of runtime state; created once per run.
pub struct App<A, P> {
    config: Config,
    watcher: LogWatcher,
    switcher: SceneSwitcher<A>,
    probe: P,
}

impl<A: SceneActuator, P: ProcessProbe> App<A, P> {
    pub fn new(config: Config, actuator: A, probe: P) -> Self {
        Self {
            watcher: LogWatcher::new(&config.log_folder),
            switcher: SceneSwitcher::new(actuator, config.switcher_settings()),
            probe,
            config,
        }
    }

    /// Probes presence once and logs the host's scene inventory.
    pub async fn start(&mut self) {
        tracing::info!(
            log_folder = %self.watcher.log_dir().display(),
            interval_ms = self.config.update_interval().as_millis() as u64,
            enabled = self.config.enabled,
            "scene switcher starting"
        );
        self.check_presence();
        self.check_scenes().await;
    }

    /// Applies a new configuration. Takes effect on the next poll; a changed
    /// OBS endpoint closes the current session.
    ///
    /// Returns true when the tail interval changed and the timer must be
    /// rescheduled.
    pub async fn reconfigure(&mut self, config: Config) -> bool {
        if config == self.config {
            tracing::debug!("configuration unchanged");
            return false;
        }

        let interval_changed = config.update_interval() != self.config.update_interval();
        let scenes_changed = config.scene != self.config.scene
            || config.default_scene != self.config.default_scene;
        let endpoint_changed = config.obs != self.config.obs;

        if config.process_name != self.config.process_name {
            self.probe.set_process_name(&config.process_name);
        }
        if endpoint_changed {
            self.switcher
                .actuator_mut()
                .set_endpoint(&config.obs.url, config.obs.password.as_deref())
                .await;
        }

        self.switcher.apply(config.switcher_settings());
        self.watcher.set_log_dir(PathBuf::from(&config.log_folder));
        self.config = config;

        if scenes_changed || endpoint_changed {
            self.check_scenes().await;
        }
        if interval_changed {
            tracing::info!(
                interval_ms = self.config.update_interval().as_millis() as u64,
                "update interval changed"
            );
        }
        interval_changed
    }

    /// Presence task body.
    pub fn check_presence(&mut self) {
        let running = self.probe.is_companion_running();
        self.watcher.set_companion_running(running);
    }

    /// Tail task body: one locate/tail/classify/switch cycle.
    ///
    /// Failures are logged here so the next poll still runs.
    pub async fn tail_once(&mut self) -> Option<(TransitionEvent, SwitchOutcome)> {
        let event = match self.watcher.poll() {
            Ok(event) => event?,
            Err(e) => {
                tracing::warn!(
                    file = ?self.watcher.state().tracked_file,
                    error = %e,
                    "failed to read log file"
                );
                return None;
            }
        };

        tracing::info!(%event, "world transition detected");
        let outcome = match event {
            TransitionEvent::EnteredLoading => self.switcher.on_entered_loading().await,
            TransitionEvent::FinishedLoading => self.switcher.on_finished_loading().await,
        };
        tracing::debug!(?outcome, "transition handled");

        Some((event, outcome))
    }

    /// Runs both periodic tasks until `cancel` fires.
    pub async fn run(
        &mut self,
        cancel: CancellationToken,
        mut reload_rx: mpsc::UnboundedReceiver<Config>,
    ) {
        let mut presence = timer(PRESENCE_INTERVAL);
        let mut tail = timer(self.config.update_interval());

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(config) = reload_rx.recv() => {
                    if self.reconfigure(config).await {
                        // Replacing the timer drops the pending tick.
                        tail = timer(self.config.update_interval());
                    }
                }
                _ = presence.tick() => self.check_presence(),
                _ = tail.tick() => {
                    self.tail_once().await;
                }
            }
        }
    }

    /// Ends the run and closes the host session. The watcher state is
    /// discarded.
    pub async fn stop(mut self) {
        self.switcher.actuator_mut().close().await;
        tracing::info!(
            file = ?self.watcher.state().tracked_file,
            "scene switcher stopped"
        );
    }

    async fn check_scenes(&mut self) {
        if let Err(e) = self.switcher.check_configured_scenes().await {
            tracing::warn!(error = %e, "could not list host scenes");
        }
    }
}

/// Interval whose first tick is one full period away.
fn timer(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
