use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::Workbench;
use crate::kernel::services::adapters::load_settings_from;
use crate::kernel::services::KernelMessage;
use crate::kernel::{Action, AuthStatus};

impl Workbench {
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// One pass of the host loop with an explicit clock.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let mut changed = false;
        changed |= self.poll_auth();
        changed |= self.poll_settings(now);
        changed |= self.poll_kernel_bus();
        changed |= self.dispatch(Action::Tick { now });
        changed
    }

    /// Blocks up to `timeout` for one message from background work and
    /// applies it. Returns `false` on timeout.
    pub fn wait_for_message(&mut self, timeout: Duration) -> bool {
        match self.kernel_services.recv_timeout(timeout) {
            Ok(KernelMessage::Action(action)) => {
                self.dispatch(action);
                true
            }
            Err(_) => false,
        }
    }

    pub fn poll_kernel_bus(&mut self) -> bool {
        let mut changed = false;
        let mut drained = 0usize;
        while drained < super::MAX_KERNEL_BUS_DRAIN_PER_TICK {
            match self.kernel_services.try_recv() {
                Ok(KernelMessage::Action(action)) => {
                    drained += 1;
                    changed |= self.dispatch(action);
                }
                Err(mpsc::TryRecvError::Empty) | Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    fn poll_auth(&mut self) -> bool {
        match self.auth_rx.has_changed() {
            Ok(true) => {}
            Ok(false) | Err(_) => return false,
        }
        let status = AuthStatus::from(&*self.auth_rx.borrow_and_update());
        self.dispatch(Action::ConnectionChanged(status))
    }

    fn poll_settings(&mut self, now: Instant) -> bool {
        let Some(path) = self.settings_path.as_ref() else {
            return false;
        };
        let due = self.last_settings_check.map_or(true, |last| {
            now.saturating_duration_since(last) >= super::SETTINGS_CHECK_INTERVAL
        });
        if !due {
            return false;
        }
        self.last_settings_check = Some(now);

        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        if modified.is_none() || modified == self.last_settings_modified {
            return false;
        }
        self.last_settings_modified = modified;

        match load_settings_from(path) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "settings reloaded");
                self.dispatch(Action::SettingsChanged(settings))
            }
            Err(e) => {
                tracing::warn!(error = %e, "settings reload failed");
                false
            }
        }
    }
}
