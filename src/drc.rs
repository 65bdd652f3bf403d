//! DRC coordinator: run sequencing, cancellation, progress reporting and the
//! observer interface exposed to the host (spec.md §4.6, §6.2).

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::board::Board;
use crate::board_drc::BoardDrcChecker;
use crate::cache::CopperPathsCache;
use crate::message::DrcMessage;
use crate::settings::DrcSettings;

/// A run's lifecycle. `Finished` carries the total message count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrcRunState {
    Idle,
    Running,
    Aborted,
    Finished(usize),
}

/// A cooperative cancellation flag, cloned cheaply and shared with whatever
/// drives the host's cancel button. Checked between passes, not mid-pass —
/// individual check procedures are not required to be interruptible.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The host-facing observer interface (spec.md §6.2). All methods are
/// required; a host with nothing to do for a given callback implements it
/// as a no-op.
pub trait DrcObserver {
    fn on_started(&mut self);
    fn on_progress(&mut self, percent: u8);
    fn on_status(&mut self, text: &str);
    fn on_message(&mut self, message: &DrcMessage);
    fn on_finished(&mut self, message_count: usize);
}

/// An observer that discards every callback, for headless or test runs.
#[derive(Debug, Default)]
pub struct NullObserver;

impl DrcObserver for NullObserver {
    fn on_started(&mut self) {}
    fn on_progress(&mut self, _percent: u8) {}
    fn on_status(&mut self, _text: &str) {}
    fn on_message(&mut self, _message: &DrcMessage) {}
    fn on_finished(&mut self, _message_count: usize) {}
}

/// Drives a single DRC run over a mutably-borrowed board. Owns the copper-
/// paths cache for the run's duration; the cache is cleared at the end of
/// `execute` regardless of how the run ends.
pub struct DrcCoordinator<'a, B: Board> {
    board: &'a mut B,
    settings: DrcSettings,
    cache: CopperPathsCache,
    state: DrcRunState,
}

impl<'a, B: Board> DrcCoordinator<'a, B> {
    pub fn new(board: &'a mut B, settings: DrcSettings) -> Self {
        Self { board, settings, cache: CopperPathsCache::new(), state: DrcRunState::Idle }
    }

    pub fn state(&self) -> DrcRunState {
        self.state
    }

    /// Runs the full (or, if `quick`, abbreviated) check sequence of
    /// spec.md §4.6, reporting to `observer` as each pass completes and
    /// honoring `cancel` between passes.
    #[tracing::instrument(skip(self, observer, cancel))]
    pub fn execute(
        &mut self,
        quick: bool,
        cancel: &CancellationToken,
        observer: &mut dyn DrcObserver,
    ) -> DrcRunState {
        self.state = DrcRunState::Running;
        let mut messages = Vec::new();

        observer.on_started();
        observer.on_progress(2);

        if self.check_cancelled(cancel, observer) {
            return self.finish_aborted();
        }

        if !quick {
            observer.on_status("rebuilding planes");
            tracing::debug!("rebuilding planes");
            self.board.rebuild_all_planes();
            observer.on_progress(12);
            if self.check_cancelled(cancel, observer) {
                return self.finish_aborted();
            }
        }

        if !self.run_pass("minimum copper width", 14, cancel, observer, &mut messages, |c| {
            c.check_minimum_copper_width()
        }) {
            return self.finish_aborted();
        }

        if !self.run_pass("copper/copper clearance", 34, cancel, observer, &mut messages, |c| {
            c.check_copper_copper_clearance()
        }) {
            return self.finish_aborted();
        }

        if !self.run_pass("copper/board clearance", 44, cancel, observer, &mut messages, |c| {
            c.check_copper_board_clearance()
        }) {
            return self.finish_aborted();
        }

        if !self.run_pass("copper/hole clearance", 54, cancel, observer, &mut messages, |c| {
            c.check_copper_hole_clearance()
        }) {
            return self.finish_aborted();
        }

        if !quick {
            if !self.run_pass("minimum annular ring", 64, cancel, observer, &mut messages, |c| {
                c.check_minimum_annular_ring()
            }) {
                return self.finish_aborted();
            }

            observer.on_status("drill, slot, pad and placement checks");
            tracing::debug!("running bundled rule checks");
            {
                let mut checker = BoardDrcChecker::new(&*self.board, &self.settings, &mut self.cache);
                messages.extend(checker.check_minimum_drill_and_slot_dimensions());
                messages.extend(checker.check_allowed_slot_policies());
                messages.extend(checker.check_invalid_pad_connections());
                messages.extend(checker.check_courtyard_clearance());
                messages.extend(checker.check_unplaced_components());
            }
            self.board.force_air_wires_rebuild();
            {
                let mut checker = BoardDrcChecker::new(&*self.board, &self.settings, &mut self.cache);
                messages.extend(checker.check_missing_connections());
                messages.extend(checker.check_stale_objects());
            }
            observer.on_progress(97);
            if self.check_cancelled(cancel, observer) {
                return self.finish_aborted();
            }
        }

        // spec.md §3: a run never emits two messages sharing the same
        // identity key, even if separate passes independently derived them.
        let mut seen = HashSet::new();
        messages.retain(|m| seen.insert(m.dedup_key()));

        for message in &messages {
            observer.on_message(message);
        }

        observer.on_progress(100);
        self.cache.clear();
        let count = messages.len();
        self.state = DrcRunState::Finished(count);
        observer.on_finished(count);
        self.state
    }

    fn run_pass(
        &mut self,
        status: &str,
        progress: u8,
        cancel: &CancellationToken,
        observer: &mut dyn DrcObserver,
        messages: &mut Vec<DrcMessage>,
        check: impl FnOnce(&mut BoardDrcChecker<'_, B>) -> Vec<DrcMessage>,
    ) -> bool {
        observer.on_status(status);
        tracing::debug!(pass = status, "running check");
        let mut checker = BoardDrcChecker::new(&*self.board, &self.settings, &mut self.cache);
        messages.extend(check(&mut checker));
        observer.on_progress(progress);
        !self.check_cancelled(cancel, observer)
    }

    fn check_cancelled(&mut self, cancel: &CancellationToken, _observer: &mut dyn DrcObserver) -> bool {
        cancel.is_cancelled()
    }

    fn finish_aborted(&mut self) -> DrcRunState {
        self.cache.clear();
        self.state = DrcRunState::Aborted;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::InMemoryBoard;
    use crate::layer::LayerStack;

    #[derive(Default)]
    struct RecordingObserver {
        progresses: Vec<u8>,
        finished: Option<usize>,
    }

    impl DrcObserver for RecordingObserver {
        fn on_started(&mut self) {}
        fn on_progress(&mut self, percent: u8) {
            self.progresses.push(percent);
        }
        fn on_status(&mut self, _text: &str) {}
        fn on_message(&mut self, _message: &DrcMessage) {}
        fn on_finished(&mut self, message_count: usize) {
            self.finished = Some(message_count);
        }
    }

    #[test]
    fn empty_board_finishes_with_zero_messages_and_monotone_progress() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        let mut coordinator = DrcCoordinator::new(&mut board, DrcSettings::disabled());
        let mut observer = RecordingObserver::default();
        let cancel = CancellationToken::new();
        let state = coordinator.execute(false, &cancel, &mut observer);
        assert_eq!(state, DrcRunState::Finished(0));
        assert_eq!(observer.finished, Some(0));
        assert!(observer.progresses.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*observer.progresses.last().unwrap(), 100);
    }

    #[test]
    fn quick_mode_skips_starred_passes_and_still_reaches_100() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        let mut coordinator = DrcCoordinator::new(&mut board, DrcSettings::disabled());
        let mut observer = RecordingObserver::default();
        let cancel = CancellationToken::new();
        coordinator.execute(true, &cancel, &mut observer);
        assert!(!observer.progresses.contains(&12));
        assert!(!observer.progresses.contains(&64));
        assert!(!observer.progresses.contains(&97));
        assert_eq!(*observer.progresses.last().unwrap(), 100);
    }

    #[test]
    fn cancellation_before_first_pass_aborts_immediately() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        let mut coordinator = DrcCoordinator::new(&mut board, DrcSettings::disabled());
        let mut observer = RecordingObserver::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let state = coordinator.execute(false, &cancel, &mut observer);
        assert_eq!(state, DrcRunState::Aborted);
        assert_eq!(observer.finished, None);
    }
}
