//! Hook slots the worker exposes to embedded extensions
//!
//! Every slot holds at most one hook and registering assigns it. Re-running a
//! load handler therefore replaces the previous registration instead of adding a
//! second one next to it.

use crate::checkpoint::UnitId;

use super::runtime::WorkControl;

/// Called once for every unit the worker finishes.
pub type CompletionHook = Box<dyn FnMut(UnitId) + Send>;

/// Work scheduled from a load handler to run after the load event has returned.
pub type DeferredAction = Box<dyn FnOnce(&mut WorkControl<'_>) -> anyhow::Result<()> + Send>;

/// Receives the worker's "job loaded" event.
pub trait LoadHandler: Send {
    fn on_job_loaded(&mut self, ctx: &mut LoadContext<'_>);
}

#[derive(Default)]
pub(super) struct HookSlots {
    pub(super) completion: Option<CompletionHook>,
    pub(super) begin: Option<DeferredAction>,
}

/// View of the hook slots handed to a [`LoadHandler`].
pub struct LoadContext<'a> {
    slots: &'a mut HookSlots,
}

impl<'a> LoadContext<'a> {
    pub(super) fn new(slots: &'a mut HookSlots) -> Self {
        Self { slots }
    }

    /// Drop every registered hook and any begin action not yet run.
    pub fn clear(&mut self) {
        self.slots.completion = None;
        self.slots.begin = None;
    }

    pub fn set_completion_hook(&mut self, hook: CompletionHook) {
        self.slots.completion = Some(hook);
    }

    /// Schedule the action that starts processing. Replaces any pending one.
    pub fn schedule_begin(&mut self, action: DeferredAction) {
        self.slots.begin = Some(action);
    }
}
