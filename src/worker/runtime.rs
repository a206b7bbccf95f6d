//! Worker-side event loop driving a [`WorkerHost`]

use tracing::debug;

use crate::checkpoint::UnitId;

use super::hooks::{CompletionHook, HookSlots, LoadContext, LoadHandler};

/// The part of a worker that actually processes units.
pub trait WorkerHost {
    /// First unit the next call to [`WorkerHost::process`] will handle.
    fn set_start_unit(&mut self, unit: UnitId);

    fn start_unit(&self) -> UnitId;

    /// Process units from the start unit through the job's last unit, calling
    /// `on_complete` after each one.
    fn process(&mut self, on_complete: &mut dyn FnMut(UnitId)) -> anyhow::Result<()>;
}

/// Handle given to a deferred action to position and start the host.
pub struct WorkControl<'a> {
    host: &'a mut dyn WorkerHost,
    completion: &'a mut Option<CompletionHook>,
}

impl WorkControl<'_> {
    pub fn set_start_unit(&mut self, unit: UnitId) {
        self.host.set_start_unit(unit);
    }

    pub fn start_unit(&self) -> UnitId {
        self.host.start_unit()
    }

    /// Run the host, firing the registered completion hook for each finished unit.
    pub fn begin(&mut self) -> anyhow::Result<()> {
        let completion = &mut *self.completion;
        self.host.process(&mut |unit| {
            if let Some(hook) = completion.as_mut() {
                hook(unit);
            }
        })
    }
}

/// Minimal worker lifecycle: a load event followed by whatever it scheduled.
pub struct WorkerRuntime<H: WorkerHost> {
    host: H,
    load_handler: Option<Box<dyn LoadHandler>>,
    slots: HookSlots,
}

impl<H: WorkerHost> WorkerRuntime<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            load_handler: None,
            slots: HookSlots::default(),
        }
    }

    /// Install the handler for load events, replacing any previous one.
    pub fn set_load_handler(&mut self, handler: Box<dyn LoadHandler>) {
        self.load_handler = Some(handler);
    }

    /// Fire the load event. Scheduled work does not run until [`Self::run_pending`].
    pub fn load_job(&mut self) {
        if let Some(handler) = self.load_handler.as_mut() {
            let mut ctx = LoadContext::new(&mut self.slots);
            handler.on_job_loaded(&mut ctx);
        }
    }

    /// Run the scheduled begin action, if any. Returns whether one ran.
    pub fn run_pending(&mut self) -> anyhow::Result<bool> {
        let Some(action) = self.slots.begin.take() else {
            return Ok(false);
        };
        debug!("Running scheduled begin action");

        let mut control = WorkControl {
            host: &mut self.host,
            completion: &mut self.slots.completion,
        };
        action(&mut control)?;
        Ok(true)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn has_pending(&self) -> bool {
        self.slots.begin.is_some()
    }
}
