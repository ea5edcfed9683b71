//! The output slot table.
//!
//! Slot 0 always holds the stdout output and cannot be removed. Slots
//! `1..=extra_outputs` are filled by `add` in ascending order and freed by
//! `remove`; a freed slot is reused by the next `add`.

use super::traits::{OutputHandler, OutputId, OutputTarget};
use crate::core::event::Event;
use crate::core::level::{is_allowed, Level};
use crate::error::{Result, UlogError};
use std::fmt;
use std::sync::Arc;

struct OutputSlot {
    handler: Arc<dyn OutputHandler>,
    level: Level,
}

pub struct OutputRegistry {
    slots: Vec<Option<OutputSlot>>,
}

impl OutputRegistry {
    pub fn new(stdout: Arc<dyn OutputHandler>, stdout_level: Level, extra_outputs: usize) -> Self {
        let mut slots = Vec::with_capacity(extra_outputs + 1);
        slots.push(Some(OutputSlot {
            handler: stdout,
            level: stdout_level,
        }));
        slots.resize_with(extra_outputs + 1, || None);
        Self { slots }
    }

    /// Total slot count, stdout included.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Places `handler` in the lowest free extra slot.
    pub fn add(&mut self, handler: Arc<dyn OutputHandler>, level: Level) -> Result<OutputId> {
        let index = self
            .slots
            .iter()
            .skip(1)
            .position(Option::is_none)
            .map(|free| free + 1)
            .ok_or_else(|| UlogError::error("no free output slot"))?;
        self.slots[index] = Some(OutputSlot { handler, level });
        Ok(OutputId::new(index))
    }

    pub fn remove(&mut self, id: OutputId) -> Result<()> {
        if id == OutputId::STDOUT {
            return Err(UlogError::error("the stdout output cannot be removed"));
        }
        self.slot_mut(id)?
            .take()
            .map(|_| ())
            .ok_or_else(|| UlogError::not_found(format!("output {}", id)))
    }

    pub fn set_level(&mut self, id: OutputId, level: Level) -> Result<()> {
        let slot = self
            .slot_mut(id)?
            .as_mut()
            .ok_or_else(|| UlogError::not_found(format!("output {}", id)))?;
        slot.level = level;
        Ok(())
    }

    /// Sets the level of every populated slot.
    pub fn set_level_all(&mut self, level: Level) {
        for slot in self.slots.iter_mut().flatten() {
            slot.level = level;
        }
    }

    pub fn level(&self, id: OutputId) -> Option<Level> {
        self.slots
            .get(id.value())
            .and_then(Option::as_ref)
            .map(|slot| slot.level)
    }

    /// Empties every extra slot and puts stdout back at `stdout_level`.
    pub fn reset(&mut self, stdout_level: Level) {
        for slot in self.slots.iter_mut().skip(1) {
            *slot = None;
        }
        if let Some(Some(stdout)) = self.slots.first_mut() {
            stdout.level = stdout_level;
        }
    }

    /// Hands `event` to every output selected by `target` whose level lets
    /// it through, in slot order. Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &Event<'_>, target: OutputTarget) -> usize {
        let mut invoked = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else { continue };
            if !target.includes(OutputId::new(index)) || !is_allowed(event.level(), slot.level) {
                continue;
            }
            // each output gets its own copy to consume
            let copy = *event;
            slot.handler.handle(&copy);
            invoked += 1;
        }
        invoked
    }

    fn slot_mut(&mut self, id: OutputId) -> Result<&mut Option<OutputSlot>> {
        let capacity = self.slots.len();
        self.slots.get_mut(id.value()).ok_or_else(|| {
            UlogError::invalid_argument(format!(
                "output id {} out of range (capacity {})",
                id, capacity
            ))
        })
    }
}

impl fmt::Debug for OutputRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                list.entry(&(index, slot.handler.name(), slot.level));
            }
        }
        list.finish()
    }
}
