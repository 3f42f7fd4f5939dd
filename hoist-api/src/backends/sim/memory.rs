use super::{HoistDeviceContextSim, HoistSimEvent, HoistSimResourceKind};
use crate::{HoistResourceId, HoistResourceState};
use std::sync::Mutex;

/// Backing storage shared by sim buffers and textures. Commands hold weak references to these so
/// that executing a command list after a resource was released is detected instead of silently
/// keeping the memory alive.
pub(super) struct SimResource {
    id: HoistResourceId,
    device_context: HoistDeviceContextSim,
    size: u64,
    state: Mutex<HoistResourceState>,
    memory: Mutex<Vec<u8>>,
}

impl SimResource {
    pub(super) fn new(
        device_context: &HoistDeviceContextSim,
        id: HoistResourceId,
        kind: HoistSimResourceKind,
        size: u64,
        initial_state: HoistResourceState,
    ) -> Self {
        device_context.trace(HoistSimEvent::ResourceCreated {
            resource: id,
            kind,
            size,
        });

        SimResource {
            id,
            device_context: device_context.clone(),
            size,
            state: Mutex::new(initial_state),
            memory: Mutex::new(vec![0; size as usize]),
        }
    }

    pub(super) fn id(&self) -> HoistResourceId {
        self.id
    }

    pub(super) fn size(&self) -> u64 {
        self.size
    }

    pub(super) fn state(&self) -> HoistResourceState {
        *self.state.lock().unwrap()
    }

    pub(super) fn set_state(
        &self,
        state: HoistResourceState,
    ) {
        *self.state.lock().unwrap() = state;
    }

    pub(super) fn read(
        &self,
        offset: u64,
        size: u64,
    ) -> Vec<u8> {
        let memory = self.memory.lock().unwrap();
        memory[offset as usize..(offset + size) as usize].to_vec()
    }

    pub(super) fn with_memory<R, F: FnOnce(&mut [u8]) -> R>(
        &self,
        f: F,
    ) -> R {
        let mut memory = self.memory.lock().unwrap();
        f(&mut memory)
    }
}

impl Drop for SimResource {
    fn drop(&mut self) {
        self.device_context.free_memory(self.size);
        self.device_context
            .trace(HoistSimEvent::ResourceFreed { resource: self.id });
    }
}
