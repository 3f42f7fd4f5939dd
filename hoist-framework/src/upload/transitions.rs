use fnv::FnvHashMap;
use hoist_api::{
    HoistBuffer, HoistBufferBarrier, HoistCommandBuffer, HoistResourceId, HoistResourceState,
    HoistResult, HoistTexture, HoistTextureBarrier,
};

#[derive(Clone, Debug)]
pub enum TransitionTarget {
    Buffer(HoistBuffer),
    Texture(HoistTexture),
}

impl TransitionTarget {
    pub fn resource_id(&self) -> HoistResourceId {
        match self {
            TransitionTarget::Buffer(buffer) => buffer.resource_id(),
            TransitionTarget::Texture(texture) => texture.resource_id(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PendingTransition {
    pub target: TransitionTarget,
    pub src_state: HoistResourceState,
    pub dst_state: HoistResourceState,
}

/// Collects at most one transition per resource and records them all as a single barrier
/// call. Recording a resource again replaces its entry.
#[derive(Default)]
pub struct TransitionBatcher {
    pending: FnvHashMap<HoistResourceId, PendingTransition>,
}

impl TransitionBatcher {
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn get(
        &self,
        resource_id: HoistResourceId,
    ) -> Option<&PendingTransition> {
        self.pending.get(&resource_id)
    }

    pub fn record_buffer(
        &mut self,
        buffer: &HoistBuffer,
        dst_state: HoistResourceState,
    ) {
        self.record(TransitionTarget::Buffer(buffer.clone()), dst_state);
    }

    pub fn record_texture(
        &mut self,
        texture: &HoistTexture,
        dst_state: HoistResourceState,
    ) {
        self.record(TransitionTarget::Texture(texture.clone()), dst_state);
    }

    /// Records a COPY_DST to `dst_state` transition for the target
    pub fn record(
        &mut self,
        target: TransitionTarget,
        dst_state: HoistResourceState,
    ) {
        self.pending.insert(
            target.resource_id(),
            PendingTransition {
                target,
                src_state: HoistResourceState::COPY_DST,
                dst_state,
            },
        );
    }

    /// Records every pending transition into `command_buffer` with one barrier call and
    /// empties the table. Returns how many transitions were recorded. Order between resources
    /// is unspecified.
    pub fn flush(
        &mut self,
        command_buffer: &HoistCommandBuffer,
    ) -> HoistResult<usize> {
        let count = self.pending.len();
        if count == 0 {
            return Ok(0);
        }

        let mut buffer_barriers = Vec::default();
        let mut texture_barriers = Vec::default();
        for transition in self.pending.values() {
            match &transition.target {
                TransitionTarget::Buffer(buffer) => {
                    buffer_barriers.push(HoistBufferBarrier::state_transition(
                        buffer,
                        transition.src_state,
                        transition.dst_state,
                    ))
                }
                TransitionTarget::Texture(texture) => {
                    texture_barriers.push(HoistTextureBarrier::state_transition(
                        texture,
                        transition.src_state,
                        transition.dst_state,
                    ))
                }
            }
        }

        command_buffer.cmd_resource_barrier(&buffer_barriers, &texture_barriers)?;
        log::trace!(
            "Recorded {} buffer and {} texture transitions",
            buffer_barriers.len(),
            texture_barriers.len()
        );

        self.pending.clear();
        Ok(count)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
