use super::command_buffer::SimCommand;
use super::*;
use crate::{HoistCommandPoolDef, HoistError, HoistQueueType, HoistResult};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

enum SimQueueOp {
    Execute(Vec<SimCommand>),
    Signal(HoistFenceSim, u64),
    Wait(HoistFenceSim, u64),
    Flush(Sender<()>),
}

struct HoistQueueSimInner {
    device_context: HoistDeviceContextSim,
    queue_type: HoistQueueType,
    queue_id: u32,
    sender: Option<Sender<SimQueueOp>>,
    worker: Option<JoinHandle<()>>,
}

impl Drop for HoistQueueSimInner {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain queued work and exit. A worker blocked on a
        // fence that is never signaled keeps this join from returning, just like a hung GPU.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("{} queue worker panicked", self.queue_type.name());
            }
        }
    }
}

/// A queue executes submitted work in order on a dedicated thread
#[derive(Clone)]
pub struct HoistQueueSim {
    inner: Arc<HoistQueueSimInner>,
}

impl std::fmt::Debug for HoistQueueSim {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HoistQueueSim")
            .field("queue_type", &self.inner.queue_type)
            .field("queue_id", &self.inner.queue_id)
            .finish()
    }
}

impl HoistQueueSim {
    pub fn device_context(&self) -> &HoistDeviceContextSim {
        &self.inner.device_context
    }

    pub fn queue_id(&self) -> u32 {
        self.inner.queue_id
    }

    pub fn queue_type(&self) -> HoistQueueType {
        self.inner.queue_type
    }

    pub fn create_command_pool(
        &self,
        command_pool_def: &HoistCommandPoolDef,
    ) -> HoistResult<HoistCommandPoolSim> {
        HoistCommandPoolSim::new(self, command_pool_def)
    }

    pub fn submit(
        &self,
        command_buffers: &[&HoistCommandBufferSim],
    ) -> HoistResult<()> {
        profiling::scope!("HoistQueueSim::submit");
        let queue_type = self.inner.queue_type;
        if self.inner.device_context.api_def().fault_injection.fail_submit == Some(queue_type) {
            log::error!("Simulated device loss on {} queue submit", queue_type.name());
            return Err(HoistError::DeviceLost);
        }

        // Validate everything before anything is queued so a failed submit has no effect
        let mut command_lists = Vec::with_capacity(command_buffers.len());
        for command_buffer in command_buffers {
            if command_buffer.queue().queue_id() != self.inner.queue_id {
                return Err(format!(
                    "Command buffer was allocated for {} queue {} and can't be submitted to {} queue {}",
                    command_buffer.queue().queue_type().name(),
                    command_buffer.queue().queue_id(),
                    queue_type.name(),
                    self.inner.queue_id
                ))?;
            }

            command_lists.push(command_buffer.closed_commands()?);
        }

        for commands in command_lists {
            self.inner
                .device_context
                .trace(HoistSimEvent::CommandListSubmitted {
                    queue: queue_type,
                    command_count: commands.len(),
                });
            self.send(SimQueueOp::Execute(commands))?;
        }

        Ok(())
    }

    /// Sets the fence to `value` once all previously submitted work on this queue is done
    pub fn signal(
        &self,
        fence: &HoistFenceSim,
        value: u64,
    ) -> HoistResult<()> {
        self.send(SimQueueOp::Signal(fence.clone(), value))
    }

    /// Work submitted after this call does not start until the fence reaches `value`. Does not
    /// block the CPU.
    pub fn wait(
        &self,
        fence: &HoistFenceSim,
        value: u64,
    ) -> HoistResult<()> {
        self.send(SimQueueOp::Wait(fence.clone(), value))
    }

    pub fn wait_for_queue_idle(&self) -> HoistResult<()> {
        profiling::scope!("HoistQueueSim::wait_for_queue_idle");
        let (sender, receiver) = crossbeam_channel::bounded(1);
        self.send(SimQueueOp::Flush(sender))?;
        receiver.recv().map_err(|_| HoistError::DeviceLost)
    }

    fn send(
        &self,
        op: SimQueueOp,
    ) -> HoistResult<()> {
        let sender = self.inner.sender.as_ref().ok_or(HoistError::DeviceLost)?;
        sender.send(op).map_err(|_| HoistError::DeviceLost)
    }

    pub(super) fn new(
        device_context: &HoistDeviceContextSim,
        queue_type: HoistQueueType,
        queue_id: u32,
    ) -> HoistResult<Self> {
        let (sender, receiver) = crossbeam_channel::unbounded();

        let worker_device_context = device_context.clone();
        let execution_delay = device_context.api_def().execution_delay;
        let worker = std::thread::Builder::new()
            .name(format!("hoist-sim-{}-{}", queue_type.name(), queue_id))
            .spawn(move || {
                run_queue_worker(
                    worker_device_context,
                    queue_type,
                    execution_delay,
                    receiver,
                )
            })?;

        log::debug!("Created sim {} queue {}", queue_type.name(), queue_id);

        let inner = HoistQueueSimInner {
            device_context: device_context.clone(),
            queue_type,
            queue_id,
            sender: Some(sender),
            worker: Some(worker),
        };

        Ok(HoistQueueSim {
            inner: Arc::new(inner),
        })
    }
}

fn run_queue_worker(
    device_context: HoistDeviceContextSim,
    queue_type: HoistQueueType,
    execution_delay: Duration,
    receiver: Receiver<SimQueueOp>,
) {
    for op in receiver.iter() {
        match op {
            SimQueueOp::Execute(commands) => {
                if !execution_delay.is_zero() {
                    std::thread::sleep(execution_delay);
                }

                for command in &commands {
                    command.execute(&device_context, queue_type);
                }

                device_context.trace(HoistSimEvent::CommandListExecuted {
                    queue: queue_type,
                    command_count: commands.len(),
                });
            }
            SimQueueOp::Signal(fence, value) => {
                // Traced first so that anything the signal unblocks is recorded after it
                device_context.trace(HoistSimEvent::FenceSignaled {
                    queue: queue_type,
                    fence: fence.fence_id(),
                    value,
                });
                fence.set_value(value);
            }
            SimQueueOp::Wait(fence, value) => {
                device_context.trace(HoistSimEvent::QueueWaitBegin {
                    queue: queue_type,
                    fence: fence.fence_id(),
                    value,
                });
                fence.block_until(value);
                device_context.trace(HoistSimEvent::QueueWaitEnd {
                    queue: queue_type,
                    fence: fence.fence_id(),
                    value,
                });
            }
            SimQueueOp::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    log::debug!("{} queue worker exiting", queue_type.name());
}
