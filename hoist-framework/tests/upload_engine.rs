use hoist_api::sim::{
    HoistApiDefSim, HoistDeviceContextSim, HoistSimEvent, HoistSimFaultInjection,
    HoistSimResourceKind,
};
use hoist_api::{
    HoistApi, HoistBuffer, HoistBufferBarrier, HoistBufferDef, HoistCommandBufferDef,
    HoistCommandPoolDef, HoistDeviceContext, HoistError, HoistExtents3D, HoistFormat,
    HoistMemoryUsage, HoistQueueType, HoistResourceId, HoistResourceState, HoistTexture,
    HoistTextureDef,
};
use hoist_framework::upload::{ResourceUploader, ResourceUploaderDef, UploadBatchState, UploadError};
use std::time::Duration;

fn create_api(api_def: &HoistApiDefSim) -> HoistApi {
    let _ = env_logger::try_init();
    HoistApi::new_sim(api_def).unwrap()
}

fn sim(device_context: &HoistDeviceContext) -> &HoistDeviceContextSim {
    device_context.sim_device_context().unwrap()
}

fn create_uploader(device_context: &HoistDeviceContext) -> ResourceUploader {
    ResourceUploader::new(device_context, &ResourceUploaderDef::default()).unwrap()
}

fn create_buffer(
    device_context: &HoistDeviceContext,
    size: u64,
) -> HoistBuffer {
    device_context
        .create_buffer(&HoistBufferDef::for_upload_destination(size))
        .unwrap()
}

fn create_texture(
    device_context: &HoistDeviceContext,
    width: u32,
    height: u32,
    mip_count: u32,
    array_length: u32,
) -> HoistTexture {
    device_context
        .create_texture(&HoistTextureDef {
            extents: HoistExtents3D {
                width,
                height,
                depth: 1,
            },
            mip_count,
            array_length,
            format: HoistFormat::R8G8B8A8_UNORM,
            ..Default::default()
        })
        .unwrap()
}

fn pattern(
    len: usize,
    seed: u8,
) -> Vec<u8> {
    (0..len)
        .map(|x| (x as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

fn mip_data(
    texture: &HoistTexture,
    mip_level: u8,
    seed: u8,
) -> Vec<u8> {
    let texture_def = texture.texture_def();
    let extents = texture_def.extents.mip_extents(mip_level);
    let size = extents.width * extents.height * texture_def.format.bytes_per_pixel();
    pattern(size as usize, seed)
}

fn position(
    events: &[HoistSimEvent],
    predicate: impl Fn(&HoistSimEvent) -> bool,
) -> usize {
    events
        .iter()
        .position(predicate)
        .expect("event is missing from the trace")
}

fn barrier_count(
    events: &[HoistSimEvent],
    resource_id: HoistResourceId,
) -> usize {
    events
        .iter()
        .filter(|event| {
            matches!(event, HoistSimEvent::BarrierExecuted { resource, .. } if *resource == resource_id)
        })
        .count()
}

fn staging_buffer_ids(events: &[HoistSimEvent]) -> Vec<HoistResourceId> {
    events
        .iter()
        .filter_map(|event| match event {
            HoistSimEvent::ResourceCreated {
                resource,
                kind: HoistSimResourceKind::Buffer(HoistMemoryUsage::CpuToGpu),
                ..
            } => Some(*resource),
            _ => None,
        })
        .collect()
}

#[test]
fn single_buffer_upload() {
    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    let buffer = create_buffer(&device_context, 256);
    let data = pattern(256, 7);
    uploader.record_copy_data(&buffer, &data).unwrap();

    assert_eq!(uploader.staging_allocation_count(), 1);
    assert_eq!(uploader.staging_bytes(), 256);
    assert_eq!(uploader.pending_transition_count(), 1);

    let result = uploader.execute().unwrap();
    assert_eq!(result.batch_index, 0);
    assert_eq!(result.copy_fence_value, 1);
    assert_eq!(result.fence_value, 2);
    assert_eq!(result.staging_allocations, 1);
    assert_eq!(result.staging_bytes, 256);
    assert_eq!(result.transitions, 1);
    assert_eq!(result.copy_commands, 1);
    assert!(uploader.completed_value() >= 2);

    let sim_buffer = buffer.sim_buffer().unwrap();
    assert_eq!(sim_buffer.read_back(), data);
    assert_eq!(sim_buffer.state(), HoistResourceState::GENERIC_READ);
    assert_eq!(sim(&device_context).validation_error_count(), 0);
}

#[test]
fn repeated_uploads_to_one_resource_transition_once() {
    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    let buffer = create_buffer(&device_context, 64);
    for seed in 0..5 {
        uploader.record_copy_data(&buffer, &pattern(64, seed)).unwrap();
        assert_eq!(uploader.pending_transition_count(), 1);
    }

    let result = uploader.execute().unwrap();
    assert_eq!(result.copy_commands, 5);
    assert_eq!(result.staging_allocations, 5);
    assert_eq!(result.transitions, 1);

    let events = sim(&device_context).trace_events();
    assert_eq!(barrier_count(&events, buffer.resource_id()), 1);
    let copies = events
        .iter()
        .filter(|event| matches!(event, HoistSimEvent::BufferCopied { dst, .. } if *dst == buffer.resource_id()))
        .count();
    assert_eq!(copies, 5);

    // Copies run in submission order, the last one wins
    assert_eq!(buffer.sim_buffer().unwrap().read_back(), pattern(64, 4));
    assert_eq!(sim(&device_context).validation_error_count(), 0);
}

#[test]
fn two_mips_of_one_texture() {
    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    // 400 byte rows are padded to a 512 byte pitch, 200 byte rows to 256
    let texture = create_texture(&device_context, 100, 10, 2, 1);
    let mip0 = mip_data(&texture, 0, 1);
    let mip1 = mip_data(&texture, 1, 2);
    uploader.record_copy_texture_data(&texture, 0, &mip0).unwrap();
    uploader.record_copy_texture_data(&texture, 1, &mip1).unwrap();

    let footprint0 = device_context.copyable_footprint(texture.texture_def(), 0, 0);
    let footprint1 = device_context.copyable_footprint(texture.texture_def(), 1, 0);
    assert_eq!(footprint0.total_bytes, 512 * 9 + 400);
    assert_eq!(footprint1.total_bytes, 256 * 4 + 200);

    assert_eq!(uploader.pending_transition_count(), 1);
    let result = uploader.execute().unwrap();
    assert_eq!(result.staging_allocations, 2);
    assert_eq!(
        result.staging_bytes,
        footprint0.total_bytes + footprint1.total_bytes
    );
    assert_eq!(result.copy_commands, 2);
    assert_eq!(result.transitions, 1);

    let events = sim(&device_context).trace_events();
    assert_eq!(barrier_count(&events, texture.resource_id()), 1);
    let copied_subresources: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            HoistSimEvent::TextureCopied { subresource, .. } => Some(*subresource),
            _ => None,
        })
        .collect();
    assert_eq!(copied_subresources, vec![0, 1]);

    let sim_texture = texture.sim_texture().unwrap();
    assert_eq!(sim_texture.read_subresource(0, 0).unwrap(), mip0);
    assert_eq!(sim_texture.read_subresource(1, 0).unwrap(), mip1);
    assert_eq!(sim_texture.state(), HoistResourceState::GENERIC_READ);
    assert_eq!(sim(&device_context).validation_error_count(), 0);
}

#[test]
fn full_mip_chain_of_a_texture_array() {
    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    let extents = HoistExtents3D {
        width: 64,
        height: 32,
        depth: 1,
    };
    let mip_count = HoistTextureDef::full_mip_count(extents);
    let texture = create_texture(&device_context, 64, 32, mip_count, 3);

    let mut expected = Vec::default();
    for array_slice in 0..3u16 {
        for mip_slice in 0..mip_count as u8 {
            let data = mip_data(&texture, mip_slice, (array_slice * 16) as u8 + mip_slice);
            uploader
                .record_copy_texture_subresource(&texture, mip_slice, array_slice, &data)
                .unwrap();
            expected.push((mip_slice, array_slice, data));
        }
    }

    let result = uploader.execute().unwrap();
    assert_eq!(result.copy_commands, 3 * mip_count as usize);
    assert_eq!(result.transitions, 1);

    let sim_texture = texture.sim_texture().unwrap();
    for (mip_slice, array_slice, data) in expected {
        assert_eq!(
            sim_texture.read_subresource(mip_slice, array_slice).unwrap(),
            data,
            "mip {} slice {}",
            mip_slice,
            array_slice
        );
    }
    assert_eq!(sim(&device_context).validation_error_count(), 0);
}

#[test]
fn empty_batch_still_signals_both_queues() {
    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);
    sim(&device_context).clear_trace();

    let result = uploader.execute().unwrap();
    assert_eq!(result.fence_value, 2);
    assert_eq!(result.staging_allocations, 0);
    assert_eq!(result.staging_bytes, 0);
    assert_eq!(result.transitions, 0);
    assert_eq!(result.copy_commands, 0);
    assert!(uploader.completed_value() >= 2);

    let events = sim(&device_context).trace_events();
    position(&events, |event| {
        matches!(
            event,
            HoistSimEvent::FenceSignaled {
                queue: HoistQueueType::Copy,
                value: 1,
                ..
            }
        )
    });
    position(&events, |event| {
        matches!(
            event,
            HoistSimEvent::FenceSignaled {
                queue: HoistQueueType::Direct,
                value: 2,
                ..
            }
        )
    });

    let touched_resources = events.iter().any(|event| {
        matches!(
            event,
            HoistSimEvent::ResourceCreated { .. }
                | HoistSimEvent::BufferCopied { .. }
                | HoistSimEvent::TextureCopied { .. }
                | HoistSimEvent::BarrierExecuted { .. }
        )
    });
    assert!(!touched_resources);
}

#[test]
fn transitions_run_after_copies_complete() {
    // GPU latency makes any missing cross-queue wait show up as a reordering
    let api = create_api(&HoistApiDefSim {
        execution_delay: Duration::from_millis(20),
        ..Default::default()
    });
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    let buffer = create_buffer(&device_context, 1024);
    let texture = create_texture(&device_context, 16, 16, 1, 1);
    uploader.record_copy_data(&buffer, &pattern(1024, 3)).unwrap();
    uploader
        .record_copy_texture_data(&texture, 0, &mip_data(&texture, 0, 9))
        .unwrap();
    uploader.execute().unwrap();

    let events = sim(&device_context).trace_events();
    let copy_signal = position(&events, |event| {
        matches!(
            event,
            HoistSimEvent::FenceSignaled {
                queue: HoistQueueType::Copy,
                value: 1,
                ..
            }
        )
    });
    let direct_wait_begin = position(&events, |event| {
        matches!(
            event,
            HoistSimEvent::QueueWaitBegin {
                queue: HoistQueueType::Direct,
                value: 1,
                ..
            }
        )
    });
    let direct_wait_end = position(&events, |event| {
        matches!(
            event,
            HoistSimEvent::QueueWaitEnd {
                queue: HoistQueueType::Direct,
                value: 1,
                ..
            }
        )
    });
    let direct_signal = position(&events, |event| {
        matches!(
            event,
            HoistSimEvent::FenceSignaled {
                queue: HoistQueueType::Direct,
                value: 2,
                ..
            }
        )
    });
    let cpu_wait_end = position(&events, |event| {
        matches!(event, HoistSimEvent::CpuWaitEnd { value: 2, .. })
    });

    let buffer_copy = position(&events, |event| {
        matches!(event, HoistSimEvent::BufferCopied { dst, .. } if *dst == buffer.resource_id())
    });
    let texture_copy = position(&events, |event| {
        matches!(event, HoistSimEvent::TextureCopied { dst, .. } if *dst == texture.resource_id())
    });

    for resource_id in [buffer.resource_id(), texture.resource_id()] {
        let barrier = position(&events, |event| {
            matches!(
                event,
                HoistSimEvent::BarrierExecuted { queue: HoistQueueType::Direct, resource, .. }
                    if *resource == resource_id
            )
        });
        assert!(buffer_copy < copy_signal);
        assert!(texture_copy < copy_signal);
        assert!(copy_signal < direct_wait_end);
        assert!(direct_wait_end < barrier);
        assert!(barrier < direct_signal);
    }

    assert!(direct_wait_begin < direct_wait_end);
    assert!(direct_signal < cpu_wait_end);
    assert_eq!(sim(&device_context).validation_error_count(), 0);
}

#[test]
fn staging_buffers_outlive_the_batch() {
    let api = create_api(&HoistApiDefSim {
        execution_delay: Duration::from_millis(10),
        ..Default::default()
    });
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    let buffers: Vec<_> = (0..4)
        .map(|_| create_buffer(&device_context, 128))
        .collect();
    for (seed, buffer) in buffers.iter().enumerate() {
        uploader
            .record_copy_data(buffer, &pattern(128, seed as u8))
            .unwrap();
    }
    let live_before_execute = sim(&device_context).live_resource_count();

    let result = uploader.execute().unwrap();
    assert!(uploader.completed_value() >= result.fence_value);
    assert_eq!(
        sim(&device_context).live_resource_count(),
        live_before_execute - 4
    );

    let events = sim(&device_context).trace_events();
    let staging_ids = staging_buffer_ids(&events);
    assert_eq!(staging_ids.len(), 4);

    let cpu_wait_end = position(&events, |event| {
        matches!(event, HoistSimEvent::CpuWaitEnd { value: 2, .. })
    });
    for staging_id in staging_ids {
        let freed = position(&events, |event| {
            matches!(event, HoistSimEvent::ResourceFreed { resource } if *resource == staging_id)
        });
        assert!(freed > cpu_wait_end);
    }

    for (seed, buffer) in buffers.iter().enumerate() {
        assert_eq!(
            buffer.sim_buffer().unwrap().read_back(),
            pattern(128, seed as u8)
        );
    }
    assert_eq!(sim(&device_context).validation_error_count(), 0);
}

#[test]
fn batches_are_isolated() {
    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    let first = create_buffer(&device_context, 32);
    uploader.record_copy_data(&first, &pattern(32, 1)).unwrap();
    let result = uploader.execute().unwrap();
    assert_eq!(result.fence_value, 2);
    assert_eq!(uploader.batch_epoch(), 2);

    assert_eq!(uploader.state(), UploadBatchState::Closed);
    assert_eq!(uploader.pending_transition_count(), 0);
    assert_eq!(uploader.staging_allocation_count(), 0);
    assert_eq!(uploader.staging_bytes(), 0);

    // A closed batch must be reopened explicitly
    let second = create_buffer(&device_context, 32);
    assert!(matches!(
        uploader.record_copy_data(&second, &pattern(32, 2)),
        Err(UploadError::BatchClosed)
    ));
    assert!(matches!(uploader.execute(), Err(UploadError::BatchClosed)));
    assert_eq!(uploader.state(), UploadBatchState::Closed);

    // An empty batch is a no-op that still moves the fence
    uploader.begin_batch().unwrap();
    sim(&device_context).clear_trace();
    let result = uploader.execute().unwrap();
    assert_eq!(result.batch_index, 1);
    assert_eq!(result.copy_fence_value, 3);
    assert_eq!(result.fence_value, 4);
    assert_eq!(result.transitions, 0);
    assert_eq!(uploader.batch_epoch(), 4);
    let events = sim(&device_context).trace_events();
    assert!(!events.iter().any(|event| matches!(
        event,
        HoistSimEvent::BufferCopied { .. } | HoistSimEvent::BarrierExecuted { .. }
    )));

    // The command buffers are reused for the next batch
    uploader.begin_batch().unwrap();
    uploader.begin_batch().unwrap();
    uploader.record_copy_data(&second, &pattern(32, 2)).unwrap();
    let result = uploader.execute().unwrap();
    assert_eq!(result.batch_index, 2);
    assert_eq!(result.fence_value, 6);
    assert_eq!(result.copy_commands, 1);
    assert!(uploader.completed_value() >= 6);

    assert_eq!(first.sim_buffer().unwrap().read_back(), pattern(32, 1));
    assert_eq!(second.sim_buffer().unwrap().read_back(), pattern(32, 2));
    assert_eq!(sim(&device_context).validation_error_count(), 0);
}

#[test]
fn reuploading_a_readable_buffer_needs_a_transition_back() {
    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    let buffer = create_buffer(&device_context, 4);
    uploader.record_copy_data(&buffer, &[1; 4]).unwrap();
    uploader.execute().unwrap();
    let sim_buffer = buffer.sim_buffer().unwrap();
    assert_eq!(sim_buffer.state(), HoistResourceState::GENERIC_READ);

    // Still readable, so the device skips both the copy and the barrier
    uploader.begin_batch().unwrap();
    uploader.record_copy_data(&buffer, &[2; 4]).unwrap();
    uploader.execute().unwrap();
    assert_eq!(sim_buffer.read_back(), vec![1; 4]);
    assert_eq!(sim_buffer.state(), HoistResourceState::GENERIC_READ);
    assert_eq!(sim(&device_context).validation_error_count(), 2);

    // Moving it back to COPY_DST on the direct queue allows the next upload
    let direct_queue = uploader.direct_queue().clone();
    let command_pool = direct_queue
        .create_command_pool(&HoistCommandPoolDef { transient: true })
        .unwrap();
    let command_buffer = command_pool
        .create_command_buffer(&HoistCommandBufferDef {
            begin_immediately: true,
        })
        .unwrap();
    command_buffer
        .cmd_resource_barrier(
            &[HoistBufferBarrier::state_transition(
                &buffer,
                HoistResourceState::GENERIC_READ,
                HoistResourceState::COPY_DST,
            )],
            &[],
        )
        .unwrap();
    command_buffer.end().unwrap();
    direct_queue.submit(&[&command_buffer]).unwrap();
    direct_queue.wait_for_queue_idle().unwrap();

    uploader.begin_batch().unwrap();
    uploader.record_copy_data(&buffer, &[3; 4]).unwrap();
    uploader.execute().unwrap();
    assert_eq!(sim_buffer.read_back(), vec![3; 4]);
    assert_eq!(sim_buffer.state(), HoistResourceState::GENERIC_READ);
    assert_eq!(sim(&device_context).validation_error_count(), 2);
}

#[test]
fn creation_failures_are_resource_creation_errors() {
    for fault_injection in [
        HoistSimFaultInjection {
            fail_queue_creation: Some(HoistQueueType::Copy),
            ..Default::default()
        },
        HoistSimFaultInjection {
            fail_queue_creation: Some(HoistQueueType::Direct),
            ..Default::default()
        },
        HoistSimFaultInjection {
            fail_fence_creation: true,
            ..Default::default()
        },
    ] {
        let api = create_api(&HoistApiDefSim {
            fault_injection,
            ..Default::default()
        });
        let result = ResourceUploader::new(&api.device_context(), &ResourceUploaderDef::default());
        assert!(matches!(
            result,
            Err(UploadError::ResourceCreation { .. })
        ));
    }
}

#[test]
fn device_memory_exhaustion_fails_only_the_request() {
    let api = create_api(&HoistApiDefSim {
        memory_budget: Some(1024),
        ..Default::default()
    });
    let device_context = api.device_context();
    let mut uploader = create_uploader(&device_context);

    let buffer = create_buffer(&device_context, 512);
    uploader.record_copy_data(&buffer, &pattern(512, 5)).unwrap();

    let result = uploader.record_copy_data(&buffer, &pattern(512, 6));
    assert!(matches!(
        result,
        Err(UploadError::Allocation {
            size: 512,
            source: HoistError::OutOfMemory { .. }
        })
    ));
    assert_eq!(uploader.state(), UploadBatchState::Recording);
    assert_eq!(uploader.staging_allocation_count(), 1);

    let result = uploader.execute().unwrap();
    assert_eq!(result.copy_commands, 1);
    assert_eq!(buffer.sim_buffer().unwrap().read_back(), pattern(512, 5));
}

#[test]
fn staging_budget_is_per_batch() {
    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = ResourceUploader::new(
        &device_context,
        &ResourceUploaderDef {
            max_staging_bytes_per_batch: Some(300),
            ..Default::default()
        },
    )
    .unwrap();

    let a = create_buffer(&device_context, 200);
    let b = create_buffer(&device_context, 200);
    uploader.record_copy_data(&a, &pattern(200, 1)).unwrap();
    assert!(matches!(
        uploader.record_copy_data(&b, &pattern(200, 2)),
        Err(UploadError::Allocation { size: 200, .. })
    ));
    uploader.execute().unwrap();

    // The budget is released with the batch
    uploader.begin_batch().unwrap();
    uploader.record_copy_data(&b, &pattern(200, 2)).unwrap();
    uploader.execute().unwrap();
    assert_eq!(b.sim_buffer().unwrap().read_back(), pattern(200, 2));
}

#[test]
fn submit_failure_faults_the_uploader() {
    for (queue_type, operation) in [
        (HoistQueueType::Copy, "copy queue submit"),
        (HoistQueueType::Direct, "direct queue submit"),
    ] {
        let api = create_api(&HoistApiDefSim {
            fault_injection: HoistSimFaultInjection {
                fail_submit: Some(queue_type),
                ..Default::default()
            },
            ..Default::default()
        });
        let device_context = api.device_context();
        let mut uploader = create_uploader(&device_context);

        let buffer = create_buffer(&device_context, 16);
        uploader.record_copy_data(&buffer, &pattern(16, 0)).unwrap();

        match uploader.execute() {
            Err(UploadError::Submission {
                operation: failed_operation,
                source: HoistError::DeviceLost,
            }) => assert_eq!(failed_operation, operation),
            other => panic!("expected a submission error, got {:?}", other),
        }

        assert_eq!(uploader.state(), UploadBatchState::Faulted);
        assert!(matches!(
            uploader.record_copy_data(&buffer, &pattern(16, 0)),
            Err(UploadError::Faulted)
        ));
        assert!(matches!(uploader.execute(), Err(UploadError::Faulted)));
        assert!(matches!(uploader.begin_batch(), Err(UploadError::Faulted)));
    }
}

#[test]
fn invalid_config_is_rejected() {
    let api = create_api(&HoistApiDefSim::default());
    let result = ResourceUploader::new(
        &api.device_context(),
        &ResourceUploaderDef {
            final_state: HoistResourceState::UNDEFINED,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(UploadError::Config(_))));
}

#[cfg(feature = "serde-support")]
#[test]
fn final_state_from_ron_config() {
    let uploader_def = ResourceUploaderDef::from_ron_str(&format!(
        "(final_state: (bits: {}))",
        HoistResourceState::PIXEL_SHADER_RESOURCE.bits()
    ))
    .unwrap();

    let api = create_api(&HoistApiDefSim::default());
    let device_context = api.device_context();
    let mut uploader = ResourceUploader::new(&device_context, &uploader_def).unwrap();

    let texture = create_texture(&device_context, 8, 8, 1, 1);
    uploader
        .record_copy_texture_data(&texture, 0, &mip_data(&texture, 0, 0))
        .unwrap();
    uploader.execute().unwrap();

    let events = sim(&device_context).trace_events();
    position(&events, |event| {
        matches!(
            event,
            HoistSimEvent::BarrierExecuted { src_state, dst_state, .. }
                if *src_state == HoistResourceState::COPY_DST
                    && *dst_state == HoistResourceState::PIXEL_SHADER_RESOURCE
        )
    });
    assert_eq!(
        texture.sim_texture().unwrap().state(),
        HoistResourceState::PIXEL_SHADER_RESOURCE
    );
}
