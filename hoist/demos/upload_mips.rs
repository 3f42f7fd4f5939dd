use log::LevelFilter;

use hoist::api::sim::{HoistApiDefSim, HoistSimEvent};
use hoist::api::*;
use hoist::upload::{ResourceUploader, ResourceUploaderDef};
use std::time::Duration;

const TEXTURE_WIDTH: u32 = 256;
const TEXTURE_HEIGHT: u32 = 128;

fn main() {
    env_logger::Builder::from_default_env()
        .default_format_timestamp_nanos(true)
        .filter_level(LevelFilter::Debug)
        .init();

    run().unwrap();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    //
    // An optional RON file may configure the uploader, see demos/uploader.ron
    //
    let uploader_def = match std::env::args().nth(1) {
        Some(path) => ResourceUploaderDef::load(path)?,
        None => ResourceUploaderDef::default(),
    };

    //
    // Create the api. The simulated device gets a little latency so the queues visibly overlap
    // with the CPU.
    //
    let mut api = HoistApi::new_sim(&HoistApiDefSim {
        execution_delay: Duration::from_millis(2),
        ..Default::default()
    })?;

    // Wrap all of this so that it gets dropped before the api is destroyed
    {
        let device_context = api.device_context();
        let mut uploader = ResourceUploader::new(&device_context, &uploader_def)?;

        //
        // A vertex buffer
        //
        #[rustfmt::skip]
        let vertex_data = [
            0.0f32, 0.5, 1.0, 0.0, 0.0,
            -0.5, -0.5, 0.0, 1.0, 0.0,
            0.5, 0.5, 0.0, 0.0, 1.0,
        ];
        let vertex_bytes: Vec<u8> = vertex_data.iter().flat_map(|x| x.to_le_bytes()).collect();
        let vertex_buffer = device_context.create_buffer(&HoistBufferDef::for_upload_destination(
            vertex_bytes.len() as u64,
        ))?;
        uploader.record_copy_data(&vertex_buffer, &vertex_bytes)?;

        //
        // A texture with a full mip chain, each level a different shade
        //
        let extents = HoistExtents3D {
            width: TEXTURE_WIDTH,
            height: TEXTURE_HEIGHT,
            depth: 1,
        };
        let texture_def = HoistTextureDef {
            extents,
            mip_count: HoistTextureDef::full_mip_count(extents),
            format: HoistFormat::R8G8B8A8_UNORM,
            ..Default::default()
        };
        let texture = device_context.create_texture(&texture_def)?;

        for mip_level in 0..texture_def.mip_count as u8 {
            let mip_extents = extents.mip_extents(mip_level);
            let shade = 255 - mip_level * 24;
            let data = vec![shade; (mip_extents.width * mip_extents.height * 4) as usize];
            uploader.record_copy_texture_data(&texture, mip_level, &data)?;
        }

        //
        // Execute blocks until the copy queue and the direct queue are both done
        //
        let result = uploader.execute()?;
        println!(
            "Batch {}: {} copies, {} transitions, {} staging buffers ({} bytes), fence at {}",
            result.batch_index,
            result.copy_commands,
            result.transitions,
            result.staging_allocations,
            result.staging_bytes,
            result.fence_value
        );

        print_trace_summary(&device_context);
    }

    api.destroy()?;
    Ok(())
}

fn print_trace_summary(device_context: &HoistDeviceContext) {
    let sim_device_context = match device_context.sim_device_context() {
        Some(sim_device_context) => sim_device_context,
        None => return,
    };

    let mut buffer_copies = 0;
    let mut texture_copies = 0;
    let mut copied_bytes = 0;
    let mut barriers = 0;
    for event in sim_device_context.trace_events() {
        match event {
            HoistSimEvent::BufferCopied { size, .. } => {
                buffer_copies += 1;
                copied_bytes += size;
            }
            HoistSimEvent::TextureCopied { size, .. } => {
                texture_copies += 1;
                copied_bytes += size;
            }
            HoistSimEvent::BarrierExecuted { .. } => barriers += 1,
            HoistSimEvent::FenceSignaled { queue, value, .. } => {
                println!("  {} queue signaled {}", queue.name(), value)
            }
            HoistSimEvent::QueueWaitEnd { queue, value, .. } => {
                println!("  {} queue waited for {}", queue.name(), value)
            }
            HoistSimEvent::ValidationError { message, .. } => {
                println!("  validation error: {}", message)
            }
            _ => {}
        }
    }

    println!(
        "Trace: {} buffer copies, {} texture copies, {} bytes copied, {} barriers, {} validation errors",
        buffer_copies,
        texture_copies,
        copied_bytes,
        barriers,
        sim_device_context.validation_error_count()
    );
}
