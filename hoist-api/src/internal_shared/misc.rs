use crate::{HoistResourceId, HoistResult, HoistSubresourceFootprint, HoistTextureDef};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn allocate_resource_id() -> HoistResourceId {
    HoistResourceId(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
}

// Commands recorded outside begin()/end() are rejected, never dropped
pub(crate) fn verify_recording(is_recording: bool) -> HoistResult<()> {
    if !is_recording {
        return Err("Commands can only be recorded between begin() and end()")?;
    }

    Ok(())
}

pub(crate) fn align_up(
    value: u64,
    alignment: u64,
) -> u64 {
    ((value + alignment - 1) / alignment) * alignment
}

/// Computes the layout of one subresource in a buffer the same way D3D12's
/// GetCopyableFootprints does for uncompressed formats.
pub(crate) fn copyable_footprint(
    texture_def: &HoistTextureDef,
    mip_level: u8,
    base_offset: u64,
    texture_alignment: u64,
    row_alignment: u64,
) -> HoistSubresourceFootprint {
    let extents = texture_def.extents.mip_extents(mip_level);
    let row_size_in_bytes = extents.width as u64 * texture_def.format.bytes_per_pixel() as u64;
    let row_pitch = align_up(row_size_in_bytes, row_alignment);
    let num_rows = extents.height;
    let depth = extents.depth;

    HoistSubresourceFootprint {
        offset: align_up(base_offset, texture_alignment),
        row_pitch,
        num_rows,
        depth,
        row_size_in_bytes,
        total_bytes: row_pitch * (num_rows as u64 * depth as u64 - 1) + row_size_in_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HoistExtents3D, HoistFormat};

    #[test]
    fn resource_ids_are_unique() {
        let a = allocate_resource_id();
        let b = allocate_resource_id();
        assert_ne!(a, b);
    }

    #[test]
    fn recording_outside_begin_end_is_an_error() {
        assert!(verify_recording(true).is_ok());
        let error = verify_recording(false).unwrap_err();
        assert!(error.to_string().contains("between begin() and end()"));
    }

    #[test]
    fn footprint_pads_rows() {
        let def = HoistTextureDef {
            extents: HoistExtents3D {
                width: 100,
                height: 10,
                depth: 1,
            },
            mip_count: 2,
            format: HoistFormat::R8G8B8A8_UNORM,
            ..Default::default()
        };

        let mip0 = copyable_footprint(&def, 0, 0, 512, 256);
        assert_eq!(mip0.row_size_in_bytes, 400);
        assert_eq!(mip0.row_pitch, 512);
        assert_eq!(mip0.num_rows, 10);
        assert_eq!(mip0.total_bytes, 512 * 9 + 400);

        let mip1 = copyable_footprint(&def, 1, 1, 512, 256);
        assert_eq!(mip1.offset, 512);
        assert_eq!(mip1.row_size_in_bytes, 200);
        assert_eq!(mip1.row_pitch, 256);
        assert_eq!(mip1.num_rows, 5);
        assert_eq!(mip1.total_bytes, 256 * 4 + 200);
    }
}
