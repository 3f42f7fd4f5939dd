use super::{UploadError, UploadResult};
use hoist_api::HoistSubresourceFootprint;

/// CPU-side data for one subresource. Rows are `row_pitch` bytes apart and depth slices are
/// `slice_pitch` bytes apart.
#[derive(Clone, Copy, Debug)]
pub struct SubresourceData<'a> {
    pub data: &'a [u8],
    pub row_pitch: u64,
    pub slice_pitch: u64,
}

impl<'a> SubresourceData<'a> {
    /// Tightly packed rows matching the footprint. Fails if `data` can't fill every row.
    pub fn for_footprint(
        data: &'a [u8],
        footprint: &HoistSubresourceFootprint,
    ) -> UploadResult<Self> {
        let row_pitch = footprint.row_size_in_bytes;
        let slice_pitch = row_pitch * footprint.num_rows as u64;
        let required_size = slice_pitch * footprint.depth as u64;

        if (data.len() as u64) < required_size {
            return Err(UploadError::InvalidRequest(format!(
                "subresource needs {} bytes ({} rows of {} bytes, {} slices) but {} were provided",
                required_size,
                footprint.num_rows,
                row_pitch,
                footprint.depth,
                data.len()
            )));
        }

        Ok(SubresourceData {
            data,
            row_pitch,
            slice_pitch,
        })
    }
}

/// Bytes a staging buffer needs to hold the subresource, including the placement offset
pub fn staging_size(footprint: &HoistSubresourceFootprint) -> u64 {
    footprint.offset + footprint.total_bytes
}

/// Copies `src` into mapped staging memory using the footprint's row pitch
pub fn write_rows(
    dst: &mut [u8],
    src: &SubresourceData,
    footprint: &HoistSubresourceFootprint,
) {
    let row_size = footprint.row_size_in_bytes as usize;
    let dst_slice_pitch = footprint.row_pitch * footprint.num_rows as u64;

    for slice in 0..footprint.depth as u64 {
        for row in 0..footprint.num_rows as u64 {
            let src_begin = (slice * src.slice_pitch + row * src.row_pitch) as usize;
            let dst_begin =
                (footprint.offset + slice * dst_slice_pitch + row * footprint.row_pitch) as usize;
            dst[dst_begin..dst_begin + row_size]
                .copy_from_slice(&src.data[src_begin..src_begin + row_size]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded_footprint() -> HoistSubresourceFootprint {
        // 3 rows of 100 bytes, padded to a 256 byte pitch
        HoistSubresourceFootprint {
            offset: 0,
            row_pitch: 256,
            num_rows: 3,
            depth: 1,
            row_size_in_bytes: 100,
            total_bytes: 256 * 2 + 100,
        }
    }

    #[test]
    fn slice_pitch_is_row_pitch_times_height() {
        let footprint = padded_footprint();
        let data = vec![0u8; 300];
        let subresource_data = SubresourceData::for_footprint(&data, &footprint).unwrap();
        assert_eq!(subresource_data.row_pitch, 100);
        assert_eq!(subresource_data.slice_pitch, 100 * 3);
        assert_eq!(staging_size(&footprint), 612);
    }

    #[test]
    fn short_data_is_rejected() {
        let footprint = padded_footprint();
        let data = vec![0u8; 299];
        assert!(matches!(
            SubresourceData::for_footprint(&data, &footprint),
            Err(UploadError::InvalidRequest(_))
        ));
    }

    #[test]
    fn extra_data_is_ignored() {
        let footprint = padded_footprint();
        let data = vec![0u8; 1000];
        let subresource_data = SubresourceData::for_footprint(&data, &footprint).unwrap();
        assert_eq!(subresource_data.slice_pitch, 300);
    }

    #[test]
    fn rows_land_at_the_padded_pitch() {
        let footprint = padded_footprint();
        let data: Vec<u8> = (0..300).map(|x| (x / 100) as u8 + 1).collect();
        let subresource_data = SubresourceData::for_footprint(&data, &footprint).unwrap();

        let mut staging = vec![0u8; staging_size(&footprint) as usize];
        write_rows(&mut staging, &subresource_data, &footprint);

        assert!(staging[0..100].iter().all(|&x| x == 1));
        assert!(staging[100..256].iter().all(|&x| x == 0));
        assert!(staging[256..356].iter().all(|&x| x == 2));
        assert!(staging[512..612].iter().all(|&x| x == 3));
    }
}
