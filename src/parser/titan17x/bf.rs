// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! BF (bayer focus) statistics.
//!
//! The hardware emits BF regions in the raster order of their bottom-right corners, which is not
//! the order the regions were requested in. Every record carries the ID of the region it belongs
//! to, and outputs are indexed by that ID.

use byteorder::ByteOrder;
use byteorder::LittleEndian;
use log::trace;

use crate::hw::titan17x::layout::read_indexed;
use crate::hw::titan17x::layout::BfStats23HwOutput;
use crate::hw::titan17x::layout::BfStats25HwOutput;
use crate::hw::titan17x::layout::LayoutError;
use crate::hw::titan17x::BF_FRAME_TAG_SIZE;
use crate::hw::titan17x::BF_MAX_ROI_REGIONS;
use crate::hw::titan17x::BF_STATS_MAX_WIDTH;
use crate::parser::StatsParseError;
use crate::stats::config::BfStatsRoiConfig;
use crate::stats::output::BfRegionStats;
use crate::stats::output::ParsedBfStatsOutput;

fn checked_roi_count(config: &BfStatsRoiConfig) -> Result<usize, StatsParseError> {
    let count = config.num_bf_stats_roi_dimension as usize;
    if count >= BF_MAX_ROI_REGIONS {
        return Err(StatsParseError::RegionCountOverflow {
            what: "BF ROI configuration",
            count,
            max: BF_MAX_ROI_REGIONS,
        });
    }
    Ok(count)
}

fn region_slot(
    output: &mut ParsedBfStatsOutput,
    region_id: u32,
) -> Result<&mut BfRegionStats, StatsParseError> {
    let capacity = output.regions.len();
    output
        .regions
        .get_mut(region_id as usize)
        .ok_or(StatsParseError::OutOfBounds {
            what: "BF region ID",
            value: region_id as usize,
            capacity,
        })
}

fn push_region_id(
    output: &mut ParsedBfStatsOutput,
    index: usize,
    region_id: u32,
) -> Result<(), StatsParseError> {
    let capacity = output.region_id.len();
    let slot = output
        .region_id
        .get_mut(index)
        .ok_or(StatsParseError::OutOfBounds {
            what: "BF region count",
            value: index + 1,
            capacity,
        })?;
    *slot = region_id;
    Ok(())
}

fn assign(slot: &mut BfRegionStats, hw: &BfStats23HwOutput) {
    *slot = BfRegionStats {
        horizontal1_sum: hw.h1_sum,
        horizontal1_num: hw.h1_count,
        horizontal1_sharpness: hw.h1_sharpness,
        vertical_sum: hw.v_sum,
        vertical_num: hw.v_count,
        vertical_sharpness: hw.v_sharpness,
        region_sel: hw.sel,
    };
}

fn accumulate(slot: &mut BfRegionStats, hw: &BfStats23HwOutput) {
    slot.horizontal1_sum += hw.h1_sum;
    slot.horizontal1_num += hw.h1_count;
    slot.horizontal1_sharpness += hw.h1_sharpness;
    slot.vertical_sum += hw.v_sum;
    slot.vertical_num += hw.v_count;
    slot.vertical_sharpness += hw.v_sharpness;
    slot.region_sel = hw.sel;
}

/// Parses the regions of one stripe buffer.
///
/// If `output` holds no region yet, the regions are stored as they come. Otherwise this is the
/// second stripe of a frame: a region that already has data spans both stripes and is summed
/// with it, any other region is appended.
fn parse_stripe(
    buffer: &[u8],
    config: &BfStatsRoiConfig,
    has_frame_tag: bool,
    output: &mut ParsedBfStatsOutput,
) -> Result<(), StatsParseError> {
    let count = checked_roi_count(config)?;

    let regions = if has_frame_tag {
        let tag = buffer.get(..BF_FRAME_TAG_SIZE).ok_or(LayoutError {
            offset: 0,
            size: BF_FRAME_TAG_SIZE,
            len: buffer.len(),
        })?;
        output.frame_tag = LittleEndian::read_u64(tag);
        &buffer[BF_FRAME_TAG_SIZE..]
    } else {
        output.frame_tag = 0;
        buffer
    };

    if output.num_of_roi_regions == 0 {
        for index in 0..count {
            let hw: BfStats23HwOutput = read_indexed(regions, index)?;
            assign(region_slot(output, hw.region_id)?, &hw);
            push_region_id(output, index, hw.region_id)?;
        }
        output.num_of_roi_regions = count as u32;
    } else {
        let mut total = output.num_of_roi_regions as usize;
        for index in 0..count {
            let hw: BfStats23HwOutput = read_indexed(regions, index)?;
            if region_slot(output, hw.region_id)?.horizontal1_sum == 0 {
                push_region_id(output, total, hw.region_id)?;
                total += 1;
            } else {
                trace!("BF region {} spans both stripes", hw.region_id);
            }
            accumulate(region_slot(output, hw.region_id)?, &hw);
        }
        output.num_of_roi_regions = total as u32;
    }

    Ok(())
}

/// Parses the BF buffer of a frame processed by a single IFE.
pub fn parse_bf_stats_buffer(
    buffer: &[u8],
    config: &BfStatsRoiConfig,
    has_frame_tag: bool,
    output: &mut ParsedBfStatsOutput,
) -> Result<(), StatsParseError> {
    if config.num_bf_stats_roi_dimension == 0 {
        return Err(StatsParseError::InvalidArg(
            "BF configuration has no region".into(),
        ));
    }

    output.num_of_roi_regions = 0;
    parse_stripe(buffer, config, has_frame_tag, output)
}

/// Parses a dual-IFE BF buffer in frame tag mode: two stripe buffers `BF_STATS_MAX_WIDTH` bytes
/// apart, each prefixed by its frame tag.
pub fn parse_bf_stats_dual_ife(
    buffer: &[u8],
    stripe_config: &[BfStatsRoiConfig; 2],
    output: &mut ParsedBfStatsOutput,
) -> Result<(), StatsParseError> {
    if stripe_config
        .iter()
        .all(|config| config.num_bf_stats_roi_dimension == 0)
    {
        return Err(StatsParseError::InvalidArg(
            "BF configuration has no region in either stripe".into(),
        ));
    }
    let right = buffer.get(BF_STATS_MAX_WIDTH..).ok_or(LayoutError {
        offset: BF_STATS_MAX_WIDTH,
        size: BF_STATS_MAX_WIDTH,
        len: buffer.len(),
    })?;

    // Regions spanning both stripes are detected by their non-zero sums, so nothing from the
    // previous frame may remain.
    output.clear();
    parse_stripe(buffer, &stripe_config[0], true, output)?;
    parse_stripe(right, &stripe_config[1], true, output)
}

/// Parses a dual-IFE BF buffer in index mode, where both stripes write their records back to
/// back and a merge bit flags the records completing a region of the other stripe.
pub fn parse_bf_stats_index_mode(
    buffer: &[u8],
    stripe_config: &[BfStatsRoiConfig; 2],
    output: &mut ParsedBfStatsOutput,
) -> Result<(), StatsParseError> {
    let counts = [
        checked_roi_count(&stripe_config[0])?,
        checked_roi_count(&stripe_config[1])?,
    ];
    if counts == [0, 0] {
        return Err(StatsParseError::InvalidArg(
            "BF configuration has no region in either stripe".into(),
        ));
    }

    // Merged records add to regions of this frame only.
    output.clear();

    let mut total = 0;
    for output_index in 0..counts[0] + counts[1] {
        let hw: BfStats25HwOutput = read_indexed(buffer, output_index)?;
        let region = hw.region;

        if hw.merge {
            accumulate(region_slot(output, region.region_id)?, &region);
        } else {
            assign(region_slot(output, region.region_id)?, &region);
            push_region_id(output, total, region.region_id)?;
            total += 1;
        }
    }
    output.num_of_roi_regions = total as u32;

    Ok(())
}
