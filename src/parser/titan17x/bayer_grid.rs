// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Bayer grid statistics: HDR-BE, AWB-BG, BPS AWB-BG and Tintless-BG.
//!
//! All of them divide the frame into a grid of regions and report per-channel sums and pixel
//! counts for each, in one of three record layouts selected by the configured output mode.

use log::trace;

use crate::hw::titan17x::layout::read_record;
use crate::hw::titan17x::layout::Bg15HwOutput;
use crate::hw::titan17x::layout::BgSat15HwOutput;
use crate::hw::titan17x::layout::BgYStats15HwOutput;
use crate::hw::titan17x::layout::HwRecord;
use crate::hw::titan17x::layout::LayoutError;
use crate::hw::titan17x::layout::TintlessBgYStats15HwOutput;
use crate::hw::titan17x::AWBBG_STATS_MAX_HORIZONTAL_REGIONS;
use crate::hw::titan17x::AWBBG_STATS_MAX_WIDTH;
use crate::hw::titan17x::BPS_AWBBG_STATS_MAX_WIDTH;
use crate::hw::titan17x::HDRBE_STATS_MAX_WIDTH;
use crate::hw::titan17x::TINTLESSBG_STATS_WIDTH;
use crate::parser::StatsParseError;
use crate::stats::config::BgBeConfig;
use crate::stats::config::BgBeOutputMode;
use crate::stats::config::IspBgBeStats;
use crate::stats::output::BayerChannelData;
use crate::stats::output::BgBeFlags;
use crate::stats::output::ParsedBgBeStatsOutput;
use crate::stats::output::ParsedTintlessBgStatsOutput;
use crate::stats::output::TintlessBgFlags;
use crate::stitch::Stripe;
use crate::stitch::StripeWalker;

/// Statistics types sharing [`ParsedBgBeStatsOutput`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BgBeStatsKind {
    HdrBe,
    AwbBg,
}

impl BgBeStatsKind {
    fn name(self) -> &'static str {
        match self {
            BgBeStatsKind::HdrBe => "HDR-BE",
            BgBeStatsKind::AwbBg => "AWB-BG",
        }
    }

    /// Offset of the right stripe in a dual-IFE buffer.
    fn stripe_width(self) -> usize {
        match self {
            BgBeStatsKind::HdrBe => HDRBE_STATS_MAX_WIDTH,
            BgBeStatsKind::AwbBg => AWBBG_STATS_MAX_WIDTH,
        }
    }

    fn degenerate_geometry(self, config: &BgBeConfig) -> StatsParseError {
        let msg = format!(
            "{} grid of {}x{} regions",
            self.name(),
            config.horizontal_num,
            config.vertical_num
        );
        match self {
            BgBeStatsKind::HdrBe => StatsParseError::InvalidArg(msg),
            BgBeStatsKind::AwbBg => StatsParseError::InvalidState(msg),
        }
    }

    fn honors_stripe_valid(self) -> bool {
        self == BgBeStatsKind::HdrBe
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RecordLayout {
    Regular,
    YStats,
    TintlessYStats,
    Saturation,
}

impl RecordLayout {
    fn for_bgbe(mode: BgBeOutputMode) -> Self {
        match mode {
            BgBeOutputMode::Regular => RecordLayout::Regular,
            BgBeOutputMode::YStatsEnabled => RecordLayout::YStats,
            BgBeOutputMode::SaturationEnabled => RecordLayout::Saturation,
        }
    }

    fn for_tintless(mode: BgBeOutputMode) -> Self {
        match mode {
            BgBeOutputMode::YStatsEnabled => RecordLayout::TintlessYStats,
            mode => Self::for_bgbe(mode),
        }
    }

    fn size(self) -> usize {
        match self {
            RecordLayout::Regular => Bg15HwOutput::SIZE,
            RecordLayout::YStats => BgYStats15HwOutput::SIZE,
            RecordLayout::TintlessYStats => TintlessBgYStats15HwOutput::SIZE,
            RecordLayout::Saturation => BgSat15HwOutput::SIZE,
        }
    }

    /// Decodes the record at `offset`. `saturation` is only written by the saturation layout.
    fn decode(
        self,
        buffer: &[u8],
        offset: usize,
        channel: &mut BayerChannelData,
        saturation: &mut BayerChannelData,
    ) -> Result<(), LayoutError> {
        match self {
            RecordLayout::Regular => {
                *channel = from_bg15(&read_record::<Bg15HwOutput>(buffer, offset)?);
            }
            RecordLayout::YStats => {
                *channel = from_y_stats(&read_record::<BgYStats15HwOutput>(buffer, offset)?);
            }
            RecordLayout::TintlessYStats => {
                *channel =
                    from_y_stats(&read_record::<TintlessBgYStats15HwOutput>(buffer, offset)?.0);
            }
            RecordLayout::Saturation => {
                let hw = read_record::<BgSat15HwOutput>(buffer, offset)?;
                *channel = from_bg15(&hw.channel);
                *saturation = from_bg15(&hw.saturation);
            }
        }
        Ok(())
    }
}

fn from_bg15(hw: &Bg15HwOutput) -> BayerChannelData {
    BayerChannelData {
        r_sum: hw.r_sum,
        b_sum: hw.b_sum,
        gr_sum: hw.gr_sum,
        gb_sum: hw.gb_sum,
        r_count: hw.r_count.into(),
        b_count: hw.b_count.into(),
        gr_count: hw.gr_count.into(),
        gb_count: hw.gb_count.into(),
    }
}

fn from_y_stats(hw: &BgYStats15HwOutput) -> BayerChannelData {
    BayerChannelData {
        r_sum: hw.r_sum,
        b_sum: hw.b_sum,
        gr_sum: hw.g_sum,
        gb_sum: hw.y_sum,
        r_count: hw.r_count.into(),
        b_count: hw.b_count.into(),
        gr_count: hw.g_count.into(),
        gb_count: hw.y_count.into(),
    }
}

/// Region arrays of an output, already checked to hold the regions being parsed.
struct GridTarget<'a> {
    channel: &'a mut [BayerChannelData],
    saturation: &'a mut [BayerChannelData],
}

impl GridTarget<'_> {
    fn fill(
        &mut self,
        buffer: &[u8],
        layout: RecordLayout,
        count: usize,
    ) -> Result<(), LayoutError> {
        for index in 0..count {
            layout.decode(
                buffer,
                index * layout.size(),
                &mut self.channel[index],
                &mut self.saturation[index],
            )?;
        }
        Ok(())
    }

    fn fill_stitched(
        &mut self,
        left: &[u8],
        right: &[u8],
        layout: RecordLayout,
        left_horiz_num: usize,
        right_horiz_num: usize,
        count: usize,
    ) -> Result<(), StatsParseError> {
        for slot in StripeWalker::new(left_horiz_num, right_horiz_num, count)? {
            let source = match slot.stripe {
                Stripe::Left => left,
                Stripe::Right => right,
            };
            layout.decode(
                source,
                slot.stripe_index * layout.size(),
                &mut self.channel[slot.output_index],
                &mut self.saturation[slot.output_index],
            )?;
        }
        Ok(())
    }
}

fn check_capacity(
    what: &'static str,
    count: usize,
    capacity: usize,
) -> Result<(), StatsParseError> {
    if count > capacity {
        return Err(StatsParseError::OutOfBounds {
            what,
            value: count,
            capacity,
        });
    }
    Ok(())
}

/// Stripes of a dual-IFE frame must describe the same rows in the same layout.
fn check_stripes_match(left: &BgBeConfig, right: &BgBeConfig) -> Result<(), StatsParseError> {
    if left.vertical_num != right.vertical_num || left.output_mode != right.output_mode {
        return Err(StatsParseError::InvalidArg(format!(
            "stripe mismatch: left has {} rows in {:?} mode, right has {} rows in {:?} mode",
            left.vertical_num, left.output_mode, right.vertical_num, right.output_mode
        )));
    }
    Ok(())
}

/// Width of the frame made of both stripes.
fn stitched_columns(what: &str, left: u32, right: u32) -> Result<u32, StatsParseError> {
    left.checked_add(right).ok_or_else(|| {
        StatsParseError::InvalidArg(format!("{what} stripes have {left} and {right} columns"))
    })
}

fn right_stripe(buffer: &[u8], stripe_width: usize) -> Result<&[u8], LayoutError> {
    buffer.get(stripe_width..).ok_or(LayoutError {
        offset: stripe_width,
        size: 0,
        len: buffer.len(),
    })
}

/// Sets the geometry and flags of `output` from `config`, returning the region count.
fn apply_bgbe_config(
    config: &BgBeConfig,
    kind: BgBeStatsKind,
    output: &mut ParsedBgBeStatsOutput,
) -> Result<usize, StatsParseError> {
    if config.horizontal_num == 0 || config.vertical_num == 0 {
        return Err(kind.degenerate_geometry(config));
    }
    let count = config.num_regions();
    check_capacity(kind.name(), count, output.capacity())?;

    output.num_rois = count as u32;
    output.horizontal_num = config.horizontal_num;
    output.flags = match config.output_mode {
        BgBeOutputMode::YStatsEnabled => BgBeFlags {
            has_sat_info: false,
            uses_y: true,
        },
        BgBeOutputMode::SaturationEnabled => BgBeFlags {
            has_sat_info: true,
            uses_y: false,
        },
        BgBeOutputMode::Regular => BgBeFlags::default(),
    };

    Ok(count)
}

fn bgbe_target(output: &mut ParsedBgBeStatsOutput) -> GridTarget<'_> {
    GridTarget {
        channel: &mut output.channel_data,
        saturation: &mut output.saturation_data,
    }
}

/// Parses an HDR-BE or AWB-BG buffer of a frame processed by a single IFE.
pub fn parse_bgbe_stats_buffer(
    buffer: &[u8],
    config: &BgBeConfig,
    kind: BgBeStatsKind,
    output: &mut ParsedBgBeStatsOutput,
) -> Result<(), StatsParseError> {
    let count = apply_bgbe_config(config, kind, output)?;
    let layout = RecordLayout::for_bgbe(config.output_mode);

    bgbe_target(output).fill(buffer, layout, count)?;
    Ok(())
}

/// Parses and stitches the two stripes of a dual-IFE HDR-BE or AWB-BG buffer.
pub fn parse_bgbe_stats_dual_ife(
    buffer: &[u8],
    stats: &IspBgBeStats,
    kind: BgBeStatsKind,
    output: &mut ParsedBgBeStatsOutput,
) -> Result<(), StatsParseError> {
    let [left, right] = &stats.stripe_config;
    let valid = if kind.honors_stripe_valid() {
        stats.stripe_valid
    } else {
        [true, true]
    };

    let reference = match valid {
        [true, true] => {
            check_stripes_match(left, right)?;
            left
        }
        [true, false] => left,
        [false, true] => right,
        [false, false] => {
            return Err(StatsParseError::InvalidArg(format!(
                "{} has no valid stripe",
                kind.name()
            )))
        }
    };
    let left_horiz_num = if valid[0] { left.horizontal_num } else { 0 };
    let right_horiz_num = if valid[1] { right.horizontal_num } else { 0 };
    trace!(
        "{} dual IFE: {} + {} columns, {} rows",
        kind.name(),
        left_horiz_num,
        right_horiz_num,
        reference.vertical_num
    );

    let frame = BgBeConfig {
        horizontal_num: stitched_columns(kind.name(), left_horiz_num, right_horiz_num)?,
        ..reference.clone()
    };
    let count = apply_bgbe_config(&frame, kind, output)?;
    let layout = RecordLayout::for_bgbe(frame.output_mode);
    let right_buffer = right_stripe(buffer, kind.stripe_width())?;

    bgbe_target(output).fill_stitched(
        buffer,
        right_buffer,
        layout,
        left_horiz_num as usize,
        right_horiz_num as usize,
        count,
    )
}

/// Parses a BPS AWB-BG buffer, whose grid rows are `BPS_AWBBG_STATS_MAX_WIDTH` bytes apart.
pub fn parse_bps_awbbg_stats_buffer(
    buffer: &[u8],
    config: &BgBeConfig,
    output: &mut ParsedBgBeStatsOutput,
) -> Result<(), StatsParseError> {
    let horizontal_num = config.horizontal_num as usize;
    check_capacity(
        "BPS AWB-BG columns",
        horizontal_num,
        AWBBG_STATS_MAX_HORIZONTAL_REGIONS,
    )?;
    apply_bgbe_config(config, BgBeStatsKind::AwbBg, output)?;
    let layout = RecordLayout::for_bgbe(config.output_mode);

    let target = bgbe_target(output);
    for row in 0..config.vertical_num as usize {
        for column in 0..horizontal_num {
            let index = row * horizontal_num + column;
            layout.decode(
                buffer,
                row * BPS_AWBBG_STATS_MAX_WIDTH + column * layout.size(),
                &mut target.channel[index],
                &mut target.saturation[index],
            )?;
        }
    }

    Ok(())
}

fn apply_tintless_config(
    config: &BgBeConfig,
    output: &mut ParsedTintlessBgStatsOutput,
) -> Result<usize, StatsParseError> {
    if config.horizontal_num == 0 || config.vertical_num == 0 {
        return Err(StatsParseError::InvalidState(format!(
            "Tintless-BG grid of {}x{} regions",
            config.horizontal_num, config.vertical_num
        )));
    }
    let count = config.num_regions();
    check_capacity("Tintless-BG", count, output.capacity())?;

    output.stats_bit_width = config.output_bit_depth;
    output.channel_gain_threshold = config.channel_gain_threshold;
    output.num_of_regions = count as u32;
    output.flags = TintlessBgFlags {
        has_y_stats: config.output_mode == BgBeOutputMode::YStatsEnabled,
        has_saturation_pixels: config.output_mode == BgBeOutputMode::SaturationEnabled,
    };

    Ok(count)
}

fn tintless_target(output: &mut ParsedTintlessBgStatsOutput) -> GridTarget<'_> {
    GridTarget {
        channel: &mut output.channel_data,
        saturation: &mut output.saturation_data,
    }
}

/// Parses a Tintless-BG buffer of a frame processed by a single IFE.
pub fn parse_tintless_bg_stats_buffer(
    buffer: &[u8],
    config: &BgBeConfig,
    output: &mut ParsedTintlessBgStatsOutput,
) -> Result<(), StatsParseError> {
    let count = apply_tintless_config(config, output)?;
    let layout = RecordLayout::for_tintless(config.output_mode);

    tintless_target(output).fill(buffer, layout, count)?;
    Ok(())
}

/// Parses and stitches the two stripes of a dual-IFE Tintless-BG buffer.
pub fn parse_tintless_bg_stats_dual_ife(
    buffer: &[u8],
    stripe_config: &[BgBeConfig; 2],
    output: &mut ParsedTintlessBgStatsOutput,
) -> Result<(), StatsParseError> {
    let [left, right] = stripe_config;
    check_stripes_match(left, right)?;

    let frame = BgBeConfig {
        horizontal_num: stitched_columns(
            "Tintless-BG",
            left.horizontal_num,
            right.horizontal_num,
        )?,
        ..left.clone()
    };
    let count = apply_tintless_config(&frame, output)?;
    let layout = RecordLayout::for_tintless(frame.output_mode);
    let right_buffer = right_stripe(buffer, TINTLESSBG_STATS_WIDTH)?;

    tintless_target(output).fill_stitched(
        buffer,
        right_buffer,
        layout,
        left.horizontal_num as usize,
        right.horizontal_num as usize,
        count,
    )
}
