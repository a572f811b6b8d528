// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Capacities and stripe strides of the Titan17x statistics buffers.
//!
//! In dual-IFE mode both stripes share one buffer: the right stripe starts at the per-type
//! stripe width below.

pub mod layout;

use layout::BHist14HwBin;
use layout::BfStats23HwOutput;
use layout::BgSat15HwOutput;
use layout::HdrBHist13HwBin;
use layout::HwRecord;
use layout::IHist12HwOutput;

/// HDR-BE region grid.
pub const HDRBE_STATS_MAX_HORIZONTAL_REGIONS: usize = 64;
pub const HDRBE_STATS_MAX_VERTICAL_REGIONS: usize = 48;
pub const MAX_HDRBE_STATS_NUM: usize =
    HDRBE_STATS_MAX_HORIZONTAL_REGIONS * HDRBE_STATS_MAX_VERTICAL_REGIONS;
pub const HDRBE_STATS_MAX_WIDTH: usize = BgSat15HwOutput::SIZE * MAX_HDRBE_STATS_NUM;

/// AWB-BG region grid.
pub const AWBBG_STATS_MAX_HORIZONTAL_REGIONS: usize = 160;
pub const AWBBG_STATS_MAX_VERTICAL_REGIONS: usize = 90;
pub const MAX_AWBBG_STATS_NUM: usize =
    AWBBG_STATS_MAX_HORIZONTAL_REGIONS * AWBBG_STATS_MAX_VERTICAL_REGIONS;
pub const AWBBG_STATS_MAX_WIDTH: usize = BgSat15HwOutput::SIZE * MAX_AWBBG_STATS_NUM;
/// Row stride of the BPS AWB-BG buffer.
pub const BPS_AWBBG_STATS_MAX_WIDTH: usize =
    BgSat15HwOutput::SIZE * AWBBG_STATS_MAX_HORIZONTAL_REGIONS;

/// Tintless-BG region grid.
pub const TINTLESSBG_STATS_MAX_HORIZONTAL_REGIONS: usize = 64;
pub const TINTLESSBG_STATS_MAX_VERTICAL_REGIONS: usize = 48;
pub const MAX_TINTLESSBG_STATS_NUM: usize =
    TINTLESSBG_STATS_MAX_HORIZONTAL_REGIONS * TINTLESSBG_STATS_MAX_VERTICAL_REGIONS;
pub const TINTLESSBG_STATS_WIDTH: usize = BgSat15HwOutput::SIZE * MAX_TINTLESSBG_STATS_NUM;

/// BF regions.
pub const BF_STATS_MAX_REGIONS: usize = 180;
pub const BF_MAX_ROI_REGIONS: usize = BF_STATS_MAX_REGIONS;
/// Frame tag word followed by four 64-bit words per region.
pub const BF_STATS_MAX_ENTRIES: usize = 4 * BF_STATS_MAX_REGIONS + 1;
pub const BF_STATS_MAX_WIDTH: usize = BF_STATS_MAX_ENTRIES * 8;
/// Size of the frame tag prefixing BF buffers before Titan 480.
pub const BF_FRAME_TAG_SIZE: usize = 8;
/// The AF config is never read fewer than this many requests back.
pub const MIN_AF_PIPELINE_DELAY: u64 = 3;

/// BHist bins per channel.
pub const BHIST_STATS_BINS_PER_CHANNEL: usize = 1024;
pub const BHIST_STATS_WIDTH: usize = BHIST_STATS_BINS_PER_CHANNEL * 4 * BHist14HwBin::SIZE;

/// IHist bins per channel.
pub const IHIST_STATS_BINS_PER_CHANNEL: usize = 256;
pub const IHIST_STATS_WIDTH: usize = IHist12HwOutput::SIZE;

/// HDR-BHist bins per channel.
pub const HDRBHIST_STATS_MAX_BINS: usize = 256;
pub const HDRBHIST_STATS_MAX_WIDTH: usize = HDRBHIST_STATS_MAX_BINS * HdrBHist13HwBin::SIZE;

/// CS region grid.
pub const CS_STATS_MAX_HORIZONTAL_REGIONS: usize = 1560;
pub const CS_STATS_MAX_VERTICAL_REGIONS: usize = 4;
pub const CS_STATS_WIDTH: usize =
    CS_STATS_MAX_HORIZONTAL_REGIONS * CS_STATS_MAX_VERTICAL_REGIONS * 2;

/// RS region grid.
pub const RS_STATS_MAX_HORIZONTAL_REGIONS: usize = 16;
pub const RS_STATS_MAX_VERTICAL_REGIONS: usize = 1024;
pub const RS_STATS_WIDTH: usize =
    RS_STATS_MAX_HORIZONTAL_REGIONS * RS_STATS_MAX_VERTICAL_REGIONS * 2;
/// Bit depth reported for software generated row sums.
pub const RS_STATS_CONFIG_BIT_DEPTH: u32 = 8;

const _: () = assert!(HDRBE_STATS_MAX_WIDTH == 147456);
const _: () = assert!(AWBBG_STATS_MAX_WIDTH == 691200);
const _: () = assert!(BPS_AWBBG_STATS_MAX_WIDTH == 7680);
const _: () = assert!(TINTLESSBG_STATS_WIDTH == 147456);
const _: () = assert!(BF_STATS_MAX_WIDTH == 5768);
const _: () = assert!(
    BF_STATS_MAX_WIDTH >= BF_FRAME_TAG_SIZE + BF_STATS_MAX_REGIONS * BfStats23HwOutput::SIZE
);
const _: () = assert!(BHIST_STATS_WIDTH == 16384);
const _: () = assert!(IHIST_STATS_WIDTH == 2048);
const _: () = assert!(HDRBHIST_STATS_MAX_WIDTH == 3072);
const _: () = assert!(CS_STATS_WIDTH == 12480);
const _: () = assert!(RS_STATS_WIDTH == 32768);
