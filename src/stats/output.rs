// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Parsed statistics outputs.
//!
//! Each output is allocated once at its hardware maximum and reused for every frame. Parsing
//! only resets the fields that bound the valid data (region or bin counts) and overwrites the
//! entries it produces, so entries beyond the current count keep stale values from earlier
//! frames and must not be read.

use crate::hw::titan17x::BF_MAX_ROI_REGIONS;
use crate::hw::titan17x::BHIST_STATS_BINS_PER_CHANNEL;
use crate::hw::titan17x::CS_STATS_MAX_HORIZONTAL_REGIONS;
use crate::hw::titan17x::CS_STATS_MAX_VERTICAL_REGIONS;
use crate::hw::titan17x::HDRBHIST_STATS_MAX_BINS;
use crate::hw::titan17x::IHIST_STATS_BINS_PER_CHANNEL;
use crate::hw::titan17x::MAX_AWBBG_STATS_NUM;
use crate::hw::titan17x::MAX_HDRBE_STATS_NUM;
use crate::hw::titan17x::MAX_TINTLESSBG_STATS_NUM;
use crate::hw::titan17x::RS_STATS_MAX_HORIZONTAL_REGIONS;
use crate::hw::titan17x::RS_STATS_MAX_VERTICAL_REGIONS;
use crate::stats::config::ColorChannel;

/// Focus statistics of one BF region.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BfRegionStats {
    pub horizontal1_sum: u64,
    pub horizontal1_num: u32,
    pub horizontal1_sharpness: u64,
    pub vertical_sum: u64,
    pub vertical_num: u32,
    pub vertical_sharpness: u64,
    /// Region selection bit reported by the hardware.
    pub region_sel: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedBfStatsOutput {
    /// Frame tag prefixing the hardware buffer, 0 when the hardware does not emit one.
    pub frame_tag: u64,
    /// Number of valid entries in `region_id`.
    pub num_of_roi_regions: u32,
    /// Region IDs in the order they were reported.
    pub region_id: Vec<u32>,
    /// Per-region statistics, indexed by region ID.
    pub regions: Vec<BfRegionStats>,
}

impl Default for ParsedBfStatsOutput {
    fn default() -> Self {
        Self {
            frame_tag: 0,
            num_of_roi_regions: 0,
            region_id: vec![0; BF_MAX_ROI_REGIONS],
            regions: vec![Default::default(); BF_MAX_ROI_REGIONS],
        }
    }
}

impl ParsedBfStatsOutput {
    /// Zeroes every region. Needed before accumulating the two stripes of a dual-IFE frame.
    pub fn clear(&mut self) {
        self.frame_tag = 0;
        self.num_of_roi_regions = 0;
        self.region_id.fill(0);
        self.regions.fill(Default::default());
    }

    /// Iterates over the reported regions as `(region_id, stats)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BfRegionStats)> {
        self.region_id
            .iter()
            .take(self.num_of_roi_regions as usize)
            .filter_map(|&id| self.regions.get(id as usize).map(|stats| (id, stats)))
    }
}

/// Sums and pixel counts of one bayer grid region.
///
/// In Y statistics mode the `gr_*` fields carry the G channel and the `gb_*` fields carry Y.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BayerChannelData {
    pub r_sum: u32,
    pub b_sum: u32,
    pub gr_sum: u32,
    pub gb_sum: u32,
    pub r_count: u32,
    pub b_count: u32,
    pub gr_count: u32,
    pub gb_count: u32,
}

/// Channel sums of one region folded into R, G and B.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RgbChannelData {
    pub r_sum: u64,
    pub r_count: u64,
    pub g_sum: u64,
    pub g_count: u64,
    pub b_sum: u64,
    pub b_count: u64,
}

impl RgbChannelData {
    /// Per-channel averages, 0 for channels without any pixel.
    pub fn averages(&self) -> [u32; 3] {
        [
            (self.r_sum.checked_div(self.r_count).unwrap_or(0)) as u32,
            (self.g_sum.checked_div(self.g_count).unwrap_or(0)) as u32,
            (self.b_sum.checked_div(self.b_count).unwrap_or(0)) as u32,
        ]
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BgBeFlags {
    pub has_sat_info: bool,
    pub uses_y: bool,
}

/// Parsed HDR-BE or AWB-BG statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedBgBeStatsOutput {
    pub flags: BgBeFlags,
    pub num_rois: u32,
    /// Horizontal region count of the frame, used to locate a region in the grid.
    pub horizontal_num: u32,
    pub channel_data: Vec<BayerChannelData>,
    /// Saturated pixel sums, only written when `flags.has_sat_info` is set.
    pub saturation_data: Vec<BayerChannelData>,
}

impl ParsedBgBeStatsOutput {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            flags: Default::default(),
            num_rois: 0,
            horizontal_num: 0,
            channel_data: vec![Default::default(); capacity],
            saturation_data: vec![Default::default(); capacity],
        }
    }

    pub fn new_hdrbe() -> Self {
        Self::with_capacity(MAX_HDRBE_STATS_NUM)
    }

    pub fn new_awbbg() -> Self {
        Self::with_capacity(MAX_AWBBG_STATS_NUM)
    }

    pub fn capacity(&self) -> usize {
        self.channel_data.len().min(self.saturation_data.len())
    }

    /// Returns the R/G/B view of region `index`, or `None` past the parsed regions.
    pub fn rgb_channel(&self, index: usize) -> Option<RgbChannelData> {
        if index >= self.num_rois as usize {
            return None;
        }
        let data = self.channel_data.get(index)?;

        let (g_sum, g_count) = if self.flags.uses_y {
            (u64::from(data.gr_sum), u64::from(data.gr_count))
        } else {
            (
                u64::from(data.gr_sum) + u64::from(data.gb_sum),
                u64::from(data.gr_count) + u64::from(data.gb_count),
            )
        };

        Some(RgbChannelData {
            r_sum: data.r_sum.into(),
            r_count: data.r_count.into(),
            g_sum,
            g_count,
            b_sum: data.b_sum.into(),
            b_count: data.b_count.into(),
        })
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TintlessBgFlags {
    pub has_y_stats: bool,
    pub has_saturation_pixels: bool,
}

/// Parsed Tintless-BG statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedTintlessBgStatsOutput {
    pub flags: TintlessBgFlags,
    pub stats_bit_width: u32,
    pub channel_gain_threshold: [u32; 4],
    pub num_of_regions: u32,
    pub channel_data: Vec<BayerChannelData>,
    pub saturation_data: Vec<BayerChannelData>,
}

impl Default for ParsedTintlessBgStatsOutput {
    fn default() -> Self {
        Self {
            flags: Default::default(),
            stats_bit_width: 0,
            channel_gain_threshold: [0; 4],
            num_of_regions: 0,
            channel_data: vec![Default::default(); MAX_TINTLESSBG_STATS_NUM],
            saturation_data: vec![Default::default(); MAX_TINTLESSBG_STATS_NUM],
        }
    }
}

impl ParsedTintlessBgStatsOutput {
    pub fn capacity(&self) -> usize {
        self.channel_data.len().min(self.saturation_data.len())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedIHistStatsOutput {
    pub num_bins: u32,
    pub ycc: [u32; IHIST_STATS_BINS_PER_CHANNEL],
    pub green: [u32; IHIST_STATS_BINS_PER_CHANNEL],
    pub blue: [u32; IHIST_STATS_BINS_PER_CHANNEL],
    pub red: [u32; IHIST_STATS_BINS_PER_CHANNEL],
}

impl Default for ParsedIHistStatsOutput {
    fn default() -> Self {
        Self {
            num_bins: 0,
            ycc: [0; IHIST_STATS_BINS_PER_CHANNEL],
            green: [0; IHIST_STATS_BINS_PER_CHANNEL],
            blue: [0; IHIST_STATS_BINS_PER_CHANNEL],
            red: [0; IHIST_STATS_BINS_PER_CHANNEL],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedHdrBHistStatsOutput {
    pub num_bins: u32,
    pub red: [u32; HDRBHIST_STATS_MAX_BINS],
    pub green: [u32; HDRBHIST_STATS_MAX_BINS],
    pub blue: [u32; HDRBHIST_STATS_MAX_BINS],
}

impl Default for ParsedHdrBHistStatsOutput {
    fn default() -> Self {
        Self {
            num_bins: 0,
            red: [0; HDRBHIST_STATS_MAX_BINS],
            green: [0; HDRBHIST_STATS_MAX_BINS],
            blue: [0; HDRBHIST_STATS_MAX_BINS],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedBHistStatsOutput {
    pub request_id: u64,
    pub channel_type: ColorChannel,
    pub uniform: bool,
    pub num_bins: u32,
    pub bins: Vec<u32>,
}

impl Default for ParsedBHistStatsOutput {
    fn default() -> Self {
        Self {
            request_id: 0,
            channel_type: Default::default(),
            uniform: false,
            num_bins: 0,
            bins: vec![0; BHIST_STATS_BINS_PER_CHANNEL],
        }
    }
}

/// Column sums, indexed `column_sum[horizontal][vertical]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCsStatsOutput {
    pub num_horizontal_regions: u32,
    pub num_vertical_regions: u32,
    pub column_sum: Vec<[u32; CS_STATS_MAX_VERTICAL_REGIONS]>,
}

impl Default for ParsedCsStatsOutput {
    fn default() -> Self {
        Self {
            num_horizontal_regions: 0,
            num_vertical_regions: 0,
            column_sum: vec![[0; CS_STATS_MAX_VERTICAL_REGIONS]; CS_STATS_MAX_HORIZONTAL_REGIONS],
        }
    }
}

/// Row sums, indexed `row_sum[horizontal][vertical]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRsStatsOutput {
    pub num_horizontal_regions: u32,
    pub num_vertical_regions: u32,
    pub row_sum: Vec<[u32; RS_STATS_MAX_VERTICAL_REGIONS]>,
}

impl Default for ParsedRsStatsOutput {
    fn default() -> Self {
        Self {
            num_horizontal_regions: 0,
            num_vertical_regions: 0,
            row_sum: vec![[0; RS_STATS_MAX_VERTICAL_REGIONS]; RS_STATS_MAX_HORIZONTAL_REGIONS],
        }
    }
}

/// A parsed output lent to the property store.
#[derive(Copy, Clone, Debug)]
pub enum ParsedStats<'a> {
    Bf(&'a ParsedBfStatsOutput),
    BgBe(&'a ParsedBgBeStatsOutput),
    TintlessBg(&'a ParsedTintlessBgStatsOutput),
    IHist(&'a ParsedIHistStatsOutput),
    HdrBHist(&'a ParsedHdrBHistStatsOutput),
    BHist(&'a ParsedBHistStatsOutput),
    Cs(&'a ParsedCsStatsOutput),
    Rs(&'a ParsedRsStatsOutput),
}

/// The output a parse call fills in place.
#[derive(Debug)]
pub enum ParsedStatsMut<'a> {
    Bf(&'a mut ParsedBfStatsOutput),
    BgBe(&'a mut ParsedBgBeStatsOutput),
    TintlessBg(&'a mut ParsedTintlessBgStatsOutput),
    IHist(&'a mut ParsedIHistStatsOutput),
    HdrBHist(&'a mut ParsedHdrBHistStatsOutput),
    BHist(&'a mut ParsedBHistStatsOutput),
    Cs(&'a mut ParsedCsStatsOutput),
    Rs(&'a mut ParsedRsStatsOutput),
}

impl ParsedStatsMut<'_> {
    pub fn as_stats(&self) -> ParsedStats<'_> {
        match self {
            ParsedStatsMut::Bf(o) => ParsedStats::Bf(o),
            ParsedStatsMut::BgBe(o) => ParsedStats::BgBe(o),
            ParsedStatsMut::TintlessBg(o) => ParsedStats::TintlessBg(o),
            ParsedStatsMut::IHist(o) => ParsedStats::IHist(o),
            ParsedStatsMut::HdrBHist(o) => ParsedStats::HdrBHist(o),
            ParsedStatsMut::BHist(o) => ParsedStats::BHist(o),
            ParsedStatsMut::Cs(o) => ParsedStats::Cs(o),
            ParsedStatsMut::Rs(o) => ParsedStats::Rs(o),
        }
    }
}

/// Owned counterpart of [`ParsedStats`], for stores that keep a copy of what they are given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnedParsedStats {
    Bf(Box<ParsedBfStatsOutput>),
    BgBe(Box<ParsedBgBeStatsOutput>),
    TintlessBg(Box<ParsedTintlessBgStatsOutput>),
    IHist(Box<ParsedIHistStatsOutput>),
    HdrBHist(Box<ParsedHdrBHistStatsOutput>),
    BHist(Box<ParsedBHistStatsOutput>),
    Cs(Box<ParsedCsStatsOutput>),
    Rs(Box<ParsedRsStatsOutput>),
}

impl From<ParsedStats<'_>> for OwnedParsedStats {
    fn from(stats: ParsedStats<'_>) -> Self {
        match stats {
            ParsedStats::Bf(o) => OwnedParsedStats::Bf(Box::new(o.clone())),
            ParsedStats::BgBe(o) => OwnedParsedStats::BgBe(Box::new(o.clone())),
            ParsedStats::TintlessBg(o) => OwnedParsedStats::TintlessBg(Box::new(o.clone())),
            ParsedStats::IHist(o) => OwnedParsedStats::IHist(Box::new(o.clone())),
            ParsedStats::HdrBHist(o) => OwnedParsedStats::HdrBHist(Box::new(o.clone())),
            ParsedStats::BHist(o) => OwnedParsedStats::BHist(Box::new(o.clone())),
            ParsedStats::Cs(o) => OwnedParsedStats::Cs(Box::new(o.clone())),
            ParsedStats::Rs(o) => OwnedParsedStats::Rs(Box::new(o.clone())),
        }
    }
}
