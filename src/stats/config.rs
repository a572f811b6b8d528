// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Region configurations applied by the ISP when it produced a statistics buffer.

use enumn::N;

/// A rectangle in sensor pixel coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RoiRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Record layout selected for bayer grid and bayer exposure statistics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, N)]
#[repr(u32)]
pub enum BgBeOutputMode {
    Regular = 0,
    /// G and Y sums replace the Gr and Gb sums.
    YStatsEnabled = 1,
    /// Each region is followed by the sums of its saturated pixels.
    SaturationEnabled = 2,
}

impl Default for BgBeOutputMode {
    fn default() -> Self {
        BgBeOutputMode::Regular
    }
}

/// Bayer grid / bayer exposure configuration, used by HDR-BE, AWB-BG and Tintless-BG.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BgBeConfig {
    pub roi: RoiRect,
    pub horizontal_num: u32,
    pub vertical_num: u32,
    pub output_mode: BgBeOutputMode,
    pub output_bit_depth: u32,
    /// Per-channel saturation thresholds (R, Gr, Gb, B).
    pub channel_gain_threshold: [u32; 4],
}

impl BgBeConfig {
    pub fn num_regions(&self) -> usize {
        self.horizontal_num as usize * self.vertical_num as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, N)]
#[repr(u32)]
pub enum BfStatsRegionType {
    Primary = 0,
    Secondary = 1,
}

impl Default for BfStatsRegionType {
    fn default() -> Self {
        BfStatsRegionType::Primary
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BfStatsRoiDimension {
    pub region_type: BfStatsRegionType,
    pub region_id: u32,
    pub roi: RoiRect,
    pub is_valid: bool,
}

/// Focus regions requested from the BF engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BfStatsRoiConfig {
    /// Number of regions the hardware reports.
    pub num_bf_stats_roi_dimension: u32,
    pub bf_stats_roi_dimension: Vec<BfStatsRoiDimension>,
}

impl BfStatsRoiConfig {
    /// Splits `roi` into a `horizontal_num` x `vertical_num` grid of primary regions, numbered in
    /// raster order.
    pub fn grid(roi: RoiRect, horizontal_num: u32, vertical_num: u32) -> Self {
        let width = roi.width.checked_div(horizontal_num).unwrap_or(0);
        let height = roi.height.checked_div(vertical_num).unwrap_or(0);

        let bf_stats_roi_dimension: Vec<_> = (0..vertical_num)
            .flat_map(|v| (0..horizontal_num).map(move |h| (h, v)))
            .enumerate()
            .map(|(region_id, (h, v))| BfStatsRoiDimension {
                region_type: BfStatsRegionType::Primary,
                region_id: region_id as u32,
                roi: RoiRect {
                    left: roi.left + h * width,
                    top: roi.top + v * height,
                    width,
                    height,
                },
                is_valid: true,
            })
            .collect();

        Self {
            num_bf_stats_roi_dimension: bf_stats_roi_dimension.len() as u32,
            bf_stats_roi_dimension,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IHistConfig {
    pub roi: RoiRect,
    pub num_bins: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HdrBHistConfig {
    pub roi: RoiRect,
    pub num_bins: u32,
}

/// Channel accumulated by the BHist engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, N)]
#[repr(u32)]
pub enum ColorChannel {
    R = 0,
    Gr = 1,
    Gb = 2,
    B = 3,
    Y = 4,
}

impl Default for ColorChannel {
    fn default() -> Self {
        ColorChannel::Y
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BHistConfig {
    pub roi: RoiRect,
    pub num_bins: u32,
    pub channel_type: ColorChannel,
    /// Whether the bins are uniformly spaced.
    pub uniform: bool,
}

/// Column sum grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CsConfig {
    pub stats_h_num: u32,
    pub stats_v_num: u32,
    pub stats_rgn_width: u32,
    pub stats_rgn_height: u32,
}

/// Row sum grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RsConfig {
    pub stats_h_num: u32,
    pub stats_v_num: u32,
    pub stats_rgn_width: u32,
    pub stats_rgn_height: u32,
    pub bit_depth: u32,
}

/// Row sum grid requested by the anti-flicker algorithm for software generated statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AfdStatsControl {
    pub stats_config: RsConfig,
}

/// Configuration property published by the ISP for one statistics type.
///
/// In dual-IFE mode, `stripe_config[0]` describes the left stripe and `stripe_config[1]` the
/// right one, while `stats_config` keeps describing the whole frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IspStatsConfig<C> {
    pub request_id: u64,
    pub dual_ife_mode: bool,
    pub stats_config: C,
    pub stripe_config: [C; 2],
    /// Whether each stripe produced statistics. Only honored for HDR-BE.
    pub stripe_valid: [bool; 2],
}

impl<C: Default> Default for IspStatsConfig<C> {
    fn default() -> Self {
        Self {
            request_id: 0,
            dual_ife_mode: false,
            stats_config: Default::default(),
            stripe_config: Default::default(),
            stripe_valid: [true; 2],
        }
    }
}

impl<C: Clone + Default> IspStatsConfig<C> {
    /// Configuration of a frame processed by a single IFE.
    pub fn single(stats_config: C) -> Self {
        Self {
            stats_config,
            ..Default::default()
        }
    }

    /// Configuration of a frame split between two IFEs.
    pub fn dual(stats_config: C, left: C, right: C) -> Self {
        Self {
            dual_ife_mode: true,
            stats_config,
            stripe_config: [left, right],
            ..Default::default()
        }
    }
}

pub type IspBfStats = IspStatsConfig<BfStatsRoiConfig>;
pub type IspBgBeStats = IspStatsConfig<BgBeConfig>;
pub type IspIHistStats = IspStatsConfig<IHistConfig>;
pub type IspHdrBHistStats = IspStatsConfig<HdrBHistConfig>;
pub type IspBHistStats = IspStatsConfig<BHistConfig>;
pub type IspCsStats = IspStatsConfig<CsConfig>;
pub type IspRsStats = IspStatsConfig<RsConfig>;
