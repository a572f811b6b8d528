// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::PathBuf;
use std::str::FromStr;

use argh::FromArgs;

use titan_stats::stats::config::BgBeOutputMode;
use titan_stats::IspStatsType;
use titan_stats::TitanVersion;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct OutputMode(pub BgBeOutputMode);

impl FromStr for OutputMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(OutputMode(BgBeOutputMode::Regular)),
            "y" | "ystats" => Ok(OutputMode(BgBeOutputMode::YStatsEnabled)),
            "saturation" => Ok(OutputMode(BgBeOutputMode::SaturationEnabled)),
            _ => Err("unrecognized output mode. Valid values: regular, ystats, saturation"),
        }
    }
}

/// Decodes a dumped Titan statistics buffer and prints the parsed result.
#[derive(Debug, FromArgs)]
pub struct Args {
    /// raw statistics buffer, as written by the ISP
    #[argh(positional)]
    pub input: PathBuf,

    /// type of the statistics in the buffer
    #[argh(option)]
    pub stats_type: IspStatsType,

    /// titan hardware version, in hex. Default: 170
    #[argh(option, default = "TitanVersion::TITAN_170")]
    pub titan_version: TitanVersion,

    /// whether the buffer holds the two stripes of a dual-IFE frame, each with the geometry
    /// given on the command line
    #[argh(switch)]
    pub dual_ife: bool,

    /// number of horizontal regions (or columns of sums). Default: 1
    #[argh(option, default = "1")]
    pub horizontal_num: u32,

    /// number of vertical regions (or rows of sums). Default: 1
    #[argh(option, default = "1")]
    pub vertical_num: u32,

    /// number of histogram bins per channel. Default: 256
    #[argh(option, default = "256")]
    pub num_bins: u32,

    /// bayer grid output mode (regular, ystats or saturation). Default: regular
    #[argh(option, default = "OutputMode(BgBeOutputMode::Regular)")]
    pub output_mode: OutputMode,

    /// width of the image, for bpsregyuv
    #[argh(option, default = "0")]
    pub image_width: u32,

    /// height of the image, for bpsregyuv
    #[argh(option, default = "0")]
    pub image_height: u32,

    /// stride of the luma plane, for bpsregyuv. Default: the image width
    #[argh(option)]
    pub image_stride: Option<u32>,

    /// directory holding the software statistics library, for bpsregyuv
    #[argh(option)]
    pub library_dir: Option<PathBuf>,

    /// how many regions to print. Default: 16
    #[argh(option, default = "16")]
    pub max_regions: usize,
}
