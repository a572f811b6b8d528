// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Parsing of Titan ISP hardware statistics.
//!
//! The ISP writes its 3A statistics (focus, exposure, white balance, histograms and column/row
//! sums) into bit-packed memory buffers. This crate decodes those buffers into typed,
//! fixed-capacity outputs, stitches the left and right stripes produced in dual-IFE mode, and
//! publishes the results through a property store supplied by the owning pipeline node.
//!
//! The entry point is [`parser::titan17x::Titan17xStatsParser`], driven through the
//! [`parser::StatsParser`] trait.

pub mod hw;
pub mod node;
pub mod parser;
pub mod software_stats;
pub mod stats;
pub mod stitch;

use std::fmt;
use std::str::FromStr;

use enumn::N;

/// Statistics types produced by the ISP.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, N)]
#[repr(u32)]
pub enum IspStatsType {
    HdrBe = 0,
    HdrBHist = 1,
    AwbBg = 2,
    Rs = 3,
    Cs = 4,
    IHist = 5,
    BHist = 6,
    Bf = 7,
    TintlessBg = 8,
    BpsAwbBg = 9,
    BpsRegYuv = 10,
}

impl IspStatsType {
    pub const ALL: [IspStatsType; 11] = [
        IspStatsType::HdrBe,
        IspStatsType::HdrBHist,
        IspStatsType::AwbBg,
        IspStatsType::Rs,
        IspStatsType::Cs,
        IspStatsType::IHist,
        IspStatsType::BHist,
        IspStatsType::Bf,
        IspStatsType::TintlessBg,
        IspStatsType::BpsAwbBg,
        IspStatsType::BpsRegYuv,
    ];

    fn name(&self) -> &'static str {
        match self {
            IspStatsType::HdrBe => "hdrbe",
            IspStatsType::HdrBHist => "hdrbhist",
            IspStatsType::AwbBg => "awbbg",
            IspStatsType::Rs => "rs",
            IspStatsType::Cs => "cs",
            IspStatsType::IHist => "ihist",
            IspStatsType::BHist => "bhist",
            IspStatsType::Bf => "bf",
            IspStatsType::TintlessBg => "tintlessbg",
            IspStatsType::BpsAwbBg => "bpsawbbg",
            IspStatsType::BpsRegYuv => "bpsregyuv",
        }
    }
}

impl fmt::Display for IspStatsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IspStatsType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        IspStatsType::ALL.into_iter().find(|t| t.name() == lower).ok_or(
            "unrecognized stats type. Valid values: hdrbe, hdrbhist, awbbg, rs, cs, ihist, bhist, \
             bf, tintlessbg, bpsawbbg, bpsregyuv",
        )
    }
}

/// Version of the Titan camera hardware, encoded as `0xMMm` (e.g. `0x170`, `0x480`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TitanVersion(pub u32);

impl TitanVersion {
    pub const TITAN_170: TitanVersion = TitanVersion(0x170);
    pub const TITAN_175: TitanVersion = TitanVersion(0x175);
    pub const TITAN_480: TitanVersion = TitanVersion(0x480);

    /// Titan 480 and later drop the BF frame tag and report BF regions in index mode.
    pub fn uses_bf_index_mode(&self) -> bool {
        *self >= TitanVersion::TITAN_480
    }
}

impl Default for TitanVersion {
    fn default() -> Self {
        TitanVersion::TITAN_170
    }
}

impl fmt::Display for TitanVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for TitanVersion {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim_start_matches("0x").trim_start_matches("titan");
        u32::from_str_radix(digits, 16)
            .map(TitanVersion)
            .map_err(|_| "unrecognized titan version. Expected a hex value such as 170 or 480")
    }
}

/// Geometry of an image plane handed to the software statistics path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageFormat {
    pub width: u32,
    pub height: u32,
    /// Distance in bytes between two lines of the luma plane.
    pub stride: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_type_from_str() {
        assert_eq!("BF".parse::<IspStatsType>(), Ok(IspStatsType::Bf));
        assert_eq!("tintlessbg".parse::<IspStatsType>(), Ok(IspStatsType::TintlessBg));
        assert!("pdaf".parse::<IspStatsType>().is_err());
        for t in IspStatsType::ALL {
            assert_eq!(t.to_string().parse::<IspStatsType>(), Ok(t));
            assert_eq!(IspStatsType::n(t as u32), Some(t));
        }
    }

    #[test]
    fn titan_version() {
        assert_eq!("480".parse::<TitanVersion>(), Ok(TitanVersion::TITAN_480));
        assert_eq!("0x175".parse::<TitanVersion>(), Ok(TitanVersion::TITAN_175));
        assert!(!TitanVersion::default().uses_bf_index_mode());
        assert!(TitanVersion::TITAN_480.uses_bf_index_mode());
        assert!(TitanVersion(0x580).uses_bf_index_mode());
    }
}
