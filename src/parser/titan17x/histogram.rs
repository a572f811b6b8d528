// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Histogram statistics: IHist, HDR-BHist and BHist.
//!
//! Histograms have no region grid, so the two stripes of a dual-IFE frame are merged by adding
//! their bins.

use crate::hw::titan17x::layout::read_indexed;
use crate::hw::titan17x::layout::read_record;
use crate::hw::titan17x::layout::BHist14HwBin;
use crate::hw::titan17x::layout::HdrBHist13HwBin;
use crate::hw::titan17x::layout::HwRecord;
use crate::hw::titan17x::layout::IHist12HwOutput;
use crate::hw::titan17x::BHIST_STATS_WIDTH;
use crate::hw::titan17x::HDRBHIST_STATS_MAX_WIDTH;
use crate::hw::titan17x::IHIST_STATS_WIDTH;
use crate::parser::StatsParseError;
use crate::stats::config::BHistConfig;
use crate::stats::config::HdrBHistConfig;
use crate::stats::config::IHistConfig;
use crate::stats::output::ParsedBHistStatsOutput;
use crate::stats::output::ParsedHdrBHistStatsOutput;
use crate::stats::output::ParsedIHistStatsOutput;

fn check_bins(
    what: &'static str,
    num_bins: u32,
    capacity: usize,
) -> Result<usize, StatsParseError> {
    let bins = num_bins as usize;
    if bins == 0 {
        return Err(StatsParseError::InvalidArg(format!("{what} configured with no bins")));
    }
    if bins > capacity {
        return Err(StatsParseError::OutOfBounds {
            what,
            value: bins,
            capacity,
        });
    }
    Ok(bins)
}

fn ihist_channels(output: &mut ParsedIHistStatsOutput) -> [&mut [u32]; 4] {
    [
        &mut output.ycc,
        &mut output.green,
        &mut output.blue,
        &mut output.red,
    ]
}

fn hw_ihist_channels(hw: &IHist12HwOutput) -> [&[u16]; 4] {
    [&hw.ycc, &hw.green, &hw.blue, &hw.red]
}

/// Parses an IHist buffer. All bins are copied; `num_bins` only tells how many are meaningful.
pub fn parse_ihist_stats_buffer(
    buffer: &[u8],
    config: &IHistConfig,
    output: &mut ParsedIHistStatsOutput,
) -> Result<(), StatsParseError> {
    check_bins("IHist", config.num_bins, output.ycc.len())?;
    let hw = read_record::<IHist12HwOutput>(buffer, 0)?;

    for (dst, src) in ihist_channels(output).into_iter().zip(hw_ihist_channels(&hw)) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = u32::from(*s);
        }
    }
    output.num_bins = config.num_bins;

    Ok(())
}

pub fn parse_ihist_stats_dual_ife(
    buffer: &[u8],
    stripe_config: &[IHistConfig; 2],
    output: &mut ParsedIHistStatsOutput,
) -> Result<(), StatsParseError> {
    parse_ihist_stats_buffer(buffer, &stripe_config[0], output)?;

    let bins = output.num_bins as usize;
    let right = read_record::<IHist12HwOutput>(buffer, IHIST_STATS_WIDTH)?;
    for (dst, src) in ihist_channels(output).into_iter().zip(hw_ihist_channels(&right)) {
        for (d, s) in dst.iter_mut().zip(src).take(bins) {
            *d += u32::from(*s);
        }
    }

    Ok(())
}

pub fn parse_hdr_bhist_stats_buffer(
    buffer: &[u8],
    config: &HdrBHistConfig,
    output: &mut ParsedHdrBHistStatsOutput,
) -> Result<(), StatsParseError> {
    let bins = check_bins("HDR-BHist", config.num_bins, output.red.len())?;

    for bin in 0..bins {
        let hw = read_indexed::<HdrBHist13HwBin>(buffer, bin)?;
        output.red[bin] = hw.red;
        output.green[bin] = hw.green;
        output.blue[bin] = hw.blue;
    }
    output.num_bins = config.num_bins;

    Ok(())
}

pub fn parse_hdr_bhist_stats_dual_ife(
    buffer: &[u8],
    stripe_config: &[HdrBHistConfig; 2],
    output: &mut ParsedHdrBHistStatsOutput,
) -> Result<(), StatsParseError> {
    parse_hdr_bhist_stats_buffer(buffer, &stripe_config[0], output)?;

    for bin in 0..output.num_bins as usize {
        let hw = read_record::<HdrBHist13HwBin>(
            buffer,
            HDRBHIST_STATS_MAX_WIDTH + bin * HdrBHist13HwBin::SIZE,
        )?;
        output.red[bin] += hw.red;
        output.green[bin] += hw.green;
        output.blue[bin] += hw.blue;
    }

    Ok(())
}

fn read_bhist_bins(
    buffer: &[u8],
    offset: usize,
    bins: usize,
    output: &mut ParsedBHistStatsOutput,
    accumulate: bool,
) -> Result<(), StatsParseError> {
    for (bin, value) in output.bins.iter_mut().take(bins).enumerate() {
        let count = read_record::<BHist14HwBin>(buffer, offset + bin * BHist14HwBin::SIZE)?.count;
        if accumulate {
            *value += count;
        } else {
            *value = count;
        }
    }
    Ok(())
}

fn apply_bhist_config(
    config: &BHistConfig,
    request_id: u64,
    output: &mut ParsedBHistStatsOutput,
) -> Result<usize, StatsParseError> {
    let bins = check_bins("BHist", config.num_bins, output.bins.len())?;

    output.request_id = request_id;
    output.num_bins = config.num_bins;
    output.channel_type = config.channel_type;
    output.uniform = config.uniform;

    Ok(bins)
}

/// Parses a BHist buffer for request `request_id`.
pub fn parse_bhist_stats_buffer(
    buffer: &[u8],
    config: &BHistConfig,
    request_id: u64,
    output: &mut ParsedBHistStatsOutput,
) -> Result<(), StatsParseError> {
    let bins = apply_bhist_config(config, request_id, output)?;
    read_bhist_bins(buffer, 0, bins, output, false)
}

pub fn parse_bhist_stats_dual_ife(
    buffer: &[u8],
    stripe_config: &[BHistConfig; 2],
    request_id: u64,
    output: &mut ParsedBHistStatsOutput,
) -> Result<(), StatsParseError> {
    let [left, right] = stripe_config;
    if left.num_bins != right.num_bins {
        return Err(StatsParseError::InvalidArg(format!(
            "BHist stripes have {} and {} bins",
            left.num_bins, right.num_bins
        )));
    }

    let bins = apply_bhist_config(left, request_id, output)?;
    read_bhist_bins(buffer, 0, bins, output, false)?;
    read_bhist_bins(buffer, BHIST_STATS_WIDTH, bins, output, true)
}

#[cfg(test)]
mod tests {
    use byteorder::ByteOrder;
    use byteorder::LittleEndian;

    use super::*;
    use crate::hw::titan17x::layout::pack_fields;
    use crate::parser::ResultCode;
    use crate::stats::config::ColorChannel;

    fn ihist_buffer(ycc: u16, red: u16) -> Vec<u8> {
        let mut raw = vec![0u8; IHIST_STATS_WIDTH];
        for bin in 0..256 {
            LittleEndian::write_u16(&mut raw[bin * 2..], ycc);
            LittleEndian::write_u16(&mut raw[1536 + bin * 2..], red);
        }
        raw
    }

    #[test]
    fn ihist_single_and_dual() {
        let config = IHistConfig {
            num_bins: 256,
            ..Default::default()
        };
        let mut output = ParsedIHistStatsOutput::default();

        parse_ihist_stats_buffer(&ihist_buffer(7, 0xffff), &config, &mut output).unwrap();
        assert_eq!(output.num_bins, 256);
        assert_eq!(output.ycc[255], 7);
        assert_eq!(output.red[0], 0xffff);

        let mut buffer = ihist_buffer(7, 0xffff);
        buffer.extend(ihist_buffer(1, 0xffff));
        let stripes = [config.clone(), config];
        parse_ihist_stats_dual_ife(&buffer, &stripes, &mut output).unwrap();

        assert_eq!(output.ycc[10], 8);
        // Two saturated 16-bit bins do not wrap.
        assert_eq!(output.red[10], 0x1fffe);
    }

    #[test]
    fn ihist_dual_merges_configured_bins_only() {
        let config = IHistConfig {
            num_bins: 16,
            ..Default::default()
        };
        let mut buffer = ihist_buffer(3, 0);
        buffer.extend(ihist_buffer(4, 0));
        let mut output = ParsedIHistStatsOutput::default();

        parse_ihist_stats_dual_ife(&buffer, &[config.clone(), config], &mut output).unwrap();

        assert_eq!(output.ycc[15], 7);
        assert_eq!(output.ycc[16], 3);
    }

    #[test]
    fn hdr_bhist_dual_adds_stripes() {
        let bin = |r, g, b| pack_fields(&[(r, 32), (g, 32), (b, 32)]);
        let mut buffer: Vec<u8> = [bin(1, 2, 3), bin(4, 5, 6)].concat();
        buffer.resize(HDRBHIST_STATS_MAX_WIDTH, 0);
        buffer.extend([bin(10, 20, 30), bin(40, 50, 60)].concat());
        let config = HdrBHistConfig {
            num_bins: 2,
            ..Default::default()
        };
        let mut output = ParsedHdrBHistStatsOutput::default();

        parse_hdr_bhist_stats_dual_ife(&buffer, &[config.clone(), config], &mut output).unwrap();

        assert_eq!(output.num_bins, 2);
        assert_eq!(output.red[..2], [11, 44]);
        assert_eq!(output.green[..2], [22, 55]);
        assert_eq!(output.blue[..2], [33, 66]);
    }

    #[test]
    fn bhist_carries_config() {
        let buffer: Vec<u8> = [5u32, 6, 7]
            .iter()
            .flat_map(|count| count.to_le_bytes())
            .collect();
        let config = BHistConfig {
            num_bins: 3,
            channel_type: ColorChannel::Gr,
            uniform: true,
            ..Default::default()
        };
        let mut output = ParsedBHistStatsOutput::default();

        parse_bhist_stats_buffer(&buffer, &config, 42, &mut output).unwrap();

        assert_eq!(output.request_id, 42);
        assert_eq!(output.num_bins, 3);
        assert_eq!(output.channel_type, ColorChannel::Gr);
        assert!(output.uniform);
        assert_eq!(output.bins[..3], [5, 6, 7]);
    }

    #[test]
    fn bhist_dual() {
        let mut buffer = vec![0u8; BHIST_STATS_WIDTH + 8];
        LittleEndian::write_u32(&mut buffer[0..], 1);
        LittleEndian::write_u32(&mut buffer[4..], 2);
        LittleEndian::write_u32(&mut buffer[BHIST_STATS_WIDTH..], 10);
        LittleEndian::write_u32(&mut buffer[BHIST_STATS_WIDTH + 4..], 20);
        let config = BHistConfig {
            num_bins: 2,
            ..Default::default()
        };
        let mut output = ParsedBHistStatsOutput::default();

        parse_bhist_stats_dual_ife(&buffer, &[config.clone(), config.clone()], 7, &mut output)
            .unwrap();
        assert_eq!(output.bins[..2], [11, 22]);

        let other = BHistConfig {
            num_bins: 4,
            ..Default::default()
        };
        let err = parse_bhist_stats_dual_ife(&buffer, &[config, other], 7, &mut output);
        assert_eq!(err.unwrap_err().code(), ResultCode::InvalidArg);
    }

    #[test]
    fn bin_count_limits() {
        let mut output = ParsedBHistStatsOutput::default();
        let none = BHistConfig::default();
        assert_eq!(
            parse_bhist_stats_buffer(&[], &none, 0, &mut output)
                .unwrap_err()
                .code(),
            ResultCode::InvalidArg
        );

        let mut output = ParsedHdrBHistStatsOutput::default();
        let too_many = HdrBHistConfig {
            num_bins: 257,
            ..Default::default()
        };
        assert_eq!(
            parse_hdr_bhist_stats_buffer(&[], &too_many, &mut output)
                .unwrap_err()
                .code(),
            ResultCode::OutOfBounds
        );

        // A truncated buffer is reported, never read past.
        let short = HdrBHistConfig {
            num_bins: 2,
            ..Default::default()
        };
        assert!(matches!(
            parse_hdr_bhist_stats_buffer(&[0; 12], &short, &mut output),
            Err(StatsParseError::Layout(_))
        ));
    }
}
