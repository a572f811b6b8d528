// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Column sum (CS) and row sum (RS) statistics.
//!
//! Both are flat arrays of 16-bit sums, one per region, walked row by row. Outputs are indexed
//! `[horizontal][vertical]`, so a dual-IFE frame places the right stripe's columns after the
//! left stripe's.

use bytes::Buf;

use crate::hw::titan17x::layout::LayoutError;
use crate::hw::titan17x::CS_STATS_WIDTH;
use crate::hw::titan17x::RS_STATS_WIDTH;
use crate::parser::StatsParseError;
use crate::stats::config::CsConfig;
use crate::stats::config::RsConfig;
use crate::stats::output::ParsedCsStatsOutput;
use crate::stats::output::ParsedRsStatsOutput;

/// Reads an `horizontal_num` x `vertical_num` grid of sums from `buffer` into `sums[h][v]`.
fn read_sum_grid<const V: usize>(
    what: &'static str,
    buffer: &[u8],
    horizontal_num: u32,
    vertical_num: u32,
    sums: &mut [[u32; V]],
) -> Result<(), StatsParseError> {
    let (h_num, v_num) = (horizontal_num as usize, vertical_num as usize);
    if h_num == 0 || v_num == 0 {
        return Err(StatsParseError::InvalidArg(format!(
            "{what} grid of {h_num}x{v_num} regions"
        )));
    }
    if h_num > sums.len() {
        return Err(StatsParseError::OutOfBounds {
            what,
            value: h_num,
            capacity: sums.len(),
        });
    }
    if v_num > V {
        return Err(StatsParseError::OutOfBounds {
            what,
            value: v_num,
            capacity: V,
        });
    }

    let size = h_num * v_num * 2;
    let mut data = buffer.get(..size).ok_or(LayoutError {
        offset: 0,
        size,
        len: buffer.len(),
    })?;
    for v in 0..v_num {
        for column in sums.iter_mut().take(h_num) {
            column[v] = data.get_u16_le().into();
        }
    }

    Ok(())
}

fn right_stripe(buffer: &[u8], stripe_width: usize) -> Result<&[u8], LayoutError> {
    buffer.get(stripe_width..).ok_or(LayoutError {
        offset: stripe_width,
        size: 0,
        len: buffer.len(),
    })
}

fn check_rows_match(what: &str, left: u32, right: u32) -> Result<(), StatsParseError> {
    if left != right {
        return Err(StatsParseError::InvalidArg(format!(
            "{what} stripes have {left} and {right} rows"
        )));
    }
    Ok(())
}

pub fn parse_cs_stats_buffer(
    buffer: &[u8],
    config: &CsConfig,
    output: &mut ParsedCsStatsOutput,
) -> Result<(), StatsParseError> {
    read_sum_grid(
        "CS",
        buffer,
        config.stats_h_num,
        config.stats_v_num,
        &mut output.column_sum,
    )?;
    output.num_horizontal_regions = config.stats_h_num;
    output.num_vertical_regions = config.stats_v_num;

    Ok(())
}

pub fn parse_cs_stats_dual_ife(
    buffer: &[u8],
    stripe_config: &[CsConfig; 2],
    output: &mut ParsedCsStatsOutput,
) -> Result<(), StatsParseError> {
    let [left, right] = stripe_config;
    check_rows_match("CS", left.stats_v_num, right.stats_v_num)?;

    parse_cs_stats_buffer(buffer, left, output)?;

    let left_h_num = left.stats_h_num as usize;
    read_sum_grid(
        "CS",
        right_stripe(buffer, CS_STATS_WIDTH)?,
        right.stats_h_num,
        right.stats_v_num,
        output.column_sum.get_mut(left_h_num..).unwrap_or_default(),
    )?;
    output.num_horizontal_regions = left.stats_h_num + right.stats_h_num;

    Ok(())
}

pub fn parse_rs_stats_buffer(
    buffer: &[u8],
    config: &RsConfig,
    output: &mut ParsedRsStatsOutput,
) -> Result<(), StatsParseError> {
    read_sum_grid(
        "RS",
        buffer,
        config.stats_h_num,
        config.stats_v_num,
        &mut output.row_sum,
    )?;
    output.num_horizontal_regions = config.stats_h_num;
    output.num_vertical_regions = config.stats_v_num;

    Ok(())
}

/// Parses a dual-IFE RS buffer. When the whole frame is a single column of regions, both
/// stripes measured the same rows and their sums are added; otherwise the right stripe's
/// columns follow the left stripe's.
pub fn parse_rs_stats_dual_ife(
    buffer: &[u8],
    frame_config: &RsConfig,
    stripe_config: &[RsConfig; 2],
    output: &mut ParsedRsStatsOutput,
) -> Result<(), StatsParseError> {
    let [left, right] = stripe_config;
    check_rows_match("RS", left.stats_v_num, right.stats_v_num)?;

    parse_rs_stats_buffer(buffer, left, output)?;
    let right_buffer = right_stripe(buffer, RS_STATS_WIDTH)?;

    if frame_config.stats_h_num == 1 {
        let rows = left.stats_v_num as usize;
        let mut data = right_buffer.get(..rows * 2).ok_or(LayoutError {
            offset: RS_STATS_WIDTH,
            size: rows * 2,
            len: buffer.len(),
        })?;
        for sum in output.row_sum[0].iter_mut().take(rows) {
            *sum += u32::from(data.get_u16_le());
        }
        output.num_horizontal_regions = 1;
    } else {
        let left_h_num = left.stats_h_num as usize;
        read_sum_grid(
            "RS",
            right_buffer,
            right.stats_h_num,
            right.stats_v_num,
            output.row_sum.get_mut(left_h_num..).unwrap_or_default(),
        )?;
        output.num_horizontal_regions = left.stats_h_num + right.stats_h_num;
    }

    Ok(())
}
