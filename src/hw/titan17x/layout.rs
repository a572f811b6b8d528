// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Bit layouts of the hardware statistics records.
//!
//! Records are little-endian and their fields are packed from the least significant bit of
//! each 32 or 64-bit word, in declaration order, without padding between words. The field
//! width tables below are the source of truth for each record size; every decoder is checked
//! against them at compile time.

use byteorder::ByteOrder;
use byteorder::LittleEndian;
use thiserror::Error;

use crate::hw::titan17x::IHIST_STATS_BINS_PER_CHANNEL;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{size}-byte record at offset {offset} overruns the {len}-byte buffer")]
pub struct LayoutError {
    pub offset: usize,
    pub size: usize,
    pub len: usize,
}

/// A fixed-size record written by the ISP.
pub trait HwRecord: Sized {
    /// Byte stride of one record in the hardware buffer.
    const SIZE: usize;

    /// Decodes a record from `raw`, which must hold at least `SIZE` bytes.
    fn decode(raw: &[u8]) -> Self;
}

/// Decodes the record starting `offset` bytes into `buffer`.
pub fn read_record<T: HwRecord>(buffer: &[u8], offset: usize) -> Result<T, LayoutError> {
    offset
        .checked_add(T::SIZE)
        .and_then(|end| buffer.get(offset..end))
        .map(T::decode)
        .ok_or(LayoutError {
            offset,
            size: T::SIZE,
            len: buffer.len(),
        })
}

/// Decodes the `index`-th record of a tightly packed array of records.
pub fn read_indexed<T: HwRecord>(buffer: &[u8], index: usize) -> Result<T, LayoutError> {
    read_record(buffer, index.saturating_mul(T::SIZE))
}

const fn layout_bytes(field_bits: &[u32]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < field_bits.len() {
        total += field_bits[i];
        i += 1;
    }
    assert!(total % 8 == 0);
    (total / 8) as usize
}

fn field(word: u64, lsb: u32, width: u32) -> u64 {
    (word >> lsb) & ((1u64 << width) - 1)
}

fn field32(word: u32, lsb: u32, width: u32) -> u32 {
    field(u64::from(word), lsb, width) as u32
}

fn words64<const N: usize>(raw: &[u8]) -> [u64; N] {
    let mut words = [0u64; N];
    LittleEndian::read_u64_into(&raw[..N * 8], &mut words);
    words
}

fn words32<const N: usize>(raw: &[u8]) -> [u32; N] {
    let mut words = [0u32; N];
    LittleEndian::read_u32_into(&raw[..N * 4], &mut words);
    words
}

// H1Sum, rsvd, H1Cnt, rsvd, Sel | H1Sharpness, rsvd, RegionID, rsvd |
// VSum, rsvd, VCnt, rsvd | VSharpness, rsvd
const BF23_FIELD_BITS: [u32; 15] = [37, 2, 23, 1, 1, 40, 14, 8, 2, 37, 2, 23, 2, 40, 24];
// Same as v2.3 except the last word: VSharpness, rsvd, OutputID, Merge, EndOfBuffer
const BF25_FIELD_BITS: [u32; 18] = [37, 2, 23, 1, 1, 40, 14, 8, 2, 37, 2, 23, 2, 40, 14, 8, 1, 1];
// RSum, BSum, GrSum, GbSum (each followed by 2 reserved bits) | RCnt, BCnt | GrCnt, GbCnt
const BG15_FIELD_BITS: [u32; 12] = [30, 2, 30, 2, 30, 2, 30, 2, 16, 16, 16, 16];
const BG15_SAT_FIELD_BITS: [u32; 24] = [
    30, 2, 30, 2, 30, 2, 30, 2, 16, 16, 16, 16, 30, 2, 30, 2, 30, 2, 30, 2, 16, 16, 16, 16,
];
// RSum, BSum, GSum, YSum | RCnt, BCnt | GCnt, YCnt
const BG15_Y_FIELD_BITS: [u32; 12] = [30, 2, 30, 2, 30, 2, 31, 1, 16, 16, 16, 16];
const TINTLESS15_Y_FIELD_BITS: [u32; 12] = [30, 2, 30, 2, 30, 2, 30, 2, 16, 16, 16, 16];
const HDRBHIST13_BIN_FIELD_BITS: [u32; 6] = [25, 7, 25, 7, 25, 7];
const BHIST14_BIN_FIELD_BITS: [u32; 2] = [25, 7];
const IHIST12_FIELD_BITS: [u32; 4 * IHIST_STATS_BINS_PER_CHANNEL] =
    [16; 4 * IHIST_STATS_BINS_PER_CHANNEL];

const _: () = assert!(layout_bytes(&BF23_FIELD_BITS) == BfStats23HwOutput::SIZE);
const _: () = assert!(layout_bytes(&BF25_FIELD_BITS) == BfStats25HwOutput::SIZE);
const _: () = assert!(layout_bytes(&BG15_FIELD_BITS) == Bg15HwOutput::SIZE);
const _: () = assert!(layout_bytes(&BG15_SAT_FIELD_BITS) == BgSat15HwOutput::SIZE);
const _: () = assert!(layout_bytes(&BG15_Y_FIELD_BITS) == BgYStats15HwOutput::SIZE);
const _: () = assert!(layout_bytes(&TINTLESS15_Y_FIELD_BITS) == TintlessBgYStats15HwOutput::SIZE);
const _: () = assert!(layout_bytes(&HDRBHIST13_BIN_FIELD_BITS) == HdrBHist13HwBin::SIZE);
const _: () = assert!(layout_bytes(&BHIST14_BIN_FIELD_BITS) == BHist14HwBin::SIZE);
const _: () = assert!(layout_bytes(&IHIST12_FIELD_BITS) == IHist12HwOutput::SIZE);

/// One BF v2.3 region.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BfStats23HwOutput {
    /// Sum of the horizontal 1 filter output.
    pub h1_sum: u64,
    /// Number of pixels accumulated into `h1_sum`.
    pub h1_count: u32,
    /// Region selection (primary or secondary ROI).
    pub sel: bool,
    pub h1_sharpness: u64,
    /// Index of the region in the order the ROI configuration requested it.
    pub region_id: u32,
    pub v_sum: u64,
    pub v_count: u32,
    pub v_sharpness: u64,
}

impl HwRecord for BfStats23HwOutput {
    const SIZE: usize = 32;

    fn decode(raw: &[u8]) -> Self {
        let [w0, w1, w2, w3] = words64::<4>(raw);

        Self {
            h1_sum: field(w0, 0, 37),
            h1_count: field(w0, 39, 23) as u32,
            sel: field(w0, 63, 1) != 0,
            h1_sharpness: field(w1, 0, 40),
            region_id: field(w1, 54, 8) as u32,
            v_sum: field(w2, 0, 37),
            v_count: field(w2, 39, 23) as u32,
            v_sharpness: field(w3, 0, 40),
        }
    }
}

/// One BF v2.5 region, as reported in index mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BfStats25HwOutput {
    pub region: BfStats23HwOutput,
    pub output_id: u32,
    /// Set when this record continues a region started in the other stripe.
    pub merge: bool,
    pub end_of_buffer: bool,
}

impl HwRecord for BfStats25HwOutput {
    const SIZE: usize = 32;

    fn decode(raw: &[u8]) -> Self {
        let w3 = LittleEndian::read_u64(&raw[24..32]);

        Self {
            region: BfStats23HwOutput::decode(raw),
            output_id: field(w3, 54, 8) as u32,
            merge: field(w3, 62, 1) != 0,
            end_of_buffer: field(w3, 63, 1) != 0,
        }
    }
}

/// Bayer grid v1.5 region (regular output mode), shared by HDR-BE, AWB-BG and Tintless-BG.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Bg15HwOutput {
    pub r_sum: u32,
    pub b_sum: u32,
    pub gr_sum: u32,
    pub gb_sum: u32,
    pub r_count: u16,
    pub b_count: u16,
    pub gr_count: u16,
    pub gb_count: u16,
}

impl HwRecord for Bg15HwOutput {
    const SIZE: usize = 24;

    fn decode(raw: &[u8]) -> Self {
        let [r_sum, b_sum, gr_sum, gb_sum, rb_count, g_count] = words32::<6>(raw);

        Self {
            r_sum: field32(r_sum, 0, 30),
            b_sum: field32(b_sum, 0, 30),
            gr_sum: field32(gr_sum, 0, 30),
            gb_sum: field32(gb_sum, 0, 30),
            r_count: field32(rb_count, 0, 16) as u16,
            b_count: field32(rb_count, 16, 16) as u16,
            gr_count: field32(g_count, 0, 16) as u16,
            gb_count: field32(g_count, 16, 16) as u16,
        }
    }
}

/// Bayer grid v1.5 region with saturated pixel sums appended.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BgSat15HwOutput {
    pub channel: Bg15HwOutput,
    pub saturation: Bg15HwOutput,
}

impl HwRecord for BgSat15HwOutput {
    const SIZE: usize = 48;

    fn decode(raw: &[u8]) -> Self {
        Self {
            channel: Bg15HwOutput::decode(raw),
            saturation: Bg15HwOutput::decode(&raw[Bg15HwOutput::SIZE..]),
        }
    }
}

/// Bayer grid v1.5 region with Y statistics (HDR-BE and AWB-BG layout).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BgYStats15HwOutput {
    pub r_sum: u32,
    pub b_sum: u32,
    pub g_sum: u32,
    pub y_sum: u32,
    pub r_count: u16,
    pub b_count: u16,
    pub g_count: u16,
    pub y_count: u16,
}

impl BgYStats15HwOutput {
    fn decode_with_y_bits(raw: &[u8], y_bits: u32) -> Self {
        let [r_sum, b_sum, g_sum, y_sum, rb_count, gy_count] = words32::<6>(raw);

        Self {
            r_sum: field32(r_sum, 0, 30),
            b_sum: field32(b_sum, 0, 30),
            g_sum: field32(g_sum, 0, 30),
            y_sum: field32(y_sum, 0, y_bits),
            r_count: field32(rb_count, 0, 16) as u16,
            b_count: field32(rb_count, 16, 16) as u16,
            g_count: field32(gy_count, 0, 16) as u16,
            y_count: field32(gy_count, 16, 16) as u16,
        }
    }
}

impl HwRecord for BgYStats15HwOutput {
    const SIZE: usize = 24;

    fn decode(raw: &[u8]) -> Self {
        Self::decode_with_y_bits(raw, 31)
    }
}

/// Tintless-BG v1.5 Y statistics region. Identical to [`BgYStats15HwOutput`] but the Y sum is
/// only 30 bits wide.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TintlessBgYStats15HwOutput(pub BgYStats15HwOutput);

impl HwRecord for TintlessBgYStats15HwOutput {
    const SIZE: usize = 24;

    fn decode(raw: &[u8]) -> Self {
        Self(BgYStats15HwOutput::decode_with_y_bits(raw, 30))
    }
}

/// IHist v1.2 buffer: 256 16-bit bins for each of the YCC, green, blue and red channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IHist12HwOutput {
    pub ycc: [u16; IHIST_STATS_BINS_PER_CHANNEL],
    pub green: [u16; IHIST_STATS_BINS_PER_CHANNEL],
    pub blue: [u16; IHIST_STATS_BINS_PER_CHANNEL],
    pub red: [u16; IHIST_STATS_BINS_PER_CHANNEL],
}

impl HwRecord for IHist12HwOutput {
    const SIZE: usize = 4 * IHIST_STATS_BINS_PER_CHANNEL * 2;

    fn decode(raw: &[u8]) -> Self {
        const CHANNEL_SIZE: usize = IHIST_STATS_BINS_PER_CHANNEL * 2;
        let mut out = Self {
            ycc: [0; IHIST_STATS_BINS_PER_CHANNEL],
            green: [0; IHIST_STATS_BINS_PER_CHANNEL],
            blue: [0; IHIST_STATS_BINS_PER_CHANNEL],
            red: [0; IHIST_STATS_BINS_PER_CHANNEL],
        };

        for (i, channel) in [&mut out.ycc, &mut out.green, &mut out.blue, &mut out.red]
            .into_iter()
            .enumerate()
        {
            LittleEndian::read_u16_into(&raw[i * CHANNEL_SIZE..(i + 1) * CHANNEL_SIZE], channel);
        }

        out
    }
}

/// One HDR-BHist v1.3 bin, holding the count of the three color channels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HdrBHist13HwBin {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

impl HwRecord for HdrBHist13HwBin {
    const SIZE: usize = 12;

    fn decode(raw: &[u8]) -> Self {
        let [red, green, blue] = words32::<3>(raw);

        Self {
            red: field32(red, 0, 25),
            green: field32(green, 0, 25),
            blue: field32(blue, 0, 25),
        }
    }
}

/// One BHist v1.4 bin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BHist14HwBin {
    pub count: u32,
}

impl HwRecord for BHist14HwBin {
    const SIZE: usize = 4;

    fn decode(raw: &[u8]) -> Self {
        Self {
            count: field32(LittleEndian::read_u32(raw), 0, 25),
        }
    }
}

/// Packs `(value, width)` pairs LSB-first, the way the ISP lays out its records.
#[cfg(test)]
pub(crate) fn pack_fields(fields: &[(u64, u32)]) -> Vec<u8> {
    let total_bits: u32 = fields.iter().map(|(_, width)| width).sum();
    let mut out = vec![0u8; (total_bits as usize).div_ceil(8)];
    let mut pos = 0usize;

    for &(value, width) in fields {
        for bit in 0..width as usize {
            if (value >> bit) & 1 == 1 {
                out[(pos + bit) / 8] |= 1 << ((pos + bit) % 8);
            }
        }
        pos += width as usize;
    }

    out
}

/// Builds a BF v2.5 record; `merge` and `output_id` are ignored by v2.3 decoders.
#[cfg(test)]
pub(crate) fn pack_bf_region(
    region: &BfStats23HwOutput,
    output_id: u32,
    merge: bool,
    end_of_buffer: bool,
) -> Vec<u8> {
    pack_fields(&[
        (region.h1_sum, 37),
        (0, 2),
        (region.h1_count.into(), 23),
        (0, 1),
        (region.sel.into(), 1),
        (region.h1_sharpness, 40),
        (0, 14),
        (region.region_id.into(), 8),
        (0, 2),
        (region.v_sum, 37),
        (0, 2),
        (region.v_count.into(), 23),
        (0, 2),
        (region.v_sharpness, 40),
        (0, 14),
        (output_id.into(), 8),
        (merge.into(), 1),
        (end_of_buffer.into(), 1),
    ])
}

#[cfg(test)]
pub(crate) fn pack_bg_region(region: &Bg15HwOutput) -> Vec<u8> {
    pack_fields(&[
        (region.r_sum.into(), 32),
        (region.b_sum.into(), 32),
        (region.gr_sum.into(), 32),
        (region.gb_sum.into(), 32),
        (region.r_count.into(), 16),
        (region.b_count.into(), 16),
        (region.gr_count.into(), 16),
        (region.gb_count.into(), 16),
    ])
}
