// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Stats parser interface.
//!
//! A stats parser turns the raw buffer the ISP wrote for one statistics type into its parsed
//! output, and publishes that output to the node that owns the buffer. Failures never leave the
//! published property unset: the previous request's value is republished instead.

pub mod titan17x;

use thiserror::Error;

use crate::hw::titan17x::layout::LayoutError;
use crate::node::NodeError;
use crate::node::PropertyId;
use crate::node::StatsNode;
use crate::software_stats::SoftwareStatsLibrary;
use crate::stats::output::ParsedStatsMut;
use crate::stitch::StitchError;
use crate::ImageFormat;
use crate::IspStatsType;
use crate::TitanVersion;

/// Flat result code of a failed parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResultCode {
    InvalidPointer,
    InvalidArg,
    InvalidState,
    Failed,
    OutOfBounds,
}

#[derive(Debug, Error)]
pub enum StatsParseError {
    #[error("{0} is not available")]
    InvalidPointer(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArg(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("property {0:?} has not been published")]
    PropertyNotPublished(PropertyId),
    #[error("no statistics buffer to parse")]
    MissingBuffer,
    #[error("input image format is not available")]
    MissingImageFormat,
    #[error("{what} reports {count} regions, the hardware supports fewer than {max}")]
    RegionCountOverflow {
        what: &'static str,
        count: usize,
        max: usize,
    },
    #[error("{what} {value} exceeds the capacity of {capacity}")]
    OutOfBounds {
        what: &'static str,
        value: usize,
        capacity: usize,
    },
    #[error("buffer too short: {0}")]
    Layout(#[from] LayoutError),
    #[error("stitching failed: {0}")]
    Stitch(#[from] StitchError),
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StatsParseError {
    pub fn code(&self) -> ResultCode {
        match self {
            StatsParseError::InvalidPointer(_) => ResultCode::InvalidPointer,
            StatsParseError::InvalidArg(_) => ResultCode::InvalidArg,
            StatsParseError::InvalidState(_) => ResultCode::InvalidState,
            StatsParseError::OutOfBounds { .. }
            | StatsParseError::Layout(_)
            | StatsParseError::Stitch(StitchError::OutputTooSmall { .. })
            | StatsParseError::Stitch(StitchError::SourceOverrun { .. }) => ResultCode::OutOfBounds,
            StatsParseError::Stitch(StitchError::EmptyGeometry) => ResultCode::InvalidArg,
            StatsParseError::PropertyNotPublished(_)
            | StatsParseError::MissingBuffer
            | StatsParseError::MissingImageFormat
            | StatsParseError::RegionCountOverflow { .. }
            | StatsParseError::Node(_)
            | StatsParseError::Other(_) => ResultCode::Failed,
        }
    }
}

/// Static settings of a parser instance.
#[derive(Clone, Debug, Default)]
pub struct ParserSettings {
    /// Also publish parsed outputs under the dump vendor tags.
    pub enable_feature2_dump: bool,
    pub titan_version: TitanVersion,
    /// Library providing software row sums for BPS YUV buffers.
    pub software_stats_library: SoftwareStatsLibrary,
}

/// Everything a single parse call works on.
pub struct ParseData<'a> {
    /// Node owning the buffer, used to read configurations and publish results.
    pub node: &'a mut dyn StatsNode,
    /// Raw hardware buffer. Only optional when `skip_parse` is set.
    pub unparsed_buffer: Option<&'a [u8]>,
    /// Publish the output without parsing, e.g. when the stats are not needed for this request.
    pub skip_parse: bool,
    /// Output filled in place, reused from one request to the next.
    pub output: ParsedStatsMut<'a>,
    /// Format of the image in `unparsed_buffer`, needed by the software row sum path.
    pub image_format: Option<ImageFormat>,
}

impl<'a> ParseData<'a> {
    pub fn new(node: &'a mut dyn StatsNode, buffer: &'a [u8], output: ParsedStatsMut<'a>) -> Self {
        Self {
            node,
            unparsed_buffer: Some(buffer),
            skip_parse: false,
            output,
            image_format: None,
        }
    }
}

/// Parses hardware statistics of a given type.
pub trait StatsParser {
    fn parse(
        &self,
        stats_type: IspStatsType,
        input: &mut ParseData<'_>,
    ) -> Result<(), StatsParseError>;

    /// Largest raw buffer, in bytes, the parser may read for `stats_type`.
    fn max_stats_buffer_size(&self, stats_type: IspStatsType) -> usize;
}
