// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Interfaces of the pipeline node that owns a stats parser.
//!
//! The node gives the parser access to the per-request property pool: configurations published
//! by the ISP are read from it and parsed statistics are written back to it. Vendor tags are
//! resolved to their runtime IDs through a [`VendorTagManager`].

pub mod memory;

use enumn::N;
use thiserror::Error;

use crate::stats::config::AfdStatsControl;
use crate::stats::config::IspBHistStats;
use crate::stats::config::IspBfStats;
use crate::stats::config::IspBgBeStats;
use crate::stats::config::IspCsStats;
use crate::stats::config::IspHdrBHistStats;
use crate::stats::config::IspIHistStats;
use crate::stats::config::IspRsStats;
use crate::stats::output::ParsedStats;
use crate::IspStatsType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("vendor tag {section}.{tag} is not registered")]
    UnknownVendorTag { section: String, tag: String },
    #[error("failed to write {0:?}")]
    WriteFailed(MetadataTag),
    #[error("metadata pool is not available")]
    PoolUnavailable,
}

/// Properties exchanged between the ISP, the stats parser and the 3A algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, N)]
#[repr(u32)]
pub enum PropertyId {
    IspBfConfig = 0x3000_0000,
    IspHdrBeConfig,
    IspAwbBgConfig,
    IspTintlessBgConfig,
    IspIHistConfig,
    IspHdrBHistConfig,
    IspBHistConfig,
    IspCsConfig,
    IspRsConfig,
    AfdStatsControl,

    ParsedBfStatsOutput = 0x3000_0100,
    ParsedHdrBeStatsOutput,
    ParsedAwbBgStatsOutput,
    ParsedTintlessBgStatsOutput,
    ParsedIHistStatsOutput,
    ParsedHdrBHistStatsOutput,
    ParsedBHistStatsOutput,
    ParsedCsStatsOutput,
    ParsedRsStatsOutput,

    SkipStatsParserTypeBf = 0x3000_0200,
    SkipStatsParserTypeHdrBe,
    SkipStatsParserTypeAwbBg,
    SkipStatsParserTypeTintlessBg,
    SkipStatsParserTypeIHist,
    SkipStatsParserTypeHdrBHist,
    SkipStatsParserTypeBHist,
    SkipStatsParserTypeCs,
    SkipStatsParserTypeRs,
}

/// Runtime ID of a vendor tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VendorTag(pub u32);

/// Key of an entry in the property pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetadataTag {
    Property(PropertyId),
    Vendor(VendorTag),
}

impl From<PropertyId> for MetadataTag {
    fn from(id: PropertyId) -> Self {
        MetadataTag::Property(id)
    }
}

impl From<VendorTag> for MetadataTag {
    fn from(tag: VendorTag) -> Self {
        MetadataTag::Vendor(tag)
    }
}

/// Property values readable by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyBlob {
    BfConfig(IspBfStats),
    BgBeConfig(IspBgBeStats),
    IHistConfig(IspIHistStats),
    HdrBHistConfig(IspHdrBHistStats),
    BHistConfig(IspBHistStats),
    CsConfig(IspCsStats),
    RsConfig(IspRsStats),
    AfdStatsControl(AfdStatsControl),
    SkipParse(bool),
}

/// Conversion out of a [`PropertyBlob`] for the property types the parser reads.
pub trait FromPropertyBlob: Sized {
    fn from_blob(blob: PropertyBlob) -> Option<Self>;
}

macro_rules! impl_from_property_blob {
    ($ty:ty, $variant:ident) => {
        impl FromPropertyBlob for $ty {
            fn from_blob(blob: PropertyBlob) -> Option<Self> {
                match blob {
                    PropertyBlob::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

impl_from_property_blob!(IspBfStats, BfConfig);
impl_from_property_blob!(IspBgBeStats, BgBeConfig);
impl_from_property_blob!(IspIHistStats, IHistConfig);
impl_from_property_blob!(IspHdrBHistStats, HdrBHistConfig);
impl_from_property_blob!(IspBHistStats, BHistConfig);
impl_from_property_blob!(IspCsStats, CsConfig);
impl_from_property_blob!(IspRsStats, RsConfig);
impl_from_property_blob!(AfdStatsControl, AfdStatsControl);
impl_from_property_blob!(bool, SkipParse);

/// Data written to the property pool.
#[derive(Copy, Clone, Debug)]
pub enum MetadataPayload<'a> {
    Parsed(ParsedStats<'a>),
    RsConfig(&'a IspRsStats),
    U32(u32),
    U32Array(&'a [u32]),
    StatsType(IspStatsType),
    PropertyId(PropertyId),
}

/// One entry of a [`StatsNode::write_data_list`] call.
#[derive(Copy, Clone, Debug)]
pub struct WriteEntry<'a> {
    pub tag: MetadataTag,
    pub data: MetadataPayload<'a>,
}

impl<'a> WriteEntry<'a> {
    pub fn new(tag: impl Into<MetadataTag>, data: MetadataPayload<'a>) -> Self {
        Self {
            tag: tag.into(),
            data,
        }
    }
}

/// The pipeline node a parser works for.
pub trait StatsNode {
    /// ID of the request being processed.
    fn current_request(&self) -> u64;

    /// Depth of the pipeline, i.e. how many requests behind the ISP configuration lags.
    fn maximum_pipeline_delay(&self) -> u64;

    /// Whether the realtime pipeline runs on BPS, in which case AWB-BG also stands in for HDR-BE.
    fn is_camera_running_on_bps(&self) -> bool;

    /// Reads property `id` as published `offset` requests before the current one.
    fn get_property(&self, id: PropertyId, offset: u64) -> Option<PropertyBlob>;

    /// Whether `tag` holds a value `offset` requests before the current one.
    fn is_published(&self, tag: MetadataTag, offset: u64) -> bool;

    /// Publishes `entries` for the current request.
    fn write_data_list(&mut self, entries: &[WriteEntry<'_>]) -> Result<(), NodeError>;

    /// Publishes the previous request's value of `id` for the current request.
    fn write_previous_data(&mut self, id: PropertyId);
}

/// Resolves vendor tag names to their runtime IDs.
pub trait VendorTagManager: Send + Sync {
    fn query_vendor_tag_location(&self, section: &str, tag: &str) -> Result<VendorTag, NodeError>;
}

/// Reads property `id` and converts it to the type the caller expects.
pub(crate) fn read_property<T: FromPropertyBlob>(
    node: &dyn StatsNode,
    id: PropertyId,
    offset: u64,
) -> Option<T> {
    node.get_property(id, offset).and_then(T::from_blob)
}
