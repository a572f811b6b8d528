// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Republication of parsed statistics under vendor tags.
//!
//! Apps reach the bayer grid and histogram statistics through vendor tags rather than the
//! internal properties. Every function here is best effort: the caller logs failures and keeps
//! the parse result.

use crate::node::MetadataPayload;
use crate::node::NodeError;
use crate::node::PropertyId;
use crate::node::StatsNode;
use crate::node::VendorTag;
use crate::node::VendorTagManager;
use crate::node::WriteEntry;
use crate::stats::config::BgBeConfig;
use crate::stats::config::RoiRect;
use crate::stats::output::ParsedBHistStatsOutput;
use crate::stats::output::ParsedBgBeStatsOutput;
use crate::stats::output::ParsedHdrBHistStatsOutput;
use crate::stats::output::ParsedStats;
use crate::IspStatsType;

pub const BAYER_EXPOSURE_SECTION: &str = "org.codeaurora.qcamera3.bayer_exposure";
pub const BAYER_GRID_SECTION: &str = "org.codeaurora.qcamera3.bayer_grid";
pub const HISTOGRAM_SECTION: &str = "org.codeaurora.qcamera3.histogram";
pub const AWBBG_DUMP_SECTION: &str = "org.codeaurora.qcamera3.awbbg";
pub const TINTLESS_DUMP_SECTION: &str = "org.codeaurora.qcamera3.tintless";
pub const BHIST_DUMP_SECTION: &str = "org.codeaurora.qcamera3.bhist";

/// Value of the `enable` tags: statistics are always on once published.
const STATS_MODE_ON: u32 = 1;

/// Vendor tags of one section.
struct Section<'a> {
    tags: &'a dyn VendorTagManager,
    name: &'static str,
}

impl<'a> Section<'a> {
    fn new(tags: &'a dyn VendorTagManager, name: &'static str) -> Self {
        Self { tags, name }
    }

    fn tag(&self, tag: &str) -> Result<VendorTag, NodeError> {
        self.tags.query_vendor_tag_location(self.name, tag)
    }
}

/// Publishes the per-region R/G/B averages of an HDR-BE or AWB-BG grid.
pub fn publish_bayer_grid_stats(
    node: &mut dyn StatsNode,
    tags: &dyn VendorTagManager,
    stats_type: IspStatsType,
    config: &BgBeConfig,
    output: &ParsedBgBeStatsOutput,
) -> Result<(), NodeError> {
    let section = match stats_type {
        IspStatsType::HdrBe => Section::new(tags, BAYER_EXPOSURE_SECTION),
        _ => Section::new(tags, BAYER_GRID_SECTION),
    };

    node.write_data_list(&[
        WriteEntry::new(section.tag("enable")?, MetadataPayload::U32(STATS_MODE_ON)),
        WriteEntry::new(section.tag("stats_type")?, MetadataPayload::StatsType(stats_type)),
    ])?;

    let count = config.num_regions().min(output.num_rois as usize);
    let mut r_stats = Vec::with_capacity(count);
    let mut g_stats = Vec::with_capacity(count);
    let mut b_stats = Vec::with_capacity(count);
    for [r, g, b] in (0..count).filter_map(|i| output.rgb_channel(i)).map(|c| c.averages()) {
        r_stats.push(r);
        g_stats.push(g);
        b_stats.push(b);
    }

    node.write_data_list(&[
        WriteEntry::new(section.tag("height")?, MetadataPayload::U32(config.roi.height)),
        WriteEntry::new(section.tag("width")?, MetadataPayload::U32(config.roi.width)),
        WriteEntry::new(section.tag("r_stats")?, MetadataPayload::U32Array(&r_stats)),
        WriteEntry::new(section.tag("g_stats")?, MetadataPayload::U32Array(&g_stats)),
        WriteEntry::new(section.tag("b_stats")?, MetadataPayload::U32Array(&b_stats)),
    ])
}

fn publish_histogram(
    node: &mut dyn StatsNode,
    tags: &dyn VendorTagManager,
    stats_type: IspStatsType,
    num_bins: u32,
    roi: &RoiRect,
    bins: &[u32],
) -> Result<(), NodeError> {
    let section = Section::new(tags, HISTOGRAM_SECTION);

    node.write_data_list(&[
        WriteEntry::new(section.tag("enable")?, MetadataPayload::U32(STATS_MODE_ON)),
        WriteEntry::new(section.tag("stats_type")?, MetadataPayload::StatsType(stats_type)),
        WriteEntry::new(section.tag("buckets")?, MetadataPayload::U32(num_bins)),
        WriteEntry::new(
            section.tag("max_count")?,
            MetadataPayload::U32(roi.width.saturating_mul(roi.height)),
        ),
        WriteEntry::new(section.tag("stats")?, MetadataPayload::U32Array(bins)),
    ])
}

pub fn publish_bhist_histogram(
    node: &mut dyn StatsNode,
    tags: &dyn VendorTagManager,
    roi: &RoiRect,
    output: &ParsedBHistStatsOutput,
) -> Result<(), NodeError> {
    publish_histogram(
        node,
        tags,
        IspStatsType::BHist,
        output.num_bins,
        roi,
        &output.bins,
    )
}

/// Publishes an HDR-BHist histogram. `stats` holds the red, green and blue bins back to back.
pub fn publish_hdr_bhist_histogram(
    node: &mut dyn StatsNode,
    tags: &dyn VendorTagManager,
    roi: &RoiRect,
    output: &ParsedHdrBHistStatsOutput,
) -> Result<(), NodeError> {
    let bins = [&output.red[..], &output.green[..], &output.blue[..]].concat();

    publish_histogram(
        node,
        tags,
        IspStatsType::HdrBHist,
        output.num_bins,
        roi,
        &bins,
    )
}

/// Publishes a copy of a parsed output with the property it was published as, then checks
/// that the copy is readable.
pub fn publish_parsed_dump(
    node: &mut dyn StatsNode,
    tags: &dyn VendorTagManager,
    section: &'static str,
    id: PropertyId,
    stats: ParsedStats<'_>,
) -> Result<(), NodeError> {
    let section = Section::new(tags, section);
    let stats_tag = section.tag("stats")?;

    node.write_data_list(&[
        WriteEntry::new(section.tag("propertyID")?, MetadataPayload::PropertyId(id)),
        WriteEntry::new(stats_tag, MetadataPayload::Parsed(stats)),
    ])?;

    if !node.is_published(stats_tag.into(), 0) {
        return Err(NodeError::WriteFailed(stats_tag.into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::memory::MemoryNode;
    use crate::node::memory::MemoryVendorTags;
    use crate::node::memory::StoredValue;
    use crate::stats::output::BayerChannelData;
    use crate::stats::output::OwnedParsedStats;

    fn bgbe_output() -> ParsedBgBeStatsOutput {
        let mut output = ParsedBgBeStatsOutput::with_capacity(4);
        output.num_rois = 2;
        output.channel_data[0] = BayerChannelData {
            r_sum: 100,
            r_count: 10,
            gr_sum: 50,
            gr_count: 5,
            gb_sum: 50,
            gb_count: 5,
            b_sum: 9,
            b_count: 3,
        };
        // No pixel in this region: averages must be 0.
        output.channel_data[1] = BayerChannelData::default();
        output
    }

    fn vendor(tags: &MemoryVendorTags, section: &str, tag: &str) -> VendorTag {
        tags.query_vendor_tag_location(section, tag).unwrap()
    }

    #[test]
    fn bayer_exposure_averages() {
        let tags = MemoryVendorTags::with_stats_sections();
        let mut node = MemoryNode::new(0);
        let config = BgBeConfig {
            roi: RoiRect {
                left: 0,
                top: 0,
                width: 640,
                height: 480,
            },
            horizontal_num: 2,
            vertical_num: 1,
            ..Default::default()
        };

        publish_bayer_grid_stats(&mut node, &tags, IspStatsType::HdrBe, &config, &bgbe_output())
            .unwrap();

        let tag = |name| vendor(&tags, BAYER_EXPOSURE_SECTION, name);
        assert_eq!(node.output(tag("enable")), Some(&StoredValue::U32(1)));
        assert_eq!(
            node.output(tag("stats_type")),
            Some(&StoredValue::StatsType(IspStatsType::HdrBe))
        );
        assert_eq!(node.output(tag("width")), Some(&StoredValue::U32(640)));
        assert_eq!(node.output(tag("height")), Some(&StoredValue::U32(480)));
        assert_eq!(
            node.output(tag("r_stats")),
            Some(&StoredValue::U32Array(vec![10, 0]))
        );
        assert_eq!(
            node.output(tag("g_stats")),
            Some(&StoredValue::U32Array(vec![10, 0]))
        );
        assert_eq!(
            node.output(tag("b_stats")),
            Some(&StoredValue::U32Array(vec![3, 0]))
        );
        // Nothing lands in the AWB-BG section.
        assert_eq!(node.output(vendor(&tags, BAYER_GRID_SECTION, "enable")), None);
    }

    #[test]
    fn averages_stop_at_parsed_regions() {
        let tags = MemoryVendorTags::with_stats_sections();
        let mut node = MemoryNode::new(0);
        let config = BgBeConfig {
            horizontal_num: 2,
            vertical_num: 2,
            ..Default::default()
        };

        publish_bayer_grid_stats(&mut node, &tags, IspStatsType::AwbBg, &config, &bgbe_output())
            .unwrap();

        assert_eq!(
            node.output(vendor(&tags, BAYER_GRID_SECTION, "r_stats")),
            Some(&StoredValue::U32Array(vec![10, 0]))
        );
    }

    #[test]
    fn hdr_bhist_histogram_concatenates_channels() {
        let tags = MemoryVendorTags::with_stats_sections();
        let mut node = MemoryNode::new(0);
        let mut output = ParsedHdrBHistStatsOutput::default();
        output.num_bins = 256;
        output.red[0] = 1;
        output.green[0] = 2;
        output.blue[255] = 3;
        let roi = RoiRect {
            width: 10,
            height: 20,
            ..Default::default()
        };

        publish_hdr_bhist_histogram(&mut node, &tags, &roi, &output).unwrap();

        let tag = |name| vendor(&tags, HISTOGRAM_SECTION, name);
        assert_eq!(node.output(tag("max_count")), Some(&StoredValue::U32(200)));
        assert_eq!(node.output(tag("buckets")), Some(&StoredValue::U32(256)));
        match node.output(tag("stats")) {
            Some(StoredValue::U32Array(bins)) => {
                assert_eq!(bins.len(), 768);
                assert_eq!(bins[0], 1);
                assert_eq!(bins[256], 2);
                assert_eq!(bins[767], 3);
            }
            other => panic!("unexpected histogram {:?}", other),
        }
    }

    #[test]
    fn parsed_dump_carries_property() {
        let tags = MemoryVendorTags::with_stats_sections();
        let mut node = MemoryNode::new(0);
        let output = ParsedBHistStatsOutput::default();

        publish_parsed_dump(
            &mut node,
            &tags,
            BHIST_DUMP_SECTION,
            PropertyId::ParsedBHistStatsOutput,
            ParsedStats::BHist(&output),
        )
        .unwrap();

        assert_eq!(
            node.output(vendor(&tags, BHIST_DUMP_SECTION, "propertyID")),
            Some(&StoredValue::PropertyId(PropertyId::ParsedBHistStatsOutput))
        );
        assert_eq!(
            node.output(vendor(&tags, BHIST_DUMP_SECTION, "stats")),
            Some(&StoredValue::Parsed(OwnedParsedStats::BHist(Box::new(output))))
        );
    }

    #[test]
    fn unknown_section_is_an_error() {
        let tags = MemoryVendorTags::default();
        let mut node = MemoryNode::new(0);
        let output = ParsedBHistStatsOutput::default();

        let err = publish_bhist_histogram(&mut node, &tags, &RoiRect::default(), &output);
        assert!(matches!(err, Err(NodeError::UnknownVendorTag { .. })));
    }
}
