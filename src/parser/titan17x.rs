// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Stats parser for the Titan 17x family of ISPs (Titan 170, 175 and 480).
//!
//! Every statistics type goes through the same sequence:
//!
//! 1. Read the configuration the ISP applied to the buffer, published `pipeline delay` requests
//!    earlier, and the flag asking to skip this type, published by the previous request.
//! 2. Unless parsing is skipped, reset the counts bounding the output and parse the buffer, as a
//!    single stripe or as the two stripes of a dual-IFE frame.
//! 3. Publish the output, then its vendor tags.
//!
//! Any failure before the vendor tags republishes the previous request's output instead, so
//! consumers never see a half-parsed result.

pub mod bayer_grid;
pub mod bf;
pub mod histogram;
pub mod sums;
pub mod vendor_tags;

use std::sync::Arc;

use log::debug;
use log::error;
use log::warn;

use crate::hw::titan17x::AWBBG_STATS_MAX_VERTICAL_REGIONS;
use crate::hw::titan17x::AWBBG_STATS_MAX_WIDTH;
use crate::hw::titan17x::BF_STATS_MAX_WIDTH;
use crate::hw::titan17x::BHIST_STATS_WIDTH;
use crate::hw::titan17x::BPS_AWBBG_STATS_MAX_WIDTH;
use crate::hw::titan17x::CS_STATS_WIDTH;
use crate::hw::titan17x::HDRBE_STATS_MAX_WIDTH;
use crate::hw::titan17x::HDRBHIST_STATS_MAX_WIDTH;
use crate::hw::titan17x::IHIST_STATS_WIDTH;
use crate::hw::titan17x::MIN_AF_PIPELINE_DELAY;
use crate::hw::titan17x::RS_STATS_CONFIG_BIT_DEPTH;
use crate::hw::titan17x::RS_STATS_WIDTH;
use crate::hw::titan17x::TINTLESSBG_STATS_WIDTH;
use crate::node::read_property;
use crate::node::FromPropertyBlob;
use crate::node::MetadataPayload;
use crate::node::NodeError;
use crate::node::PropertyId;
use crate::node::StatsNode;
use crate::node::VendorTagManager;
use crate::node::WriteEntry;
use crate::parser::titan17x::bayer_grid::BgBeStatsKind;
use crate::parser::ParseData;
use crate::parser::ParserSettings;
use crate::parser::StatsParseError;
use crate::parser::StatsParser;
use crate::software_stats::LibraryRowSumGenerator;
use crate::software_stats::RowSumGenerator;
use crate::stats::config::AfdStatsControl;
use crate::stats::config::IspBHistStats;
use crate::stats::config::IspBfStats;
use crate::stats::config::IspBgBeStats;
use crate::stats::config::IspCsStats;
use crate::stats::config::IspHdrBHistStats;
use crate::stats::config::IspIHistStats;
use crate::stats::config::IspRsStats;
use crate::stats::config::RsConfig;
use crate::stats::output::ParsedStats;
use crate::stats::output::ParsedStatsMut;
use crate::IspStatsType;

/// Borrows the output of `$input` as the variant expected for `$stats_type`.
macro_rules! output_as {
    ($input:expr, $variant:ident, $stats_type:expr) => {
        match &mut $input.output {
            ParsedStatsMut::$variant(output) => &mut **output,
            _ => {
                return Err(StatsParseError::InvalidArg(format!(
                    "{} stats cannot be parsed into this output",
                    $stats_type
                )))
            }
        }
    };
}

fn read_config<T: FromPropertyBlob>(
    node: &dyn StatsNode,
    id: PropertyId,
    offset: u64,
) -> Result<T, StatsParseError> {
    let blob = node
        .get_property(id, offset)
        .ok_or(StatsParseError::PropertyNotPublished(id))?;
    T::from_blob(blob).ok_or(StatsParseError::InvalidPointer("statistics configuration"))
}

/// Whether the previous request asked to skip parsing of this statistics type.
fn skip_requested(node: &dyn StatsNode, id: PropertyId) -> bool {
    read_property::<bool>(node, id, 1).unwrap_or(false)
}

fn required_buffer(buffer: Option<&[u8]>) -> Result<&[u8], StatsParseError> {
    buffer.ok_or(StatsParseError::MissingBuffer)
}

fn publish(
    node: &mut dyn StatsNode,
    id: PropertyId,
    stats: ParsedStats<'_>,
) -> Result<(), NodeError> {
    node.write_data_list(&[WriteEntry::new(id, MetadataPayload::Parsed(stats))])
}

fn warn_on_vendor_tag_failure(what: &str, result: Result<(), NodeError>) {
    if let Err(e) = result {
        warn!("Failed to publish {} vendor tags: {}", what, e);
    }
}

/// Properties republished from the previous request when parsing `stats_type` fails.
fn fallback_properties(stats_type: IspStatsType, running_on_bps: bool) -> &'static [PropertyId] {
    match stats_type {
        IspStatsType::Bf => &[PropertyId::ParsedBfStatsOutput],
        IspStatsType::HdrBe => &[PropertyId::ParsedHdrBeStatsOutput],
        IspStatsType::AwbBg => &[PropertyId::ParsedAwbBgStatsOutput],
        IspStatsType::BpsAwbBg if running_on_bps => &[
            PropertyId::ParsedAwbBgStatsOutput,
            PropertyId::ParsedHdrBeStatsOutput,
        ],
        IspStatsType::BpsAwbBg => &[PropertyId::ParsedAwbBgStatsOutput],
        IspStatsType::TintlessBg => &[PropertyId::ParsedTintlessBgStatsOutput],
        IspStatsType::IHist => &[PropertyId::ParsedIHistStatsOutput],
        IspStatsType::HdrBHist => &[PropertyId::ParsedHdrBHistStatsOutput],
        IspStatsType::BHist => &[PropertyId::ParsedBHistStatsOutput],
        IspStatsType::Cs => &[PropertyId::ParsedCsStatsOutput],
        IspStatsType::Rs => &[PropertyId::ParsedRsStatsOutput],
        IspStatsType::BpsRegYuv => &[PropertyId::IspRsConfig, PropertyId::ParsedRsStatsOutput],
    }
}

/// Parser for the statistics of Titan 17x ISPs.
///
/// The parser holds no per-frame state and can be shared by several pipelines. The software
/// row sum library is the only resource it initializes lazily.
pub struct Titan17xStatsParser {
    settings: ParserSettings,
    vendor_tags: Arc<dyn VendorTagManager>,
    row_sum_generator: Box<dyn RowSumGenerator>,
}

impl Titan17xStatsParser {
    pub fn new(settings: ParserSettings, vendor_tags: Arc<dyn VendorTagManager>) -> Self {
        let row_sum_generator =
            LibraryRowSumGenerator::new(settings.software_stats_library.clone());

        Self {
            settings,
            vendor_tags,
            row_sum_generator: Box::new(row_sum_generator),
        }
    }

    /// Replaces the generator used for software row sums.
    pub fn with_row_sum_generator(mut self, generator: impl RowSumGenerator + 'static) -> Self {
        self.row_sum_generator = Box::new(generator);
        self
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    fn parse_bf(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, Bf, IspStatsType::Bf);
        let node = &mut *input.node;
        let offset = node
            .maximum_pipeline_delay()
            .saturating_sub(1)
            .max(MIN_AF_PIPELINE_DELAY);

        if !input.skip_parse {
            let stats: IspBfStats = read_config(node, PropertyId::IspBfConfig, offset)?;

            if !skip_requested(node, PropertyId::SkipStatsParserTypeBf) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                let index_mode = self.settings.titan_version.uses_bf_index_mode();
                output.num_of_roi_regions = 0;

                if !stats.dual_ife_mode {
                    bf::parse_bf_stats_buffer(buffer, &stats.stats_config, !index_mode, output)?;
                } else if index_mode {
                    bf::parse_bf_stats_index_mode(buffer, &stats.stripe_config, output)?;
                } else {
                    bf::parse_bf_stats_dual_ife(buffer, &stats.stripe_config, output)?;
                }
                debug!(
                    "Request {}: {} BF regions, frame tag {}",
                    node.current_request(),
                    output.num_of_roi_regions,
                    output.frame_tag
                );
            }
        }

        publish(node, PropertyId::ParsedBfStatsOutput, ParsedStats::Bf(&*output))?;
        Ok(())
    }

    fn parse_bgbe(
        &self,
        kind: BgBeStatsKind,
        input: &mut ParseData<'_>,
    ) -> Result<(), StatsParseError> {
        let (stats_type, config_id, skip_id, output_id) = match kind {
            BgBeStatsKind::HdrBe => (
                IspStatsType::HdrBe,
                PropertyId::IspHdrBeConfig,
                PropertyId::SkipStatsParserTypeHdrBe,
                PropertyId::ParsedHdrBeStatsOutput,
            ),
            BgBeStatsKind::AwbBg => (
                IspStatsType::AwbBg,
                PropertyId::IspAwbBgConfig,
                PropertyId::SkipStatsParserTypeAwbBg,
                PropertyId::ParsedAwbBgStatsOutput,
            ),
        };
        let output = output_as!(input, BgBe, stats_type);
        let node = &mut *input.node;

        let mut applied = None;
        if !input.skip_parse {
            let stats: IspBgBeStats =
                read_config(node, config_id, node.maximum_pipeline_delay())?;

            if !skip_requested(node, skip_id) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                output.num_rois = 0;

                if stats.dual_ife_mode {
                    bayer_grid::parse_bgbe_stats_dual_ife(buffer, &stats, kind, output)?;
                } else {
                    bayer_grid::parse_bgbe_stats_buffer(buffer, &stats.stats_config, kind, output)?;
                }
                debug!(
                    "Request {}: {} {} regions",
                    node.current_request(),
                    output.num_rois,
                    stats_type
                );
            }
            applied = Some(stats);
        }

        publish(node, output_id, ParsedStats::BgBe(&*output))?;

        if let Some(stats) = applied {
            if kind == BgBeStatsKind::AwbBg && self.settings.enable_feature2_dump {
                warn_on_vendor_tag_failure(
                    "parsed AWB-BG",
                    vendor_tags::publish_parsed_dump(
                        node,
                        &*self.vendor_tags,
                        vendor_tags::AWBBG_DUMP_SECTION,
                        output_id,
                        ParsedStats::BgBe(&*output),
                    ),
                );
            }
            warn_on_vendor_tag_failure(
                "bayer grid",
                vendor_tags::publish_bayer_grid_stats(
                    node,
                    &*self.vendor_tags,
                    stats_type,
                    &stats.stats_config,
                    output,
                ),
            );
        }

        Ok(())
    }

    /// Parses AWB-BG statistics produced by the BPS, which stand in for HDR-BE when the realtime
    /// pipeline runs on the BPS.
    fn parse_bps_awbbg(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, BgBe, IspStatsType::BpsAwbBg);
        let node = &mut *input.node;

        if !input.skip_parse {
            let stats: IspBgBeStats = read_config(
                node,
                PropertyId::IspAwbBgConfig,
                node.maximum_pipeline_delay(),
            )?;

            if !skip_requested(node, PropertyId::SkipStatsParserTypeAwbBg) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                output.num_rois = 0;
                bayer_grid::parse_bps_awbbg_stats_buffer(buffer, &stats.stats_config, output)?;
            }
        }

        let stats = ParsedStats::BgBe(&*output);
        let mut entries = vec![WriteEntry::new(
            PropertyId::ParsedAwbBgStatsOutput,
            MetadataPayload::Parsed(stats),
        )];
        if node.is_camera_running_on_bps() {
            entries.push(WriteEntry::new(
                PropertyId::ParsedHdrBeStatsOutput,
                MetadataPayload::Parsed(stats),
            ));
        }
        node.write_data_list(&entries)?;

        Ok(())
    }

    fn parse_tintless_bg(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, TintlessBg, IspStatsType::TintlessBg);
        let node = &mut *input.node;

        if !input.skip_parse {
            let stats: IspBgBeStats = read_config(
                node,
                PropertyId::IspTintlessBgConfig,
                node.maximum_pipeline_delay(),
            )?;

            if !skip_requested(node, PropertyId::SkipStatsParserTypeTintlessBg) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                output.num_of_regions = 0;

                if stats.dual_ife_mode {
                    bayer_grid::parse_tintless_bg_stats_dual_ife(
                        buffer,
                        &stats.stripe_config,
                        output,
                    )?;
                } else {
                    bayer_grid::parse_tintless_bg_stats_buffer(
                        buffer,
                        &stats.stats_config,
                        output,
                    )?;
                }
            }
        }

        publish(
            node,
            PropertyId::ParsedTintlessBgStatsOutput,
            ParsedStats::TintlessBg(&*output),
        )?;

        if self.settings.enable_feature2_dump && !input.skip_parse {
            warn_on_vendor_tag_failure(
                "parsed Tintless-BG",
                vendor_tags::publish_parsed_dump(
                    node,
                    &*self.vendor_tags,
                    vendor_tags::TINTLESS_DUMP_SECTION,
                    PropertyId::ParsedTintlessBgStatsOutput,
                    ParsedStats::TintlessBg(&*output),
                ),
            );
        }

        Ok(())
    }

    fn parse_ihist(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, IHist, IspStatsType::IHist);
        let node = &mut *input.node;

        if !input.skip_parse {
            let stats: IspIHistStats = read_config(
                node,
                PropertyId::IspIHistConfig,
                node.maximum_pipeline_delay(),
            )?;

            if !skip_requested(node, PropertyId::SkipStatsParserTypeIHist) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                output.num_bins = 0;

                if stats.dual_ife_mode {
                    histogram::parse_ihist_stats_dual_ife(buffer, &stats.stripe_config, output)?;
                } else {
                    histogram::parse_ihist_stats_buffer(buffer, &stats.stats_config, output)?;
                }
            }
        }

        publish(node, PropertyId::ParsedIHistStatsOutput, ParsedStats::IHist(&*output))?;
        Ok(())
    }

    fn parse_hdr_bhist(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, HdrBHist, IspStatsType::HdrBHist);
        let node = &mut *input.node;

        let mut applied = None;
        if !input.skip_parse {
            let stats: IspHdrBHistStats = read_config(
                node,
                PropertyId::IspHdrBHistConfig,
                node.maximum_pipeline_delay(),
            )?;

            if !skip_requested(node, PropertyId::SkipStatsParserTypeHdrBHist) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                output.num_bins = 0;

                if stats.dual_ife_mode {
                    histogram::parse_hdr_bhist_stats_dual_ife(
                        buffer,
                        &stats.stripe_config,
                        output,
                    )?;
                } else {
                    histogram::parse_hdr_bhist_stats_buffer(buffer, &stats.stats_config, output)?;
                }
            }
            applied = Some(stats);
        }

        publish(
            node,
            PropertyId::ParsedHdrBHistStatsOutput,
            ParsedStats::HdrBHist(&*output),
        )?;

        // The histogram vendor tags carry BHist unless a dump was requested.
        if let Some(stats) = applied.filter(|_| self.settings.enable_feature2_dump) {
            warn_on_vendor_tag_failure(
                "HDR-BHist histogram",
                vendor_tags::publish_hdr_bhist_histogram(
                    node,
                    &*self.vendor_tags,
                    &stats.stats_config.roi,
                    output,
                ),
            );
        }

        Ok(())
    }

    fn parse_bhist(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, BHist, IspStatsType::BHist);
        let node = &mut *input.node;

        let mut applied = None;
        if !input.skip_parse {
            let stats: IspBHistStats = read_config(
                node,
                PropertyId::IspBHistConfig,
                node.maximum_pipeline_delay(),
            )?;

            if !skip_requested(node, PropertyId::SkipStatsParserTypeBHist) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                output.num_bins = 0;

                if stats.dual_ife_mode {
                    histogram::parse_bhist_stats_dual_ife(
                        buffer,
                        &stats.stripe_config,
                        stats.request_id,
                        output,
                    )?;
                } else {
                    histogram::parse_bhist_stats_buffer(
                        buffer,
                        &stats.stats_config,
                        stats.request_id,
                        output,
                    )?;
                }
            }
            applied = Some(stats);
        }

        publish(node, PropertyId::ParsedBHistStatsOutput, ParsedStats::BHist(&*output))?;

        if let Some(stats) = applied {
            if self.settings.enable_feature2_dump {
                warn_on_vendor_tag_failure(
                    "parsed BHist",
                    vendor_tags::publish_parsed_dump(
                        node,
                        &*self.vendor_tags,
                        vendor_tags::BHIST_DUMP_SECTION,
                        PropertyId::ParsedBHistStatsOutput,
                        ParsedStats::BHist(&*output),
                    ),
                );
            }
            warn_on_vendor_tag_failure(
                "histogram",
                vendor_tags::publish_bhist_histogram(
                    node,
                    &*self.vendor_tags,
                    &stats.stats_config.roi,
                    output,
                ),
            );
        }

        Ok(())
    }

    fn parse_cs(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, Cs, IspStatsType::Cs);
        let node = &mut *input.node;

        if !input.skip_parse {
            let stats: IspCsStats =
                read_config(node, PropertyId::IspCsConfig, node.maximum_pipeline_delay())?;

            if !skip_requested(node, PropertyId::SkipStatsParserTypeCs) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                output.num_horizontal_regions = 0;
                output.num_vertical_regions = 0;

                if stats.dual_ife_mode {
                    sums::parse_cs_stats_dual_ife(buffer, &stats.stripe_config, output)?;
                } else {
                    sums::parse_cs_stats_buffer(buffer, &stats.stats_config, output)?;
                }
            }
        }

        publish(node, PropertyId::ParsedCsStatsOutput, ParsedStats::Cs(&*output))?;
        Ok(())
    }

    fn parse_rs(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, Rs, IspStatsType::Rs);
        let node = &mut *input.node;

        if !input.skip_parse {
            let stats: IspRsStats =
                read_config(node, PropertyId::IspRsConfig, node.maximum_pipeline_delay())?;

            if !skip_requested(node, PropertyId::SkipStatsParserTypeRs) {
                let buffer = required_buffer(input.unparsed_buffer)?;
                output.num_horizontal_regions = 0;
                output.num_vertical_regions = 0;

                if stats.dual_ife_mode {
                    sums::parse_rs_stats_dual_ife(
                        buffer,
                        &stats.stats_config,
                        &stats.stripe_config,
                        output,
                    )?;
                } else {
                    sums::parse_rs_stats_buffer(buffer, &stats.stats_config, output)?;
                }
            }
        }

        publish(node, PropertyId::ParsedRsStatsOutput, ParsedStats::Rs(&*output))?;
        Ok(())
    }

    /// Computes row sums from a BPS YUV image and publishes them along with the grid they were
    /// computed on.
    fn parse_software_rs(&self, input: &mut ParseData<'_>) -> Result<(), StatsParseError> {
        let output = output_as!(input, Rs, IspStatsType::BpsRegYuv);
        let node = &mut *input.node;

        let mut rs_config = IspRsStats::default();
        if !input.skip_parse {
            let format = input.image_format.ok_or(StatsParseError::MissingImageFormat)?;
            let control: AfdStatsControl = read_config(
                node,
                PropertyId::AfdStatsControl,
                node.maximum_pipeline_delay(),
            )?;
            let buffer = required_buffer(input.unparsed_buffer)?;

            let grid =
                self.row_sum_generator
                    .generate(buffer, &format, &control.stats_config, output)?;
            output.num_horizontal_regions = grid.horizontal_region_count;
            output.num_vertical_regions = grid.vertical_region_count;

            rs_config.stats_config = RsConfig {
                stats_h_num: grid.horizontal_region_count,
                stats_v_num: grid.vertical_region_count,
                stats_rgn_width: grid.region_width,
                stats_rgn_height: grid.region_height,
                ..control.stats_config
            };
            debug!(
                "Request {}: software row sums over {}x{} regions",
                node.current_request(),
                grid.horizontal_region_count,
                grid.vertical_region_count
            );
        }
        rs_config.stats_config.bit_depth = RS_STATS_CONFIG_BIT_DEPTH;

        node.write_data_list(&[
            WriteEntry::new(PropertyId::IspRsConfig, MetadataPayload::RsConfig(&rs_config)),
            WriteEntry::new(
                PropertyId::ParsedRsStatsOutput,
                MetadataPayload::Parsed(ParsedStats::Rs(&*output)),
            ),
        ])?;

        Ok(())
    }
}

impl StatsParser for Titan17xStatsParser {
    fn parse(
        &self,
        stats_type: IspStatsType,
        input: &mut ParseData<'_>,
    ) -> Result<(), StatsParseError> {
        if !input.skip_parse && input.unparsed_buffer.is_none() {
            error!("No {} buffer to parse and parsing is not skipped", stats_type);
            return Err(StatsParseError::MissingBuffer);
        }

        let result = match stats_type {
            IspStatsType::Bf => self.parse_bf(input),
            IspStatsType::HdrBe => self.parse_bgbe(BgBeStatsKind::HdrBe, input),
            IspStatsType::AwbBg => self.parse_bgbe(BgBeStatsKind::AwbBg, input),
            IspStatsType::BpsAwbBg => self.parse_bps_awbbg(input),
            IspStatsType::TintlessBg => self.parse_tintless_bg(input),
            IspStatsType::IHist => self.parse_ihist(input),
            IspStatsType::HdrBHist => self.parse_hdr_bhist(input),
            IspStatsType::BHist => self.parse_bhist(input),
            IspStatsType::Cs => self.parse_cs(input),
            IspStatsType::Rs => self.parse_rs(input),
            IspStatsType::BpsRegYuv => self.parse_software_rs(input),
        };

        if let Err(e) = &result {
            error!(
                "Request {}: failed to parse {} stats, republishing previous data: {}",
                input.node.current_request(),
                stats_type,
                e
            );
            let running_on_bps = input.node.is_camera_running_on_bps();
            for id in fallback_properties(stats_type, running_on_bps) {
                input.node.write_previous_data(*id);
            }
        }

        result
    }

    fn max_stats_buffer_size(&self, stats_type: IspStatsType) -> usize {
        match stats_type {
            IspStatsType::Bf => 2 * BF_STATS_MAX_WIDTH,
            IspStatsType::HdrBe => 2 * HDRBE_STATS_MAX_WIDTH,
            IspStatsType::AwbBg => 2 * AWBBG_STATS_MAX_WIDTH,
            IspStatsType::BpsAwbBg => BPS_AWBBG_STATS_MAX_WIDTH * AWBBG_STATS_MAX_VERTICAL_REGIONS,
            IspStatsType::TintlessBg => 2 * TINTLESSBG_STATS_WIDTH,
            IspStatsType::IHist => 2 * IHIST_STATS_WIDTH,
            IspStatsType::HdrBHist => 2 * HDRBHIST_STATS_MAX_WIDTH,
            IspStatsType::BHist => 2 * BHIST_STATS_WIDTH,
            IspStatsType::Cs => 2 * CS_STATS_WIDTH,
            IspStatsType::Rs => 2 * RS_STATS_WIDTH,
            // Software row sums read an image whose size only the image format tells.
            IspStatsType::BpsRegYuv => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::hw::titan17x::layout::pack_bf_region;
    use crate::hw::titan17x::layout::pack_bg_region;
    use crate::hw::titan17x::layout::Bg15HwOutput;
    use crate::hw::titan17x::layout::BfStats23HwOutput;
    use crate::node::memory::MemoryNode;
    use crate::node::memory::MemoryVendorTags;
    use crate::node::memory::StoredValue;
    use crate::node::PropertyBlob;
    use crate::parser::ResultCode;
    use crate::software_stats::RowSumGrid;
    use crate::stats::config::BHistConfig;
    use crate::stats::config::BfStatsRoiConfig;
    use crate::stats::config::BgBeConfig;
    use crate::stats::config::CsConfig;
    use crate::stats::config::IspStatsConfig;
    use crate::stats::config::RoiRect;
    use crate::stats::output::OwnedParsedStats;
    use crate::stats::output::ParsedBHistStatsOutput;
    use crate::stats::output::ParsedBfStatsOutput;
    use crate::stats::output::ParsedBgBeStatsOutput;
    use crate::stats::output::ParsedCsStatsOutput;
    use crate::stats::output::ParsedRsStatsOutput;
    use crate::ImageFormat;
    use crate::TitanVersion;

    const PIPELINE_DELAY: u64 = 2;

    fn parser() -> Titan17xStatsParser {
        Titan17xStatsParser::new(
            ParserSettings::default(),
            Arc::new(MemoryVendorTags::with_stats_sections()),
        )
    }

    fn run(
        parser: &Titan17xStatsParser,
        stats_type: IspStatsType,
        node: &mut MemoryNode,
        buffer: &[u8],
        output: ParsedStatsMut<'_>,
    ) -> Result<(), StatsParseError> {
        let mut input = ParseData::new(node, buffer, output);
        parser.parse(stats_type, &mut input)
    }

    fn cs_config(stats_h_num: u32, stats_v_num: u32) -> PropertyBlob {
        PropertyBlob::CsConfig(IspStatsConfig::single(CsConfig {
            stats_h_num,
            stats_v_num,
            ..Default::default()
        }))
    }

    fn u16_buffer(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn published_cs(node: &MemoryNode) -> Option<&ParsedCsStatsOutput> {
        match node.output(PropertyId::ParsedCsStatsOutput) {
            Some(StoredValue::Parsed(OwnedParsedStats::Cs(cs))) => Some(&**cs),
            _ => None,
        }
    }

    #[test]
    fn bf_grid_is_published_by_region_id() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(10);
        // BF configurations lag by at least the minimum AF pipeline delay.
        node.publish(
            10 - MIN_AF_PIPELINE_DELAY,
            PropertyId::IspBfConfig,
            PropertyBlob::BfConfig(IspStatsConfig::single(BfStatsRoiConfig::grid(
                RoiRect {
                    left: 0,
                    top: 0,
                    width: 400,
                    height: 300,
                },
                4,
                3,
            ))),
        );

        let mut buffer = 77u64.to_le_bytes().to_vec();
        for region_id in (0..12).rev() {
            let region = BfStats23HwOutput {
                h1_sum: 100 + u64::from(region_id),
                h1_count: region_id + 1,
                region_id,
                ..Default::default()
            };
            buffer.extend(pack_bf_region(&region, 0, false, false));
        }
        let mut output = ParsedBfStatsOutput::default();

        run(
            &parser,
            IspStatsType::Bf,
            &mut node,
            &buffer,
            ParsedStatsMut::Bf(&mut output),
        )
        .unwrap();

        assert_eq!(output.num_of_roi_regions, 12);
        assert_eq!(output.frame_tag, 77);
        assert_eq!(output.regions[5].horizontal1_sum, 105);
        assert_eq!(output.regions[5].horizontal1_num, 6);
        assert_eq!(
            node.output(PropertyId::ParsedBfStatsOutput),
            Some(&StoredValue::Parsed(OwnedParsedStats::Bf(Box::new(output))))
        );
    }

    fn bf_row(count: u32) -> BfStatsRoiConfig {
        BfStatsRoiConfig::grid(RoiRect::default(), count, 1)
    }

    fn bf_record(region_id: u32, h1_sum: u64, h1_count: u32) -> BfStats23HwOutput {
        BfStats23HwOutput {
            h1_sum,
            h1_count,
            region_id,
            ..Default::default()
        }
    }

    #[test]
    fn titan480_dual_ife_bf_merges_split_regions() {
        let parser = Titan17xStatsParser::new(
            ParserSettings {
                titan_version: TitanVersion::TITAN_480,
                ..Default::default()
            },
            Arc::new(MemoryVendorTags::with_stats_sections()),
        );
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(10);
        node.publish(
            10 - MIN_AF_PIPELINE_DELAY,
            PropertyId::IspBfConfig,
            PropertyBlob::BfConfig(IspStatsConfig::dual(bf_row(3), bf_row(2), bf_row(2))),
        );

        // Region 1 straddles the stripe boundary: the right stripe reports its second half.
        let buffer: Vec<u8> = [
            pack_bf_region(&bf_record(0, 10, 1), 0, false, false),
            pack_bf_region(&bf_record(1, 20, 2), 0, false, false),
            pack_bf_region(&bf_record(1, 5, 3), 1, true, false),
            pack_bf_region(&bf_record(2, 30, 4), 1, false, true),
        ]
        .concat();
        let mut output = ParsedBfStatsOutput {
            frame_tag: 0xdead,
            ..Default::default()
        };

        run(
            &parser,
            IspStatsType::Bf,
            &mut node,
            &buffer,
            ParsedStatsMut::Bf(&mut output),
        )
        .unwrap();

        assert_eq!(output.num_of_roi_regions, 3);
        assert_eq!(output.frame_tag, 0);
        assert_eq!(&output.region_id[..3], &[0, 1, 2]);
        assert_eq!(output.regions[0].horizontal1_sum, 10);
        assert_eq!(output.regions[1].horizontal1_sum, 25);
        assert_eq!(output.regions[1].horizontal1_num, 5);
        assert_eq!(output.regions[2].horizontal1_sum, 30);
        assert_eq!(
            node.output(PropertyId::ParsedBfStatsOutput),
            Some(&StoredValue::Parsed(OwnedParsedStats::Bf(Box::new(output))))
        );
    }

    #[test]
    fn bf_config_lags_by_at_least_the_af_delay() {
        let parser = parser();
        let mut buffer = 1u64.to_le_bytes().to_vec();
        buffer.extend(pack_bf_region(&bf_record(0, 8, 2), 0, false, false));
        let config = || PropertyBlob::BfConfig(IspStatsConfig::single(bf_row(1)));

        // A short pipeline still reads the configuration three requests back.
        let mut node = MemoryNode::new(1);
        node.set_request(10);
        node.publish(10, PropertyId::IspBfConfig, config());
        let mut output = ParsedBfStatsOutput::default();
        let err = run(
            &parser,
            IspStatsType::Bf,
            &mut node,
            &buffer,
            ParsedStatsMut::Bf(&mut output),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StatsParseError::PropertyNotPublished(PropertyId::IspBfConfig)
        ));

        node.publish(7, PropertyId::IspBfConfig, config());
        let mut output = ParsedBfStatsOutput::default();
        run(
            &parser,
            IspStatsType::Bf,
            &mut node,
            &buffer,
            ParsedStatsMut::Bf(&mut output),
        )
        .unwrap();
        assert_eq!(output.num_of_roi_regions, 1);
        assert_eq!(output.regions[0].horizontal1_sum, 8);

        // Longer pipelines read one request less far back than their delay.
        let mut node = MemoryNode::new(5);
        node.set_request(10);
        node.publish(6, PropertyId::IspBfConfig, config());
        let mut output = ParsedBfStatsOutput::default();
        run(
            &parser,
            IspStatsType::Bf,
            &mut node,
            &buffer,
            ParsedStatsMut::Bf(&mut output),
        )
        .unwrap();
        assert_eq!(output.frame_tag, 1);
    }

    #[test]
    fn cs_example_grid() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(5);
        node.publish(3, PropertyId::IspCsConfig, cs_config(2, 2));
        let mut output = ParsedCsStatsOutput::default();

        run(
            &parser,
            IspStatsType::Cs,
            &mut node,
            &u16_buffer(&[10, 20, 30, 40]),
            ParsedStatsMut::Cs(&mut output),
        )
        .unwrap();

        let cs = published_cs(&node).unwrap();
        assert_eq!(cs.column_sum[0][0], 10);
        assert_eq!(cs.column_sum[1][0], 20);
        assert_eq!(cs.column_sum[0][1], 30);
        assert_eq!(cs.column_sum[1][1], 40);
        assert_eq!(node.previous_data_writes().count(), 0);
    }

    #[test]
    fn failure_republishes_previous_data_once() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        let mut output = ParsedCsStatsOutput::default();

        node.set_request(5);
        node.publish(3, PropertyId::IspCsConfig, cs_config(2, 1));
        run(
            &parser,
            IspStatsType::Cs,
            &mut node,
            &u16_buffer(&[1, 2]),
            ParsedStatsMut::Cs(&mut output),
        )
        .unwrap();
        let previous = published_cs(&node).cloned();

        // No configuration was published for request 6.
        node.set_request(6);
        let err = run(
            &parser,
            IspStatsType::Cs,
            &mut node,
            &u16_buffer(&[3, 4]),
            ParsedStatsMut::Cs(&mut output),
        )
        .unwrap_err();

        assert_eq!(err.code(), ResultCode::Failed);
        assert_eq!(
            node.previous_data_writes().collect::<Vec<_>>(),
            vec![PropertyId::ParsedCsStatsOutput]
        );
        assert_eq!(published_cs(&node).cloned(), previous);
    }

    #[test]
    fn degenerate_config_falls_back() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.publish(2, PropertyId::IspCsConfig, cs_config(0, 2));
        let mut output = ParsedCsStatsOutput::default();

        let err = run(
            &parser,
            IspStatsType::Cs,
            &mut node,
            &[0; 8],
            ParsedStatsMut::Cs(&mut output),
        )
        .unwrap_err();

        assert_eq!(err.code(), ResultCode::InvalidArg);
        assert_eq!(node.previous_data_writes().count(), 1);
        // Nothing was published for request 3, so nothing is carried over either.
        assert_eq!(published_cs(&node), None);
    }

    #[test]
    fn config_of_the_wrong_type_is_invalid() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.publish(2, PropertyId::IspCsConfig, PropertyBlob::SkipParse(false));
        let mut output = ParsedCsStatsOutput::default();

        let err = run(
            &parser,
            IspStatsType::Cs,
            &mut node,
            &[0; 8],
            ParsedStatsMut::Cs(&mut output),
        )
        .unwrap_err();

        assert_eq!(err.code(), ResultCode::InvalidPointer);
        assert_eq!(node.previous_data_writes().count(), 1);
    }

    #[test]
    fn skip_flag_publishes_without_parsing() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.publish(2, PropertyId::IspCsConfig, cs_config(2, 2));
        node.publish(3, PropertyId::SkipStatsParserTypeCs, PropertyBlob::SkipParse(true));
        let mut output = ParsedCsStatsOutput::default();
        output.num_horizontal_regions = 9;

        run(
            &parser,
            IspStatsType::Cs,
            &mut node,
            &[],
            ParsedStatsMut::Cs(&mut output),
        )
        .unwrap();

        assert_eq!(published_cs(&node).unwrap().num_horizontal_regions, 9);
    }

    #[test]
    fn skip_parse_needs_neither_buffer_nor_config() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        let mut output = ParsedCsStatsOutput::default();
        let mut input = ParseData {
            node: &mut node,
            unparsed_buffer: None,
            skip_parse: true,
            output: ParsedStatsMut::Cs(&mut output),
            image_format: None,
        };

        parser.parse(IspStatsType::Cs, &mut input).unwrap();

        assert!(published_cs(&node).is_some());
    }

    #[test]
    fn missing_buffer_is_rejected_before_dispatch() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        let mut output = ParsedCsStatsOutput::default();
        let mut input = ParseData {
            node: &mut node,
            unparsed_buffer: None,
            skip_parse: false,
            output: ParsedStatsMut::Cs(&mut output),
            image_format: None,
        };

        let err = parser.parse(IspStatsType::Cs, &mut input).unwrap_err();

        assert_eq!(err.code(), ResultCode::Failed);
        assert_eq!(node.previous_data_writes().count(), 0);
    }

    #[test]
    fn mismatched_output_is_invalid() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        let mut output = ParsedCsStatsOutput::default();

        let err = run(
            &parser,
            IspStatsType::Rs,
            &mut node,
            &[0; 4],
            ParsedStatsMut::Cs(&mut output),
        )
        .unwrap_err();

        assert_eq!(err.code(), ResultCode::InvalidArg);
        assert_eq!(
            node.previous_data_writes().collect::<Vec<_>>(),
            vec![PropertyId::ParsedRsStatsOutput]
        );
    }

    fn awbbg_config() -> PropertyBlob {
        PropertyBlob::BgBeConfig(IspStatsConfig::single(BgBeConfig {
            horizontal_num: 2,
            vertical_num: 1,
            ..Default::default()
        }))
    }

    fn bg_buffer() -> Vec<u8> {
        [10, 20]
            .iter()
            .flat_map(|&r_sum| {
                pack_bg_region(&Bg15HwOutput {
                    r_sum,
                    r_count: 10,
                    ..Default::default()
                })
            })
            .collect()
    }

    #[test]
    fn bps_awbbg_also_stands_in_for_hdrbe() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.set_running_on_bps(true);
        node.publish(2, PropertyId::IspAwbBgConfig, awbbg_config());
        let mut output = ParsedBgBeStatsOutput::new_awbbg();

        run(
            &parser,
            IspStatsType::BpsAwbBg,
            &mut node,
            &bg_buffer(),
            ParsedStatsMut::BgBe(&mut output),
        )
        .unwrap();

        assert_eq!(output.num_rois, 2);
        assert!(node.output(PropertyId::ParsedAwbBgStatsOutput).is_some());
        assert_eq!(
            node.output(PropertyId::ParsedAwbBgStatsOutput),
            node.output(PropertyId::ParsedHdrBeStatsOutput)
        );

        node.set_request(5);
        run(
            &parser,
            IspStatsType::BpsAwbBg,
            &mut node,
            &bg_buffer(),
            ParsedStatsMut::BgBe(&mut output),
        )
        .unwrap_err();
        assert_eq!(
            node.previous_data_writes().collect::<Vec<_>>(),
            vec![
                PropertyId::ParsedAwbBgStatsOutput,
                PropertyId::ParsedHdrBeStatsOutput
            ]
        );
    }

    #[test]
    fn awbbg_vendor_tags_and_dump() {
        let tags = Arc::new(MemoryVendorTags::with_stats_sections());
        let parser = Titan17xStatsParser::new(
            ParserSettings {
                enable_feature2_dump: true,
                ..Default::default()
            },
            tags.clone(),
        );
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.publish(2, PropertyId::IspAwbBgConfig, awbbg_config());
        let mut output = ParsedBgBeStatsOutput::new_awbbg();

        run(
            &parser,
            IspStatsType::AwbBg,
            &mut node,
            &bg_buffer(),
            ParsedStatsMut::BgBe(&mut output),
        )
        .unwrap();

        let tag = |section, name| tags.query_vendor_tag_location(section, name).unwrap();
        assert_eq!(
            node.output(tag(vendor_tags::BAYER_GRID_SECTION, "r_stats")),
            Some(&StoredValue::U32Array(vec![1, 2]))
        );
        assert_eq!(
            node.output(tag(vendor_tags::AWBBG_DUMP_SECTION, "propertyID")),
            Some(&StoredValue::PropertyId(PropertyId::ParsedAwbBgStatsOutput))
        );
    }

    #[test]
    fn vendor_tag_failures_are_not_fatal() {
        let parser = Titan17xStatsParser::new(
            ParserSettings::default(),
            Arc::new(MemoryVendorTags::default()),
        );
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.publish(
            2,
            PropertyId::IspBHistConfig,
            PropertyBlob::BHistConfig(IspStatsConfig::single(BHistConfig {
                num_bins: 2,
                ..Default::default()
            })),
        );
        let mut output = ParsedBHistStatsOutput::default();

        run(
            &parser,
            IspStatsType::BHist,
            &mut node,
            &[1, 0, 0, 0, 2, 0, 0, 0],
            ParsedStatsMut::BHist(&mut output),
        )
        .unwrap();

        assert_eq!(output.bins[..2], [1, 2]);
        assert!(node.output(PropertyId::ParsedBHistStatsOutput).is_some());
        assert_eq!(node.previous_data_writes().count(), 0);
    }

    #[test]
    fn failed_output_write_falls_back() {
        let parser = parser();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.publish(2, PropertyId::IspCsConfig, cs_config(1, 1));
        node.fail_writes_to(PropertyId::ParsedCsStatsOutput);
        let mut output = ParsedCsStatsOutput::default();

        let err = run(
            &parser,
            IspStatsType::Cs,
            &mut node,
            &[1, 0],
            ParsedStatsMut::Cs(&mut output),
        )
        .unwrap_err();

        assert!(matches!(err, StatsParseError::Node(NodeError::WriteFailed(_))));
        assert_eq!(node.previous_data_writes().count(), 1);
    }

    #[test]
    fn bhist_histogram_and_dump() {
        let tags = Arc::new(MemoryVendorTags::with_stats_sections());
        let parser = Titan17xStatsParser::new(
            ParserSettings {
                enable_feature2_dump: true,
                ..Default::default()
            },
            tags.clone(),
        );
        let tag = |section, name| tags.query_vendor_tag_location(section, name).unwrap();
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.publish(
            2,
            PropertyId::IspBHistConfig,
            PropertyBlob::BHistConfig(IspStatsConfig::single(BHistConfig {
                num_bins: 2,
                roi: RoiRect {
                    width: 4,
                    height: 2,
                    ..Default::default()
                },
                ..Default::default()
            })),
        );
        let mut output = ParsedBHistStatsOutput::default();

        run(
            &parser,
            IspStatsType::BHist,
            &mut node,
            &[5, 0, 0, 0, 3, 0, 0, 0],
            ParsedStatsMut::BHist(&mut output),
        )
        .unwrap();

        assert_eq!(
            node.output(tag(vendor_tags::HISTOGRAM_SECTION, "max_count")),
            Some(&StoredValue::U32(8))
        );
        assert_eq!(
            node.output(tag(vendor_tags::BHIST_DUMP_SECTION, "propertyID")),
            Some(&StoredValue::PropertyId(PropertyId::ParsedBHistStatsOutput))
        );

        // Nothing but the output itself when parsing is skipped.
        node.set_request(5);
        let mut input = ParseData {
            node: &mut node,
            unparsed_buffer: None,
            skip_parse: true,
            output: ParsedStatsMut::BHist(&mut output),
            image_format: None,
        };
        parser.parse(IspStatsType::BHist, &mut input).unwrap();

        assert!(node.output(PropertyId::ParsedBHistStatsOutput).is_some());
        assert_eq!(node.output(tag(vendor_tags::HISTOGRAM_SECTION, "stats")), None);
        assert_eq!(node.output(tag(vendor_tags::BHIST_DUMP_SECTION, "stats")), None);
    }

    fn software_rs_node() -> MemoryNode {
        let mut node = MemoryNode::new(PIPELINE_DELAY);
        node.set_request(4);
        node.publish(
            2,
            PropertyId::AfdStatsControl,
            PropertyBlob::AfdStatsControl(AfdStatsControl {
                stats_config: RsConfig {
                    stats_h_num: 1,
                    stats_v_num: 4,
                    ..Default::default()
                },
            }),
        );
        node
    }

    fn image_format() -> ImageFormat {
        ImageFormat {
            width: 4,
            height: 4,
            stride: 4,
        }
    }

    #[test]
    fn software_row_sums() {
        let parser = parser().with_row_sum_generator(
            |image: &[u8],
             format: &ImageFormat,
             config: &RsConfig,
             output: &mut ParsedRsStatsOutput|
             -> anyhow::Result<RowSumGrid> {
                for (row, line) in image.chunks(format.stride as usize).enumerate() {
                    output.row_sum[0][row] = line.iter().map(|&p| u32::from(p)).sum();
                }
                Ok(RowSumGrid {
                    horizontal_region_count: config.stats_h_num,
                    vertical_region_count: format.height,
                    region_width: format.width,
                    region_height: 1,
                })
            },
        );
        let mut node = software_rs_node();
        let image = [1u8; 16];
        let mut output = ParsedRsStatsOutput::default();
        let mut input = ParseData::new(&mut node, &image, ParsedStatsMut::Rs(&mut output));
        input.image_format = Some(image_format());

        parser.parse(IspStatsType::BpsRegYuv, &mut input).unwrap();

        assert_eq!(output.row_sum[0][..4], [4, 4, 4, 4]);
        assert_eq!(output.num_vertical_regions, 4);
        match node.output(PropertyId::IspRsConfig) {
            Some(StoredValue::RsConfig(config)) => {
                assert_eq!(config.stats_config.stats_h_num, 1);
                assert_eq!(config.stats_config.stats_v_num, 4);
                assert_eq!(config.stats_config.stats_rgn_width, 4);
                assert_eq!(config.stats_config.bit_depth, RS_STATS_CONFIG_BIT_DEPTH);
            }
            other => panic!("unexpected RS config {:?}", other),
        }
    }

    #[test]
    fn software_row_sums_need_an_image_format() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let parser = parser().with_row_sum_generator(
            move |_: &[u8],
                  _: &ImageFormat,
                  _: &RsConfig,
                  _: &mut ParsedRsStatsOutput|
                  -> anyhow::Result<RowSumGrid> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(RowSumGrid::default())
            },
        );
        let mut node = software_rs_node();
        let mut output = ParsedRsStatsOutput::default();

        let err = run(
            &parser,
            IspStatsType::BpsRegYuv,
            &mut node,
            &[0; 16],
            ParsedStatsMut::Rs(&mut output),
        )
        .unwrap_err();

        assert_eq!(err.code(), ResultCode::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            node.previous_data_writes().collect::<Vec<_>>(),
            vec![PropertyId::IspRsConfig, PropertyId::ParsedRsStatsOutput]
        );
    }

    #[test]
    fn software_row_sums_without_library() {
        let parser = Titan17xStatsParser::new(
            ParserSettings {
                software_stats_library: crate::software_stats::SoftwareStatsLibrary {
                    directory: "/nonexistent".into(),
                    ..Default::default()
                },
                ..Default::default()
            },
            Arc::new(MemoryVendorTags::with_stats_sections()),
        );
        let mut node = software_rs_node();
        let image = [0u8; 16];
        let mut output = ParsedRsStatsOutput::default();
        let mut input = ParseData::new(&mut node, &image, ParsedStatsMut::Rs(&mut output));
        input.image_format = Some(image_format());

        let err = parser.parse(IspStatsType::BpsRegYuv, &mut input).unwrap_err();

        assert!(matches!(err, StatsParseError::Other(_)));
        assert_eq!(node.previous_data_writes().count(), 2);
    }

    #[test]
    fn buffer_sizes_cover_both_stripes() {
        let parser = parser();
        assert_eq!(parser.max_stats_buffer_size(IspStatsType::Cs), 2 * 12480);
        assert_eq!(parser.max_stats_buffer_size(IspStatsType::Bf), 2 * 5768);
        assert_eq!(parser.max_stats_buffer_size(IspStatsType::BpsAwbBg), 7680 * 90);
        assert_eq!(parser.max_stats_buffer_size(IspStatsType::BpsRegYuv), 0);
    }
}
