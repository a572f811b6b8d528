// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! statsdump, a small program decoding dumped Titan statistics buffers with titan-stats.
//!
//! The region geometry the ISP was programmed with is not part of the buffer, so it is given on
//! the command line and published to an in-memory property pool before parsing.

use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use titan_stats::node::memory::MemoryNode;
use titan_stats::node::memory::MemoryVendorTags;
use titan_stats::node::PropertyBlob;
use titan_stats::node::PropertyId;
use titan_stats::parser::titan17x::Titan17xStatsParser;
use titan_stats::parser::ParseData;
use titan_stats::parser::ParserSettings;
use titan_stats::parser::StatsParser;
use titan_stats::software_stats::SoftwareStatsLibrary;
use titan_stats::stats::config::AfdStatsControl;
use titan_stats::stats::config::BHistConfig;
use titan_stats::stats::config::BfStatsRoiConfig;
use titan_stats::stats::config::BgBeConfig;
use titan_stats::stats::config::CsConfig;
use titan_stats::stats::config::HdrBHistConfig;
use titan_stats::stats::config::IHistConfig;
use titan_stats::stats::config::IspStatsConfig;
use titan_stats::stats::config::RoiRect;
use titan_stats::stats::config::RsConfig;
use titan_stats::stats::output::ParsedBHistStatsOutput;
use titan_stats::stats::output::ParsedBfStatsOutput;
use titan_stats::stats::output::ParsedBgBeStatsOutput;
use titan_stats::stats::output::ParsedCsStatsOutput;
use titan_stats::stats::output::ParsedHdrBHistStatsOutput;
use titan_stats::stats::output::ParsedIHistStatsOutput;
use titan_stats::stats::output::ParsedRsStatsOutput;
use titan_stats::stats::output::ParsedStatsMut;
use titan_stats::stats::output::ParsedTintlessBgStatsOutput;
use titan_stats::ImageFormat;
use titan_stats::IspStatsType;

use crate::util::Args;

mod util;

/// Request the buffer is parsed for. Configurations are published for every earlier request so
/// that any pipeline delay finds them.
const REQUEST: u64 = 8;
const PIPELINE_DELAY: u64 = 2;

fn isp_config<C: Clone + Default>(args: &Args, config: C) -> IspStatsConfig<C> {
    if args.dual_ife {
        IspStatsConfig::dual(config.clone(), config.clone(), config)
    } else {
        IspStatsConfig::single(config)
    }
}

fn config_property(args: &Args) -> (PropertyId, PropertyBlob) {
    let (h, v) = (args.horizontal_num, args.vertical_num);
    let bgbe = || BgBeConfig {
        horizontal_num: h,
        vertical_num: v,
        output_mode: args.output_mode.0,
        ..Default::default()
    };
    let rs = RsConfig {
        stats_h_num: h,
        stats_v_num: v,
        ..Default::default()
    };

    match args.stats_type {
        IspStatsType::Bf => (
            PropertyId::IspBfConfig,
            PropertyBlob::BfConfig(isp_config(
                args,
                BfStatsRoiConfig::grid(RoiRect::default(), h, v),
            )),
        ),
        IspStatsType::HdrBe => (
            PropertyId::IspHdrBeConfig,
            PropertyBlob::BgBeConfig(isp_config(args, bgbe())),
        ),
        IspStatsType::AwbBg | IspStatsType::BpsAwbBg => (
            PropertyId::IspAwbBgConfig,
            PropertyBlob::BgBeConfig(isp_config(args, bgbe())),
        ),
        IspStatsType::TintlessBg => (
            PropertyId::IspTintlessBgConfig,
            PropertyBlob::BgBeConfig(isp_config(args, bgbe())),
        ),
        IspStatsType::IHist => (
            PropertyId::IspIHistConfig,
            PropertyBlob::IHistConfig(isp_config(
                args,
                IHistConfig {
                    num_bins: args.num_bins,
                    ..Default::default()
                },
            )),
        ),
        IspStatsType::HdrBHist => (
            PropertyId::IspHdrBHistConfig,
            PropertyBlob::HdrBHistConfig(isp_config(
                args,
                HdrBHistConfig {
                    num_bins: args.num_bins,
                    ..Default::default()
                },
            )),
        ),
        IspStatsType::BHist => (
            PropertyId::IspBHistConfig,
            PropertyBlob::BHistConfig(isp_config(
                args,
                BHistConfig {
                    num_bins: args.num_bins,
                    ..Default::default()
                },
            )),
        ),
        IspStatsType::Cs => (
            PropertyId::IspCsConfig,
            PropertyBlob::CsConfig(isp_config(
                args,
                CsConfig {
                    stats_h_num: h,
                    stats_v_num: v,
                    ..Default::default()
                },
            )),
        ),
        IspStatsType::Rs => (
            PropertyId::IspRsConfig,
            PropertyBlob::RsConfig(isp_config(args, rs)),
        ),
        IspStatsType::BpsRegYuv => (
            PropertyId::AfdStatsControl,
            PropertyBlob::AfdStatsControl(AfdStatsControl { stats_config: rs }),
        ),
    }
}

/// Storage for the output of any statistics type.
enum Output {
    Bf(Box<ParsedBfStatsOutput>),
    BgBe(Box<ParsedBgBeStatsOutput>),
    TintlessBg(Box<ParsedTintlessBgStatsOutput>),
    IHist(Box<ParsedIHistStatsOutput>),
    HdrBHist(Box<ParsedHdrBHistStatsOutput>),
    BHist(Box<ParsedBHistStatsOutput>),
    Cs(Box<ParsedCsStatsOutput>),
    Rs(Box<ParsedRsStatsOutput>),
}

impl Output {
    fn for_type(stats_type: IspStatsType) -> Self {
        match stats_type {
            IspStatsType::Bf => Output::Bf(Default::default()),
            IspStatsType::HdrBe => Output::BgBe(Box::new(ParsedBgBeStatsOutput::new_hdrbe())),
            IspStatsType::AwbBg | IspStatsType::BpsAwbBg => {
                Output::BgBe(Box::new(ParsedBgBeStatsOutput::new_awbbg()))
            }
            IspStatsType::TintlessBg => Output::TintlessBg(Default::default()),
            IspStatsType::IHist => Output::IHist(Default::default()),
            IspStatsType::HdrBHist => Output::HdrBHist(Default::default()),
            IspStatsType::BHist => Output::BHist(Default::default()),
            IspStatsType::Cs => Output::Cs(Default::default()),
            IspStatsType::Rs | IspStatsType::BpsRegYuv => Output::Rs(Default::default()),
        }
    }

    fn as_mut(&mut self) -> ParsedStatsMut<'_> {
        match self {
            Output::Bf(o) => ParsedStatsMut::Bf(o),
            Output::BgBe(o) => ParsedStatsMut::BgBe(o),
            Output::TintlessBg(o) => ParsedStatsMut::TintlessBg(o),
            Output::IHist(o) => ParsedStatsMut::IHist(o),
            Output::HdrBHist(o) => ParsedStatsMut::HdrBHist(o),
            Output::BHist(o) => ParsedStatsMut::BHist(o),
            Output::Cs(o) => ParsedStatsMut::Cs(o),
            Output::Rs(o) => ParsedStatsMut::Rs(o),
        }
    }

    fn print(&self, max_regions: usize) {
        match self {
            Output::Bf(o) => {
                println!("frame tag {:#x}, {} regions", o.frame_tag, o.num_of_roi_regions);
                for (id, region) in o.iter().take(max_regions) {
                    println!(
                        "  region {:3}: h1 {} / {} v {} / {}",
                        id,
                        region.horizontal1_sum,
                        region.horizontal1_num,
                        region.vertical_sum,
                        region.vertical_num
                    );
                }
            }
            Output::BgBe(o) => {
                println!("{} regions, {:?}", o.num_rois, o.flags);
                for index in 0..(o.num_rois as usize).min(max_regions) {
                    if let Some(rgb) = o.rgb_channel(index) {
                        let [r, g, b] = rgb.averages();
                        println!("  region {:4}: r {} g {} b {}", index, r, g, b);
                    }
                }
            }
            Output::TintlessBg(o) => {
                println!("{} regions, {:?}", o.num_of_regions, o.flags);
                for (index, data) in o
                    .channel_data
                    .iter()
                    .take((o.num_of_regions as usize).min(max_regions))
                    .enumerate()
                {
                    println!("  region {:4}: {:?}", index, data);
                }
            }
            Output::IHist(o) => {
                let bins = (o.num_bins as usize).min(max_regions);
                println!("{} bins", o.num_bins);
                println!("  y {:?}", &o.ycc[..bins]);
                println!("  r {:?}", &o.red[..bins]);
                println!("  g {:?}", &o.green[..bins]);
                println!("  b {:?}", &o.blue[..bins]);
            }
            Output::HdrBHist(o) => {
                let bins = (o.num_bins as usize).min(max_regions);
                println!("{} bins", o.num_bins);
                println!("  r {:?}", &o.red[..bins]);
                println!("  g {:?}", &o.green[..bins]);
                println!("  b {:?}", &o.blue[..bins]);
            }
            Output::BHist(o) => {
                let bins = (o.num_bins as usize).min(max_regions);
                println!("{} bins of {:?}", o.num_bins, o.channel_type);
                println!("  {:?}", &o.bins[..bins]);
            }
            Output::Cs(o) => {
                println!(
                    "{}x{} column sums",
                    o.num_horizontal_regions, o.num_vertical_regions
                );
                let columns = (o.num_horizontal_regions as usize).min(max_regions);
                for column in o.column_sum.iter().take(columns) {
                    println!("  {:?}", &column[..o.num_vertical_regions as usize]);
                }
            }
            Output::Rs(o) => {
                println!(
                    "{}x{} row sums",
                    o.num_horizontal_regions, o.num_vertical_regions
                );
                for column in o.row_sum.iter().take(o.num_horizontal_regions as usize) {
                    let rows = (o.num_vertical_regions as usize).min(max_regions);
                    println!("  {:?}", &column[..rows]);
                }
            }
        }
    }
}

fn main() {
    env_logger::init();

    let args: Args = argh::from_env();

    let mut input = File::open(&args.input).expect("error opening input file");
    let mut buffer = Vec::new();
    input
        .read_to_end(&mut buffer)
        .expect("error reading input file");

    let mut settings = ParserSettings {
        titan_version: args.titan_version,
        ..Default::default()
    };
    if let Some(directory) = &args.library_dir {
        settings.software_stats_library = SoftwareStatsLibrary {
            directory: directory.clone(),
            ..Default::default()
        };
    }
    let parser = Titan17xStatsParser::new(
        settings,
        Arc::new(MemoryVendorTags::with_stats_sections()),
    );

    let mut node = MemoryNode::new(PIPELINE_DELAY);
    let (id, blob) = config_property(&args);
    for request in 0..=REQUEST {
        node.publish(request, id, blob.clone());
    }
    node.set_request(REQUEST);

    let max_size = parser.max_stats_buffer_size(args.stats_type);
    if max_size != 0 && buffer.len() > max_size {
        log::warn!(
            "{} bytes of input, {} stats buffers hold at most {}",
            buffer.len(),
            args.stats_type,
            max_size
        );
    }

    let mut output = Output::for_type(args.stats_type);
    let mut data = ParseData::new(&mut node, &buffer, output.as_mut());
    if args.stats_type == IspStatsType::BpsRegYuv {
        data.image_format = Some(ImageFormat {
            width: args.image_width,
            height: args.image_height,
            stride: args.image_stride.unwrap_or(args.image_width),
        });
    }

    if let Err(e) = parser.parse(args.stats_type, &mut data) {
        eprintln!("failed to parse {} stats: {} ({:?})", args.stats_type, e, e.code());
        std::process::exit(1);
    }

    output.print(args.max_regions);
}
