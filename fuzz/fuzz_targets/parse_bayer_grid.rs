#![no_main]

use libfuzzer_sys::fuzz_target;
use titan_stats::parser::titan17x::bayer_grid::parse_bgbe_stats_buffer;
use titan_stats::parser::titan17x::bayer_grid::parse_bgbe_stats_dual_ife;
use titan_stats::parser::titan17x::bayer_grid::parse_tintless_bg_stats_buffer;
use titan_stats::parser::titan17x::bayer_grid::BgBeStatsKind;
use titan_stats::stats::config::BgBeConfig;
use titan_stats::stats::config::BgBeOutputMode;
use titan_stats::stats::config::IspStatsConfig;
use titan_stats::stats::output::ParsedBgBeStatsOutput;
use titan_stats::stats::output::ParsedTintlessBgStatsOutput;

fuzz_target!(|data: &[u8]| {
    let Some((&[h, v, mode, kind], buffer)) = data.split_first_chunk::<4>() else {
        return;
    };
    let config = BgBeConfig {
        horizontal_num: u32::from(h),
        vertical_num: u32::from(v),
        output_mode: BgBeOutputMode::n(u32::from(mode % 3)).unwrap_or_default(),
        ..Default::default()
    };
    let kind = if kind & 1 == 0 {
        BgBeStatsKind::HdrBe
    } else {
        BgBeStatsKind::AwbBg
    };

    let mut output = ParsedBgBeStatsOutput::new_hdrbe();
    let _ = parse_bgbe_stats_buffer(buffer, &config, kind, &mut output);

    let stats = IspStatsConfig::dual(config.clone(), config.clone(), config.clone());
    let _ = parse_bgbe_stats_dual_ife(buffer, &stats, kind, &mut output);

    let mut output = ParsedTintlessBgStatsOutput::default();
    let _ = parse_tintless_bg_stats_buffer(buffer, &config, &mut output);
});
