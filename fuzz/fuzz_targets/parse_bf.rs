#![no_main]

use libfuzzer_sys::fuzz_target;
use titan_stats::parser::titan17x::bf::parse_bf_stats_buffer;
use titan_stats::parser::titan17x::bf::parse_bf_stats_dual_ife;
use titan_stats::parser::titan17x::bf::parse_bf_stats_index_mode;
use titan_stats::stats::config::BfStatsRoiConfig;
use titan_stats::stats::config::RoiRect;
use titan_stats::stats::output::ParsedBfStatsOutput;

fuzz_target!(|data: &[u8]| {
    let Some((&[h, v, mode], buffer)) = data.split_first_chunk::<3>() else {
        return;
    };
    let config = BfStatsRoiConfig::grid(RoiRect::default(), u32::from(h % 16), u32::from(v % 16));
    let stripes = [config.clone(), config.clone()];
    let mut output = ParsedBfStatsOutput::default();

    let _ = match mode % 3 {
        0 => parse_bf_stats_buffer(buffer, &config, h & 0x80 != 0, &mut output),
        1 => parse_bf_stats_dual_ife(buffer, &stripes, &mut output),
        _ => parse_bf_stats_index_mode(buffer, &stripes, &mut output),
    };
});
