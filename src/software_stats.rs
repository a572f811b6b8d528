// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Software generated row sums.
//!
//! When the hardware RS engine is not used (BPS YUV processing), row sums are computed from the
//! image by an external algorithm library. The parser only sees the [`RowSumGenerator`]
//! interface; [`LibraryRowSumGenerator`] is the implementation backed by that library.

use std::ffi::c_int;
use std::path::PathBuf;
use std::sync::Mutex;

use log::debug;
use log::error;
use thiserror::Error;

use crate::hw::titan17x::RS_STATS_MAX_HORIZONTAL_REGIONS;
use crate::hw::titan17x::RS_STATS_MAX_VERTICAL_REGIONS;
use crate::stats::config::RsConfig;
use crate::stats::output::ParsedRsStatsOutput;
use crate::ImageFormat;

pub const DEFAULT_SOFTWARE_STATS_LIBRARY_NAME: &str = "com.qti.stats.statsgenerator";
pub const GENERATE_SOFTWARE_RS_STATS_SYMBOL: &str = "GenerateSoftwareRSStats";
pub const DEFAULT_ALGORITHM_PATH: &str = "/vendor/lib64/camera/components";

/// Location of the software statistics library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoftwareStatsLibrary {
    pub directory: PathBuf,
    pub name: String,
    pub symbol: String,
}

impl Default for SoftwareStatsLibrary {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_ALGORITHM_PATH),
            name: DEFAULT_SOFTWARE_STATS_LIBRARY_NAME.to_string(),
            symbol: GENERATE_SOFTWARE_RS_STATS_SYMBOL.to_string(),
        }
    }
}

impl SoftwareStatsLibrary {
    pub fn path(&self) -> PathBuf {
        self.directory
            .join(format!("{}{}", self.name, std::env::consts::DLL_SUFFIX))
    }
}

#[derive(Debug, Error)]
pub enum SoftwareStatsError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("failed to resolve {symbol}: {source}")]
    Symbol {
        symbol: String,
        #[source]
        source: libloading::Error,
    },
    #[error("row sum generator failed with {0}")]
    Generator(c_int),
    #[error("image needs {needed} bytes but the buffer holds {len}")]
    ImageTooSmall { needed: usize, len: usize },
    #[error("generator reported a {horizontal}x{vertical} grid")]
    GridTooLarge { horizontal: u32, vertical: u32 },
    #[error("library state lock was poisoned")]
    Poisoned,
}

/// Grid of the row sums written by a generator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSumGrid {
    pub horizontal_region_count: u32,
    pub vertical_region_count: u32,
    pub region_width: u32,
    pub region_height: u32,
}

/// Computes row sums from an image.
pub trait RowSumGenerator: Send + Sync {
    /// Fills `output.row_sum` from the luma plane in `image` and returns the grid it used.
    fn generate(
        &self,
        image: &[u8],
        format: &ImageFormat,
        config: &RsConfig,
        output: &mut ParsedRsStatsOutput,
    ) -> anyhow::Result<RowSumGrid>;
}

impl<F> RowSumGenerator for F
where
    F: Fn(&[u8], &ImageFormat, &RsConfig, &mut ParsedRsStatsOutput) -> anyhow::Result<RowSumGrid>
        + Send
        + Sync,
{
    fn generate(
        &self,
        image: &[u8],
        format: &ImageFormat,
        config: &RsConfig,
        output: &mut ParsedRsStatsOutput,
    ) -> anyhow::Result<RowSumGrid> {
        self(image, format, config, output)
    }
}

#[repr(C)]
struct StatsDimension {
    width: u32,
    height: u32,
}

#[repr(C)]
struct RsStatsConfigAbi {
    stats_h_num: u32,
    stats_v_num: u32,
    stats_rgn_width: u32,
    stats_rgn_height: u32,
    bit_depth: u32,
}

#[repr(C)]
struct StatsRowSum {
    /// `RS_STATS_MAX_HORIZONTAL_REGIONS` rows of `RS_STATS_MAX_VERTICAL_REGIONS` sums.
    row_sum: *mut u32,
    horizontal_region_count: u32,
    vertical_region_count: u32,
    region_width: u32,
    region_height: u32,
}

type GenerateSoftwareRsStats = unsafe extern "C" fn(
    *const u8,
    *const StatsDimension,
    u32,
    *mut RsStatsConfigAbi,
    *mut StatsRowSum,
) -> c_int;

struct LoadedLibrary {
    // Keeps `generate` valid.
    _library: libloading::Library,
    generate: GenerateSoftwareRsStats,
}

/// Row sum generator backed by the software statistics library, loaded on first use.
///
/// Loading is serialized so that pipelines racing on their first frame load the library once.
/// A failed load leaves the generator unloaded and is retried on the next call.
pub struct LibraryRowSumGenerator {
    library: SoftwareStatsLibrary,
    loaded: Mutex<Option<LoadedLibrary>>,
}

impl LibraryRowSumGenerator {
    pub fn new(library: SoftwareStatsLibrary) -> Self {
        Self {
            library,
            loaded: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.lock().map(|l| l.is_some()).unwrap_or(false)
    }

    fn load(&self) -> Result<LoadedLibrary, SoftwareStatsError> {
        let path = self.library.path();
        debug!("Loading software stats library {}", path.display());

        // SAFETY: the library is a camera algorithm component without load-time side effects
        // beyond its own initialization.
        let library = unsafe { libloading::Library::new(&path) }
            .map_err(|source| SoftwareStatsError::Load { path, source })?;

        // SAFETY: the exported symbol has the `GenerateSoftwareRsStats` signature.
        let generate =
            unsafe { library.get::<GenerateSoftwareRsStats>(self.library.symbol.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|source| SoftwareStatsError::Symbol {
                symbol: self.library.symbol.clone(),
                source,
            })?;

        Ok(LoadedLibrary {
            _library: library,
            generate,
        })
    }

    fn generate_fn(&self) -> Result<GenerateSoftwareRsStats, SoftwareStatsError> {
        let mut loaded = self.loaded.lock().map_err(|_| SoftwareStatsError::Poisoned)?;

        if loaded.is_none() {
            match self.load() {
                Ok(library) => *loaded = Some(library),
                Err(e) => {
                    error!("Failed to load library for stats generation: {}", e);
                    return Err(e);
                }
            }
        }

        loaded
            .as_ref()
            .map(|library| library.generate)
            .ok_or(SoftwareStatsError::Poisoned)
    }
}

impl RowSumGenerator for LibraryRowSumGenerator {
    fn generate(
        &self,
        image: &[u8],
        format: &ImageFormat,
        config: &RsConfig,
        output: &mut ParsedRsStatsOutput,
    ) -> anyhow::Result<RowSumGrid> {
        let generate = self.generate_fn()?;

        let needed = format.stride as usize * format.height as usize;
        if image.len() < needed || (format.width > format.stride) {
            return Err(SoftwareStatsError::ImageTooSmall {
                needed,
                len: image.len(),
            }
            .into());
        }
        if output.row_sum.len() < RS_STATS_MAX_HORIZONTAL_REGIONS {
            return Err(SoftwareStatsError::GridTooLarge {
                horizontal: RS_STATS_MAX_HORIZONTAL_REGIONS as u32,
                vertical: RS_STATS_MAX_VERTICAL_REGIONS as u32,
            }
            .into());
        }

        let dimensions = StatsDimension {
            width: format.width,
            height: format.height,
        };
        let mut abi_config = RsStatsConfigAbi {
            stats_h_num: config.stats_h_num,
            stats_v_num: config.stats_v_num,
            stats_rgn_width: config.stats_rgn_width,
            stats_rgn_height: config.stats_rgn_height,
            bit_depth: config.bit_depth,
        };
        let mut row_sum = StatsRowSum {
            row_sum: output.row_sum.as_mut_ptr().cast::<u32>(),
            horizontal_region_count: 0,
            vertical_region_count: 0,
            region_width: 0,
            region_height: 0,
        };

        // SAFETY: `image` holds `stride * height` bytes and `row_sum` points to the full
        // `RS_STATS_MAX_HORIZONTAL_REGIONS` x `RS_STATS_MAX_VERTICAL_REGIONS` array, both alive
        // for the duration of the call.
        let ret = unsafe {
            generate(
                image.as_ptr(),
                &dimensions,
                format.stride,
                &mut abi_config,
                &mut row_sum,
            )
        };
        if ret != 0 {
            return Err(SoftwareStatsError::Generator(ret).into());
        }

        if row_sum.horizontal_region_count as usize > RS_STATS_MAX_HORIZONTAL_REGIONS
            || row_sum.vertical_region_count as usize > RS_STATS_MAX_VERTICAL_REGIONS
        {
            return Err(SoftwareStatsError::GridTooLarge {
                horizontal: row_sum.horizontal_region_count,
                vertical: row_sum.vertical_region_count,
            }
            .into());
        }

        Ok(RowSumGrid {
            horizontal_region_count: row_sum.horizontal_region_count,
            vertical_region_count: row_sum.vertical_region_count,
            region_width: row_sum.region_width,
            region_height: row_sum.region_height,
        })
    }
}
