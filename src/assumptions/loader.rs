//! CSV-based rate-table loader
//!
//! Loads rate tables from CSV files in data/rates/, or from the copies
//! bundled into the binary at build time.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use super::rates::{AgeBand, AgeBandTable, FactorRange, GenderRates, RateTables};
use crate::error::DataError;
use crate::policy::{HealthAddon, HealthProgram, HealthScope, MainProduct};

/// Default path to the rate-table directory
pub const DEFAULT_RATES_PATH: &str = "data/rates";

pub const MAIN_RATES_FILE: &str = "main_rates.csv";
pub const PREMIUM_FACTORS_FILE: &str = "premium_factors.csv";
pub const HEALTH_RATES_FILE: &str = "health_rates.csv";
pub const HEALTH_ADDON_RATES_FILE: &str = "health_addon_rates.csv";
pub const CRITICAL_ILLNESS_RATES_FILE: &str = "critical_illness_rates.csv";
pub const ACCIDENT_RATES_FILE: &str = "accident_rates.csv";
pub const HOSPITAL_CASH_RATES_FILE: &str = "hospital_cash_rates.csv";
pub const WAIVER_RATES_FILE: &str = "waiver_rates.csv";
pub const OCCUPATIONS_FILE: &str = "occupations.csv";

/// Where rate files are read from
#[derive(Debug, Clone)]
pub enum RateFileSource {
    /// A directory holding the CSV files
    Dir(PathBuf),
    /// The copies compiled into the crate
    Bundled,
}

impl RateFileSource {
    pub fn open(&self, file: &str) -> Result<Box<dyn Read>, DataError> {
        match self {
            RateFileSource::Dir(dir) => Ok(Box::new(File::open(dir.join(file))?)),
            RateFileSource::Bundled => {
                let text = bundled_file(file).ok_or_else(|| DataError::MalformedRow {
                    file: file.to_string(),
                    detail: "no bundled copy".to_string(),
                })?;
                Ok(Box::new(text.as_bytes()))
            }
        }
    }
}

fn bundled_file(file: &str) -> Option<&'static str> {
    let text = match file {
        MAIN_RATES_FILE => include_str!("../../data/rates/main_rates.csv"),
        PREMIUM_FACTORS_FILE => include_str!("../../data/rates/premium_factors.csv"),
        HEALTH_RATES_FILE => include_str!("../../data/rates/health_rates.csv"),
        HEALTH_ADDON_RATES_FILE => include_str!("../../data/rates/health_addon_rates.csv"),
        CRITICAL_ILLNESS_RATES_FILE => include_str!("../../data/rates/critical_illness_rates.csv"),
        ACCIDENT_RATES_FILE => include_str!("../../data/rates/accident_rates.csv"),
        HOSPITAL_CASH_RATES_FILE => include_str!("../../data/rates/hospital_cash_rates.csv"),
        WAIVER_RATES_FILE => include_str!("../../data/rates/waiver_rates.csv"),
        OCCUPATIONS_FILE => include_str!("../../data/rates/occupations.csv"),
        _ => return None,
    };
    Some(text)
}

fn malformed(file: &str, detail: String) -> DataError {
    DataError::MalformedRow {
        file: file.to_string(),
        detail,
    }
}

#[derive(Debug, Deserialize)]
struct MainRateRow {
    product: String,
    term: u32,
    age: u32,
    male: f64,
    female: f64,
}

#[derive(Debug, Deserialize)]
struct BandRow {
    band_min: u32,
    band_max: u32,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct GenderBandRow {
    band_min: u32,
    band_max: u32,
    male: f64,
    female: f64,
}

#[derive(Debug, Deserialize)]
struct FactorRow {
    band_min: u32,
    band_max: u32,
    min_factor: f64,
    max_factor: f64,
}

#[derive(Debug, Deserialize)]
struct HealthRow {
    band_min: u32,
    band_max: u32,
    program: String,
    scope: String,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct HealthAddonRow {
    band_min: u32,
    band_max: u32,
    program: String,
    addon: String,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct AccidentRow {
    risk_group: u8,
    rate: f64,
}

/// Occupation row: name and risk group
#[derive(Debug, Clone, Deserialize)]
pub struct OccupationRow {
    pub name: String,
    pub group: u8,
}

fn read_rows<T: serde::de::DeserializeOwned>(source: &RateFileSource, file: &str) -> Result<Vec<T>, DataError> {
    let mut reader = csv::Reader::from_reader(source.open(file)?);
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    debug!("{}: {} rows", file, rows.len());
    Ok(rows)
}

/// Load exact-age main product rates keyed by (product, term)
pub fn load_main_rates(
    source: &RateFileSource,
) -> Result<HashMap<(MainProduct, u32), BTreeMap<u32, GenderRates>>, DataError> {
    let mut rates: HashMap<(MainProduct, u32), BTreeMap<u32, GenderRates>> = HashMap::new();
    for row in read_rows::<MainRateRow>(source, MAIN_RATES_FILE)? {
        let product = MainProduct::from_key(&row.product)
            .ok_or_else(|| malformed(MAIN_RATES_FILE, format!("unknown product '{}'", row.product)))?;
        let previous = rates.entry((product, row.term)).or_default().insert(
            row.age,
            GenderRates {
                male: row.male,
                female: row.female,
            },
        );
        if previous.is_some() {
            return Err(malformed(
                MAIN_RATES_FILE,
                format!("duplicate age {} for {} term {}", row.age, row.product, row.term),
            ));
        }
    }
    Ok(rates)
}

/// Load premium factor ranges for flexible-premium products
pub fn load_premium_factors(source: &RateFileSource) -> Result<AgeBandTable<FactorRange>, DataError> {
    let bands = read_rows::<FactorRow>(source, PREMIUM_FACTORS_FILE)?
        .into_iter()
        .map(|r| AgeBand {
            min_age: r.band_min,
            max_age: r.band_max,
            value: FactorRange {
                min_factor: r.min_factor,
                max_factor: r.max_factor,
            },
        })
        .collect();
    AgeBandTable::new(PREMIUM_FACTORS_FILE, bands)
}

/// Group keyed band rows into one table per key
fn group_bands<K, T>(file: &str, rows: Vec<(K, AgeBand<T>)>) -> Result<HashMap<K, AgeBandTable<T>>, DataError>
where
    K: std::hash::Hash + Eq,
{
    let mut grouped: HashMap<K, Vec<AgeBand<T>>> = HashMap::new();
    for (key, band) in rows {
        grouped.entry(key).or_default().push(band);
    }
    grouped
        .into_iter()
        .map(|(key, bands)| Ok((key, AgeBandTable::new(file, bands)?)))
        .collect()
}

/// Load flat health-rider rates keyed by (program, scope)
pub fn load_health_rates(
    source: &RateFileSource,
) -> Result<HashMap<(HealthProgram, HealthScope), AgeBandTable<f64>>, DataError> {
    let rows = read_rows::<HealthRow>(source, HEALTH_RATES_FILE)?
        .into_iter()
        .map(|r| {
            let program = HealthProgram::from_key(&r.program)
                .ok_or_else(|| malformed(HEALTH_RATES_FILE, format!("unknown program '{}'", r.program)))?;
            let scope = HealthScope::from_key(&r.scope)
                .ok_or_else(|| malformed(HEALTH_RATES_FILE, format!("unknown scope '{}'", r.scope)))?;
            Ok((
                (program, scope),
                AgeBand {
                    min_age: r.band_min,
                    max_age: r.band_max,
                    value: r.rate,
                },
            ))
        })
        .collect::<Result<Vec<_>, DataError>>()?;
    group_bands(HEALTH_RATES_FILE, rows)
}

/// Load health add-on rates keyed by (add-on, program)
pub fn load_health_addon_rates(
    source: &RateFileSource,
) -> Result<HashMap<(HealthAddon, HealthProgram), AgeBandTable<f64>>, DataError> {
    let rows = read_rows::<HealthAddonRow>(source, HEALTH_ADDON_RATES_FILE)?
        .into_iter()
        .map(|r| {
            let program = HealthProgram::from_key(&r.program).ok_or_else(|| {
                malformed(HEALTH_ADDON_RATES_FILE, format!("unknown program '{}'", r.program))
            })?;
            let addon = HealthAddon::from_key(&r.addon).ok_or_else(|| {
                malformed(HEALTH_ADDON_RATES_FILE, format!("unknown add-on '{}'", r.addon))
            })?;
            Ok((
                (addon, program),
                AgeBand {
                    min_age: r.band_min,
                    max_age: r.band_max,
                    value: r.rate,
                },
            ))
        })
        .collect::<Result<Vec<_>, DataError>>()?;
    group_bands(HEALTH_ADDON_RATES_FILE, rows)
}

fn load_gender_bands(source: &RateFileSource, file: &str) -> Result<AgeBandTable<GenderRates>, DataError> {
    let bands = read_rows::<GenderBandRow>(source, file)?
        .into_iter()
        .map(|r| AgeBand {
            min_age: r.band_min,
            max_age: r.band_max,
            value: GenderRates {
                male: r.male,
                female: r.female,
            },
        })
        .collect();
    AgeBandTable::new(file, bands)
}

fn load_flat_bands(source: &RateFileSource, file: &str) -> Result<AgeBandTable<f64>, DataError> {
    let bands = read_rows::<BandRow>(source, file)?
        .into_iter()
        .map(|r| AgeBand {
            min_age: r.band_min,
            max_age: r.band_max,
            value: r.rate,
        })
        .collect();
    AgeBandTable::new(file, bands)
}

/// Load accident rates keyed by risk group
pub fn load_accident_rates(source: &RateFileSource) -> Result<BTreeMap<u8, f64>, DataError> {
    Ok(read_rows::<AccidentRow>(source, ACCIDENT_RATES_FILE)?
        .into_iter()
        .map(|r| (r.risk_group, r.rate))
        .collect())
}

/// Load the occupation list
pub fn load_occupations(source: &RateFileSource) -> Result<Vec<OccupationRow>, DataError> {
    read_rows(source, OCCUPATIONS_FILE)
}

/// Load every rate table from the given source
pub fn load_rate_tables(source: &RateFileSource) -> Result<RateTables, DataError> {
    Ok(RateTables {
        main: load_main_rates(source)?,
        premium_factors: Some(load_premium_factors(source)?),
        health: load_health_rates(source)?,
        health_addons: load_health_addon_rates(source)?,
        critical_illness: Some(load_gender_bands(source, CRITICAL_ILLNESS_RATES_FILE)?),
        accident: load_accident_rates(source)?,
        hospital_cash: Some(load_flat_bands(source, HOSPITAL_CASH_RATES_FILE)?),
        waiver: Some(load_gender_bands(source, WAIVER_RATES_FILE)?),
    })
}

impl RateTables {
    /// Tables compiled into the crate
    pub fn bundled() -> Result<Self, DataError> {
        load_rate_tables(&RateFileSource::Bundled)
    }

    /// Load tables from CSV files in the default location (data/rates/)
    pub fn from_csv() -> Result<Self, DataError> {
        Self::from_csv_path(Path::new(DEFAULT_RATES_PATH))
    }

    /// Load tables from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        load_rate_tables(&RateFileSource::Dir(path.to_path_buf()))
    }
}
