use crate::dataset::{Dataset, SampleRecord};
use crate::driving::SpeedSample;
use crate::events::{EventFile, Events};
use crate::trace::TimeSyncSample;
use crate::Error;

/// inclusive range of days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    pub fn new(start: chrono::NaiveDate, end: chrono::NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: chrono::NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// extend the range by `days` on both sides
    pub fn widen(&self, days: u32) -> Self {
        let days = chrono::Days::new(days.into());
        Self {
            start: self
                .start
                .checked_sub_days(days)
                .unwrap_or(chrono::NaiveDate::MIN),
            end: self
                .end
                .checked_add_days(days)
                .unwrap_or(chrono::NaiveDate::MAX),
        }
    }
}

/// provider of the recordings of a vehicle
pub trait DataSource {
    /// time-sync rows in collection order
    fn fetch_trace(&self, range: &DateRange) -> Result<Vec<TimeSyncSample>, Error>;
    /// raw IMU samples, timestamps on the IMU clock
    fn fetch_samples(&self, range: &DateRange) -> Result<Dataset, Error>;
    fn fetch_speed(&self, range: &DateRange) -> Result<Vec<SpeedSample>, Error>;
    fn fetch_events(&self, range: &DateRange) -> Result<Events, Error>;
}

/// tables that are already loaded, the date range is ignored
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub trace: Vec<TimeSyncSample>,
    pub samples: Dataset,
    pub speed: Vec<SpeedSample>,
    pub events: Events,
}

impl DataSource for MemorySource {
    fn fetch_trace(&self, _range: &DateRange) -> Result<Vec<TimeSyncSample>, Error> {
        Ok(self.trace.clone())
    }

    fn fetch_samples(&self, _range: &DateRange) -> Result<Dataset, Error> {
        Ok(self.samples.clone())
    }

    fn fetch_speed(&self, _range: &DateRange) -> Result<Vec<SpeedSample>, Error> {
        Ok(self.speed.clone())
    }

    fn fetch_events(&self, _range: &DateRange) -> Result<Events, Error> {
        Ok(self.events.clone())
    }
}

/// daily JSON files in a local directory
///
/// Every table lives in it's own subdirectory. The file names start with the
/// day of the recording like `2023-07-18.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: std::path::PathBuf,
    trace_margin_days: u32,
}

impl DirSource {
    pub const TRACE_DIR: &'static str = "trace";
    pub const SAMPLES_DIR: &'static str = "samples";
    pub const SPEED_DIR: &'static str = "speed";
    pub const EVENTS_DIR: &'static str = "events";

    pub fn new<P: Into<std::path::PathBuf>>(root: P, trace_margin_days: u32) -> Self {
        Self {
            root: root.into(),
            trace_margin_days,
        }
    }

    pub fn from_config(cfg: &crate::config::Data) -> Self {
        Self::new(&cfg.root, cfg.trace_margin_days)
    }

    /// return the files of a table for the given days, sorted by name
    pub fn files(&self, table: &str, range: &DateRange) -> Result<Vec<std::path::PathBuf>, Error> {
        let mut ret = Vec::new();
        for entry in std::fs::read_dir(self.root.join(table))? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let name = crate::unwrap_opt_or!(path.file_name().and_then(|n| n.to_str()), continue);
            let day = match name
                .get(..10)
                .map(|prefix| chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d"))
            {
                Some(Ok(day)) => day,
                _ => {
                    log::warn!("skipping {}: no date in file name", path.display());
                    continue;
                }
            };

            if range.contains(day) {
                ret.push(path);
            }
        }

        ret.sort();
        log::debug!("{} {} files for {:?}", ret.len(), table, range);
        Ok(ret)
    }

    fn read<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        range: &DateRange,
    ) -> Result<Vec<T>, Error> {
        let mut ret = Vec::new();
        for path in self.files(table, range)? {
            let file = std::io::BufReader::new(std::fs::File::open(&path)?);
            ret.push(serde_json::from_reader(file)?);
        }
        Ok(ret)
    }
}

impl DataSource for DirSource {
    fn fetch_trace(&self, range: &DateRange) -> Result<Vec<TimeSyncSample>, Error> {
        let range = range.widen(self.trace_margin_days);
        let days: Vec<Vec<TimeSyncSample>> = self.read(Self::TRACE_DIR, &range)?;
        Ok(days.into_iter().flatten().collect())
    }

    fn fetch_samples(&self, range: &DateRange) -> Result<Dataset, Error> {
        let days: Vec<Vec<SampleRecord>> = self.read(Self::SAMPLES_DIR, range)?;
        let records: Vec<SampleRecord> = days.into_iter().flatten().collect();
        Ok(Dataset::from_records(&records))
    }

    fn fetch_speed(&self, range: &DateRange) -> Result<Vec<SpeedSample>, Error> {
        let days: Vec<Vec<SpeedSample>> = self.read(Self::SPEED_DIR, range)?;
        Ok(days.into_iter().flatten().collect())
    }

    fn fetch_events(&self, range: &DateRange) -> Result<Events, Error> {
        let days: Vec<EventFile> = self.read(Self::EVENTS_DIR, range)?;
        let mut events = Events::default();
        for day in days {
            events.extend(day.imu_telematics);
        }
        Ok(events)
    }
}
