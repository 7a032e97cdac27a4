use crate::Error;
use serde::{Deserialize, Serialize};

/// upstream names of the three acceleration axes
pub const ACCEL_KINDS: [&str; 3] = ["lr_acc(m/s^2)", "bf_acc(m/s^2)", "vert_acc(m/s^2)"];

/// name of the derived acceleration magnitude kind
pub const NORM_ACC: &str = "norm_acc";

/// one row of a stored sensor sample file
///
/// Every field except the timestamp becomes a signal kind. `null` is read as
/// a missing value and stored as NaN.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SampleRecord {
    #[serde(alias = "timestamp(epoch in sec)")]
    pub timestamp: f64,
    #[serde(flatten)]
    pub values: std::collections::BTreeMap<String, Option<f64>>,
}

/// a table of sensor samples
///
/// `times` holds the raw IMU timestamp of every row in seconds.
/// Each kind is a named signal column, e.g. one acceleration axis.
/// Users must ensure that all kinds have the same length as `times`, the
/// constructors check this.
///
/// Tables are never modified after construction, every operation returns a
/// new table. Cloning does not copy the column data since Arcs are used
/// internally.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    times: std::sync::Arc<ndarray::Array1<f64>>,
    kinds: std::collections::BTreeMap<String, std::sync::Arc<ndarray::Array1<f64>>>,
}

impl Dataset {
    pub fn new(times: ndarray::Array1<f64>) -> Self {
        Self {
            times: std::sync::Arc::new(times),
            kinds: std::collections::BTreeMap::new(),
        }
    }

    /// build a table from stored rows
    ///
    /// Kinds that are absent in some rows are filled with NaN for those rows.
    pub fn from_records(records: &[SampleRecord]) -> Self {
        let times: ndarray::Array1<f64> = records.iter().map(|r| r.timestamp).collect();

        let mut names = std::collections::BTreeSet::new();
        for record in records {
            names.extend(record.values.keys().cloned());
        }

        let kinds = names
            .into_iter()
            .map(|name| {
                let column: ndarray::Array1<f64> = records
                    .iter()
                    .map(|r| r.values.get(&name).copied().flatten().unwrap_or(f64::NAN))
                    .collect();
                (name, std::sync::Arc::new(column))
            })
            .collect();

        Self {
            times: std::sync::Arc::new(times),
            kinds,
        }
    }

    /// return the number of rows in this table
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// raw timestamps of all rows
    pub fn times(&self) -> &ndarray::Array1<f64> {
        self.times.as_ref()
    }

    /// looks up a data kind by name and returns a reference to it's data
    pub fn get_kind(&self, name: &str) -> Option<&ndarray::Array1<f64>> {
        self.kinds.get(name).map(|kind| kind.as_ref())
    }

    pub fn kind_names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(|name| name.as_str())
    }

    /// return a copy of this table with an additional kind
    pub fn with_kind<N: Into<String>>(
        mut self,
        name: N,
        value: ndarray::Array1<f64>,
    ) -> Result<Self, Error> {
        let name = name.into();
        if value.len() != self.len() {
            return Err(Error::LengthMismatch {
                name,
                len: value.len(),
                expected: self.len(),
            });
        }

        self.kinds.insert(name, std::sync::Arc::new(value));
        Ok(self)
    }

    /// return a copy of this table with the euclidean norm of `sources` as a new kind
    pub fn with_norm(self, name: &str, sources: &[&str]) -> Result<Self, Error> {
        let mut sum = ndarray::Array1::<f64>::zeros(self.len());
        for source in sources {
            let kind = self
                .get_kind(source)
                .ok_or_else(|| Error::MissingKind(source.to_string()))?;
            sum.zip_mut_with(kind, |acc, v| *acc += v * v);
        }

        sum.mapv_inplace(f64::sqrt);
        self.with_kind(name, sum)
    }

    /// return the rows at the given indices, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            times: std::sync::Arc::new(self.times.select(ndarray::Axis(0), indices)),
            kinds: self
                .kinds
                .iter()
                .map(|(name, kind)| {
                    (
                        name.clone(),
                        std::sync::Arc::new(kind.select(ndarray::Axis(0), indices)),
                    )
                })
                .collect(),
        }
    }

    /// append the rows of all parts, all parts must have the same kinds
    pub fn concat(parts: &[Self]) -> Result<Self, Error> {
        let first = crate::unwrap_opt_or!(parts.first(), return Ok(Self::default()));

        let times: Vec<f64> = parts.iter().flat_map(|p| p.times.iter().copied()).collect();

        let mut kinds = std::collections::BTreeMap::new();
        for name in first.kinds.keys() {
            let mut column = Vec::with_capacity(times.len());
            for part in parts {
                let kind = part
                    .get_kind(name)
                    .ok_or_else(|| Error::MissingKind(name.clone()))?;
                column.extend(kind.iter().copied());
            }
            kinds.insert(
                name.clone(),
                std::sync::Arc::new(ndarray::Array1::from(column)),
            );
        }

        for part in parts {
            if let Some(extra) = part.kind_names().find(|n| !first.kinds.contains_key(*n)) {
                return Err(Error::MissingKind(extra.to_string()));
            }
        }

        Ok(Self {
            times: std::sync::Arc::new(ndarray::Array1::from(times)),
            kinds,
        })
    }
}

/// rows of a timestamp column in ascending time order
///
/// Rows with a NaN timestamp are left out. Looking up a time range is a binary
/// search, so a sweep over sorted, disjoint ranges touches every row once.
#[derive(Clone, Debug)]
pub struct TimeIndex {
    order: Vec<usize>,
    sorted: Vec<f64>,
}

impl TimeIndex {
    pub fn new<S>(times: &ndarray::ArrayBase<S, ndarray::Ix1>) -> Self
    where
        S: ndarray::Data<Elem = f64>,
    {
        let mut order: Vec<usize> = (0..times.len()).filter(|&i| !times[i].is_nan()).collect();
        order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));
        let sorted = order.iter().map(|&i| times[i]).collect();

        Self { order, sorted }
    }

    /// return the rows within `[start, end)`, or `[start, end]` if `closed`
    ///
    /// The rows are in time order.
    pub fn range(&self, start: f64, end: f64, closed: bool) -> &[usize] {
        let lo = self.sorted.partition_point(|&ts| ts < start);
        let hi = if closed {
            self.sorted.partition_point(|&ts| ts <= end)
        } else {
            self.sorted.partition_point(|&ts| ts < end)
        };

        &self.order[lo..hi.max(lo)]
    }
}

/// sensor samples with clock-corrected timestamps
///
/// `corrected_ts` is aligned with the rows of `samples`. Every row has a valid
/// corrected timestamp, rows that could not be corrected are never part of
/// such a table.
#[derive(Clone, Debug, Default)]
pub struct CorrectedDataset {
    corrected: std::sync::Arc<ndarray::Array1<f64>>,
    samples: Dataset,
}

impl CorrectedDataset {
    pub fn new(corrected: ndarray::Array1<f64>, samples: Dataset) -> Result<Self, Error> {
        if corrected.len() != samples.len() {
            return Err(Error::LengthMismatch {
                name: "corrected_ts".to_string(),
                len: corrected.len(),
                expected: samples.len(),
            });
        }

        Ok(Self {
            corrected: std::sync::Arc::new(corrected),
            samples,
        })
    }

    pub fn len(&self) -> usize {
        self.corrected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrected.is_empty()
    }

    pub fn corrected_ts(&self) -> &ndarray::Array1<f64> {
        self.corrected.as_ref()
    }

    pub fn samples(&self) -> &Dataset {
        &self.samples
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            corrected: std::sync::Arc::new(self.corrected.select(ndarray::Axis(0), indices)),
            samples: self.samples.select(indices),
        }
    }

    /// index of the rows by corrected timestamp
    pub fn time_index(&self) -> TimeIndex {
        TimeIndex::new(self.corrected.as_ref())
    }

    pub fn concat(parts: &[Self]) -> Result<Self, Error> {
        let corrected: Vec<f64> = parts
            .iter()
            .flat_map(|p| p.corrected.iter().copied())
            .collect();
        let samples: Vec<Dataset> = parts.iter().map(|p| p.samples.clone()).collect();

        Self::new(ndarray::Array1::from(corrected), Dataset::concat(&samples)?)
    }

    /// add the acceleration magnitude if the table carries all three axes
    pub fn with_accel_norm(self) -> Result<Self, Error> {
        if !ACCEL_KINDS
            .iter()
            .all(|k| self.samples.get_kind(k).is_some())
        {
            log::debug!("no acceleration axes, skipping {}", NORM_ACC);
            return Ok(self);
        }

        Ok(Self {
            samples: self.samples.with_norm(NORM_ACC, &ACCEL_KINDS)?,
            corrected: self.corrected,
        })
    }
}
