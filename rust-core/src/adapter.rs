//! Column adapter: named numeric columns in, feature tables out
//!
//! A host hands over tabular data as named columns. Numeric columns become
//! [`Signal`]s, extractor outputs become [`FeatureTable`]s with one row per
//! signal or segment.

use crate::error::{Result, SignalError};
use crate::features::{
    extract_frequency_features, extract_time_features, moving_rms, FeatureSet,
    FrequencyFeatureConfig, TimeFeatureConfig,
};
use crate::signal::{SegmentConfig, Signal, DEFAULT_SAMPLE_RATE};
use crate::spectrum::fft::compute_fft;
use tracing::debug;

/// Values of one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Numbers with missing entries as `None`
    Numeric(Vec<Option<f64>>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Numeric column without missing entries
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        Self::numeric(name, values.iter().copied().map(Some).collect())
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present, finite values in order
    fn present_values(&self) -> Option<Vec<f64>> {
        match &self.data {
            ColumnData::Numeric(values) => Some(
                values
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|v| v.is_finite())
                    .collect(),
            ),
            ColumnData::Text(_) => None,
        }
    }
}

/// Ordered columns with unique names
///
/// Columns may differ in length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut set = Self::default();
        for column in columns {
            set.push(column)?;
        }
        Ok(set)
    }

    /// Append a column; its name must not be taken
    pub fn push(&mut self, column: Column) -> Result<()> {
        if self.get(&column.name).is_some() {
            return Err(SignalError::invalid(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Replace every column name, in order
    pub fn rename<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        if names.len() != self.columns.len() {
            return Err(SignalError::invalid(format!(
                "{} names given for {} columns",
                names.len(),
                self.columns.len()
            )));
        }

        let renamed = self
            .columns
            .iter()
            .zip(names)
            .map(|(column, name)| Column {
                name: name.as_ref().to_string(),
                data: column.data.clone(),
            })
            .collect();
        Self::new(renamed)
    }

    /// Columns of a 2-D array delivered by a `.mat` reader, named `Var0..`
    pub fn from_named_array(array: &NamedArray) -> Result<Self> {
        let (rows, cols) = array.shape;
        if rows == 0 || cols == 0 {
            return Err(SignalError::invalid(format!(
                "array '{}' has empty shape {}x{}",
                array.name, rows, cols
            )));
        }
        if rows * cols != array.data.len() {
            return Err(SignalError::invalid(format!(
                "array '{}' has shape {}x{} but {} values",
                array.name,
                rows,
                cols,
                array.data.len()
            )));
        }

        let columns = array
            .data
            .chunks(rows)
            .enumerate()
            .map(|(i, values)| Column::from_values(format!("Var{i}"), values))
            .collect();
        Self::new(columns)
    }
}

/// A named 2-D numeric array in column-major order
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArray {
    pub name: String,

    /// (rows, columns)
    pub shape: (usize, usize),

    pub data: Vec<f64>,
}

/// Where a signal's sample rate comes from
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SampleRate {
    /// 1 Hz
    #[default]
    Default,
    Hz(f64),

    /// First present value of the named column
    Column(String),
}

impl SampleRate {
    pub fn resolve(&self, columns: &ColumnSet) -> Result<f64> {
        let rate = match self {
            SampleRate::Default => DEFAULT_SAMPLE_RATE,
            SampleRate::Hz(rate) => *rate,
            SampleRate::Column(name) => {
                let column = columns.get(name).ok_or_else(|| {
                    SignalError::invalid(format!("sample rate column '{name}' not found"))
                })?;
                column
                    .present_values()
                    .and_then(|values| values.first().copied())
                    .ok_or_else(|| {
                        SignalError::invalid(format!("sample rate column '{name}' has no numeric value"))
                    })?
            }
        };

        if !(rate.is_finite() && rate > 0.0) {
            return Err(SignalError::invalid(format!(
                "sample rate must be positive and finite, got {rate}"
            )));
        }
        Ok(rate)
    }
}

/// Build a signal from a numeric column, dropping missing and NaN entries
///
/// # Errors
/// `InvalidInput` if the column is absent, textual, has no present values,
/// or the sample rate is invalid.
pub fn signal_from_column(columns: &ColumnSet, name: &str, sample_rate: &SampleRate) -> Result<Signal> {
    let column = columns
        .get(name)
        .ok_or_else(|| SignalError::invalid(format!("column '{name}' not found")))?;

    let values = column
        .present_values()
        .ok_or_else(|| SignalError::invalid(format!("column '{name}' is not numeric")))?;
    if values.is_empty() {
        return Err(SignalError::invalid(format!("column '{name}' has no values")));
    }

    let rate = sample_rate.resolve(columns)?;
    debug!(column = name, samples = values.len(), sample_rate = rate, "column to signal");
    Signal::new(values, rate)
}

/// Rows of named feature values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    label: Option<String>,
}

impl FeatureTable {
    /// One row per set, one column per feature key (order of the first set)
    ///
    /// # Errors
    /// `InvalidInput` if the sets do not all carry the same keys.
    pub fn from_sets(sets: &[FeatureSet]) -> Result<Self> {
        let Some(first) = sets.first() else {
            return Ok(Self::default());
        };
        let columns: Vec<String> = first.keys().map(str::to_string).collect();

        let mut rows = Vec::with_capacity(sets.len());
        for (i, set) in sets.iter().enumerate() {
            if set.len() != columns.len() {
                return Err(SignalError::invalid(format!(
                    "feature set {i} has {} features, expected {}",
                    set.len(),
                    columns.len()
                )));
            }
            let row = columns
                .iter()
                .map(|key| {
                    set.get(key).ok_or_else(|| {
                        SignalError::invalid(format!("feature set {i} lacks '{key}'"))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }

        Ok(Self {
            columns,
            rows,
            label: None,
        })
    }

    /// Tag every row with a constant class label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Values of one feature across all rows
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

/// Time-domain features of each segment, one row per segment
pub fn extract_time_table(
    signal: &Signal,
    segments: &SegmentConfig,
    config: &TimeFeatureConfig,
) -> Result<FeatureTable> {
    let sets = signal
        .segments(segments)?
        .iter()
        .map(|segment| extract_time_features(segment, config))
        .collect::<Result<Vec<_>>>()?;
    FeatureTable::from_sets(&sets)
}

/// Frequency-domain features of each segment, one row per segment
pub fn extract_frequency_table(
    signal: &Signal,
    segments: &SegmentConfig,
    config: &FrequencyFeatureConfig,
) -> Result<FeatureTable> {
    let sets = signal
        .segments(segments)?
        .iter()
        .map(|segment| extract_frequency_features(segment, config))
        .collect::<Result<Vec<_>>>()?;
    FeatureTable::from_sets(&sets)
}

/// Moving RMS of every numeric column as `RMS_<name>`
///
/// The window spans `segment_seconds` and shrinks to a shorter column; the
/// step follows the overlap percentage.
pub fn rms_columns(columns: &ColumnSet, sample_rate: &SampleRate, segment: &SegmentConfig) -> Result<ColumnSet> {
    let rate = sample_rate.resolve(columns)?;
    if !(0.0..100.0).contains(&segment.overlap_percent) {
        return Err(SignalError::invalid(format!(
            "overlap must be in [0, 100) percent, got {}",
            segment.overlap_percent
        )));
    }

    let window = (segment.segment_seconds * rate) as usize;
    if window == 0 {
        return Err(SignalError::invalid(format!(
            "RMS segment of {} s at {} Hz spans no samples",
            segment.segment_seconds, rate
        )));
    }
    let step = (window as f64 * (1.0 - segment.overlap_percent / 100.0)) as usize;

    numeric_columns(columns, rate, "RMS", |signal| moving_rms(signal, window, step))
}

/// Single-sided amplitude spectrum of `[start, end)` seconds of every
/// numeric column as `FFT_<name>`
pub fn fft_columns(columns: &ColumnSet, sample_rate: &SampleRate, start: f64, end: f64) -> Result<ColumnSet> {
    let rate = sample_rate.resolve(columns)?;
    numeric_columns(columns, rate, "FFT", |signal| {
        let spectrum = compute_fft(&signal.slice_seconds(start, end)?)?;
        Ok(spectrum.magnitudes().to_vec())
    })
}

fn numeric_columns<F>(columns: &ColumnSet, rate: f64, prefix: &str, transform: F) -> Result<ColumnSet>
where
    F: Fn(&Signal) -> Result<Vec<f64>>,
{
    let mut output = ColumnSet::default();
    for column in columns.iter() {
        if matches!(column.data, ColumnData::Text(_)) {
            continue;
        }
        let signal = signal_from_column(columns, &column.name, &SampleRate::Hz(rate))?;
        let values = transform(&signal)?;
        output.push(Column::from_values(format!("{prefix}_{}", column.name), &values))?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{SpectralFeature, TimeFeature};

    fn sample_columns() -> ColumnSet {
        ColumnSet::new(vec![
            Column::numeric("x", vec![Some(1.0), None, Some(f64::NAN), Some(-1.0), Some(1.0)]),
            Column::text("tag", vec!["a".into(), "b".into()]),
            Column::numeric("empty", vec![None, None]),
            Column::from_values("fs", &[4.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_signal_from_column_drops_missing() {
        let columns = sample_columns();

        let signal = signal_from_column(&columns, "x", &SampleRate::Default).unwrap();
        assert_eq!(signal.samples(), &[1.0, -1.0, 1.0]);
        assert_eq!(signal.sample_rate(), 1.0);

        let signal = signal_from_column(&columns, "x", &SampleRate::Column("fs".into())).unwrap();
        assert_eq!(signal.sample_rate(), 4.0);
    }

    #[test]
    fn test_signal_from_column_rejections() {
        let columns = sample_columns();

        for (name, rate) in [
            ("missing", SampleRate::Default),
            ("tag", SampleRate::Default),
            ("empty", SampleRate::Default),
            ("x", SampleRate::Hz(0.0)),
            ("x", SampleRate::Hz(f64::NAN)),
            ("x", SampleRate::Column("nope".into())),
            ("x", SampleRate::Column("tag".into())),
        ] {
            assert!(
                matches!(signal_from_column(&columns, name, &rate), Err(SignalError::InvalidInput(_))),
                "{} with {:?} should fail",
                name,
                rate
            );
        }
    }

    #[test]
    fn test_duplicate_and_rename() {
        let err = ColumnSet::new(vec![Column::from_values("a", &[1.0]), Column::from_values("a", &[2.0])]);
        assert!(err.is_err());

        let columns = ColumnSet::new(vec![Column::from_values("a", &[1.0]), Column::from_values("b", &[2.0])])
            .unwrap();
        let renamed = columns.rename(&["left", "right"]).unwrap();
        assert_eq!(renamed.names().collect::<Vec<_>>(), vec!["left", "right"]);
        assert_eq!(renamed.get("right"), Some(&Column::from_values("right", &[2.0])));

        assert!(columns.rename(&["only"]).is_err());
        assert!(columns.rename(&["same", "same"]).is_err());
    }

    #[test]
    fn test_named_array_columns() {
        let array = NamedArray {
            name: "vibration".into(),
            shape: (3, 2),
            data: vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0],
        };

        let columns = ColumnSet::from_named_array(&array).unwrap();
        assert_eq!(columns.names().collect::<Vec<_>>(), vec!["Var0", "Var1"]);
        assert_eq!(columns.get("Var1"), Some(&Column::from_values("Var1", &[10.0, 20.0, 30.0])));

        let bad = NamedArray {
            shape: (4, 2),
            ..array.clone()
        };
        assert!(ColumnSet::from_named_array(&bad).is_err());

        for shape in [(0, 3), (3, 0), (0, 0)] {
            let empty = NamedArray {
                shape,
                data: Vec::new(),
                ..array.clone()
            };
            assert!(matches!(
                ColumnSet::from_named_array(&empty),
                Err(SignalError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_feature_table_from_sets() {
        let config = TimeFeatureConfig::with_features(&[TimeFeature::Rms, TimeFeature::Peak]);
        let sets: Vec<FeatureSet> = [vec![1.0, -1.0], vec![2.0, 0.0, -2.0]]
            .into_iter()
            .map(|s| extract_time_features(&Signal::with_default_rate(s).unwrap(), &config).unwrap())
            .collect();

        let table = FeatureTable::from_sets(&sets).unwrap().with_label("healthy");

        assert_eq!(table.columns(), &["rms".to_string(), "peak".to_string()]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("peak"), Some(vec![1.0, 2.0]));
        assert_eq!(table.label(), Some("healthy"));
        assert_eq!(table.column("missing"), None);

        let other = extract_time_features(
            &Signal::with_default_rate(vec![1.0]).unwrap(),
            &TimeFeatureConfig::with_features(&[TimeFeature::Mean, TimeFeature::Peak]),
        )
        .unwrap();
        assert!(FeatureTable::from_sets(&[sets[0].clone(), other]).is_err());
    }

    #[test]
    fn test_segment_tables() {
        let samples: Vec<f64> = (0..40).map(|i| if i < 20 { 1.0 } else { 3.0 }).collect();
        let signal = Signal::new(samples, 10.0).unwrap();
        let segments = SegmentConfig {
            segment_seconds: 1.0,
            overlap_percent: 50.0,
        };

        let table = extract_time_table(
            &signal,
            &segments,
            &TimeFeatureConfig::with_features(&[TimeFeature::Mean]),
        )
        .unwrap();
        assert_eq!(table.column("mean"), Some(vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0]));

        let spectral = extract_frequency_table(
            &signal,
            &segments,
            &FrequencyFeatureConfig::with_features(&[SpectralFeature::PeakFrequency]),
        )
        .unwrap();
        assert_eq!(spectral.num_rows(), 7);
        assert_eq!(spectral.column("peak_frequency").unwrap()[0], 0.0);

        let too_long = SegmentConfig {
            segment_seconds: 10.0,
            overlap_percent: 0.0,
        };
        assert!(extract_time_table(&signal, &too_long, &TimeFeatureConfig::default()).is_err());
    }

    #[test]
    fn test_rms_columns() {
        let columns = ColumnSet::new(vec![
            Column::from_values("a", &[1.0, -1.0, 2.0, -2.0]),
            Column::text("tag", vec!["x".into()]),
        ])
        .unwrap();
        let segment = SegmentConfig {
            segment_seconds: 1.0,
            overlap_percent: 0.0,
        };

        let rms = rms_columns(&columns, &SampleRate::Hz(2.0), &segment).unwrap();
        assert_eq!(rms.names().collect::<Vec<_>>(), vec!["RMS_a"]);
        assert_eq!(rms.get("RMS_a"), Some(&Column::from_values("RMS_a", &[1.0, 2.0])));

        // Window longer than the column shrinks to it
        let whole = rms_columns(&columns, &SampleRate::Hz(100.0), &segment).unwrap();
        assert_eq!(whole.get("RMS_a").unwrap().len(), 1);
    }

    #[test]
    fn test_fft_columns() {
        let columns = ColumnSet::new(vec![Column::from_values(
            "s",
            &[0.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0],
        )])
        .unwrap();

        let fft = fft_columns(&columns, &SampleRate::Hz(8.0), 0.0, 2.0).unwrap();
        let ColumnData::Numeric(values) = &fft.get("FFT_s").unwrap().data else {
            panic!("expected numeric output");
        };
        assert_eq!(values.len(), 5);
        assert!((values[2].unwrap() - 1.0).abs() < 1e-12);

        assert!(fft_columns(&columns, &SampleRate::Hz(8.0), 1.0, 0.5).is_err());
    }
}
