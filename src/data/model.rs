use std::collections::BTreeMap;
use std::fmt;

use crate::error::{HistogramError, LoadError};

// ---------------------------------------------------------------------------
// Histogram – a 1-D binned distribution
// ---------------------------------------------------------------------------

/// A one-dimensional histogram with per-bin errors.
///
/// Bins are numbered from 1 to `nbins()` inclusive, matching the numbering
/// used by the upstream fit output (bin 0 and `nbins() + 1` would be the
/// under/overflow bins, which are not stored).
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges, `nbins + 1` values, strictly increasing.
    pub edges: Vec<f64>,
    /// Bin contents, one per bin.
    pub contents: Vec<f64>,
    /// Bin errors, one per bin.
    pub errors: Vec<f64>,
}

impl Histogram {
    /// Build a histogram and check its shape.
    pub fn new(edges: Vec<f64>, contents: Vec<f64>, errors: Vec<f64>) -> Result<Self, HistogramError> {
        let h = Histogram {
            edges,
            contents,
            errors,
        };
        h.validate()?;
        Ok(h)
    }

    /// Histogram with `nbins` equal-width bins over `[xmin, xmax)`, all empty.
    pub fn uniform(nbins: usize, xmin: f64, xmax: f64) -> Result<Self, HistogramError> {
        if nbins == 0 {
            return Err(HistogramError::Empty);
        }
        let width = (xmax - xmin) / nbins as f64;
        let hist = Histogram {
            edges: (0..=nbins).map(|i| xmin + i as f64 * width).collect(),
            contents: vec![0.0; nbins],
            errors: vec![0.0; nbins],
        };
        hist.validate()?;
        Ok(hist)
    }

    pub fn validate(&self) -> Result<(), HistogramError> {
        let nbins = self.contents.len();
        if nbins == 0 {
            return Err(HistogramError::Empty);
        }
        if self.edges.len() != nbins + 1 {
            return Err(HistogramError::LengthMismatch {
                what: "bin edges",
                expected: nbins + 1,
                got: self.edges.len(),
            });
        }
        if self.errors.len() != nbins {
            return Err(HistogramError::LengthMismatch {
                what: "bin errors",
                expected: nbins,
                got: self.errors.len(),
            });
        }
        if let Some(index) = self.edges.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(HistogramError::UnorderedEdges { index: index + 1 });
        }
        Ok(())
    }

    pub fn nbins(&self) -> usize {
        self.contents.len()
    }

    pub fn x_min(&self) -> f64 {
        self.edges[0]
    }

    pub fn x_max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    fn slot(&self, bin: usize) -> Result<usize, HistogramError> {
        if bin == 0 || bin > self.nbins() {
            return Err(HistogramError::BinOutOfRange {
                bin,
                nbins: self.nbins(),
            });
        }
        Ok(bin - 1)
    }

    pub fn bin_content(&self, bin: usize) -> Result<f64, HistogramError> {
        self.slot(bin).map(|i| self.contents[i])
    }

    pub fn bin_error(&self, bin: usize) -> Result<f64, HistogramError> {
        self.slot(bin).map(|i| self.errors[i])
    }

    pub fn bin_center(&self, bin: usize) -> Result<f64, HistogramError> {
        self.slot(bin).map(|i| 0.5 * (self.edges[i] + self.edges[i + 1]))
    }

    /// Width of bin `bin`.
    ///
    /// A uniformly binned axis has a single width, so any bin number is
    /// accepted there; variable binning requires an in-range bin.
    pub fn bin_width(&self, bin: usize) -> Result<f64, HistogramError> {
        match self.slot(bin) {
            Ok(i) => Ok(self.edges[i + 1] - self.edges[i]),
            Err(err) => {
                if self.is_uniform() {
                    Ok((self.x_max() - self.x_min()) / self.nbins() as f64)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Whether all bins share the same width (to a relative 1e-9).
    pub fn is_uniform(&self) -> bool {
        let nominal = (self.x_max() - self.x_min()) / self.nbins() as f64;
        self.edges
            .windows(2)
            .all(|w| ((w[1] - w[0]) - nominal).abs() <= 1e-9 * nominal.abs())
    }

    /// Merge groups of `factor` adjacent bins into one.
    ///
    /// Contents are summed and errors combined in quadrature. Trailing bins
    /// that do not fill a complete group are dropped from the axis.
    pub fn rebin(&self, factor: u32) -> Result<Histogram, HistogramError> {
        if factor == 0 {
            return Err(HistogramError::InvalidRebin(factor));
        }
        let group = factor as usize;
        if group > self.nbins() {
            return Err(HistogramError::RebinTooLarge {
                factor,
                nbins: self.nbins(),
            });
        }
        if group == 1 {
            return Ok(self.clone());
        }

        let new_nbins = self.nbins() / group;
        let leftover = self.nbins() % group;
        if leftover != 0 {
            log::warn!(
                "rebin by {factor}: {} bins is not a multiple, dropping the last {leftover}",
                self.nbins()
            );
        }

        let edges: Vec<f64> = (0..=new_nbins).map(|i| self.edges[i * group]).collect();
        let contents: Vec<f64> = self
            .contents
            .chunks_exact(group)
            .map(|chunk| chunk.iter().sum())
            .collect();
        let errors: Vec<f64> = self
            .errors
            .chunks_exact(group)
            .map(|chunk| chunk.iter().map(|e| e * e).sum::<f64>().sqrt())
            .collect();

        Ok(Histogram {
            edges,
            contents,
            errors,
        })
    }

    /// Number of the first bin holding the largest content. NaN contents
    /// are skipped, as in [`Histogram::maximum`].
    pub fn maximum_bin(&self) -> usize {
        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (i, &c) in self.contents.iter().enumerate() {
            if c > best_value {
                best = i;
                best_value = c;
            }
        }
        best + 1
    }

    /// Largest bin content.
    pub fn maximum(&self) -> f64 {
        self.contents.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Iterate `(center, half_width, content, error)` over all bins.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.edges
            .windows(2)
            .zip(self.contents.iter().zip(self.errors.iter()))
            .map(|(w, (&c, &e))| (0.5 * (w[0] + w[1]), 0.5 * (w[1] - w[0]), c, e))
    }
}

// ---------------------------------------------------------------------------
// Curve – a fit function sampled on a grid
// ---------------------------------------------------------------------------

/// A pre-fit function stored as `(x, y)` samples with increasing `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Curve {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, String> {
        if x.len() != y.len() {
            return Err(format!("x has {} samples but y has {}", x.len(), y.len()));
        }
        if x.len() < 2 {
            return Err("a curve needs at least two samples".to_string());
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) {
            return Err("sample abscissae must be strictly increasing".to_string());
        }
        Ok(Curve { x, y })
    }

    /// Samples with `xmin <= x <= xmax`.
    pub fn points_within(&self, xmin: f64, xmax: f64) -> Vec<(f64, f64)> {
        self.x
            .iter()
            .zip(self.y.iter())
            .filter(|(&x, _)| x >= xmin && x <= xmax)
            .map(|(&x, &y)| (x, y))
            .collect()
    }

    /// Linear interpolation between samples, `None` outside the sampled range.
    pub fn eval(&self, x: f64) -> Option<f64> {
        if x < self.x[0] || x > self.x[self.x.len() - 1] {
            return None;
        }
        let upper = self.x.partition_point(|&xi| xi < x);
        if upper == 0 {
            return Some(self.y[0]);
        }
        let (x0, x1) = (self.x[upper - 1], self.x[upper]);
        let (y0, y1) = (self.y[upper - 1], self.y[upper]);
        Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }
}

// ---------------------------------------------------------------------------
// ResultsFile – named objects read from an analysis-results file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsObject {
    Histogram(Histogram),
    Curve(Curve),
}

impl ResultsObject {
    pub fn kind(&self) -> &'static str {
        match self {
            ResultsObject::Histogram(_) => "hist",
            ResultsObject::Curve(_) => "curve",
        }
    }
}

impl fmt::Display for ResultsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultsObject::Histogram(h) => write!(
                f,
                "hist with {} bins in [{}, {}]",
                h.nbins(),
                h.x_min(),
                h.x_max()
            ),
            ResultsObject::Curve(c) => write!(f, "curve with {} samples", c.x.len()),
        }
    }
}

/// All objects of one results file, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsFile {
    objects: BTreeMap<String, ResultsObject>,
}

impl ResultsFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object; names are unique within a file.
    pub fn insert(&mut self, name: impl Into<String>, object: ResultsObject) -> Result<(), LoadError> {
        let name = name.into();
        if self.objects.contains_key(&name) {
            return Err(LoadError::DuplicateObject(name));
        }
        self.objects.insert(name, object);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&ResultsObject, LoadError> {
        self.objects
            .get(name)
            .ok_or_else(|| LoadError::MissingObject(name.to_string()))
    }

    pub fn histogram(&self, name: &str) -> Result<&Histogram, LoadError> {
        match self.get(name)? {
            ResultsObject::Histogram(h) => Ok(h),
            other => Err(LoadError::WrongKind {
                name: name.to_string(),
                expected: "hist",
                found: other.kind(),
            }),
        }
    }

    pub fn curve(&self, name: &str) -> Result<&Curve, LoadError> {
        match self.get(name)? {
            ResultsObject::Curve(c) => Ok(c),
            other => Err(LoadError::WrongKind {
                name: name.to_string(),
                expected: "curve",
                found: other.kind(),
            }),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultsObject)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sample_hist() -> Histogram {
        Histogram::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            vec![1.0, 4.0, 9.0, 4.0, 1.0],
            vec![1.0, 2.0, 3.0, 2.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn bins_are_numbered_from_one() {
        let h = sample_hist();
        assert_eq!(h.bin_content(1).unwrap(), 1.0);
        assert_eq!(h.bin_content(3).unwrap(), 9.0);
        assert_eq!(h.bin_error(5).unwrap(), 1.0);
        assert_eq!(
            h.bin_content(0),
            Err(HistogramError::BinOutOfRange { bin: 0, nbins: 5 })
        );
        assert!(h.bin_content(6).is_err());
    }

    #[test]
    fn maximum_bin_takes_first_of_ties() {
        let h = Histogram::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![2.0, 7.0, 7.0],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap();
        assert_eq!(h.maximum_bin(), 2);
        assert_eq!(h.maximum(), 7.0);
    }

    #[test]
    fn rebin_sums_contents_and_adds_errors_in_quadrature() {
        let h = Histogram::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![1.0, 2.0, 3.0, 4.0],
            vec![3.0, 4.0, 1.0, 1.0],
        )
        .unwrap();
        let r = h.rebin(2).unwrap();
        assert_eq!(r.edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(r.contents, vec![3.0, 7.0]);
        assert!(close(r.errors[0], 5.0));
        assert!(close(r.errors[1], 2f64.sqrt()));
    }

    #[test]
    fn rebin_drops_incomplete_trailing_group() {
        let r = sample_hist().rebin(2).unwrap();
        assert_eq!(r.nbins(), 2);
        assert_eq!(r.edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(r.contents, vec![5.0, 13.0]);
    }

    #[test]
    fn rebin_rejects_bad_factors() {
        let h = sample_hist();
        assert_eq!(h.rebin(0), Err(HistogramError::InvalidRebin(0)));
        assert!(matches!(
            h.rebin(6),
            Err(HistogramError::RebinTooLarge { factor: 6, nbins: 5 })
        ));
        assert_eq!(h.rebin(1).unwrap(), h);
    }

    #[test]
    fn bin_width_on_uniform_axis_accepts_any_bin() {
        let h = Histogram::uniform(10, 1.7, 2.1).unwrap();
        assert!(close(h.bin_width(1).unwrap(), 0.04));
        assert!(close(h.bin_width(42).unwrap(), 0.04));
    }

    #[test]
    fn uniform_rejects_degenerate_axes() {
        assert_eq!(Histogram::uniform(0, 1.7, 2.1), Err(HistogramError::Empty));
        assert!(matches!(
            Histogram::uniform(4, 2.1, 1.7),
            Err(HistogramError::UnorderedEdges { .. })
        ));
    }

    #[test]
    fn maximum_bin_skips_nan_like_maximum() {
        let h = Histogram::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![f64::NAN, 3.0, 5.0, 5.0],
            vec![0.0; 4],
        )
        .unwrap();
        assert_eq!(h.maximum(), 5.0);
        assert_eq!(h.maximum_bin(), 3);
        assert_eq!(h.bin_content(h.maximum_bin()).unwrap(), h.maximum());
    }

    #[test]
    fn bin_width_on_variable_axis_requires_valid_bin() {
        let h = Histogram::new(vec![0.0, 1.0, 3.0], vec![0.0, 0.0], vec![0.0, 0.0]).unwrap();
        assert!(close(h.bin_width(2).unwrap(), 2.0));
        assert!(h.bin_width(3).is_err());
    }

    #[test]
    fn validate_catches_shape_problems() {
        assert_eq!(
            Histogram::new(vec![0.0, 1.0], vec![], vec![]),
            Err(HistogramError::Empty)
        );
        assert!(matches!(
            Histogram::new(vec![0.0, 1.0, 2.0], vec![1.0, 1.0], vec![1.0]),
            Err(HistogramError::LengthMismatch { what: "bin errors", .. })
        ));
        assert_eq!(
            Histogram::new(vec![0.0, 2.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]),
            Err(HistogramError::UnorderedEdges { index: 2 })
        );
    }

    #[test]
    fn curve_interpolates_between_samples() {
        let c = Curve::new(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 0.0]).unwrap();
        assert_eq!(c.eval(0.5), Some(5.0));
        assert_eq!(c.eval(2.0), Some(0.0));
        assert_eq!(c.eval(0.0), Some(0.0));
        assert_eq!(c.eval(2.5), None);
        assert_eq!(c.points_within(0.5, 2.0), vec![(1.0, 10.0), (2.0, 0.0)]);
    }

    #[test]
    fn curve_rejects_unsorted_samples() {
        assert!(Curve::new(vec![0.0, 0.0], vec![1.0, 1.0]).is_err());
        assert!(Curve::new(vec![0.0], vec![1.0]).is_err());
    }

    #[test]
    fn results_file_typed_lookup() {
        let mut file = ResultsFile::new();
        file.insert("hMass", ResultsObject::Histogram(sample_hist()))
            .unwrap();
        file.insert(
            "fTot",
            ResultsObject::Curve(Curve::new(vec![0.0, 1.0], vec![1.0, 1.0]).unwrap()),
        )
        .unwrap();

        assert!(file.histogram("hMass").is_ok());
        assert!(file.curve("fTot").is_ok());
        assert!(matches!(
            file.curve("hMass"),
            Err(LoadError::WrongKind { expected: "curve", found: "hist", .. })
        ));
        assert!(matches!(
            file.histogram("nope"),
            Err(LoadError::MissingObject(name)) if name == "nope"
        ));
        assert!(matches!(
            file.insert("fTot", ResultsObject::Histogram(sample_hist())),
            Err(LoadError::DuplicateObject(_))
        ));
        assert_eq!(file.names().collect::<Vec<_>>(), vec!["fTot", "hMass"]);
    }
}
