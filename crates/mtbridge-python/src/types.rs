//! Python classes built by the marshaller
//!
//! `Hypothesis` and `Translation` are the default target classes; any other
//! class with compatible constructors can be configured instead.

use pyo3::basic::CompareOp;
use pyo3::prelude::*;

use mtbridge_core::{
    encode_alignment, to_runtime_array, AlignmentEncoding, AlignmentPair, BridgeConfig, Candidate,
    DecoderOutput, ResultMarshaller,
};

use crate::error::to_py_err;
use crate::runtime::PyRuntime;

pub const DEFAULT_HYPOTHESIS_CLASS: &str = "mtbridge.Hypothesis";
pub const DEFAULT_TRANSLATION_CLASS: &str = "mtbridge.Translation";

/// One candidate of the n-best list
#[pyclass(name = "Hypothesis", module = "mtbridge", frozen)]
#[derive(Debug, Clone, PartialEq)]
pub struct PyHypothesis {
    #[pyo3(get)]
    text: String,
    #[pyo3(get)]
    total_score: f32,
    #[pyo3(get)]
    feature_values: String,
}

#[pymethods]
impl PyHypothesis {
    #[new]
    fn new(text: String, total_score: f32, feature_values: String) -> Self {
        Self {
            text,
            total_score,
            feature_values,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Hypothesis(text={:?}, total_score={}, feature_values={:?})",
            self.text, self.total_score, self.feature_values
        )
    }

    fn __richcmp__(&self, other: &Self, op: CompareOp, py: Python<'_>) -> PyObject {
        match op {
            CompareOp::Eq => (self == other).into_py(py),
            CompareOp::Ne => (self != other).into_py(py),
            _ => py.NotImplemented(),
        }
    }
}

/// Translation result for one sentence
#[pyclass(name = "Translation", module = "mtbridge", frozen)]
#[derive(Debug)]
pub struct PyTranslation {
    text: String,
    hypotheses: Vec<PyObject>,
    alignment: Vec<i32>,
    source: Option<String>,
}

#[pymethods]
impl PyTranslation {
    #[new]
    #[pyo3(signature = (text, hypotheses, alignment, source=None))]
    fn new(
        text: String,
        hypotheses: Vec<PyObject>,
        alignment: Vec<i32>,
        source: Option<String>,
    ) -> Self {
        Self {
            text,
            hypotheses,
            alignment,
            source,
        }
    }

    #[getter]
    fn text(&self) -> String {
        self.text.clone()
    }

    #[getter]
    fn hypotheses(&self, py: Python<'_>) -> Vec<PyObject> {
        self.hypotheses.iter().map(|h| h.clone_ref(py)).collect()
    }

    /// Flat alignment `[s0, t0, s1, t1, ...]`
    #[getter]
    fn alignment(&self) -> Vec<i32> {
        self.alignment.clone()
    }

    #[getter]
    fn source(&self) -> Option<String> {
        self.source.clone()
    }

    /// Alignment as `(source, target)` tuples
    fn alignment_pairs(&self) -> PyResult<Vec<(usize, usize)>> {
        let encoding = AlignmentEncoding::from_flat(self.alignment.clone()).map_err(to_py_err)?;
        Ok(encoding.pairs().map(|p| (p.source, p.target)).collect())
    }

    fn __len__(&self) -> usize {
        self.hypotheses.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Translation(text={:?}, hypotheses={}, alignment_pairs={}, source={:?})",
            self.text,
            self.hypotheses.len(),
            self.alignment.len() / 2,
            self.source
        )
    }
}

fn to_pairs(alignment: Vec<(usize, usize)>) -> Vec<AlignmentPair> {
    alignment.into_iter().map(AlignmentPair::from).collect()
}

/// Builds Python result objects from decoder output
///
/// Class and constructor lookups happen on first use and are cached for the
/// lifetime of the marshaller.
#[pyclass(name = "Marshaller", module = "mtbridge", frozen)]
pub struct PyMarshaller {
    inner: ResultMarshaller<PyRuntime>,
}

#[pymethods]
impl PyMarshaller {
    #[new]
    #[pyo3(signature = (hypothesis_class=DEFAULT_HYPOTHESIS_CLASS, translation_class=DEFAULT_TRANSLATION_CLASS, include_source=true))]
    fn new(hypothesis_class: &str, translation_class: &str, include_source: bool) -> PyResult<Self> {
        let config = BridgeConfig {
            hypothesis_class: hypothesis_class.to_string(),
            translation_class: translation_class.to_string(),
            include_source,
        };
        config.validate().map_err(to_py_err)?;
        Ok(Self {
            inner: ResultMarshaller::new(&config),
        })
    }

    /// Marshaller configured from `MTBRIDGE_*` environment variables
    #[staticmethod]
    fn from_env() -> PyResult<Self> {
        let config = BridgeConfig {
            hypothesis_class: DEFAULT_HYPOTHESIS_CLASS.to_string(),
            translation_class: DEFAULT_TRANSLATION_CLASS.to_string(),
            include_source: true,
        }
        .with_env_overrides()
        .map_err(to_py_err)?;
        Ok(Self {
            inner: ResultMarshaller::new(&config),
        })
    }

    #[getter]
    fn hypothesis_class(&self) -> String {
        self.inner.hypotheses().class_name().to_string()
    }

    #[getter]
    fn translation_class(&self) -> String {
        self.inner.translations().class_name().to_string()
    }

    /// Resolve both classes now instead of on first use
    fn resolve(&self) -> PyResult<()> {
        self.inner.hypotheses().resolve(&PyRuntime).map_err(to_py_err)?;
        self.inner.translations().resolve(&PyRuntime).map_err(to_py_err)
    }

    fn hypothesis(&self, text: &str, total_score: f32, feature_values: &str) -> PyResult<PyObject> {
        self.inner
            .hypotheses()
            .create(&PyRuntime, text, total_score, feature_values)
            .map_err(to_py_err)
    }

    /// Build a translation from already constructed hypotheses
    #[pyo3(signature = (text, hypotheses, alignment, source=None))]
    fn translation(
        &self,
        text: &str,
        hypotheses: Vec<PyObject>,
        alignment: Vec<(usize, usize)>,
        source: Option<&str>,
    ) -> PyResult<PyObject> {
        let runtime = PyRuntime;
        let encoding = encode_alignment(&to_pairs(alignment)).map_err(to_py_err)?;
        let nbest = self
            .inner
            .hypotheses()
            .new_array(&runtime, hypotheses)
            .map_err(to_py_err)?;
        let alignment = to_runtime_array(&runtime, &encoding).map_err(to_py_err)?;

        let translations = self.inner.translations();
        let translation = match source {
            Some(source) => translations.create_with_source(&runtime, text, nbest, alignment, source),
            None => translations.create(&runtime, text, nbest, alignment),
        };
        translation.map_err(to_py_err)
    }

    /// Convert one decoder output
    ///
    /// `nbest` holds `(text, total_score, feature_values)` tuples in rank
    /// order; an empty list yields an empty hypothesis list.
    #[pyo3(signature = (text, nbest=Vec::new(), alignment=Vec::new(), source=None))]
    fn marshal(
        &self,
        text: String,
        nbest: Vec<(String, f32, String)>,
        alignment: Vec<(usize, usize)>,
        source: Option<String>,
    ) -> PyResult<PyObject> {
        let output = DecoderOutput {
            text,
            source,
            nbest: nbest
                .into_iter()
                .map(|(text, score, features)| Candidate::new(text, score, features))
                .collect(),
            alignment: to_pairs(alignment),
        };
        self.inner.marshal(&PyRuntime, &output).map_err(to_py_err)
    }
}

/// Flatten `(source, target)` pairs into `[s0, t0, s1, t1, ...]`
#[pyfunction]
#[pyo3(name = "encode_alignment")]
pub fn encode_alignment_pairs(pairs: Vec<(usize, usize)>) -> PyResult<Vec<i32>> {
    encode_alignment(&to_pairs(pairs))
        .map(AlignmentEncoding::into_vec)
        .map_err(to_py_err)
}

/// Inverse of `encode_alignment`
#[pyfunction]
pub fn decode_alignment(flat: Vec<i32>) -> PyResult<Vec<(usize, usize)>> {
    let encoding = AlignmentEncoding::from_flat(flat).map_err(to_py_err)?;
    Ok(encoding.pairs().map(|p| (p.source, p.target)).collect())
}
