//! Python as a managed runtime
//!
//! Classes are looked up by dotted path (`package.module.Class`), the class
//! object itself is the constructor, and arrays are Python lists.

use mtbridge_core::{Arg, Error, ManagedRuntime, Result, Signature};
use pyo3::prelude::*;
use pyo3::types::{PyList, PyTuple, PyType};
use tracing::debug;

/// A resolved Python class
#[derive(Debug, Clone)]
pub struct PyClassHandle {
    name: String,
    class: PyObject,
}

/// Stateless handle on the interpreter; every call takes the GIL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PyRuntime;

impl PyRuntime {
    /// Check that the class can be called with `arity` positional arguments.
    ///
    /// Classes without an introspectable signature (some extension types)
    /// are accepted as they are.
    fn check_arity(py: Python<'_>, class: &PyClassHandle, signature: &Signature) -> Result<()> {
        let linkage = |message: String| Error::linkage(class.name.as_str(), signature.to_string(), message);

        let inspect = py.import("inspect").map_err(|e| linkage(e.to_string()))?;
        let spec = match inspect.getattr("signature").and_then(|f| f.call1((class.class.as_ref(py),))) {
            Ok(spec) => spec,
            Err(_) => return Ok(()),
        };

        let placeholders = PyTuple::new(py, (0..signature.arity()).map(|_| py.None()));
        spec.call_method1("bind", placeholders)
            .map(|_| ())
            .map_err(|e| linkage(e.to_string()))
    }
}

impl ManagedRuntime for PyRuntime {
    type Object = PyObject;
    type Class = PyClassHandle;
    type Constructor = PyObject;

    fn find_class(&self, name: &str) -> Result<Self::Class> {
        Python::with_gil(|py| {
            let (module, attr) = name
                .rsplit_once('.')
                .ok_or_else(|| Error::linkage(name, "", "expected a dotted path module.Class"))?;

            let module = py
                .import(module)
                .map_err(|e| Error::linkage(name, "", e.to_string()))?;
            let class = module
                .getattr(attr)
                .map_err(|e| Error::linkage(name, "", e.to_string()))?;
            if class.downcast::<PyType>().is_err() {
                return Err(Error::linkage(name, "", "not a class"));
            }

            debug!(class = %name, module = %module.name().unwrap_or("?"), "imported python class");
            Ok(PyClassHandle {
                name: name.to_string(),
                class: class.to_object(py),
            })
        })
    }

    fn constructor(&self, class: &Self::Class, signature: &Signature) -> Result<Self::Constructor> {
        Python::with_gil(|py| {
            Self::check_arity(py, class, signature)?;
            Ok(class.class.clone_ref(py))
        })
    }

    fn new_object(
        &self,
        class: &Self::Class,
        constructor: &Self::Constructor,
        args: Vec<Arg<Self::Object>>,
    ) -> Result<Self::Object> {
        Python::with_gil(|py| {
            let args: Vec<PyObject> = args
                .into_iter()
                .map(|arg| match arg {
                    Arg::Str(s) => s.into_py(py),
                    Arg::Float(f) => f.into_py(py),
                    Arg::Object(o) => o,
                })
                .collect();

            constructor
                .call1(py, PyTuple::new(py, args))
                .map_err(|e| Error::construction(class.name.as_str(), e))
        })
    }

    fn new_int_array(&self, values: &[i32]) -> Result<Self::Object> {
        Python::with_gil(|py| Ok(PyList::new(py, values).to_object(py)))
    }

    fn new_object_array(
        &self,
        element_class: &Self::Class,
        elements: Vec<Self::Object>,
    ) -> Result<Self::Object> {
        Python::with_gil(|py| {
            let class = element_class.class.as_ref(py);
            for (i, element) in elements.iter().enumerate() {
                let is_instance = element
                    .as_ref(py)
                    .is_instance(class)
                    .map_err(|e| Error::construction(element_class.name.as_str(), e))?;
                if !is_instance {
                    return Err(Error::construction(
                        element_class.name.as_str(),
                        format!("array element {} is not a {}", i, element_class.name),
                    ));
                }
            }
            Ok(PyList::new(py, elements).to_object(py))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtbridge_core::{BridgeConfig, DecoderOutput, HypothesisBuilder, ResultMarshaller, TranslationBuilder};

    const MODULE: &str = "mtbridge_runtime_classes";
    const CLASSES: &str = r#"
class Hyp:
    def __init__(self, text, total_score, feature_values):
        if total_score != total_score:
            raise ValueError("score is NaN")
        self.text = text
        self.total_score = total_score
        self.feature_values = feature_values

class NarrowTranslation:
    def __init__(self, text, hypotheses, alignment):
        self.text = text
        self.hypotheses = hypotheses
        self.alignment = alignment

class Translation(NarrowTranslation):
    def __init__(self, text, hypotheses, alignment, source=None):
        super().__init__(text, hypotheses, alignment)
        self.source = source

not_a_class = 42
"#;

    fn load_classes(py: Python<'_>) {
        PyModule::from_code(py, CLASSES, "mtbridge_runtime_classes.py", MODULE).unwrap();
    }

    fn class_path(name: &str) -> String {
        format!("{}.{}", MODULE, name)
    }

    #[test]
    fn test_find_class_failures_are_linkage_errors() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            load_classes(py);
            for name in [
                class_path("not_a_class"),
                class_path("Missing"),
                "mtbridge_no_such_module.Type".to_string(),
                "NoDots".to_string(),
            ] {
                let err = PyRuntime.find_class(&name).unwrap_err();
                assert!(err.is_linkage(), "{}: {}", name, err);
            }
        });
    }

    #[test]
    fn test_narrow_only_class_rejects_source_constructor() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            load_classes(py);
            let hyp = class_path("Hyp");
            let narrow = PyRuntime.find_class(&class_path("NarrowTranslation")).unwrap();

            assert!(PyRuntime
                .constructor(&narrow, &TranslationBuilder::<PyRuntime>::signature(&hyp))
                .is_ok());
            let err = PyRuntime
                .constructor(
                    &narrow,
                    &TranslationBuilder::<PyRuntime>::signature_with_source(&hyp),
                )
                .unwrap_err();
            assert!(err.is_linkage());

            let extended = PyRuntime.find_class(&class_path("Translation")).unwrap();
            assert!(PyRuntime
                .constructor(
                    &extended,
                    &TranslationBuilder::<PyRuntime>::signature_with_source(&hyp),
                )
                .is_ok());
        });
    }

    #[test]
    fn test_object_array_rejects_foreign_elements() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            load_classes(py);
            let builder = HypothesisBuilder::<PyRuntime>::new(class_path("Hyp"));
            let hypothesis = builder.create(&PyRuntime, "the cat", -1.5, "lm=-1").unwrap();

            let err = builder
                .new_array(&PyRuntime, vec![hypothesis, 7i32.into_py(py)])
                .unwrap_err();
            assert!(matches!(err, Error::Construction { .. }));
            assert!(err.to_string().contains("element 1"));
        });
    }

    #[test]
    fn test_constructor_exception_becomes_construction_error() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            load_classes(py);
            let builder = HypothesisBuilder::<PyRuntime>::new(class_path("Hyp"));

            let err = builder.create(&PyRuntime, "x", f32::NAN, "").unwrap_err();
            match err {
                Error::Construction { message, source, .. } => {
                    assert!(message.contains("score is NaN"));
                    assert!(source.is_some());
                }
                other => panic!("expected construction error, got {other:?}"),
            }
        });
    }

    #[test]
    fn test_marshal_into_plain_python_classes() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            load_classes(py);
            let config = BridgeConfig {
                hypothesis_class: class_path("Hyp"),
                translation_class: class_path("Translation"),
                include_source: true,
            };
            let marshaller = ResultMarshaller::<PyRuntime>::new(&config);
            let output = DecoderOutput::new("le chat")
                .with_candidate(mtbridge_core::Candidate::new("the cat", -1.5, "lm=-1"))
                .with_alignment([(0, 0), (1, 1)])
                .with_source("the cat");

            let translation = marshaller.marshal(&PyRuntime, &output).unwrap();
            let translation = translation.as_ref(py);

            let text: String = translation.getattr("text").unwrap().extract().unwrap();
            let alignment: Vec<i32> = translation.getattr("alignment").unwrap().extract().unwrap();
            let source: Option<String> = translation.getattr("source").unwrap().extract().unwrap();
            let hypotheses: Vec<&PyAny> = translation.getattr("hypotheses").unwrap().extract().unwrap();
            assert_eq!(text, "le chat");
            assert_eq!(alignment, vec![0, 0, 1, 1]);
            assert_eq!(source.as_deref(), Some("the cat"));
            assert_eq!(hypotheses.len(), 1);

            let score: f32 = hypotheses[0].getattr("total_score").unwrap().extract().unwrap();
            assert_eq!(score, -1.5);
        });
    }
}
