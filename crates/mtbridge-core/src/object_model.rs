//! In-process object model implementing [`ManagedRuntime`]
//!
//! Classes are registered with a field list and any number of constructors.
//! Each constructor assigns its arguments to named fields in order; fields a
//! constructor does not mention stay `Null`. Objects are immutable once
//! built and shared by reference.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use crate::error::{Error, Result};
use crate::runtime::{Arg, ManagedRuntime, ParamKind, Signature};

/// Class name of the default hypothesis type
pub const HYPOTHESIS_CLASS: &str = "mtbridge/Hypothesis";

/// Class name of the default translation type
pub const TRANSLATION_CLASS: &str = "mtbridge/Translation";

/// Constructor-side validation hook
pub type Validator = Arc<dyn Fn(&[Value]) -> anyhow::Result<()> + Send + Sync>;

/// A value held by the object model
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Str(String),
    Float(f32),
    IntArray(Arc<[i32]>),
    Array {
        class: String,
        elements: Arc<[Value]>,
    },
    Object(Arc<Instance>),
}

/// An instance of a registered class
#[derive(Debug, PartialEq)]
pub struct Instance {
    class: String,
    fields: Vec<(String, Value)>,
}

impl Instance {
    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Value::IntArray(values) => Some(&values[..]),
            _ => None,
        }
    }

    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array { elements, .. } => Some(&elements[..]),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance.as_ref()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Read a field of an object value
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_instance().and_then(|instance| instance.field(name))
    }

    /// Identity comparison; `==` compares by value
    pub fn same_object(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::IntArray(a), Value::IntArray(b)) => Arc::ptr_eq(a, b),
            (Value::Array { elements: a, .. }, Value::Array { elements: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }

    /// Render as JSON. Non-finite floats become the strings `"NaN"`,
    /// `"Infinity"` and `"-Infinity"`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Str(s) => json!(s),
            Value::Float(f) if f.is_nan() => json!("NaN"),
            Value::Float(f) if f.is_infinite() => {
                if *f > 0.0 {
                    json!("Infinity")
                } else {
                    json!("-Infinity")
                }
            }
            // Shortest f32 decimal, so 0.95f32 renders as 0.95
            Value::Float(f) => f
                .to_string()
                .parse::<f64>()
                .map_or_else(|_| json!(f64::from(*f)), |shortest| json!(shortest)),
            Value::IntArray(values) => json!(&values[..]),
            Value::Array { elements, .. } => {
                serde_json::Value::Array(elements.iter().map(Value::to_json).collect())
            }
            Value::Object(instance) => {
                let map = instance
                    .fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect();
                serde_json::Value::Object(map)
            }
        }
    }

    fn matches_kind(&self, kind: &ParamKind) -> bool {
        match (kind, self) {
            (ParamKind::String, Value::Str(_)) => true,
            (ParamKind::Float, Value::Float(_)) => true,
            (ParamKind::IntArray, Value::IntArray(_)) => true,
            (ParamKind::ObjectArray(expected), Value::Array { class, .. }) => expected == class,
            _ => false,
        }
    }
}

impl From<Arg<Value>> for Value {
    fn from(arg: Arg<Value>) -> Self {
        match arg {
            Arg::Str(s) => Value::Str(s),
            Arg::Float(f) => Value::Float(f),
            Arg::Object(o) => o,
        }
    }
}

/// A registered constructor
pub struct ConstructorDef {
    signature: Signature,
    assigns: Vec<String>,
    validator: Option<Validator>,
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDef")
            .field("signature", &self.signature)
            .field("assigns", &self.assigns)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// A registered class
#[derive(Debug)]
pub struct ClassDef {
    name: String,
    fields: Vec<String>,
    constructors: Vec<Arc<ConstructorDef>>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            constructors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a constructor assigning its arguments to `assigns`, in order
    ///
    /// # Panics
    /// When `assigns` does not match the signature arity or names an
    /// undeclared field. Class definitions are static setup.
    pub fn constructor(self, signature: Signature, assigns: &[&str]) -> Self {
        self.add_constructor(signature, assigns, None)
    }

    /// Same as [`ClassDef::constructor`], rejecting arguments when
    /// `validator` fails
    pub fn validated_constructor<F>(self, signature: Signature, assigns: &[&str], validator: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_constructor(signature, assigns, Some(Arc::new(validator)))
    }

    fn add_constructor(
        mut self,
        signature: Signature,
        assigns: &[&str],
        validator: Option<Validator>,
    ) -> Self {
        assert_eq!(
            signature.arity(),
            assigns.len(),
            "constructor of {} assigns {} fields for {} parameters",
            self.name,
            assigns.len(),
            signature.arity()
        );
        for field in assigns {
            assert!(
                self.fields.iter().any(|f| f == field),
                "constructor of {} assigns unknown field {}",
                self.name,
                field
            );
        }
        self.constructors.push(Arc::new(ConstructorDef {
            signature,
            assigns: assigns.iter().map(|f| f.to_string()).collect(),
            validator,
        }));
        self
    }
}

/// Class registry and allocator
#[derive(Debug, Default)]
pub struct ObjectModel {
    classes: HashMap<String, Arc<ClassDef>>,
    class_lookups: AtomicUsize,
    constructor_lookups: AtomicUsize,
}

impl ObjectModel {
    /// An empty model: every lookup fails until classes are registered
    pub fn new() -> Self {
        Self::default()
    }

    /// A model with the standard hypothesis and translation classes
    pub fn with_default_classes() -> Self {
        let mut model = Self::new();
        model.register(hypothesis_class());
        model.register(translation_class());
        model
    }

    pub fn register(&mut self, class: ClassDef) {
        self.classes.insert(class.name.clone(), Arc::new(class));
    }

    /// Number of `find_class` calls served so far
    pub fn class_lookups(&self) -> usize {
        self.class_lookups.load(Ordering::Relaxed)
    }

    /// Number of `constructor` calls served so far
    pub fn constructor_lookups(&self) -> usize {
        self.constructor_lookups.load(Ordering::Relaxed)
    }
}

/// Default hypothesis class: `(text, totalScore, featureValues)`
pub fn hypothesis_class() -> ClassDef {
    ClassDef::new(HYPOTHESIS_CLASS, &["text", "totalScore", "featureValues"]).constructor(
        Signature::new(vec![ParamKind::String, ParamKind::Float, ParamKind::String]),
        &["text", "totalScore", "featureValues"],
    )
}

/// Default translation class with both the narrow constructor (source left
/// `Null`) and the extended one carrying the source sentence
pub fn translation_class() -> ClassDef {
    let hypotheses = || ParamKind::ObjectArray(HYPOTHESIS_CLASS.to_string());
    ClassDef::new(
        TRANSLATION_CLASS,
        &["text", "hypotheses", "alignment", "source"],
    )
    .constructor(
        Signature::new(vec![ParamKind::String, hypotheses(), ParamKind::IntArray]),
        &["text", "hypotheses", "alignment"],
    )
    .constructor(
        Signature::new(vec![
            ParamKind::String,
            hypotheses(),
            ParamKind::IntArray,
            ParamKind::String,
        ]),
        &["text", "hypotheses", "alignment", "source"],
    )
}

impl ManagedRuntime for ObjectModel {
    type Object = Value;
    type Class = Arc<ClassDef>;
    type Constructor = Arc<ConstructorDef>;

    fn find_class(&self, name: &str) -> Result<Self::Class> {
        self.class_lookups.fetch_add(1, Ordering::Relaxed);
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::linkage(name, "", "class not registered"))
    }

    fn constructor(&self, class: &Self::Class, signature: &Signature) -> Result<Self::Constructor> {
        self.constructor_lookups.fetch_add(1, Ordering::Relaxed);
        class
            .constructors
            .iter()
            .find(|c| &c.signature == signature)
            .cloned()
            .ok_or_else(|| {
                Error::linkage(
                    class.name.as_str(),
                    signature.to_string(),
                    "no constructor with this signature",
                )
            })
    }

    fn new_object(
        &self,
        class: &Self::Class,
        constructor: &Self::Constructor,
        args: Vec<Arg<Self::Object>>,
    ) -> Result<Self::Object> {
        let args: Vec<Value> = args.into_iter().map(Value::from).collect();
        let params = constructor.signature.params();

        if args.len() != params.len() {
            return Err(Error::construction(
                class.name.as_str(),
                format!("expected {} arguments, got {}", params.len(), args.len()),
            ));
        }
        for (i, (arg, kind)) in args.iter().zip(params).enumerate() {
            if !arg.matches_kind(kind) {
                return Err(Error::construction(
                    class.name.as_str(),
                    format!("argument {} is not a {}", i, kind),
                ));
            }
        }
        if let Some(validator) = &constructor.validator {
            validator(&args).map_err(|e| Error::construction(class.name.as_str(), e))?;
        }

        let mut fields: Vec<(String, Value)> = class
            .fields
            .iter()
            .map(|name| (name.clone(), Value::Null))
            .collect();
        for (name, value) in constructor.assigns.iter().zip(args) {
            if let Some(slot) = fields.iter_mut().find(|(field, _)| field == name) {
                slot.1 = value;
            }
        }

        Ok(Value::Object(Arc::new(Instance {
            class: class.name.clone(),
            fields,
        })))
    }

    fn new_int_array(&self, values: &[i32]) -> Result<Self::Object> {
        Ok(Value::IntArray(Arc::from(values)))
    }

    fn new_object_array(
        &self,
        element_class: &Self::Class,
        elements: Vec<Self::Object>,
    ) -> Result<Self::Object> {
        if let Some(i) = elements.iter().position(|e| {
            e.as_instance()
                .map_or(true, |instance| instance.class != element_class.name)
        }) {
            return Err(Error::construction(
                element_class.name.as_str(),
                format!("array element {} is not a {}", i, element_class.name),
            ));
        }
        Ok(Value::Array {
            class: element_class.name.clone(),
            elements: Arc::from(elements),
        })
    }
}
