//! Data model of one decoded compiled unit, as produced by the external
//! class-file decoder. Names are kept in the decoder's native slash-separated
//! form; the producer converts them to dotted FQNs.

use serde::{Deserialize, Serialize};

/// One class/interface's declarations and instruction events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassUnit {
    /// Declared name in slash form, e.g. `com/example/Widget`.
    pub name: String,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub super_name: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Inner-class records attached to this unit, used to detect
    /// anonymous/locally-scoped classes.
    #[serde(default)]
    pub inner_classes: Vec<InnerClassInfo>,
    /// Declared field names.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodUnit>,
}

/// One inner-class metadata record. A record naming the unit itself with no
/// inner simple name marks the unit as anonymous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InnerClassInfo {
    pub name: String,
    #[serde(default)]
    pub inner_name: Option<String>,
}

/// One declared method with its ordered body events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodUnit {
    pub name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub body: Vec<BodyOp>,
}

/// One instruction event observed in a method body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BodyOp {
    /// Method invocation on `owner`.
    Call { owner: String, name: String },
    /// Field read or write on `owner`.
    FieldAccess { owner: String, name: String },
    /// Dynamic call site generated by closure/lambda construction, carrying
    /// the bootstrap kind and the bound target.
    DynamicCall {
        bootstrap: BootstrapKind,
        owner: String,
        name: String,
    },
}

/// Bootstrap method kind of a dynamic call site. Only the standard lambda
/// metafactory is resolved to a call edge; other kinds are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapKind {
    LambdaMetafactory,
    Other,
}
