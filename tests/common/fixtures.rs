//! Shared builders for declarations and decoded units.
#![allow(dead_code)]

use classdep::sink::ObjectDecl;
use classdep::unit::{BodyOp, BootstrapKind, ClassUnit, InnerClassInfo, MethodUnit};

/// Declaration of a plain top-level object.
pub fn decl(fqn: &str, supers: &[&str]) -> ObjectDecl {
    ObjectDecl::new(
        fqn,
        false,
        false,
        supers.iter().map(|s| s.to_string()).collect(),
    )
}

/// Declaration of an anonymous/locally-scoped object.
pub fn local_decl(fqn: &str, supers: &[&str]) -> ObjectDecl {
    ObjectDecl::new(
        fqn,
        true,
        false,
        supers.iter().map(|s| s.to_string()).collect(),
    )
}

/// Declaration of a pure interface.
pub fn interface_decl(fqn: &str, supers: &[&str]) -> ObjectDecl {
    ObjectDecl::new(
        fqn,
        false,
        true,
        supers.iter().map(|s| s.to_string()).collect(),
    )
}

pub fn unit(name: &str) -> ClassUnit {
    ClassUnit {
        name: name.to_string(),
        is_interface: false,
        super_name: Some("java/lang/Object".to_string()),
        interfaces: Vec::new(),
        inner_classes: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
    }
}

/// Unit carrying the inner-class record that marks it anonymous.
pub fn anonymous_unit(name: &str) -> ClassUnit {
    let mut unit = unit(name);
    unit.inner_classes.push(InnerClassInfo {
        name: name.to_string(),
        inner_name: None,
    });
    unit
}

pub fn method(name: &str, body: Vec<BodyOp>) -> MethodUnit {
    MethodUnit {
        name: name.to_string(),
        private: false,
        body,
    }
}

pub fn private_method(name: &str, body: Vec<BodyOp>) -> MethodUnit {
    MethodUnit {
        name: name.to_string(),
        private: true,
        body,
    }
}

pub fn call(owner: &str, name: &str) -> BodyOp {
    BodyOp::Call {
        owner: owner.to_string(),
        name: name.to_string(),
    }
}

pub fn field_access(owner: &str, name: &str) -> BodyOp {
    BodyOp::FieldAccess {
        owner: owner.to_string(),
        name: name.to_string(),
    }
}

pub fn lambda_call(owner: &str, name: &str) -> BodyOp {
    BodyOp::DynamicCall {
        bootstrap: BootstrapKind::LambdaMetafactory,
        owner: owner.to_string(),
        name: name.to_string(),
    }
}

pub fn opaque_dynamic_call(owner: &str, name: &str) -> BodyOp {
    BodyOp::DynamicCall {
        bootstrap: BootstrapKind::Other,
        owner: owner.to_string(),
        name: name.to_string(),
    }
}
