//! The dependency sink contract: the open/close capture protocol shared by the
//! producer, every transformation stage, and the terminal sink.

use std::cell::RefCell;
use std::rc::Rc;

/// Declaration attributes of one code object, as passed to [`DependencySink::open_object`].
///
/// Supers are ordered: superclass first, then interfaces in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDecl {
    pub fqn: String,
    /// Object is only locally usable inside another object (anonymous inner
    /// class or a class defined inside a method).
    pub local: bool,
    pub pure_interface: bool,
    pub supers: Vec<String>,
}

impl ObjectDecl {
    pub fn new(
        fqn: impl Into<String>,
        local: bool,
        pure_interface: bool,
        supers: Vec<String>,
    ) -> Self {
        Self {
            fqn: fqn.into(),
            local,
            pure_interface,
            supers,
        }
    }
}

/// Member name identifying constructor call edges in bytecode.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Dependencies between a number of code objects.
///
/// Objects may be opened in any order; edges may target objects not yet (or
/// never) opened. `close` is the pipeline shutdown event, fired exactly once
/// after all input units are exhausted.
pub trait DependencySink {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle;

    fn close(&mut self);
}

/// One open code object accumulating members.
pub trait ObjectSink {
    /// `local` means the method is only locally callable (private).
    fn open_method(&mut self, name: &str, local: bool) -> MethodHandle;

    fn field(&mut self, name: &str);

    fn close(&mut self);
}

/// One open method accumulating outgoing edges.
pub trait MethodSink {
    fn call(&mut self, target_fqn: &str, method_name: &str);

    fn reference(&mut self, target_fqn: &str, field_name: &str);

    fn close(&mut self);
}

/// Cheap clonable handle to an open object. Stages retain clones of downstream
/// handles in deferred waiters, so members can still be delivered after the
/// producer has moved on.
#[derive(Clone)]
pub struct ObjectHandle(Rc<RefCell<dyn ObjectSink>>);

impl ObjectHandle {
    pub fn new(sink: impl ObjectSink + 'static) -> Self {
        let inner: Rc<RefCell<dyn ObjectSink>> = Rc::new(RefCell::new(sink));
        Self(inner)
    }

    /// Handle that discards everything, used when a filter rejects an object.
    pub fn null() -> Self {
        Self::new(NullObject)
    }

    pub fn open_method(&self, name: &str, local: bool) -> MethodHandle {
        self.0.borrow_mut().open_method(name, local)
    }

    pub fn field(&self, name: &str) {
        self.0.borrow_mut().field(name);
    }

    pub fn close(&self) {
        self.0.borrow_mut().close();
    }
}

/// Cheap clonable handle to an open method.
#[derive(Clone)]
pub struct MethodHandle(Rc<RefCell<dyn MethodSink>>);

impl MethodHandle {
    pub fn new(sink: impl MethodSink + 'static) -> Self {
        let inner: Rc<RefCell<dyn MethodSink>> = Rc::new(RefCell::new(sink));
        Self(inner)
    }

    pub fn null() -> Self {
        Self::new(NullMethod)
    }

    pub fn call(&self, target_fqn: &str, method_name: &str) {
        self.0.borrow_mut().call(target_fqn, method_name);
    }

    pub fn reference(&self, target_fqn: &str, field_name: &str) {
        self.0.borrow_mut().reference(target_fqn, field_name);
    }

    pub fn close(&self) {
        self.0.borrow_mut().close();
    }
}

struct NullObject;

impl ObjectSink for NullObject {
    fn open_method(&mut self, _name: &str, _local: bool) -> MethodHandle {
        MethodHandle::null()
    }

    fn field(&mut self, _name: &str) {}

    fn close(&mut self) {}
}

struct NullMethod;

impl MethodSink for NullMethod {
    fn call(&mut self, _target_fqn: &str, _method_name: &str) {}

    fn reference(&mut self, _target_fqn: &str, _field_name: &str) {}

    fn close(&mut self) {}
}

/// Sink that discards the whole stream while satisfying the full contract.
pub struct NullSink;

impl DependencySink for NullSink {
    fn open_object(&mut self, _decl: &ObjectDecl) -> ObjectHandle {
        ObjectHandle::null()
    }

    fn close(&mut self) {}
}
