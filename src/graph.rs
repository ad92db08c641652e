//! Terminal sink: accumulates the final dependency stream into a petgraph
//! graph and serializes it to JSON for the visualization layer.

use crate::sink::{DependencySink, MethodHandle, MethodSink, ObjectDecl, ObjectHandle, ObjectSink};
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct ObjectNode {
    pub fqn: String,
    pub pure_interface: bool,
    pub supers: Vec<String>,
    pub fields: Vec<String>,
    pub methods: Vec<String>,
    /// True for placeholder nodes created as edge targets only; the object
    /// itself was never analyzed in this run.
    pub is_external: bool,
}

impl ObjectNode {
    fn external(fqn: &str) -> Self {
        Self {
            fqn: fqn.to_string(),
            pure_interface: false,
            supers: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            is_external: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Call,
    Reference,
}

#[derive(Debug, Clone)]
pub struct DependencyEdge {
    pub source_method: String,
    pub target_member: String,
    pub kind: EdgeKind,
}

/// The assembled graph: one node per object FQN, edges labelled with their
/// source method and target member.
pub struct DependencyGraph {
    pub graph: DiGraph<ObjectNode, DependencyEdge>,
    fqn_to_node: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            fqn_to_node: HashMap::new(),
        }
    }

    fn get_or_create(&mut self, fqn: &str) -> NodeIndex {
        if let Some(&idx) = self.fqn_to_node.get(fqn) {
            return idx;
        }
        let idx = self.graph.add_node(ObjectNode::external(fqn));
        self.fqn_to_node.insert(fqn.to_string(), idx);
        idx
    }

    /// Record an analyzed object's declaration. Re-opening updates the one
    /// existing node instead of forking a second entity.
    fn declare(&mut self, decl: &ObjectDecl) -> NodeIndex {
        let idx = self.get_or_create(&decl.fqn);
        let node = &mut self.graph[idx];
        node.pure_interface = decl.pure_interface;
        node.supers = decl.supers.clone();
        node.is_external = false;
        idx
    }

    fn add_field(&mut self, object: NodeIndex, name: &str) {
        let fields = &mut self.graph[object].fields;
        if !fields.iter().any(|f| f == name) {
            fields.push(name.to_string());
        }
    }

    fn add_method(&mut self, object: NodeIndex, name: &str) {
        let methods = &mut self.graph[object].methods;
        if !methods.iter().any(|m| m == name) {
            methods.push(name.to_string());
        }
    }

    fn add_edge(
        &mut self,
        source: NodeIndex,
        source_method: &str,
        target_fqn: &str,
        target_member: &str,
        kind: EdgeKind,
    ) {
        let target = self.get_or_create(target_fqn);
        self.graph.add_edge(
            source,
            target,
            DependencyEdge {
                source_method: source_method.to_string(),
                target_member: target_member.to_string(),
                kind,
            },
        );
    }

    pub fn node_by_fqn(&self, fqn: &str) -> Option<&ObjectNode> {
        self.fqn_to_node.get(fqn).map(|&idx| &self.graph[idx])
    }

    /// Serialize the graph into the stable `{objects, edges}` JSON shape
    /// consumed by the visualization layer.
    pub fn to_json(&self) -> Value {
        let objects: Vec<Value> = self
            .graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                json!({
                    "fqn": node.fqn,
                    "pure_interface": node.pure_interface,
                    "supers": node.supers,
                    "fields": node.fields,
                    "methods": node.methods,
                    "external": node.is_external,
                })
            })
            .collect();
        let edges: Vec<Value> = self
            .graph
            .edge_indices()
            .filter_map(|idx| {
                let (source, target) = self.graph.edge_endpoints(idx)?;
                let edge = &self.graph[idx];
                Some(json!({
                    "from": self.graph[source].fqn,
                    "from_method": edge.source_method,
                    "to": self.graph[target].fqn,
                    "to_member": edge.target_member,
                    "kind": match edge.kind {
                        EdgeKind::Call => "call",
                        EdgeKind::Reference => "reference",
                    },
                }))
            })
            .collect();
        json!({ "objects": objects, "edges": edges })
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal sink feeding a shared [`DependencyGraph`]. Tolerates members and
/// edges arriving after object close; the accessor stage legitimately flushes
/// late.
pub struct GraphSink {
    graph: Rc<RefCell<DependencyGraph>>,
}

impl GraphSink {
    pub fn new() -> (Self, Rc<RefCell<DependencyGraph>>) {
        let graph = Rc::new(RefCell::new(DependencyGraph::new()));
        (
            Self {
                graph: graph.clone(),
            },
            graph,
        )
    }
}

impl DependencySink for GraphSink {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        let node = self.graph.borrow_mut().declare(decl);
        ObjectHandle::new(GraphObject {
            graph: self.graph.clone(),
            node,
        })
    }

    fn close(&mut self) {}
}

struct GraphObject {
    graph: Rc<RefCell<DependencyGraph>>,
    node: NodeIndex,
}

impl ObjectSink for GraphObject {
    fn open_method(&mut self, name: &str, _local: bool) -> MethodHandle {
        self.graph.borrow_mut().add_method(self.node, name);
        MethodHandle::new(GraphMethod {
            graph: self.graph.clone(),
            node: self.node,
            name: name.to_string(),
        })
    }

    fn field(&mut self, name: &str) {
        self.graph.borrow_mut().add_field(self.node, name);
    }

    fn close(&mut self) {}
}

struct GraphMethod {
    graph: Rc<RefCell<DependencyGraph>>,
    node: NodeIndex,
    name: String,
}

impl MethodSink for GraphMethod {
    fn call(&mut self, target_fqn: &str, method_name: &str) {
        self.graph
            .borrow_mut()
            .add_edge(self.node, &self.name, target_fqn, method_name, EdgeKind::Call);
    }

    fn reference(&mut self, target_fqn: &str, field_name: &str) {
        self.graph.borrow_mut().add_edge(
            self.node,
            &self.name,
            target_fqn,
            field_name,
            EdgeKind::Reference,
        );
    }

    fn close(&mut self) {}
}
