//! Depsets: immutable, order-tagged, hierarchical collections.
//!
//! A depset holds direct elements plus references to child depsets. Building
//! a set that includes another never copies it, so accumulating values along
//! a dependency graph costs time proportional to the number of edges, not the
//! number of elements. Elements are only collected ("flattened") on demand.

use std::fmt;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::errors::{
    depset_content_type, depset_depth, depset_element, depset_invalid_order, depset_order,
    EvalError,
};
use crate::value::{HashKey, Heap, TypeTag, Value};

/// Maximum nesting depth accepted when flattening.
pub const MAX_DEPTH: usize = 3500;

/// Traversal order of a depset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Unspecified but deterministic; compatible with every other order.
    Stable,
    /// Children left to right, then direct elements.
    Postorder,
    /// Direct elements, then children left to right.
    Preorder,
    /// Every element appears before the elements of the sets it includes.
    Topological,
}

impl Order {
    /// The name used by the `order` parameter.
    pub fn name(self) -> &'static str {
        match self {
            Order::Stable => "default",
            Order::Postorder => "postorder",
            Order::Preorder => "preorder",
            Order::Topological => "topological",
        }
    }

    pub fn parse(name: &str) -> Result<Order, EvalError> {
        match name {
            "default" => Ok(Order::Stable),
            "postorder" => Ok(Order::Postorder),
            "preorder" => Ok(Order::Preorder),
            "topological" => Ok(Order::Topological),
            other => Err(depset_invalid_order(other)),
        }
    }

    /// Whether sets of these orders may be combined.
    pub fn is_compatible(self, other: Order) -> bool {
        self == other || self == Order::Stable || other == Order::Stable
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element type shared by every element of a depset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContentType {
    /// Empty so far; unifies with anything.
    Any,
    Of(TypeTag),
}

impl ContentType {
    fn name(self) -> &'static str {
        match self {
            ContentType::Any => "any",
            ContentType::Of(tag) => tag.name(),
        }
    }

    /// Unify with the type of a new item, naming `item_type` on mismatch.
    fn unify(self, item: ContentType) -> Result<ContentType, EvalError> {
        match (self, item) {
            (ContentType::Any, other) | (other, ContentType::Any) => Ok(other),
            (ContentType::Of(a), ContentType::Of(b)) if a == b => Ok(self),
            (ContentType::Of(_), ContentType::Of(_)) => {
                Err(depset_content_type(item.name(), self.name()))
            }
        }
    }
}

/// An immutable depset.
#[derive(Debug)]
pub struct Depset {
    content_type: ContentType,
    order: Order,
    direct: Vec<Value>,
    transitive: Vec<Heap<Depset>>,
    depth: usize,
}

impl Depset {
    /// An empty set of the given order.
    pub fn empty(order: Order) -> Depset {
        Depset {
            content_type: ContentType::Any,
            order,
            direct: Vec::new(),
            transitive: Vec::new(),
            depth: 1,
        }
    }

    pub fn builder(order: Order) -> DepsetBuilder {
        DepsetBuilder::new(order)
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Nesting depth: 1 for a set without children.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn direct(&self) -> &[Value] {
        &self.direct
    }

    pub fn transitive(&self) -> &[Heap<Depset>] {
        &self.transitive
    }

    /// Whether the set holds no elements. Empty children are never linked,
    /// so looking at this level suffices.
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.transitive.is_empty()
    }

    /// Collect the elements in this set's order, without duplicates.
    pub fn to_list(&self) -> Result<Vec<Value>, EvalError> {
        if self.depth > MAX_DEPTH {
            return Err(depset_depth(MAX_DEPTH));
        }
        let mut walk = Walk::default();
        match self.order {
            Order::Stable | Order::Postorder => walk.postorder(self),
            Order::Preorder => walk.preorder(self),
            Order::Topological => walk.topological(self),
        }
        trace!(order = %self.order, len = walk.out.len(), "flattened depset");
        Ok(walk.out)
    }
}

/// Unlinks children iteratively so dropping a deep chain of sets does not
/// recurse once per level.
impl Drop for Depset {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.transitive);
        while let Some(child) = pending.pop() {
            if let Some(mut inner) = child.into_inner() {
                pending.append(&mut inner.transitive);
            }
        }
    }
}

enum Step<'a> {
    Visit(&'a Depset),
    Emit(&'a [Value]),
    EmitReversed(&'a [Value]),
}

/// Explicit-stack traversal state, so deep sets do not recurse natively.
#[derive(Default)]
struct Walk {
    visited: FxHashSet<usize>,
    seen: FxHashSet<HashKey>,
    out: Vec<Value>,
}

impl Walk {
    fn emit(&mut self, items: impl Iterator<Item = Value>) {
        for item in items {
            // Elements were validated hashable on insertion.
            if let Ok(key) = HashKey::new(item.clone()) {
                if self.seen.insert(key) {
                    self.out.push(item);
                }
            }
        }
    }

    fn run<'a>(&mut self, root: &'a Depset, expand: impl Fn(&'a Depset, &mut Vec<Step<'a>>)) {
        let mut stack = vec![Step::Visit(root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Visit(set) => {
                    let addr = std::ptr::from_ref(set) as usize;
                    if self.visited.insert(addr) {
                        expand(set, &mut stack);
                    }
                }
                Step::Emit(items) => self.emit(items.iter().cloned()),
                Step::EmitReversed(items) => self.emit(items.iter().rev().cloned()),
            }
        }
    }

    fn postorder(&mut self, root: &Depset) {
        self.run(root, |set, stack| {
            stack.push(Step::Emit(&set.direct));
            for child in set.transitive.iter().rev() {
                stack.push(Step::Visit(&**child));
            }
        });
    }

    fn preorder(&mut self, root: &Depset) {
        self.run(root, |set, stack| {
            for child in set.transitive.iter().rev() {
                stack.push(Step::Visit(&**child));
            }
            stack.push(Step::Emit(&set.direct));
        });
    }

    /// Reverse of a postorder walk that visits children right to left and
    /// emits direct elements backwards. An element shared by several sets
    /// ends up after every set that includes it.
    fn topological(&mut self, root: &Depset) {
        self.run(root, |set, stack| {
            stack.push(Step::EmitReversed(&set.direct));
            for child in &set.transitive {
                stack.push(Step::Visit(&**child));
            }
        });
        self.out.reverse();
    }
}

/// Incremental construction of a depset.
#[derive(Debug)]
pub struct DepsetBuilder {
    content_type: ContentType,
    order: Order,
    direct: Vec<Value>,
    transitive: Vec<Heap<Depset>>,
}

impl DepsetBuilder {
    pub fn new(order: Order) -> Self {
        DepsetBuilder {
            content_type: ContentType::Any,
            order,
            direct: Vec::new(),
            transitive: Vec::new(),
        }
    }

    /// Add a direct element.
    pub fn add_direct(&mut self, item: Value) -> Result<&mut Self, EvalError> {
        if matches!(item, Value::Depset(_)) || !item.is_hashable() {
            return Err(depset_element(item.type_name()));
        }
        self.content_type = self
            .content_type
            .unify(ContentType::Of(item.type_tag()))?;
        self.direct.push(item);
        Ok(self)
    }

    /// Add every element of `set` without copying it. Empty sets are skipped.
    pub fn add_transitive(&mut self, set: Heap<Depset>) -> Result<&mut Self, EvalError> {
        if set.is_empty() {
            return Ok(self);
        }
        self.content_type = self.content_type.unify(set.content_type)?;
        if !self.order.is_compatible(set.order) {
            return Err(depset_order(self.order.name(), set.order.name()));
        }
        self.transitive.push(set);
        Ok(self)
    }

    pub fn build(self) -> Depset {
        let depth = self
            .transitive
            .iter()
            .map(|child| child.depth)
            .max()
            .map_or(1, |deepest| deepest.saturating_add(1));
        Depset {
            content_type: self.content_type,
            order: self.order,
            direct: self.direct,
            transitive: self.transitive,
            depth,
        }
    }
}

/// `left + right`, `left | right` and `left.union(right)`: a new set of the
/// left operand's order including `left`, then `right`. A non-depset right
/// operand contributes its elements as direct items.
pub fn union(left: &Heap<Depset>, right: &Value) -> Result<Depset, EvalError> {
    let mut builder = DepsetBuilder::new(left.order);
    builder.add_transitive(left.clone())?;
    match right {
        Value::Depset(other) => {
            builder.add_transitive(other.clone())?;
        }
        Value::List(list) => {
            for item in list.to_vec() {
                builder.add_direct(item)?;
            }
        }
        Value::Tuple(items) => {
            for item in items.iter() {
                builder.add_direct(item.clone())?;
            }
        }
        other => {
            builder.add_direct(other.clone())?;
        }
    }
    Ok(builder.build())
}
