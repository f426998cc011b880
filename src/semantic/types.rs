use crate::syntax::{NodeId, TypeName};
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveType {
    Int,
    Bool,
    String,
    Void,
    // The type of an expression whose type could not be determined.
    // Every construct that consumes an `Error` operand is `Error` too.
    Error,
}

impl PrimitiveType {
    pub fn is_error(self) -> bool {
        self == PrimitiveType::Error
    }
}

impl From<TypeName> for PrimitiveType {
    fn from(name: TypeName) -> Self {
        match name {
            TypeName::Int => PrimitiveType::Int,
            TypeName::Bool => PrimitiveType::Bool,
            TypeName::String => PrimitiveType::String,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Int => write!(f, "Int"),
            PrimitiveType::Bool => write!(f, "Bool"),
            PrimitiveType::String => write!(f, "String"),
            PrimitiveType::Void => write!(f, "Void"),
            PrimitiveType::Error => write!(f, "Error"),
        }
    }
}

/// The type of every expression node, keyed by node id.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypeMap {
    types: BTreeMap<NodeId, PrimitiveType>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the type of `id`. An entry is written once; later writes are
    /// ignored.
    pub fn insert(&mut self, id: NodeId, ty: PrimitiveType) {
        if let Some(existing) = self.types.get(&id) {
            warn!(
                "[types] node {} already typed as {}, ignoring {}",
                id, existing, ty
            );
            return;
        }
        self.types.insert(id, ty);
    }

    pub fn get(&self, id: NodeId) -> Option<PrimitiveType> {
        self.types.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.types.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, PrimitiveType)> + '_ {
        self.types.iter().map(|(id, ty)| (*id, *ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Ast;

    #[test]
    fn write_once() {
        let mut ast = Ast::new();
        let id = ast.int_literal(1);
        let mut types = TypeMap::new();

        types.insert(id, PrimitiveType::Int);
        types.insert(id, PrimitiveType::Error);

        assert_eq!(types.get(id), Some(PrimitiveType::Int));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn from_type_name() {
        assert_eq!(PrimitiveType::from(TypeName::Bool), PrimitiveType::Bool);
        assert_eq!(PrimitiveType::String.to_string(), "String");
    }
}
