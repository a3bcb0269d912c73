use crate::types::Type;

/// Kind of one layer of a [`TypeExpansion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    List,
    Map,
    Terminal,
}

/// A declared type unwrapped through its List/Map layers: `List<Map<int>>`
/// expands to `[List<Map<int>>, Map<int>, int]`.
///
/// Codecs, deep copy and equality all walk the same expansion, indexed by
/// depth, so their nesting never disagrees.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpansion<'a> {
    layers: Vec<&'a Type>,
}

impl<'a> TypeExpansion<'a> {
    /// Type at `depth`; depth 0 is the declared type.
    pub fn at(&self, depth: usize) -> &'a Type {
        self.layers[depth.min(self.layers.len() - 1)]
    }

    pub fn kind(&self, depth: usize) -> LayerKind {
        match self.at(depth) {
            Type::List(_) => LayerKind::List,
            Type::Map(_) => LayerKind::Map,
            _ => LayerKind::Terminal,
        }
    }

    pub fn terminal(&self) -> &'a Type {
        self.at(self.layers.len() - 1)
    }

    /// Number of container layers.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[&'a Type] {
        &self.layers
    }
}

pub fn expand(ty: &Type) -> TypeExpansion<'_> {
    let mut layers = vec![ty];
    let mut current = ty;
    while let Some(inner) = current.element() {
        layers.push(inner);
        current = inner;
    }
    TypeExpansion { layers }
}
