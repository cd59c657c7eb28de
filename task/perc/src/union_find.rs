use crate::{Error, Result};

////////////////////////////////////////////////////////////////////////////////

/// Weighted quick-union over a fixed universe of elements `0..len`.
///
/// Components are merged by size, so trees stay logarithmic in height even
/// without path compression. Mutating lookups additionally halve paths.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
    count: usize,
}

impl UnionFind {
    /// Creates `len` singleton components.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
            count: len,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the number of components.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the representative of the component containing `element`.
    ///
    /// Does not touch the structure, so it can be used behind a shared
    /// reference.
    pub fn find(&self, element: usize) -> Result<usize> {
        self.validate(element)?;

        let mut root = element;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        Ok(root)
    }

    /// Same as [`find`](Self::find), but halves the path on the way up.
    pub fn find_mut(&mut self, element: usize) -> Result<usize> {
        self.validate(element)?;

        let mut current = element;
        while self.parent[current] != current {
            let grandparent = self.parent[self.parent[current]];
            self.parent[current] = grandparent;
            current = grandparent;
        }

        Ok(current)
    }

    /// Merges the components of `a` and `b`. The smaller tree is attached
    /// under the root of the larger one; ties go to `b`'s root.
    pub fn union(&mut self, a: usize, b: usize) -> Result<()> {
        let root_a = self.find_mut(a)?;
        let root_b = self.find_mut(b)?;
        if root_a == root_b {
            return Ok(());
        }

        let (child, root) = if self.size[root_a] < self.size[root_b] {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[child] = root;
        self.size[root] += self.size[child];
        self.count -= 1;

        Ok(())
    }

    pub fn connected(&self, a: usize, b: usize) -> Result<bool> {
        Ok(self.find(a)? == self.find(b)?)
    }

    fn validate(&self, element: usize) -> Result<()> {
        if element < self.len() {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                index: element,
                len: self.len(),
            })
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
