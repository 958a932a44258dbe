//! Index newtypes for mesh nodes, triangles and vertical layers.
//!
//! The solver stores everything in flat vectors; these wrappers keep node
//! numbers, element numbers and layer numbers from being swapped at API
//! boundaries. Inner loops work on plain `usize`.

use std::fmt;

macro_rules! index_newtype {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Iterate over `[0, n)`.
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }
    };
}

index_newtype!(
    /// Mesh node (triangle vertex) number.
    ///
    /// ```
    /// use tidal_fe::types::NodeIndex;
    ///
    /// let node = NodeIndex::new(3);
    /// assert_eq!(node.to_string(), "N3");
    /// ```
    NodeIndex,
    "N"
);

index_newtype!(
    /// Triangle number.
    ElementIndex,
    "E"
);

index_newtype!(
    /// Vertical layer number, counted from the surface downward.
    LayerIndex,
    "L"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(NodeIndex::new(4).to_string(), "N4");
        assert_eq!(ElementIndex::new(0).to_string(), "E0");
        assert_eq!(LayerIndex::new(2).to_string(), "L2");
    }

    #[test]
    fn test_index_vec() {
        let depths = vec![1.0, 2.0, 3.0];
        assert_eq!(depths[NodeIndex::new(2)], 3.0);
        let layers: Vec<_> = LayerIndex::iter(3).collect();
        assert_eq!(layers.last().map(|l| l.get()), Some(2));
    }
}
