//! Positional pairing of two record streams with an explicit length policy.

use std::fmt;

use neuralsearch_core::types::AlignmentPolicy;
use neuralsearch_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Documents,
    Vectors,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Documents => f.write_str("documents"),
            Side::Vectors => f.write_str("vectors"),
        }
    }
}

/// Records left over on the longer stream once the shorter one ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentWarning {
    pub side: Side,
    pub unmatched: usize,
}

impl fmt::Display for AlignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unmatched {} ignored", self.unmatched, self.side)
    }
}

/// Zips a document stream with a vector stream.
///
/// Under `Truncate` pairing stops at the shorter stream and the remainder is
/// exposed through [`Aligned::warning`]. Under `Strict` a length difference
/// yields one final `Error::Alignment`. An I/O error on either side ends
/// iteration after being yielded.
pub struct Aligned<D, V> {
    docs: D,
    vecs: V,
    policy: AlignmentPolicy,
    paired: usize,
    warning: Option<AlignmentWarning>,
    done: bool,
}

impl<D, V> Aligned<D, V> {
    pub fn new(docs: D, vecs: V, policy: AlignmentPolicy) -> Self {
        Self { docs, vecs, policy, paired: 0, warning: None, done: false }
    }

    pub fn paired(&self) -> usize { self.paired }

    pub fn warning(&self) -> Option<AlignmentWarning> { self.warning }
}

impl<A, B, D, V> Aligned<D, V>
where
    D: Iterator<Item = Result<A>>,
    V: Iterator<Item = Result<B>>,
{
    fn mismatch(&mut self, side: Side, unmatched: usize) -> Option<Result<(A, B)>> {
        self.done = true;
        match self.policy {
            AlignmentPolicy::Truncate => {
                self.warning = Some(AlignmentWarning { side, unmatched });
                None
            }
            AlignmentPolicy::Strict => {
                let (documents, vectors) = match side {
                    Side::Documents => (self.paired + unmatched, self.paired),
                    Side::Vectors => (self.paired, self.paired + unmatched),
                };
                Some(Err(Error::Alignment { documents, vectors }))
            }
        }
    }
}

impl<A, B, D, V> Iterator for Aligned<D, V>
where
    D: Iterator<Item = Result<A>>,
    V: Iterator<Item = Result<B>>,
{
    type Item = Result<(A, B)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done { return None; }
        match (self.docs.next(), self.vecs.next()) {
            (Some(Ok(a)), Some(Ok(b))) => {
                self.paired += 1;
                Some(Ok((a, b)))
            }
            (Some(Err(e)), _) | (_, Some(Err(e))) => {
                self.done = true;
                Some(Err(e))
            }
            (None, None) => {
                self.done = true;
                None
            }
            (Some(Ok(_)), None) => {
                let rest = 1 + self.docs.by_ref().count();
                self.mismatch(Side::Documents, rest)
            }
            (None, Some(Ok(_))) => {
                let rest = 1 + self.vecs.by_ref().count();
                self.mismatch(Side::Vectors, rest)
            }
        }
    }
}
