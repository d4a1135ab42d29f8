//! # Representation Lists
//!
//! An [`Rs`] is an ordered list of `(multiplicity, degree)` pairs describing
//! how a signal is cut into blocks. Degree `L` contributes `2L+1` real
//! coefficients, ordered `m = -L..=L`.
//!
//! ## Invariant
//!
//! Every degree is `<= MAX_DEGREE`. Negative entries cannot be represented;
//! the signed constructor [`Rs::from_signed`] (also used by serde) rejects
//! them with [`E3Error::InvalidDegree`].

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::E3Error;

/// Largest supported degree. Clebsch–Gordan coefficients involve
/// `(L1 + L2 + L3 + 1)!`, which must stay finite in `f64`.
pub const MAX_DEGREE: u32 = 40;

/// Validate a signed degree from user input (e.g. a requested `lmax`).
///
/// # Errors
///
/// [`E3Error::InvalidDegree`] when `l` is negative or above [`MAX_DEGREE`].
pub fn checked_degree(l: i64) -> Result<u32, E3Error> {
    if l < 0 {
        return Err(E3Error::InvalidDegree(format!("degree {l} is negative")));
    }
    match u32::try_from(l) {
        Ok(l) if l <= MAX_DEGREE => Ok(l),
        _ => Err(E3Error::InvalidDegree(format!(
            "degree {l} exceeds the supported maximum {MAX_DEGREE}"
        ))),
    }
}

/// One `(multiplicity, degree)` entry of a representation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Irrep {
    mul: usize,
    l: u32,
}

impl Irrep {
    /// Create an entry, rejecting degrees above [`MAX_DEGREE`].
    pub fn new(mul: usize, l: u32) -> Result<Self, E3Error> {
        if l > MAX_DEGREE {
            return Err(E3Error::InvalidDegree(format!(
                "degree {l} exceeds the supported maximum {MAX_DEGREE}"
            )));
        }
        Ok(Self { mul, l })
    }

    /// Number of copies of this degree.
    pub fn mul(&self) -> usize {
        self.mul
    }

    /// Angular-momentum degree.
    pub fn l(&self) -> u32 {
        self.l
    }

    /// Coefficients in one copy: `2L+1`.
    pub fn block_dim(&self) -> usize {
        2 * self.l as usize + 1
    }

    /// Coefficients in all copies.
    pub fn dim(&self) -> usize {
        self.mul * self.block_dim()
    }
}

impl fmt::Display for Irrep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.mul, self.l)
    }
}

/// A single `2L+1` slice of a signal: one copy of one [`Irrep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Index of the owning entry in the representation list.
    pub irrep_index: usize,
    /// Copy index within the entry's multiplicity.
    pub copy: usize,
    /// Degree of the block.
    pub l: u32,
    /// Offset of the block's first coefficient in the signal.
    pub offset: usize,
}

impl Block {
    /// Number of coefficients (`2L+1`).
    pub fn len(&self) -> usize {
        2 * self.l as usize + 1
    }

    /// Always false; a block holds at least one coefficient.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index range of the block within the signal.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len()
    }
}

/// Ordered representation list.
///
/// Serializes as a list of pairs, e.g. `[[1,0],[1,1],[2,2]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<(i64, i64)>", into = "Vec<(i64, i64)>")]
pub struct Rs(Vec<Irrep>);

impl Rs {
    /// Build from unsigned `(multiplicity, degree)` pairs.
    pub fn new(entries: impl IntoIterator<Item = (usize, u32)>) -> Result<Self, E3Error> {
        entries
            .into_iter()
            .map(|(mul, l)| Irrep::new(mul, l))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Build from signed pairs, as found in user input.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidDegree`] for a negative multiplicity or degree, or a
    /// degree above [`MAX_DEGREE`].
    pub fn from_signed(entries: &[(i64, i64)]) -> Result<Self, E3Error> {
        let mut irreps = Vec::with_capacity(entries.len());
        for &(mul, l) in entries {
            if mul < 0 || l < 0 {
                return Err(E3Error::InvalidDegree(format!(
                    "representation entry ({mul}, {l}) has a negative multiplicity or degree"
                )));
            }
            let l = checked_degree(l)?;
            let mul = usize::try_from(mul)
                .map_err(|_| E3Error::InvalidDegree(format!("multiplicity {mul} is too large")))?;
            irreps.push(Irrep::new(mul, l)?);
        }
        Ok(Self(irreps))
    }

    /// `[(1, 0), (1, 1), ..., (1, lmax)]`, the layout produced by geometry
    /// projection.
    pub fn spherical(lmax: u32) -> Result<Self, E3Error> {
        Self::new((0..=lmax).map(|l| (1, l)))
    }

    /// The entries in order.
    pub fn irreps(&self) -> &[Irrep] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total coefficient count: Σ `mul × (2L+1)`.
    pub fn dim(&self) -> usize {
        self.0.iter().map(Irrep::dim).sum()
    }

    /// Largest degree with a non-zero multiplicity.
    pub fn lmax(&self) -> Option<u32> {
        self.0.iter().filter(|ir| ir.mul > 0).map(|ir| ir.l).max()
    }

    /// Every `2L+1` block of a matching signal, in signal order.
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        let mut offset = 0;
        self.0.iter().enumerate().flat_map(move |(irrep_index, ir)| {
            let start = offset;
            offset += ir.dim();
            let step = ir.block_dim();
            let l = ir.l;
            (0..ir.mul).map(move |copy| Block {
                irrep_index,
                copy,
                l,
                offset: start + copy * step,
            })
        })
    }

    /// Drop zero multiplicities and merge adjacent entries of equal degree.
    ///
    /// The signal layout is unchanged by this operation.
    pub fn simplify(&self) -> Self {
        let mut out: Vec<Irrep> = Vec::with_capacity(self.0.len());
        for ir in self.0.iter().filter(|ir| ir.mul > 0) {
            match out.last_mut() {
                Some(last) if last.l == ir.l => last.mul += ir.mul,
                _ => out.push(*ir),
            }
        }
        Self(out)
    }

    /// `Some(lmax)` when the list is exactly `[(1,0), ..., (1,lmax)]`.
    pub fn spherical_lmax(&self) -> Option<u32> {
        let spherical = self
            .0
            .iter()
            .enumerate()
            .all(|(i, ir)| ir.mul == 1 && ir.l as usize == i);
        if spherical && !self.0.is_empty() {
            self.lmax()
        } else {
            None
        }
    }

    /// True when the list is `[(1,0), ..., (1,lmax)]` for some `lmax`.
    pub fn is_spherical(&self) -> bool {
        self.spherical_lmax().is_some()
    }

    /// Entries as plain pairs.
    pub fn to_pairs(&self) -> Vec<(usize, u32)> {
        self.0.iter().map(|ir| (ir.mul, ir.l)).collect()
    }
}

impl fmt::Display for Rs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("0");
        }
        for (i, ir) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{ir}")?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<(i64, i64)>> for Rs {
    type Error = E3Error;

    fn try_from(entries: Vec<(i64, i64)>) -> Result<Self, Self::Error> {
        Self::from_signed(&entries)
    }
}

impl From<Rs> for Vec<(i64, i64)> {
    fn from(rs: Rs) -> Self {
        rs.0.iter().map(|ir| (ir.mul as i64, i64::from(ir.l))).collect()
    }
}
