//! # Coupling Product
//!
//! Clebsch–Gordan tensor product of two spherical tensors.
//!
//! ## Layout
//!
//! Pairs `(entry of a, entry of b)` are visited with `a` outer and `b` inner.
//! Each pair `(L1, L2)` feeds every `L_out` in `|L1-L2|..=L1+L2` with
//! `mul1 × mul2` copies. The output list has one entry per `L_out`,
//! ascending. Inside an entry, copies follow pair order, then the copy index
//! of `a`, then the copy index of `b`.

use std::collections::BTreeMap;

use e3sym_core::{E3Error, Irrep, Rs, MAX_DEGREE};

use crate::clebsch_gordan::CouplingCache;
use crate::spherical::SphericalTensor;

/// Representation list of `a.couple(b)`.
///
/// # Errors
///
/// [`E3Error::InvalidDegree`] when an output degree would exceed
/// [`MAX_DEGREE`].
pub fn coupled_rs(a: &Rs, b: &Rs) -> Result<Rs, E3Error> {
    let totals = output_multiplicities(a, b)?;
    Rs::new(totals.into_iter().filter(|(_, mul)| *mul > 0).map(|(l, mul)| (mul, l)))
}

fn output_multiplicities(a: &Rs, b: &Rs) -> Result<BTreeMap<u32, usize>, E3Error> {
    let mut totals = BTreeMap::new();
    for ia in a.irreps() {
        for ib in b.irreps() {
            let top = ia.l() + ib.l();
            if top > MAX_DEGREE {
                return Err(E3Error::InvalidDegree(format!(
                    "coupling {ia} with {ib} reaches degree {top}, above {MAX_DEGREE}"
                )));
            }
            for l in ia.l().abs_diff(ib.l())..=top {
                *totals.entry(l).or_insert(0) += ia.mul() * ib.mul();
            }
        }
    }
    Ok(totals)
}

/// Start offset of every entry of `rs` in its signal.
fn entry_offsets(rs: &Rs) -> Vec<usize> {
    rs.irreps()
        .iter()
        .scan(0, |offset, ir| {
            let start = *offset;
            *offset += ir.dim();
            Some(start)
        })
        .collect()
}

impl SphericalTensor {
    /// Clebsch–Gordan tensor product `a ⊗ b`.
    ///
    /// The result carries the coarser of the two precisions. Coupling paths
    /// are built once per call and shared by every copy that uses them.
    ///
    /// # Errors
    ///
    /// [`E3Error::InvalidDegree`] when an output degree would exceed
    /// [`MAX_DEGREE`].
    pub fn couple(&self, other: &Self) -> Result<Self, E3Error> {
        let (a_rs, b_rs) = (self.rs(), other.rs());
        let totals = output_multiplicities(a_rs, b_rs)?;

        // Offset of each output entry and the next free copy in it.
        let mut base = BTreeMap::new();
        let mut offset = 0;
        for (&l, &mul) in totals.iter().filter(|(_, mul)| **mul > 0) {
            base.insert(l, (offset, 0_usize));
            offset += mul * Irrep::new(1, l)?.block_dim();
        }
        let rs = coupled_rs(a_rs, b_rs)?;
        let mut signal = vec![0.0; rs.dim()];

        let a_offsets = entry_offsets(a_rs);
        let b_offsets = entry_offsets(b_rs);
        let mut cache = CouplingCache::new();
        for (ia, a_start) in a_rs.irreps().iter().zip(&a_offsets) {
            for (ib, b_start) in b_rs.irreps().iter().zip(&b_offsets) {
                let (l1, l2) = (ia.l(), ib.l());
                for l3 in l1.abs_diff(l2)..=l1 + l2 {
                    let d3 = 2 * l3 as usize + 1;
                    let Some(cg) = cache.get(l1, l2, l3) else {
                        continue;
                    };
                    let Some((out_start, next)) = base.get_mut(&l3) else {
                        continue;
                    };
                    for u in 0..ia.mul() {
                        let a_block = &self.signal()
                            [a_start + u * ia.block_dim()..a_start + (u + 1) * ia.block_dim()];
                        for v in 0..ib.mul() {
                            let b_block = &other.signal()
                                [b_start + v * ib.block_dim()..b_start + (v + 1) * ib.block_dim()];
                            let o = *out_start + *next * d3;
                            cg.contract_into(a_block, b_block, &mut signal[o..o + d3]);
                            *next += 1;
                        }
                    }
                }
            }
        }
        tracing::debug!(
            left = %a_rs,
            right = %b_rs,
            output = %rs,
            paths = cache.len(),
            "coupled spherical tensors"
        );
        Self::with_precision(signal, rs, self.precision().coarser(other.precision()))
    }
}
