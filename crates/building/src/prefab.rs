//! Weighted prefab variant selection.

use rand::Rng;

use crate::objects::PrefabVariant;

/// Pick a variant with probability proportional to its weight.
///
/// Draws uniformly from `[0, total)` and scans cumulative weights. Negative
/// and non-finite weights count as zero. Returns `None` when the total
/// weight is zero, including an empty list.
pub fn select_variant<'a, R: Rng + ?Sized>(
    variants: &'a [PrefabVariant],
    rng: &mut R,
) -> Option<&'a PrefabVariant> {
    let weight = |v: &PrefabVariant| {
        if v.weight.is_finite() {
            v.weight.max(0.0)
        } else {
            0.0
        }
    };
    let total: f32 = variants.iter().map(weight).sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for variant in variants {
        cumulative += weight(variant);
        if roll < cumulative {
            return Some(variant);
        }
    }
    // Float accumulation can leave `roll` just above the final sum.
    variants.iter().rev().find(|v| weight(v) > 0.0)
}

/// Explicit variant choice by index, bypassing the weights.
pub fn variant_by_index(variants: &[PrefabVariant], index: usize) -> Option<&PrefabVariant> {
    variants.get(index)
}
