/// Interleaves a front-side scan with a back-side scan of the flipped stack.
///
/// Sheet `i` is `fronts[i]` followed by `backs[backs.len() - 1 - i]`. Unpaired fronts
/// follow in scan order; unpaired backs continue the reversal. Count mismatches are
/// not corrected.
pub fn duplex_order<T: Clone>(fronts: &[T], backs: &[T]) -> Vec<T> {
    let paired = fronts.len().min(backs.len());
    let mut merged = Vec::with_capacity(fronts.len() + backs.len());

    for index in 0..paired {
        merged.push(fronts[index].clone());
        merged.push(backs[backs.len() - 1 - index].clone());
    }

    merged.extend(fronts.iter().skip(paired).cloned());
    merged.extend(backs.iter().rev().skip(paired).cloned());
    merged
}
