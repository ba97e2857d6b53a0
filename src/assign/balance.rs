use crate::assign::Candidate;
use std::cmp::Reverse;

const UTILISATION_WEIGHT: i64 = 2;
const CONTINUATION_BONUS: i64 = 500;
const CHAIN_BREAK_PENALTY: i64 = 200;
const FRESH_TAIL_BONUS: i64 = 300;
const LONG_GAP_PENALTY: i64 = 50;
const LONG_GAP_MINUTES: i64 = 360;

/// Higher is better.
pub fn score(candidate: &Candidate) -> i64 {
    let compatible = candidate.chain.is_compatible();
    let mut score = -UTILISATION_WEIGHT * candidate.assigned_minutes;
    if compatible && candidate.continues && !candidate.idle {
        score += CONTINUATION_BONUS;
    }
    if !compatible && !candidate.idle {
        score -= CHAIN_BREAK_PENALTY;
    }
    if candidate.assigned_legs == 0 {
        score += FRESH_TAIL_BONUS;
    }
    if candidate.gap.map_or(false, |gap| gap > LONG_GAP_MINUTES) {
        score -= LONG_GAP_PENALTY;
    }
    score - candidate.evaluation.soft_penalty + candidate.evaluation.bonus
}

pub fn select(candidates: &[Candidate]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| Reverse(score(c)))
        .map(|(i, _)| i)
}
