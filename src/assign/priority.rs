use crate::assign::Candidate;

/// Continuity class of a candidate tail, best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Leaves from where the tail last landed, both neighbours line up.
    Continuation = 1,
    /// Neighbours line up, or the tail is still idle.
    Compatible = 2,
    /// Feasible in time but at least one neighbour is at another station.
    ChainBreak = 3,
}

pub fn tier(candidate: &Candidate) -> Tier {
    match (candidate.chain.is_compatible(), candidate.continues && !candidate.idle) {
        (true, true) => Tier::Continuation,
        (true, false) => Tier::Compatible,
        (false, _) => Tier::ChainBreak,
    }
}

fn rank_key(candidate: &Candidate) -> (Tier, i64, i64) {
    let tier = tier(candidate);
    let gap = match tier {
        Tier::Continuation => candidate.gap.unwrap_or(0),
        _ => 0,
    };
    (tier, candidate.evaluation.net_cost(), gap)
}

pub fn select(candidates: &[Candidate]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| rank_key(c))
        .map(|(i, _)| i)
}
