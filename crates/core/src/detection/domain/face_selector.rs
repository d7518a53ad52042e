use crate::shared::region::Region;

/// Picks the candidate to classify: the region with the largest area.
///
/// Ties keep the earliest candidate, so the choice is stable for a given
/// detector output order. Pure function; no state carries across frames.
pub fn select_primary(candidates: &[Region]) -> Option<&Region> {
    let mut best: Option<&Region> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.area() <= current.area() => {}
            _ => best = Some(candidate),
        }
    }
    best
}
