use crate::predict::types::{EventKind, EventSeries, PassWindow};

/// Walk the detector output three events at a time and keep the triplets
/// shaped RISE, _, SET.
///
/// Anything else, typically a window truncated by the range boundary, is
/// dropped without error.
pub fn extract_passes(events: &EventSeries) -> Vec<PassWindow> {
    let kinds = &events.kinds;
    (0..kinds.len().saturating_sub(2))
        .step_by(3)
        .filter(|&i| kinds[i] == EventKind::Rise && kinds[i + 2] == EventKind::Set)
        .map(|i| PassWindow {
            rise_index: i,
            set_index: i + 2,
            rise: events.times[i],
            set: events.times[i + 2],
        })
        .collect()
}
