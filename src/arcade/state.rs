use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TractionRegime {
    #[default]
    Grip,
    Drift,
}

/// Pure function of (slip angle, speed); there is no recovery band, so the
/// regime can flip every tick right at the threshold. Ties go to Grip.
pub fn classify_regime(
    angle_deg: f32,
    speed: f32,
    angle_threshold_deg: f32,
    min_drift_speed: f32,
) -> TractionRegime {
    if angle_deg > angle_threshold_deg && speed > min_drift_speed {
        TractionRegime::Drift
    } else {
        TractionRegime::Grip
    }
}

/// Tracks the regime across ticks so callers can react to transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeTracker {
    pub current: TractionRegime,
    pub transitions: u64,
}

impl RegimeTracker {
    /// Record this tick's regime. Returns the previous one when it changed.
    pub fn observe(&mut self, next: TractionRegime) -> Option<TractionRegime> {
        let prev = self.current;
        self.current = next;
        if prev != next {
            self.transitions += 1;
            Some(prev)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_ties_go_to_grip() {
        assert_eq!(classify_regime(10.0, 20.0, 10.0, 5.0), TractionRegime::Grip);
        assert_eq!(classify_regime(30.0, 5.0, 10.0, 5.0), TractionRegime::Grip);
        assert_eq!(classify_regime(10.01, 5.01, 10.0, 5.0), TractionRegime::Drift);
    }

    #[test]
    fn tracker_counts_flips() {
        let mut t = RegimeTracker::default();
        assert_eq!(t.observe(TractionRegime::Grip), None);
        assert_eq!(t.observe(TractionRegime::Drift), Some(TractionRegime::Grip));
        assert_eq!(t.observe(TractionRegime::Grip), Some(TractionRegime::Drift));
        assert_eq!(t.transitions, 2);
    }
}
