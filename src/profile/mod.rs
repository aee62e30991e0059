//! Default RF characteristics for known radio hardware.
//!
//! Management APIs report beamwidths only for some device families, so the
//! planner falls back to datasheet figures keyed off the model string (and,
//! where the attached reflector changes the pattern, the antenna subtype
//! string). Rules are checked in order and the first match wins, which lets
//! reflector-specific rows shadow the generic row for the same radio.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntennaProfile {
    pub beamwidth_h_deg: f64,
    pub beamwidth_v_deg: f64,
    pub range_m: f64,
}

impl AntennaProfile {
    const fn new(beamwidth_h_deg: f64, beamwidth_v_deg: f64, range_m: f64) -> Self {
        Self {
            beamwidth_h_deg,
            beamwidth_v_deg,
            range_m,
        }
    }
}

/// Fallback for models absent from the table: a generic 60°/15° sector
/// usable out to 5 km.
pub const DEFAULT_PROFILE: AntennaProfile = AntennaProfile::new(60.0, 15.0, 5000.0);

struct ProfileRule {
    /// Substrings that must all appear in the lowercased model string.
    model: &'static [&'static str],
    /// Substring of the lowercased antenna subtype, for radios whose
    /// pattern is set by the attached reflector.
    antenna: Option<&'static str>,
    profile: AntennaProfile,
}

impl ProfileRule {
    fn matches(&self, model: &str, antenna: &str) -> bool {
        self.model.iter().all(|needle| model.contains(needle))
            && self.antenna.is_none_or(|needle| antenna.contains(needle))
    }
}

const PROFILE_TABLE: &[ProfileRule] = &[
    // Rocket 5AC / Rocket Prism 5AC with the AMO-5G10 omni reflector.
    ProfileRule {
        model: &["r5ac"],
        antenna: Some("amo-5g10"),
        profile: AntennaProfile::new(360.0, 12.0, 750.0),
    },
    ProfileRule {
        model: &["rp-5ac"],
        antenna: Some("amo-5g10"),
        profile: AntennaProfile::new(360.0, 12.0, 750.0),
    },
    // Rocket 5AC family on any other reflector.
    ProfileRule {
        model: &["r5ac"],
        antenna: None,
        profile: AntennaProfile::new(60.0, 15.0, 3000.0),
    },
    ProfileRule {
        model: &["rp-5ac"],
        antenna: None,
        profile: AntennaProfile::new(60.0, 15.0, 3000.0),
    },
    // PrismStation 5AC, horn or standard.
    ProfileRule {
        model: &["ps-5ac"],
        antenna: None,
        profile: AntennaProfile::new(60.0, 15.0, 3000.0),
    },
    // LiteAP GPS access point.
    ProfileRule {
        model: &["lap-gps"],
        antenna: None,
        profile: AntennaProfile::new(90.0, 20.0, 2000.0),
    },
    // AirMax AC sectors, then older AirMax models.
    ProfileRule {
        model: &["airmax", "ac"],
        antenna: None,
        profile: AntennaProfile::new(90.0, 7.0, 5000.0),
    },
    ProfileRule {
        model: &["airmax"],
        antenna: None,
        profile: AntennaProfile::new(60.0, 12.0, 5000.0),
    },
    ProfileRule {
        model: &["litemax"],
        antenna: None,
        profile: AntennaProfile::new(120.0, 10.0, 5000.0),
    },
    // PowerBeam point-to-point dishes.
    ProfileRule {
        model: &["powerbeam"],
        antenna: None,
        profile: AntennaProfile::new(30.0, 30.0, 5000.0),
    },
    // Wave AP Micro must be checked before the plain Wave AP sector.
    ProfileRule {
        model: &["wave-ap", "micro"],
        antenna: None,
        profile: AntennaProfile::new(90.0, 30.0, 6000.0),
    },
    ProfileRule {
        model: &["wave-ap"],
        antenna: None,
        profile: AntennaProfile::new(30.0, 3.0, 8000.0),
    },
    ProfileRule {
        model: &["wave-pro"],
        antenna: None,
        profile: AntennaProfile::new(1.3, 1.3, 15000.0),
    },
    ProfileRule {
        model: &["wave-lr"],
        antenna: None,
        profile: AntennaProfile::new(60.0, 15.0, 12000.0),
    },
    // AirFiber 60 GHz pencil beam.
    ProfileRule {
        model: &["af60"],
        antenna: None,
        profile: AntennaProfile::new(1.6, 1.6, 12000.0),
    },
];

/// Resolve the profile for a device by case-insensitive substring match
/// against the rule table. Unknown hardware gets [`DEFAULT_PROFILE`].
pub fn resolve_profile(model: &str, antenna: &str) -> AntennaProfile {
    let model = model.to_lowercase();
    let antenna = antenna.to_lowercase();
    PROFILE_TABLE
        .iter()
        .find(|rule| rule.matches(&model, &antenna))
        .map(|rule| rule.profile)
        .unwrap_or(DEFAULT_PROFILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflector_row_shadows_generic_rocket_row() {
        let with_omni = resolve_profile("R5AC-Lite", "AMO-5G10");
        assert_eq!(with_omni.beamwidth_h_deg, 360.0);
        assert_eq!(with_omni.range_m, 750.0);

        let bare = resolve_profile("R5AC-Lite", "AM-5G19-120");
        assert_eq!(bare.beamwidth_h_deg, 60.0);
        assert_eq!(bare.range_m, 3000.0);
    }

    #[test]
    fn either_rocket_prefix_matches() {
        let prism = resolve_profile("RP-5AC-Gen2", "");
        assert_eq!(prism.range_m, 3000.0);

        let prism_omni = resolve_profile("RP-5AC-Gen2", "amo-5g10");
        assert_eq!(prism_omni.range_m, 750.0);
    }

    #[test]
    fn airmax_ac_beats_plain_airmax() {
        let ac = resolve_profile("AirMax AC Sector", "");
        assert_eq!((ac.beamwidth_h_deg, ac.beamwidth_v_deg), (90.0, 7.0));

        let legacy = resolve_profile("AirMax M5", "");
        assert_eq!((legacy.beamwidth_h_deg, legacy.beamwidth_v_deg), (60.0, 12.0));
    }

    #[test]
    fn wave_micro_beats_plain_wave_ap() {
        let micro = resolve_profile("Wave-AP-Micro", "");
        assert_eq!(micro.beamwidth_h_deg, 90.0);
        assert_eq!(micro.range_m, 6000.0);

        let sector = resolve_profile("Wave-AP", "");
        assert_eq!(sector.beamwidth_h_deg, 30.0);
        assert_eq!(sector.range_m, 8000.0);
    }

    #[test]
    fn narrow_beam_hardware() {
        assert_eq!(resolve_profile("Wave-Pro", "").beamwidth_h_deg, 1.3);
        assert_eq!(resolve_profile("AF60-LR", "").beamwidth_h_deg, 1.6);
        assert_eq!(resolve_profile("AF60-LR", "").range_m, 12000.0);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        assert_eq!(resolve_profile("NanoStation M2", ""), DEFAULT_PROFILE);
        assert_eq!(resolve_profile("", ""), DEFAULT_PROFILE);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(resolve_profile("POWERBEAM-5AC", "").beamwidth_h_deg, 30.0);
        assert_eq!(resolve_profile("LiteMax Sector", "").beamwidth_h_deg, 120.0);
        assert_eq!(resolve_profile("lap-gps", "").range_m, 2000.0);
    }
}
