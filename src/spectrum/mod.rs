//! Regulatory band classification and 802.11 channelization.
//!
//! Bands are half-open `[low, high)` intervals scanned in ascending order;
//! the first interval containing the frequency wins, and frequencies outside
//! every interval are simply uncategorized (the map renderer styles those
//! neutrally, it is not an error). Channel numbers come from fixed
//! center-frequency tables keyed by channel width.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub name: &'static str,
    pub low_mhz: f64,
    pub high_mhz: f64,
}

impl Band {
    const fn new(low_mhz: f64, high_mhz: f64, name: &'static str) -> Self {
        Self {
            name,
            low_mhz,
            high_mhz,
        }
    }

    pub fn contains(&self, freq_mhz: f64) -> bool {
        freq_mhz >= self.low_mhz && freq_mhz < self.high_mhz
    }

    /// True for the U-NII sub-bands (anything in 5150..7125 MHz).
    pub fn is_5ghz(&self) -> bool {
        self.low_mhz >= 5150.0 && self.high_mhz <= 7125.0
    }
}

pub const BANDS: &[Band] = &[
    Band::new(2400.0, 2495.0, "ISM"),
    Band::new(5150.0, 5250.0, "U-NII-1"),
    Band::new(5250.0, 5350.0, "U-NII-2A"),
    Band::new(5350.0, 5470.0, "U-NII-2B"),
    Band::new(5470.0, 5725.0, "U-NII-2C"),
    Band::new(5725.0, 5850.0, "U-NII-3"),
    Band::new(5850.0, 5925.0, "U-NII-4"),
    Band::new(5925.0, 7125.0, "U-NII-5...8"),
    Band::new(58000.0, 70000.0, "Vband"),
];

/// Classify a frequency into its regulatory band, or `None` when it falls
/// outside every known interval.
pub fn classify(freq_mhz: f64) -> Option<&'static Band> {
    BANDS.iter().find(|band| band.contains(freq_mhz))
}

/// 5 GHz center-frequency → channel tables, one per channel width.
const CHANNELS_5_20: &[(f64, u16)] = &[
    (5180.0, 36),
    (5200.0, 40),
    (5220.0, 44),
    (5240.0, 48),
    (5260.0, 52),
    (5280.0, 56),
    (5300.0, 60),
    (5320.0, 64),
    (5500.0, 100),
    (5520.0, 104),
    (5540.0, 108),
    (5560.0, 112),
    (5580.0, 116),
    (5600.0, 120),
    (5620.0, 124),
    (5640.0, 128),
    (5660.0, 132),
    (5680.0, 136),
    (5700.0, 140),
    (5720.0, 144),
    (5745.0, 149),
    (5765.0, 153),
    (5785.0, 157),
    (5805.0, 161),
    (5825.0, 165),
    (5845.0, 169),
];

const CHANNELS_5_40: &[(f64, u16)] = &[
    (5190.0, 38),
    (5230.0, 46),
    (5270.0, 54),
    (5310.0, 62),
    (5350.0, 70),
    (5390.0, 78),
    (5430.0, 86),
    (5470.0, 94),
    (5510.0, 102),
    (5550.0, 110),
    (5590.0, 118),
    (5630.0, 126),
    (5670.0, 134),
    (5710.0, 142),
    (5755.0, 151),
    (5795.0, 159),
    (5835.0, 167),
    (5875.0, 175),
];

const CHANNELS_5_80: &[(f64, u16)] = &[
    (5210.0, 42),
    (5290.0, 58),
    (5370.0, 74),
    (5450.0, 90),
    (5530.0, 106),
    (5610.0, 122),
    (5690.0, 138),
    (5775.0, 155),
    (5855.0, 171),
];

const CHANNELS_5_160: &[(f64, u16)] = &[
    (5530.0, 106),
    (5610.0, 122),
    (5690.0, 138),
    (5775.0, 155),
    (5855.0, 171),
];

/// The six fixed 60 GHz (802.11ad/ay) channels.
const CHANNELS_60: &[(f64, u16)] = &[
    (58320.0, 1),
    (60480.0, 2),
    (62640.0, 3),
    (64800.0, 4),
    (66960.0, 5),
    (69120.0, 6),
];

fn table_lookup(table: &[(f64, u16)], freq_mhz: f64) -> Option<u16> {
    table
        .iter()
        .find(|&&(center, _)| center == freq_mhz)
        .map(|&(_, channel)| channel)
}

/// 5 GHz channel for a center frequency at the given channel width.
/// Combinations absent from the tables yield `None`, not an error.
pub fn channel_5(freq_mhz: f64, width_mhz: f64) -> Option<u16> {
    let table = match width_mhz as u32 {
        20 => CHANNELS_5_20,
        40 => CHANNELS_5_40,
        80 => CHANNELS_5_80,
        160 => CHANNELS_5_160,
        _ => return None,
    };
    table_lookup(table, freq_mhz)
}

/// 60 GHz channel for a center frequency; width-independent.
pub fn channel_60(freq_mhz: f64) -> Option<u16> {
    table_lookup(CHANNELS_60, freq_mhz)
}

/// Channel number for a frequency/width pair, dispatching on the band the
/// frequency classifies into. ISM and unclassified frequencies have no
/// channel mapping here.
pub fn channel(freq_mhz: f64, width_mhz: f64) -> Option<u16> {
    match classify(freq_mhz) {
        Some(band) if band.name == "Vband" => channel_60(freq_mhz),
        Some(band) if band.is_5ghz() => channel_5(freq_mhz, width_mhz),
        _ => None,
    }
}
