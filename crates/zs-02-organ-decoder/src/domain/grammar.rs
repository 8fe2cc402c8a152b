//! # Organ Identifier Grammar
//!
//! ```text
//! federal  = "0.0." postfix            (chairperson, soviet, congress)
//! regional = region "." postfix
//! local    = region "." number "." postfix
//! region   = two-digit code, "00".."99" without "20" and "91"
//! number   = 0 .. scan_organ_size
//! ```
//!
//! On-chain organ hashes are keccak-256 over the UTF-8 bytes of these strings.

use std::fmt;

/// Region codes in use. `20` and `91` are reserved.
pub const REGION_CODES: [&str; 98] = [
    "00", "01", "02", "03", "04", "05", "06", "07", "08", "09", //
    "10", "11", "12", "13", "14", "15", "16", "17", "18", "19", //
    "21", "22", "23", "24", "25", "26", "27", "28", "29", "30", //
    "31", "32", "33", "34", "35", "36", "37", "38", "39", "40", //
    "41", "42", "43", "44", "45", "46", "47", "48", "49", "50", //
    "51", "52", "53", "54", "55", "56", "57", "58", "59", "60", //
    "61", "62", "63", "64", "65", "66", "67", "68", "69", "70", //
    "71", "72", "73", "74", "75", "76", "77", "78", "79", "80", //
    "81", "82", "83", "84", "85", "86", "87", "88", "89", "90", //
    "92", "93", "94", "95", "96", "97", "98", "99",
];

/// Organ kind suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Postfix {
    Congress,
    Soviet,
    Chairperson,
    GeneralAssembly,
    Conference,
}

impl Postfix {
    pub const ALL: [Postfix; 5] = [
        Postfix::Congress,
        Postfix::Soviet,
        Postfix::Chairperson,
        Postfix::GeneralAssembly,
        Postfix::Conference,
    ];

    /// Postfixes of the three fixed federal organs.
    pub const FEDERAL: [Postfix; 3] = [Postfix::Chairperson, Postfix::Soviet, Postfix::Congress];

    pub fn token(self) -> &'static str {
        match self {
            Postfix::Congress => "СЗД",
            Postfix::Soviet => "СОВ",
            Postfix::Chairperson => "ПРЛ",
            Postfix::GeneralAssembly => "ОБС",
            Postfix::Conference => "КОН",
        }
    }
}

/// A well-formed organ identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrganIdentifier {
    Federal { postfix: Postfix },
    Regional { region: &'static str, postfix: Postfix },
    Local {
        region: &'static str,
        number: u32,
        postfix: Postfix,
    },
}

impl fmt::Display for OrganIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrganIdentifier::Federal { postfix } => write!(f, "0.0.{}", postfix.token()),
            OrganIdentifier::Regional { region, postfix } => write!(f, "{}.{}", region, postfix.token()),
            OrganIdentifier::Local {
                region,
                number,
                postfix,
            } => write!(f, "{}.{}.{}", region, number, postfix.token()),
        }
    }
}

/// Every identifier of the grammar for the given local-number bound.
pub fn enumerate(scan_organ_size: u32) -> impl Iterator<Item = OrganIdentifier> {
    let federal = Postfix::FEDERAL
        .into_iter()
        .map(|postfix| OrganIdentifier::Federal { postfix });

    let regional = REGION_CODES.into_iter().flat_map(|region| {
        Postfix::ALL
            .into_iter()
            .map(move |postfix| OrganIdentifier::Regional { region, postfix })
    });

    let local = REGION_CODES.into_iter().flat_map(move |region| {
        (0..scan_organ_size).flat_map(move |number| {
            Postfix::ALL.into_iter().map(move |postfix| OrganIdentifier::Local {
                region,
                number,
                postfix,
            })
        })
    });

    federal.chain(regional).chain(local)
}

/// Alternative spellings of the federal organs used by other clients: the
/// bare postfix and `0.0` directly followed by the postfix.
pub fn legacy_federal_spellings() -> impl Iterator<Item = String> {
    Postfix::FEDERAL
        .into_iter()
        .flat_map(|p| [p.token().to_string(), format!("0.0{}", p.token())])
}

/// Number of grammar identifiers for the given bound.
pub fn grammar_size(scan_organ_size: u32) -> usize {
    let regions = REGION_CODES.len();
    let postfixes = Postfix::ALL.len();
    Postfix::FEDERAL.len() + regions * postfixes + regions * scan_organ_size as usize * postfixes
}
