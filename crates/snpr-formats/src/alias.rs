//! Legacy mitochondrial marker names and their dbSNP identifiers.
//!
//! IYG exports name mitochondrial calls by mutation (`MT-T3027C`); the
//! catalog keys them by rs id.

const MT_ALIASES: &[(&str, &str)] = &[
  ("MT-T3027C", "rs199838004"),
  ("MT-T4336C", "rs41456348"),
  ("MT-G4580A", "rs28357975"),
  ("MT-T5004C", "rs41419549"),
  ("MT-C5178A", "rs28357984"),
  ("MT-A5390G", "rs41333444"),
  ("MT-C6371T", "rs41366755"),
  ("MT-G8697A", "rs28358886"),
  ("MT-G9477A", "rs2853825"),
  ("MT-G10310A", "rs41467651"),
  ("MT-A10550G", "rs28358280"),
  ("MT-C10873T", "rs2857284"),
  ("MT-C11332T", "rs55714831"),
  ("MT-A11947G", "rs28359168"),
  ("MT-A12308G", "rs2853498"),
  ("MT-A12612G", "rs28359172"),
  ("MT-T14318C", "rs28357675"),
  ("MT-T14766C", "rs3135031"),
  ("MT-T14783C", "rs28357680"),
];

/// Look up the rs id for a legacy marker name, ignoring ASCII case.
pub fn canonical_id(name: &str) -> Option<&'static str> {
  MT_ALIASES
    .iter()
    .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
    .map(|(_, rs)| *rs)
}
