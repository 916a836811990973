//! Query normalization
//!
//! BOM viewers print values with unit symbols (`10kΩ`) and footprints with a
//! designator prefix (`R0402`), while the component table stores canonical
//! forms (`10K`, `0402`). Only the query side is normalized.

/// Kilo-ohm spellings, with both the Greek capital omega and the ohm sign
const KILO_OHM_FORMS: [&str; 4] = ["k\u{3a9}", "K\u{3a9}", "k\u{2126}", "K\u{2126}"];

/// Mega-ohm spellings; lowercase `m` is accepted as a common typo
const MEGA_OHM_FORMS: [&str; 4] = ["M\u{3a9}", "m\u{3a9}", "M\u{2126}", "m\u{2126}"];

const OHM_FORMS: [&str; 2] = ["\u{3a9}", "\u{2126}"];

/// Designator letters that may prefix a 4-digit imperial size code
const SIZE_CODE_PREFIXES: [char; 2] = ['R', 'C'];

/// Normalize a footprint from the BOM
///
/// `R0402` / `c0603` become `0402` / `0603`; anything else is only
/// uppercased, so multi-token codes like `SOT-23-5` survive intact.
pub fn normalize_footprint(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let mut chars = upper.chars();
    let is_prefixed_size_code = upper.chars().count() == 5
        && chars.next().is_some_and(|c| SIZE_CODE_PREFIXES.contains(&c))
        && chars.all(|c| c.is_ascii_digit());

    if is_prefixed_size_code {
        upper[1..].to_string()
    } else {
        upper
    }
}

/// Normalize an electrical value from the BOM to the stored canonical form
///
/// `kΩ` → `K`, `MΩ` → `M`, `Ω` → `R`. Case is left alone; matching is
/// case-insensitive anyway.
pub fn normalize_parameter(raw: &str) -> String {
    let mut value = raw.to_string();
    // Prefixed forms first; a bare-ohm pass first would turn `1MΩ` into `1MR`
    for form in KILO_OHM_FORMS {
        value = value.replace(form, "K");
    }
    for form in MEGA_OHM_FORMS {
        value = value.replace(form, "M");
    }
    for form in OHM_FORMS {
        value = value.replace(form, "R");
    }
    value
}
