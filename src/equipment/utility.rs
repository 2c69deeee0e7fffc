//! Utility company codes

pub const APS: &str = "APS";
pub const SRP: &str = "SRP";
pub const TEP: &str = "TEP";
pub const TRICO: &str = "TRICO";
pub const XCEL: &str = "XCEL";

/// Maps long utility names to their short codes
///
/// Unknown names pass through trimmed.
pub fn normalize_utility_name(name: &str) -> String {
    let trimmed = name.trim();
    let lower = trimmed.to_lowercase();

    let code = if lower == "aps" || lower.contains("arizona public service") {
        Some(APS)
    } else if lower == "srp" || lower.contains("salt river") {
        Some(SRP)
    } else if lower == "tep" || lower.contains("tucson electric") {
        Some(TEP)
    } else if lower.contains("trico") {
        Some(TRICO)
    } else if lower.contains("xcel") || lower.contains("public service company of colorado") {
        Some(XCEL)
    } else {
        None
    };

    code.map(str::to_string)
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        aps_code = { "APS", "APS" },
        aps_lower = { "aps", "APS" },
        aps_long = { "Arizona Public Service", "APS" },
        srp_long = { "Salt River Project", "SRP" },
        tep_long = { "Tucson Electric Power", "TEP" },
        trico = { "TRICO Electric Cooperative", "TRICO" },
        xcel = { "Xcel Energy", "XCEL" },
        pscc = { "Public Service Company of Colorado", "XCEL" },
        unknown = { "  Pacific Gas & Electric ", "Pacific Gas & Electric" },
        empty = { "", "" },
    )]
    fn test_normalize_utility_name(input: &str, expected: &str) {
        assert_eq!(normalize_utility_name(input), expected);
    }
}
