use super::domain::InstituteCategory;

/// Classify a free-text institute name or type label into a display tier.
///
/// Exact short codes win; otherwise canonical long names and name prefixes
/// are matched case-insensitively. IIIT is tested before IIT so neither the
/// long form nor the prefix family is swallowed by the broader IIT match.
/// Anything recognizably an institute but matching no family is GFTI; empty
/// input is UNKNOWN.
pub fn classify_institute(label: &str) -> InstituteCategory {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return InstituteCategory::Unknown;
    }

    match trimmed.to_ascii_uppercase().as_str() {
        "IIT" => return InstituteCategory::Iit,
        "NIT" => return InstituteCategory::Nit,
        "IIIT" => return InstituteCategory::Iiit,
        "GFTI" => return InstituteCategory::Gfti,
        _ => {}
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("indian institute of information technology") || lower.starts_with("iiit") {
        return InstituteCategory::Iiit;
    }
    if lower.contains("indian institute of technology") || lower.starts_with("iit") {
        return InstituteCategory::Iit;
    }
    if lower.contains("national institute of technology") || lower.starts_with("nit") {
        return InstituteCategory::Nit;
    }

    InstituteCategory::Gfti
}
