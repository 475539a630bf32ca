use std::sync::LazyLock;

use regex::Regex;

static YEARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\+?\s+(?:years?|yrs?)\b").expect("years pattern is valid")
});

/// Best-effort years of experience stated in `text`.
///
/// Takes the largest "N years" / "N+ yrs" figure rather than summing them: "5 years ... 2 years"
/// reads as at least five. Returns 0.0 when nothing is stated.
pub fn estimate_years(text: &str) -> f64 {
    YEARS_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .map(f64::from)
        .unwrap_or(0.0)
}
