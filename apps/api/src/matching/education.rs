/// Degree and credential vocabulary. Matched as case-insensitive substrings, so every entry is
/// long or punctuated enough not to fire inside ordinary words.
const DEGREE_VOCABULARY: &[&str] = &[
    "bachelor",
    "master",
    "doctorate",
    "diploma",
    "bsc",
    "b.sc",
    "msc",
    "m.sc",
    "btech",
    "b.tech",
    "mtech",
    "m.tech",
    "b.e.",
    "m.e.",
    "bca",
    "mca",
    "mba",
    "phd",
    "ph.d",
];

fn mentions_degree(text: &str) -> bool {
    let lowered = text.to_lowercase();
    DEGREE_VOCABULARY.iter().any(|term| lowered.contains(term))
}

/// Returns `(jd_has_education, resume_has_education)`, each computed on its own.
pub fn has_education_signal(jd_text: &str, resume_text: &str) -> (bool, bool) {
    (mentions_degree(jd_text), mentions_degree(resume_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_sides_detected_independently() {
        assert_eq!(
            has_education_signal("Bachelor's degree required", "M.Tech in CS"),
            (true, true)
        );
        assert_eq!(
            has_education_signal("No formal requirements", "PhD, Stanford"),
            (false, true)
        );
    }

    #[test]
    fn test_generic_degree_word_is_not_a_signal() {
        let (_, resume) = has_education_signal("", "3 years Python developer, AWS certified, no degree mentioned");
        assert!(!resume);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(has_education_signal("MBA preferred", "bsc physics"), (true, true));
    }

    #[test]
    fn test_empty_text_has_no_signal() {
        assert_eq!(has_education_signal("", ""), (false, false));
    }
}
