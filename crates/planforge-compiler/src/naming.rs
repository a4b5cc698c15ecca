//! Fresh-name generation for synthesized symbols.

use std::collections::HashSet;

/// Reserves a name derived from `base` that is not in `taken`.
///
/// Returns `base` itself when free, otherwise `base_1`, `base_2`, ...
pub fn fresh_name(base: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut counter = 0;
    while taken.contains(&candidate) {
        counter += 1;
        candidate = format!("{base}_{counter}");
    }
    taken.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_name_skips_taken() {
        let mut taken: HashSet<String> = ["not_at".to_string(), "not_at_1".to_string()].into();
        assert_eq!(fresh_name("not_at", &mut taken), "not_at_2");
        assert_eq!(fresh_name("not_at", &mut taken), "not_at_3");
        assert_eq!(fresh_name("not_on", &mut taken), "not_on");
    }
}
