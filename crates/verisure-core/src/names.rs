// ── Display name registry ──

use std::collections::HashSet;

/// Hands out display names that are unique for the lifetime of the registry.
///
/// A name already taken gets the first free ` #N` suffix, starting at 2.
/// A taken name that already ends in ` #N` continues counting from N + 1.
/// Names are never released.
#[derive(Debug, Default)]
pub struct NameRegistry {
    assigned: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, base: &str) -> String {
        if self.assigned.insert(base.to_owned()) {
            return base.to_owned();
        }

        let (stem, mut n) = split_suffix(base);
        loop {
            let candidate = format!("{stem} #{n}");
            if self.assigned.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assigned.contains(name)
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Split `"Hall #2"` into `("Hall", 3)`; anything else counts from 2.
fn split_suffix(name: &str) -> (&str, u64) {
    let Some((stem, digits)) = name.rsplit_once(" #") else {
        return (name, 2);
    };
    if stem.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (name, 2);
    }
    match digits.parse::<u64>() {
        Ok(n) => (stem, n.saturating_add(1)),
        Err(_) => (name, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_names_get_suffixes() {
        let mut names = NameRegistry::new();
        assert_eq!(names.assign("Smart plug (Kitchen)"), "Smart plug (Kitchen)");
        assert_eq!(names.assign("Smart plug (Kitchen)"), "Smart plug (Kitchen) #2");
        assert_eq!(names.assign("Smart plug (Kitchen)"), "Smart plug (Kitchen) #3");
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn distinct_names_untouched() {
        let mut names = NameRegistry::new();
        assert_eq!(names.assign("Hall"), "Hall");
        assert_eq!(names.assign("Garage"), "Garage");
        assert!(names.contains("Hall"));
        assert!(!names.contains("Hall #2"));
    }

    #[test]
    fn suffix_skips_names_already_taken() {
        let mut names = NameRegistry::new();
        names.assign("Hall #2");
        names.assign("Hall");
        assert_eq!(names.assign("Hall"), "Hall #3");
        assert_eq!(names.assign("Hall #2"), "Hall #4");
    }

    #[test]
    fn numbered_name_increments_its_suffix() {
        let mut names = NameRegistry::new();
        assert_eq!(names.assign("Hall #2"), "Hall #2");
        assert_eq!(names.assign("Hall #2"), "Hall #3");
        assert_eq!(names.assign("Hall #2"), "Hall #4");
        assert!(!names.contains("Hall #2 #2"));
    }

    #[test]
    fn non_numeric_hash_suffix_is_part_of_the_name() {
        let mut names = NameRegistry::new();
        names.assign("Room #A");
        assert_eq!(names.assign("Room #A"), "Room #A #2");
        names.assign("#7");
        assert_eq!(names.assign("#7"), "#7 #2");
    }
}
