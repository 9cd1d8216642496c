/// Static mapping from staff name fragments to WhatsApp numbers, loaded
/// from configuration at startup.
///
/// Entries keep their declared order: when no exact key matches, the first
/// fragment contained in the normalized name wins. Task assignees arrive as
/// full display names ("Edgardo Pérez") while the directory stores first
/// names, so the substring fallback does the bulk of the matching;
/// exact-match-first avoids ambiguity when a full key is also a substring
/// of another.
#[derive(Debug, Clone, Default)]
pub struct AssigneeDirectory {
    entries: Vec<(String, String)>,
}

impl AssigneeDirectory {
    /// Builds a directory from `(name fragment, phone)` pairs. Fragments
    /// are lowercased and trimmed; empty fragments are discarded so they
    /// can never match every name.
    pub fn new(entries: Vec<(String, String)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(name, phone)| (name.trim().to_lowercase(), phone))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        AssigneeDirectory { entries }
    }

    /// Resolves a free-text assignee name to a phone number.
    ///
    /// `None` is a legitimate outcome meaning the task is skipped, not an
    /// error to retry.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let normalized = name.trim().to_lowercase();

        if let Some((_, phone)) = self.entries.iter().find(|(key, _)| *key == normalized) {
            return Some(phone);
        }

        self.entries
            .iter()
            .find(|(key, _)| normalized.contains(key.as_str()))
            .map(|(_, phone)| phone.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> AssigneeDirectory {
        AssigneeDirectory::new(vec![
            ("edgardo".to_string(), "573116123189".to_string()),
            ("dairo".to_string(), "573007189383".to_string()),
            ("stiven".to_string(), "573026444564".to_string()),
        ])
    }

    #[test]
    fn exact_match_resolves() {
        assert_eq!(directory().lookup("edgardo"), Some("573116123189"));
    }

    #[test]
    fn full_display_name_resolves_via_substring() {
        let dir = directory();
        assert_eq!(dir.lookup("Edgardo Pérez"), dir.lookup("edgardo"));
        assert_eq!(dir.lookup("Edgardo Pérez"), Some("573116123189"));
    }

    #[test]
    fn lookup_is_case_insensitive_and_trimmed() {
        assert_eq!(directory().lookup("  STIVEN  "), Some("573026444564"));
    }

    #[test]
    fn unknown_name_is_not_found() {
        assert_eq!(directory().lookup("unknown person"), None);
    }

    #[test]
    fn exact_match_wins_over_earlier_substring() {
        let dir = AssigneeDirectory::new(vec![
            ("ed".to_string(), "111".to_string()),
            ("edgardo".to_string(), "222".to_string()),
        ]);
        assert_eq!(dir.lookup("edgardo"), Some("222"));
    }

    #[test]
    fn substring_fallback_honors_declared_order() {
        let dir = AssigneeDirectory::new(vec![
            ("gar".to_string(), "111".to_string()),
            ("edg".to_string(), "222".to_string()),
        ]);
        assert_eq!(dir.lookup("Edgardo Pérez"), Some("111"));
    }

    #[test]
    fn empty_fragments_never_match() {
        let dir = AssigneeDirectory::new(vec![("  ".to_string(), "111".to_string())]);
        assert_eq!(dir.lookup("anyone"), None);
        assert!(dir.is_empty());
    }
}
