const PRIMARY_TRIGGER: &str = "vouch";

/// The keywords whose case-insensitive presence in a forwarded message makes it count.
#[derive(Clone, Debug)]
pub struct TriggerWords {
    extra: Option<String>,
}

impl TriggerWords {
    pub fn new(extra: Option<String>) -> Self {
        let extra = extra
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty());
        Self { extra }
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        text.contains(PRIMARY_TRIGGER) || self.extra.as_deref()
            .map(|word| text.contains(word))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod test {
    use super::TriggerWords;

    #[test]
    fn primary_keyword_is_case_insensitive() {
        let triggers = TriggerWords::new(None);
        assert!(triggers.matches("VoUcH for this guy"));
        assert!(triggers.matches("big vouches all around"));
        assert!(!triggers.matches("nothing to see here"));
    }

    #[test]
    fn extra_keyword() {
        let triggers = TriggerWords::new(Some("Thanks".to_owned()));
        assert!(triggers.matches("THANKS a lot!"));
        assert!(triggers.matches("vouch"));

        let without_extra = TriggerWords::new(Some("  ".to_owned()));
        assert!(!without_extra.matches("thanks a lot!"));
    }
}
