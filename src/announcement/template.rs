use once_cell::sync::Lazy;
use regex::Regex;
use crate::config::AnnouncementConfig;
use crate::domain::VouchCount;

/// The label the count is displayed behind. [`COUNT_PATTERN`] must keep matching
/// whatever [`render`] produces, or the counter won't survive restarts.
const COUNT_LABEL: &str = "Total Vouches";

// The platform strips entity markup from the text it reports back, but the
// pattern tolerates tags anyway: anything non-digit may sit between the
// label and the number, as long as they share a line.
static COUNT_PATTERN: Lazy<Regex> = Lazy::new(||
    Regex::new(r"(?i)total\s+vouches\s*:[^\d\n]*(\d+)")
        .expect("count extraction regular expression must be valid")
);

pub(super) fn render(config: &AnnouncementConfig, count: VouchCount) -> String {
    let mut body = format!(
        "🔥 <b>{}</b> 🔥\n\n<b>{COUNT_LABEL}:</b> {count}\n\n(Forward messages containing the word 'vouch')",
        config.display_name
    );
    if let Some(footer) = &config.footer {
        body.push('\n');
        body.push('\n');
        body.push_str(footer);
    }
    body
}

/// Pulls the displayed count back out of the announcement's rendered text.
pub(super) fn extract_count(text: &str) -> Option<VouchCount> {
    COUNT_PATTERN.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|group| group.as_str().parse().ok())
}

#[cfg(test)]
mod test {
    use super::{extract_count, render};
    use crate::config::AnnouncementConfig;
    use crate::domain::VouchCount;

    #[test]
    fn render_embeds_the_count_and_footer() {
        let config = AnnouncementConfig {
            footer: Some("@my_channel".to_owned()),
            ..Default::default()
        };
        let body = render(&config, "15".parse().unwrap());

        assert!(body.contains("Total Vouches:</b> 15"));
        assert!(body.contains("Vouch Counter"));
        assert!(body.ends_with("@my_channel"));
    }

    #[test]
    fn extraction_reverses_rendering() {
        let count: VouchCount = "123".parse().unwrap();
        let body = render(&AnnouncementConfig::default(), count);
        assert_eq!(extract_count(&body), Some(count));
    }

    #[test]
    fn extraction_is_tolerant() {
        assert_eq!(extract_count("Total Vouches: 7"), Some("7".parse().unwrap()));
        assert_eq!(extract_count("total  vouches :42 and some tail"), Some("42".parse().unwrap()));
        assert_eq!(extract_count("TOTAL VOUCHES:\t0"), Some(VouchCount::ZERO));
    }

    #[test]
    fn extraction_misses() {
        assert_eq!(extract_count("no counter here"), None);
        assert_eq!(extract_count("Total Vouches: many"), None);
        assert_eq!(extract_count(""), None);
    }
}
