//! WhatsApp and email link helpers
//!
//! Both link fields are optional on a landing page, so an empty string is
//! always valid. Messages are shown to the page owner as-is.

use serde::{Deserialize, Serialize};
use url::Url;

/// Canonical WhatsApp click-to-chat prefix
pub const WHATSAPP_PREFIX: &str = "https://wa.me/";

/// Outcome of a link validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkValidation {
    pub is_valid: bool,
    pub message: String,
}

impl LinkValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            message: message.to_string(),
        }
    }
}

/// Accepts `""` or exactly `https://wa.me/<digits>`
pub fn validate_whatsapp_link(link: &str) -> LinkValidation {
    if link.is_empty() {
        return LinkValidation::valid();
    }

    let digits_ok = link
        .strip_prefix(WHATSAPP_PREFIX)
        .map(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false);

    if digits_ok {
        LinkValidation::valid()
    } else {
        LinkValidation::invalid(
            "Link do WhatsApp inválido. Use o formato https://wa.me/5511999999999",
        )
    }
}

/// Accepts `""` or any well-formed absolute URL
pub fn validate_email_link(link: &str) -> LinkValidation {
    if link.is_empty() {
        return LinkValidation::valid();
    }

    match Url::parse(link) {
        Ok(_) => LinkValidation::valid(),
        Err(_) => LinkValidation::invalid(
            "Link de e-mail inválido. Informe uma URL completa (ex.: https://... ou mailto:...)",
        ),
    }
}

/// Builds a `https://wa.me/<digits>` link from a phone number or link
///
/// An input that already starts with the canonical prefix keeps only the
/// digits after it, so formatting is idempotent. Input without digits
/// formats to `""`.
pub fn format_whatsapp_link(raw: &str) -> String {
    let raw = raw.trim();
    let number_part = raw.strip_prefix(WHATSAPP_PREFIX).unwrap_or(raw);

    let digits: String = number_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }

    format!("{WHATSAPP_PREFIX}{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_digits_only() {
        for number in ["5511999999999", "1", "00000", "48988887777"] {
            assert_eq!(format_whatsapp_link(number), format!("https://wa.me/{number}"));
        }
    }

    #[test]
    fn test_format_strips_punctuation() {
        assert_eq!(format_whatsapp_link("+55 (11) 99999-9999"), "https://wa.me/5511999999999");
    }

    #[test]
    fn test_format_is_idempotent_on_formatted_links() {
        let once = format_whatsapp_link("+55 11 98888-7777");
        assert_eq!(format_whatsapp_link(&once), once);
    }

    #[test]
    fn test_format_without_digits_is_empty() {
        assert_eq!(format_whatsapp_link(""), "");
        assert_eq!(format_whatsapp_link("sem número"), "");
    }

    #[test]
    fn test_whatsapp_validation() {
        assert!(validate_whatsapp_link("").is_valid);
        assert!(validate_whatsapp_link("https://wa.me/5511999999999").is_valid);

        for bad in [
            "https://wa.me/",
            "https://wa.me/55 11",
            "http://wa.me/5511",
            "wa.me/5511",
            "https://wa.me/5511x",
            "5511999999999",
            "https://api.whatsapp.com/send?phone=5511",
        ] {
            let result = validate_whatsapp_link(bad);
            assert!(!result.is_valid, "{bad} should be invalid");
            assert!(!result.message.is_empty());
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email_link("").is_valid);
        assert!(validate_email_link("mailto:contato@exemplo.com").is_valid);
        assert!(validate_email_link("https://exemplo.com/contato").is_valid);

        for bad in ["contato@exemplo.com", "exemplo.com", "http//broken", "://x"] {
            assert!(!validate_email_link(bad).is_valid, "{bad} should be invalid");
        }
    }
}
