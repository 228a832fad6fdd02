//! Digital name (URL slug) normalisation
//!
//! `"Meu Site!"` becomes `"meu-site"`: lowercase ASCII, Portuguese accents
//! folded, every run of other characters collapsed into a single hyphen.

/// Maximum slug length accepted by the `landing_pages.digital_name` column
pub const MAX_DIGITAL_NAME_LEN: usize = 60;

/// Folds the Latin-1 accents used in Portuguese to their base letter
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Normalises free text into a digital name
///
/// The result may be empty when the input has no letters or digits.
pub fn normalize_digital_name(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > MAX_DIGITAL_NAME_LEN {
        slug.truncate(MAX_DIGITAL_NAME_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Whether `value` is already a normalised digital name
pub fn is_valid_digital_name(value: &str) -> bool {
    !value.is_empty() && normalize_digital_name(value) == value
}
