use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // One or more name parts: "John", "McDonald", "O'Neil", "Jean-Luc", "J.", "SMITH",
    // or uncased scripts such as "李明"
    static ref NAME_SHAPE: Regex = Regex::new(
        r"^(?:\p{Lu}?\p{Ll}+(?:\p{Lu}\p{Ll}+)?|\p{Lu}+|\p{Lo}+)\.?(?:(?:\s+|\s*[-'’]\s*)(?:\p{Lu}?\p{Ll}+(?:\p{Lu}\p{Ll}+)?|\p{Lu}+|\p{Lo}+)\.?)*$"
    )
    .unwrap();

    // Letters, digits and the punctuation company names actually use
    static ref COMPANY_SHAPE: Regex =
        Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N}\s&.,'’()/+@!-]*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Company,
    Message,
}

// Thresholds for one field kind
#[derive(Debug, Clone, Copy)]
struct Profile {
    consonant_run: usize,
    repeat_run: usize,
    // amounts like "$10000" are normal in a message
    skip_digit_repeats: bool,
    min_vowel_ratio: f64,
    ratio_min_len: usize,
    shape_min_len: Option<usize>,
}

impl FieldKind {
    fn profile(self) -> Profile {
        match self {
            FieldKind::Name | FieldKind::Company => Profile {
                consonant_run: 5,
                repeat_run: 4,
                skip_digit_repeats: false,
                min_vowel_ratio: 0.15,
                ratio_min_len: 8,
                shape_min_len: Some(3),
            },
            // compound words like "strengths" already carry five in a row
            FieldKind::Message => Profile {
                consonant_run: 6,
                repeat_run: 4,
                skip_digit_repeats: true,
                min_vowel_ratio: 0.15,
                ratio_min_len: 8,
                shape_min_len: None,
            },
        }
    }

    fn matches_shape(self, text: &str) -> bool {
        match self {
            FieldKind::Name => NAME_SHAPE.is_match(text),
            FieldKind::Company => COMPANY_SHAPE.is_match(text),
            FieldKind::Message => true,
        }
    }
}

/// Best-effort check for keyboard mashing and generated junk.
///
/// Flags long consonant runs, long runs of one repeated character, a vowel ratio
/// under the profile minimum, and for names and companies anything that does
/// not look like one. Empty text is never gibberish; required-field checks
/// handle that.
pub fn is_gibberish(text: &str, kind: FieldKind) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    let profile = kind.profile();

    if longest_consonant_run(text) >= profile.consonant_run {
        return true;
    }

    if longest_repeated_run(text, profile.skip_digit_repeats) >= profile.repeat_run {
        return true;
    }

    if text.chars().count() > profile.ratio_min_len {
        if let Some(ratio) = vowel_ratio(text) {
            if ratio < profile.min_vowel_ratio {
                return true;
            }
        }
    }

    if let Some(min_len) = profile.shape_min_len {
        if text.chars().count() > min_len && !kind.matches_shape(text) {
            return true;
        }
    }

    false
}

fn is_vowel(c: char) -> bool {
    matches!(
        c.to_lowercase().next().unwrap_or(c),
        'a' | 'e' | 'i' | 'o' | 'u' | 'y'
            | 'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'æ'
            | 'è' | 'é' | 'ê' | 'ë'
            | 'ì' | 'í' | 'î' | 'ï'
            | 'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø'
            | 'ù' | 'ú' | 'û' | 'ü' | 'ý' | 'ÿ'
    )
}

// y counts as a vowel here, so "rhythm" stays short of a flag
fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !is_vowel(c)
}

fn longest_consonant_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if is_consonant(c) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

// Longest run of one non-whitespace character, case-insensitive
fn longest_repeated_run(text: &str, skip_digits: bool) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<char> = None;
    for c in text.chars().flat_map(char::to_lowercase) {
        let counted = !c.is_whitespace() && !(skip_digits && c.is_numeric());
        if !counted {
            current = 0;
        } else if previous == Some(c) {
            current += 1;
        } else {
            current = 1;
        }
        longest = longest.max(current);
        previous = Some(c);
    }
    longest
}

// Cased letters only. Scripts without vowels (CJK, kana) have no ratio.
fn is_cased_letter(c: char) -> bool {
    c.is_alphabetic() && (c.is_lowercase() || c.is_uppercase())
}

// Share of letters that are vowels, None if there are no letters
fn vowel_ratio(text: &str) -> Option<f64> {
    let (letters, vowels) = text
        .chars()
        .filter(|c| is_cased_letter(*c))
        .fold((0usize, 0usize), |(letters, vowels), c| {
            (letters + 1, vowels + usize::from(is_vowel(c)))
        });
    if letters == 0 {
        return None;
    }
    Some(vowels as f64 / letters as f64)
}
