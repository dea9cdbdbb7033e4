//! Porter suffix-stripping stemmer.
//!
//! Follows the published algorithm with the extensions used by the NLTK
//! implementation the classifier was trained with:
//!
//! - a small table of irregular forms (`skies` → `sky`, `dying` → `die`, ...)
//! - words of one or two letters are returned untouched
//! - `ies`/`ied` on four-letter words become `ie` (`dies` → `die`)
//! - step 1c only rewrites `y` after a consonant in a stem longer than one letter
//! - `alli` is handled before the rest of step 2 and `fulli`/`logi` are added
//! - a two-letter vowel-consonant stem also counts as `*o`
//!
//! Input is expected to be lowercase ASCII; anything else is lowercased and
//! returned without stemming.

/// Irregular forms mapped straight to their stem.
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("sky", "sky"),
    ("skies", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("news", "news"),
    ("innings", "inning"),
    ("inning", "inning"),
    ("outings", "outing"),
    ("outing", "outing"),
    ("cannings", "canning"),
    ("canning", "canning"),
    ("howe", "howe"),
    ("proceed", "proceed"),
    ("exceed", "exceed"),
    ("succeed", "succeed"),
];

type Condition<'a> = &'a dyn Fn(&str) -> bool;

/// Reduce `word` to its stem.
pub fn stem(word: &str) -> String {
    let word = word.to_lowercase();
    if !word.is_ascii() {
        return word;
    }

    if let Some((_, stem)) = IRREGULAR_FORMS.iter().find(|(form, _)| *form == word) {
        return (*stem).to_string();
    }

    if word.len() <= 2 {
        return word;
    }

    let word = step1a(&word);
    let word = step1b(&word);
    let word = step1c(&word);
    let word = step2(&word);
    let word = step3(&word);
    let word = step4(&word);
    let word = step5a(&word);
    step5b(&word)
}

fn is_consonant(word: &[u8], i: usize) -> bool {
    match word[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(word, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences, the `m` of `[C](VC){m}[V]`.
fn measure(stem: &str) -> usize {
    let bytes = stem.as_bytes();
    let mut count = 0;
    let mut previous_vowel = false;
    for i in 0..bytes.len() {
        let consonant = is_consonant(bytes, i);
        if consonant && previous_vowel {
            count += 1;
        }
        previous_vowel = !consonant;
    }
    count
}

fn has_positive_measure(stem: &str) -> bool {
    measure(stem) > 0
}

fn measure_gt_1(stem: &str) -> bool {
    measure(stem) > 1
}

fn contains_vowel(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    (0..bytes.len()).any(|i| !is_consonant(bytes, i))
}

fn ends_double_consonant(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    n >= 2 && bytes[n - 1] == bytes[n - 2] && is_consonant(bytes, n - 1)
}

/// The `*o` condition: stem ends consonant-vowel-consonant, the last not
/// `w`, `x` or `y`; a bare vowel-consonant pair also qualifies.
fn ends_cvc(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    (n >= 3
        && is_consonant(bytes, n - 3)
        && !is_consonant(bytes, n - 2)
        && is_consonant(bytes, n - 1)
        && !matches!(bytes[n - 1], b'w' | b'x' | b'y'))
        || (n == 2 && !is_consonant(bytes, 0) && is_consonant(bytes, 1))
}

/// Apply the first rule whose suffix matches; if its condition fails, no
/// later rule is tried.
fn apply_rules(word: &str, rules: &[(&str, &str, Option<Condition<'_>>)]) -> String {
    for &(suffix, replacement, condition) in rules {
        if let Some(stem) = word.strip_suffix(suffix) {
            return if condition.is_none_or(|holds| holds(stem)) {
                format!("{stem}{replacement}")
            } else {
                word.to_string()
            };
        }
    }
    word.to_string()
}

fn replace_suffix(word: &str, suffix: &str, replacement: &str) -> String {
    format!("{}{}", &word[..word.len() - suffix.len()], replacement)
}

fn step1a(word: &str) -> String {
    if word.ends_with("ies") && word.len() == 4 {
        return replace_suffix(word, "ies", "ie");
    }

    apply_rules(
        word,
        &[
            ("sses", "ss", None),
            ("ies", "i", None),
            ("ss", "ss", None),
            ("s", "", None),
        ],
    )
}

fn step1b(word: &str) -> String {
    if word.ends_with("ied") {
        let replacement = if word.len() == 4 { "ie" } else { "i" };
        return replace_suffix(word, "ied", replacement);
    }

    if let Some(stem) = word.strip_suffix("eed") {
        return if measure(stem) > 0 {
            format!("{stem}ee")
        } else {
            word.to_string()
        };
    }

    let Some(stem) = ["ed", "ing"]
        .iter()
        .filter_map(|suffix| word.strip_suffix(suffix))
        .find(|stem| contains_vowel(stem))
    else {
        return word.to_string();
    };

    for (suffix, replacement) in [("at", "ate"), ("bl", "ble"), ("iz", "ize")] {
        if stem.ends_with(suffix) {
            return replace_suffix(stem, suffix, replacement);
        }
    }

    if ends_double_consonant(stem) {
        let last = &stem[stem.len() - 1..];
        return if matches!(last, "l" | "s" | "z") {
            stem.to_string()
        } else {
            format!("{}{}", &stem[..stem.len() - 2], last)
        };
    }

    if measure(stem) == 1 && ends_cvc(stem) {
        format!("{stem}e")
    } else {
        stem.to_string()
    }
}

fn step1c(word: &str) -> String {
    let consonant_before: Condition<'_> =
        &|stem: &str| stem.len() > 1 && is_consonant(stem.as_bytes(), stem.len() - 1);
    apply_rules(word, &[("y", "i", Some(consonant_before))])
}

fn step2(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("alli") {
        if has_positive_measure(stem) {
            return step2(&format!("{stem}al"));
        }
    }

    let positive: Condition<'_> = &has_positive_measure;
    // The `l` of `logi` stays with the stem for the measure check.
    let logi: Condition<'_> = &|_: &str| has_positive_measure(&word[..word.len() - 3]);

    apply_rules(
        word,
        &[
            ("ational", "ate", Some(positive)),
            ("tional", "tion", Some(positive)),
            ("enci", "ence", Some(positive)),
            ("anci", "ance", Some(positive)),
            ("izer", "ize", Some(positive)),
            ("bli", "ble", Some(positive)),
            ("alli", "al", Some(positive)),
            ("entli", "ent", Some(positive)),
            ("eli", "e", Some(positive)),
            ("ousli", "ous", Some(positive)),
            ("ization", "ize", Some(positive)),
            ("ation", "ate", Some(positive)),
            ("ator", "ate", Some(positive)),
            ("alism", "al", Some(positive)),
            ("iveness", "ive", Some(positive)),
            ("fulness", "ful", Some(positive)),
            ("ousness", "ous", Some(positive)),
            ("aliti", "al", Some(positive)),
            ("iviti", "ive", Some(positive)),
            ("biliti", "ble", Some(positive)),
            ("fulli", "ful", Some(positive)),
            ("logi", "log", Some(logi)),
        ],
    )
}

fn step3(word: &str) -> String {
    let positive: Condition<'_> = &has_positive_measure;
    apply_rules(
        word,
        &[
            ("icate", "ic", Some(positive)),
            ("ative", "", Some(positive)),
            ("alize", "al", Some(positive)),
            ("iciti", "ic", Some(positive)),
            ("ical", "ic", Some(positive)),
            ("ful", "", Some(positive)),
            ("ness", "", Some(positive)),
        ],
    )
}

fn step4(word: &str) -> String {
    let gt1: Condition<'_> = &measure_gt_1;
    let ion: Condition<'_> = &|stem: &str| measure(stem) > 1 && stem.ends_with(['s', 't']);

    apply_rules(
        word,
        &[
            ("al", "", Some(gt1)),
            ("ance", "", Some(gt1)),
            ("ence", "", Some(gt1)),
            ("er", "", Some(gt1)),
            ("ic", "", Some(gt1)),
            ("able", "", Some(gt1)),
            ("ible", "", Some(gt1)),
            ("ant", "", Some(gt1)),
            ("ement", "", Some(gt1)),
            ("ment", "", Some(gt1)),
            ("ent", "", Some(gt1)),
            ("ion", "", Some(ion)),
            ("ou", "", Some(gt1)),
            ("ism", "", Some(gt1)),
            ("ate", "", Some(gt1)),
            ("iti", "", Some(gt1)),
            ("ous", "", Some(gt1)),
            ("ive", "", Some(gt1)),
            ("ize", "", Some(gt1)),
        ],
    )
}

fn step5a(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('e') {
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            return stem.to_string();
        }
    }
    word.to_string()
}

fn step5b(word: &str) -> String {
    let trailing_l: Condition<'_> = &|_: &str| measure(&word[..word.len() - 1]) > 1;
    apply_rules(word, &[("ll", "l", Some(trailing_l))])
}
