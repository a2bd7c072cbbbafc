//! English singularization for lookup variable names.
//!
//! `authors` becomes `author`, so nested registrations get `author_pk`.
//! Rules are tried in order and the first match wins.

use std::sync::LazyLock;

use regex::Regex;

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "jeans",
    "money",
    "news",
    "police",
    "rice",
    "series",
    "sheep",
    "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("men", "man"),
    ("children", "child"),
    ("sexes", "sex"),
    ("moves", "move"),
    ("zombies", "zombie"),
    ("kine", "cow"),
];

static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)(passer)s?by$", "${1}by"),
        (r"(?i)(database)s$", "$1"),
        (r"(?i)(quiz)zes$", "$1"),
        (r"(?i)(matr)ices$", "${1}ix"),
        (r"(?i)(vert|ind)ices$", "${1}ex"),
        (r"(?i)^(ox)en", "$1"),
        (r"(?i)(alias|status)(es)?$", "$1"),
        (r"(?i)(octop|vir)(us|i)$", "${1}us"),
        (r"(?i)^(a)x[ie]s$", "${1}xis"),
        (r"(?i)(cris|test)(is|es)$", "${1}is"),
        (r"(?i)(shoe)s$", "$1"),
        (r"(?i)(o)es$", "$1"),
        (r"(?i)(bus)(es)?$", "$1"),
        (r"(?i)(m|l)ice$", "${1}ouse"),
        (r"(?i)(x|ch|ss|sh)es$", "$1"),
        (r"(?i)(m)ovies$", "${1}ovie"),
        (r"(?i)(s)eries$", "${1}eries"),
        (r"(?i)([^aeiouy]|qu)ies$", "${1}y"),
        (r"(?i)([lr])ves$", "${1}f"),
        (r"(?i)(tive)s$", "$1"),
        (r"(?i)(hive)s$", "$1"),
        (r"(?i)([^f])ves$", "${1}fe"),
        (r"(?i)(t)he(sis|ses)$", "${1}hesis"),
        (r"(?i)(s)ynop(sis|ses)$", "${1}ynopsis"),
        (r"(?i)(p)rogno(sis|ses)$", "${1}rognosis"),
        (r"(?i)(p)arenthe(sis|ses)$", "${1}arenthesis"),
        (r"(?i)(d)iagno(sis|ses)$", "${1}iagnosis"),
        (r"(?i)(b)a(sis|ses)$", "${1}asis"),
        (r"(?i)(a)naly(sis|ses)$", "${1}nalysis"),
        (r"(?i)([ti])a$", "${1}um"),
        (r"(?i)(n)ews$", "${1}ews"),
        (r"(?i)(ss)$", "$1"),
        (r"(?i)s$", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("singularization rule must compile"),
            replacement,
        )
    })
    .collect()
});

/// Return the singular form of an English word.
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if UNCOUNTABLE.iter().any(|u| lower.ends_with(u)) {
        return word.to_string();
    }
    for (plural, singular) in IRREGULAR {
        if !lower.ends_with(plural) {
            continue;
        }
        let cut = word.len().saturating_sub(plural.len());
        if let (Some(stem), Some(matched)) = (word.get(..cut), word.get(cut..)) {
            // The singular takes the case of the replaced word's first letter.
            let lead = if matched.starts_with(|c: char| c.is_ascii_uppercase()) {
                singular[..1].to_ascii_uppercase()
            } else {
                singular[..1].to_string()
            };
            return format!("{stem}{lead}{}", &singular[1..]);
        }
    }
    for (rule, replacement) in RULES.iter() {
        if rule.is_match(word) {
            return rule.replace(word, *replacement).into_owned();
        }
    }
    word.to_string()
}
