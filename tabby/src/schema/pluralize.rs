use once_cell::sync::Lazy;
use regex::Regex;

// first matching rule wins
const RULES: [(&str, &str); 21] = [
    (r"(m)an$", "${1}en"),
    (r"(pe)rson$", "${1}ople"),
    (r"(child)$", "${1}ren"),
    (r"^(ox)$", "${1}en"),
    (r"(ax|test)is$", "${1}es"),
    (r"(octop|vir)us$", "${1}i"),
    (r"(alias|status)$", "${1}es"),
    (r"(bu)s$", "${1}ses"),
    (r"(buffal|tomat|potat)o$", "${1}oes"),
    (r"([ti])um$", "${1}a"),
    (r"sis$", "ses"),
    (r"(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    (r"(hive)$", "${1}s"),
    (r"([^aeiouy]|qu)y$", "${1}ies"),
    (r"(x|ch|ss|sh)$", "${1}es"),
    (r"(matr|vert|ind)ix|ex$", "${1}ices"),
    (r"([m|l])ouse$", "${1}ice"),
    (r"^(quiz)$", "${1}zes"),
    (r"s$", "s"),
    (r"([^a-z])$", "${1}"),
    (r"$", "s"),
];

const UNCOUNTABLES: [&str; 27] = [
    "advice",
    "energy",
    "excretion",
    "digestion",
    "cooperation",
    "health",
    "justice",
    "labour",
    "machinery",
    "equipment",
    "information",
    "pollution",
    "sewage",
    "paper",
    "money",
    "species",
    "series",
    "rain",
    "rice",
    "fish",
    "sheep",
    "moose",
    "deer",
    "news",
    "expertise",
    "status",
    "media",
];

static COMPILED_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    RULES
        .iter()
        .filter_map(|(pattern, replacement)| match Regex::new(pattern) {
            Ok(regex) => Some((regex, *replacement)),
            Err(err) => {
                log::error!("Invalid pluralization rule {}: {}", pattern, err);
                None
            }
        })
        .collect()
});

/// Derives a collection name from a model name: lowercase, then English
/// plural (`Cat` -> `cats`, `Person` -> `people`, `Entry` -> `entries`).
/// Uncountable nouns such as `sheep` or `news` are only lowercased.
pub fn pluralize(name: &str) -> String {
    let lower = name.to_lowercase();
    if UNCOUNTABLES.contains(&lower.as_str()) {
        return lower;
    }

    COMPILED_RULES
        .iter()
        .find(|(regex, _)| regex.is_match(&lower))
        .map(|(regex, replacement)| regex.replace(&lower, *replacement).into_owned())
        .unwrap_or(lower)
}
