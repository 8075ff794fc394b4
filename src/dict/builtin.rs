use crate::normalizer::dictionary::Category;

/// Canonical word, its category and the misspellings accepted for it.
///
/// Order matters: it is the final tie-break of the fuzzy matcher.
pub const BUILTIN_KEYWORDS: &[(&str, Category, &[&str])] = &[
    ("def", Category::Statement, &["deff", "define", "defin"]),
    ("if", Category::Statement, &["iff", "iif"]),
    ("elif", Category::Statement, &["elsif", "elseif", "else_if"]),
    ("else", Category::Statement, &["els", "elze"]),
    ("for", Category::Statement, &["fore", "four", "fr"]),
    ("while", Category::Statement, &["wile", "whyle", "whil"]),
    ("in", Category::Operator, &["inn", "iin"]),
    ("return", Category::Statement, &["retrun", "retrn", "ret"]),
    ("import", Category::Statement, &["imprt", "imort", "importt"]),
    ("from", Category::Statement, &["frm", "fom"]),
    ("as", Category::Statement, &["az", "ass"]),
    ("class", Category::Statement, &["clas", "clss", "klass"]),
    ("try", Category::Statement, &["tri", "tyr"]),
    ("except", Category::Statement, &["exept", "excpt", "catch"]),
    ("finally", Category::Statement, &["finaly", "finale"]),
    ("with", Category::Statement, &["wth", "wit"]),
    ("and", Category::Operator, &["andd", "adn"]),
    ("or", Category::Operator, &["orr"]),
    ("not", Category::Operator, &["nott", "no"]),
    ("is", Category::Operator, &["iz", "iss"]),
    ("True", Category::Literal, &["true", "TRUE", "tru"]),
    ("False", Category::Literal, &["false", "FALSE", "fals"]),
    ("None", Category::Literal, &["none", "NONE", "null", "nil"]),
    ("print", Category::Builtin, &["prin", "prnt", "pritn"]),
];
