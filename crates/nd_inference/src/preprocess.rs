//! Headline normalization applied before vectorization.
//!
//! The same preprocessor is stored inside every trained pipeline, so training
//! and prediction always see identically cleaned text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"http\S+|www\S+|https\S+").unwrap();
    static ref DIGITS_RE: Regex = Regex::new(r"\d+").unwrap();
    static ref PUNCT_RE: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref SPACES_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref STOPWORDS: HashSet<&'static str> = ENGLISH_STOPWORDS.iter().copied().collect();
    static ref IRREGULAR_VERBS: HashMap<&'static str, &'static str> =
        IRREGULAR_VERB_FORMS.iter().copied().collect();
    static ref IRREGULAR_NOUNS: HashMap<&'static str, &'static str> =
        IRREGULAR_NOUN_FORMS.iter().copied().collect();
    static ref UNINFLECTED: HashSet<&'static str> = UNINFLECTED_WORDS
        .iter()
        .chain(PROPER_NAMES)
        .copied()
        .collect();
}

/// NLTK's English stopword list.
const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't",
    "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven",
    "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn",
    "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't",
    "won", "won't", "wouldn", "wouldn't",
];

const IRREGULAR_VERB_FORMS: &[(&str, &str)] = &[
    ("went", "go"), ("gone", "go"), ("goes", "go"), ("ran", "run"), ("took", "take"),
    ("taken", "take"), ("made", "make"), ("said", "say"), ("says", "say"), ("lost", "lose"),
    ("left", "leave"), ("found", "find"), ("gave", "give"), ("given", "give"), ("came", "come"),
    ("became", "become"), ("began", "begin"), ("begun", "begin"), ("brought", "bring"),
    ("bought", "buy"), ("built", "build"), ("caught", "catch"), ("chose", "choose"),
    ("chosen", "choose"), ("drove", "drive"), ("driven", "drive"), ("fell", "fall"),
    ("fallen", "fall"), ("felt", "feel"), ("fought", "fight"), ("flew", "fly"),
    ("flown", "fly"), ("forgot", "forget"), ("got", "get"), ("gotten", "get"), ("grew", "grow"),
    ("grown", "grow"), ("held", "hold"), ("kept", "keep"), ("knew", "know"), ("known", "know"),
    ("led", "lead"), ("met", "meet"), ("paid", "pay"), ("risen", "rise"), ("sold", "sell"),
    ("sent", "send"), ("shot", "shoot"), ("spent", "spend"), ("stood", "stand"),
    ("struck", "strike"), ("taught", "teach"), ("thought", "think"), ("told", "tell"),
    ("threw", "throw"), ("thrown", "throw"), ("understood", "understand"), ("wore", "wear"),
    ("worn", "wear"), ("wrote", "write"), ("written", "write"), ("seen", "see"),
    ("broke", "break"), ("broken", "break"), ("spoke", "speak"), ("spoken", "speak"),
    ("stole", "steal"), ("stolen", "steal"), ("died", "die"), ("dies", "die"),
    ("dying", "die"), ("lying", "lie"), ("tied", "tie"), ("hid", "hide"), ("hidden", "hide"),
    ("fled", "flee"), ("sank", "sink"), ("sunk", "sink"), ("slid", "slide"), ("swore", "swear"),
    ("sworn", "swear"), ("withdrew", "withdraw"), ("withdrawn", "withdraw"),
];

const IRREGULAR_NOUN_FORMS: &[(&str, &str)] = &[
    ("children", "child"), ("men", "man"), ("women", "woman"), ("mice", "mouse"),
    ("feet", "foot"), ("teeth", "tooth"), ("geese", "goose"), ("crises", "crisis"),
    ("analyses", "analysis"), ("theses", "thesis"), ("criteria", "criterion"),
    ("phenomena", "phenomenon"), ("media", "medium"), ("lives", "life"), ("wives", "wife"),
    ("knives", "knife"), ("wolves", "wolf"), ("leaves", "leaf"), ("halves", "half"),
    ("thieves", "thief"), ("shelves", "shelf"),
];

/// Words that look inflected but are already base forms.
const UNINFLECTED_WORDS: &[&str] = &[
    "news", "series", "species", "means", "gas", "lens", "chaos", "bias", "alias", "atlas",
    "canvas", "thanks", "always", "perhaps", "whereas", "various", "famous", "previous",
    "serious", "morning", "evening", "thing", "nothing", "something", "anything", "everything",
    "king", "ring", "spring", "string", "wing", "ceiling", "wedding", "sibling", "sterling",
    "darling", "pudding", "lightning", "feed", "need", "seed", "speed", "breed", "bleed",
    "greed", "reed", "indeed", "hundred", "red", "bed", "shed", "sled", "wed", "bred",
    "sacred", "naked", "wicked", "bus", "plus", "campus", "virus", "census", "status",
    "focus", "bonus", "consensus", "corpus", "chorus", "minus", "surplus", "yes", "this",
    "exceed", "proceed", "succeed", "deed", "heed", "weed", "steed", "tweed",
];

/// Names common in headlines whose spelling ends like an inflection.
const PROPER_NAMES: &[&str] = &[
    "texas", "athens", "brussels", "beijing", "wyoming", "boeing", "paris", "wales", "kansas",
    "arkansas", "honduras", "barbados", "bahamas", "philippines", "netherlands", "caracas",
    "lagos", "vegas", "angeles", "dallas", "carlos", "thomas", "james", "peking", "viking",
    "nanjing", "chongqing", "xinjiang", "hastings", "downing", "fleming", "cummings",
];

/// Normalizes raw headlines into space-separated lemmas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPreprocessor {
    /// Tokens with this many characters or fewer are dropped
    pub max_dropped_len: usize,
}

impl Default for TextPreprocessor {
    fn default() -> Self {
        Self { max_dropped_len: 2 }
    }
}

impl TextPreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preprocess(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    pub fn preprocess_all(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|t| self.preprocess(t)).collect()
    }

    pub fn tokens(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        let text = URL_RE.replace_all(&text, "");
        let text = DIGITS_RE.replace_all(&text, "");
        let text = PUNCT_RE.replace_all(&text, " ");
        let text = SPACES_RE.replace_all(&text, " ");

        text.split_whitespace()
            .filter(|t| !STOPWORDS.contains(t) && t.chars().count() > self.max_dropped_len)
            .map(|t| lemmatize_noun(&lemmatize_verb(t)))
            .collect()
    }
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn has_vowel(s: &str) -> bool {
    s.bytes().any(|b| is_vowel(b) || b == b'y')
}

fn ends_with_double_consonant(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2
        && b[b.len() - 1] == b[b.len() - 2]
        && !is_vowel(b[b.len() - 1])
        && !matches!(b[b.len() - 1], b'l' | b's' | b'z')
}

/// Short consonant-vowel-consonant stem like "mak" or "hop", which lost an "e".
fn is_short_cvc(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() < 3 || b.len() > 4 {
        return false;
    }
    let (c1, v, c2) = (b[b.len() - 3], b[b.len() - 2], b[b.len() - 1]);
    !is_vowel(c1) && is_vowel(v) && !is_vowel(c2) && !matches!(c2, b'w' | b'x' | b'y')
}

/// Stems need a vowel and cannot end in "j" or "q".
fn is_plausible_stem(stem: &str) -> bool {
    let b = stem.as_bytes();
    b.len() >= 3
        && has_vowel(stem)
        && !matches!(b[b.len() - 1], b'j' | b'q')
}

/// Restore the stem left after stripping "-ed"/"-ing".
fn restore_stem(stem: &str) -> String {
    if ends_with_double_consonant(stem) {
        return stem[..stem.len() - 1].to_string();
    }
    if stem.ends_with("at") || stem.ends_with("bl") || stem.ends_with("iz") || stem.ends_with("ur")
        || is_short_cvc(stem)
    {
        return format!("{}e", stem);
    }
    stem.to_string()
}

/// Rule-based verb lemmatization (past tense and gerunds).
pub fn lemmatize_verb(word: &str) -> String {
    if !word.is_ascii() || UNINFLECTED.contains(word) {
        return word.to_string();
    }
    if let Some(base) = IRREGULAR_VERBS.get(word) {
        return base.to_string();
    }
    if let Some(stem) = word.strip_suffix("ied") {
        if stem.len() >= 2 {
            return format!("{}y", stem);
        }
    }
    // "agreed" -> "agree", while "proceed" is covered above
    if word.len() > 4 && word.ends_with("eed") && !word.ends_with("ceed") {
        return word[..word.len() - 1].to_string();
    }
    for suffix in ["ing", "ed"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            if is_plausible_stem(stem) {
                return restore_stem(stem);
            }
        }
    }
    word.to_string()
}

/// Rule-based noun lemmatization (plurals).
pub fn lemmatize_noun(word: &str) -> String {
    if !word.is_ascii() || UNINFLECTED.contains(word) {
        return word.to_string();
    }
    if let Some(base) = IRREGULAR_NOUNS.get(word) {
        return base.to_string();
    }
    if word.len() <= 3 || word.ends_with("ss") || word.ends_with("us") || word.ends_with("is")
        || word.ends_with("ics")
    {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{}y", stem);
        }
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        return stem.to_string();
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_urls_digits_and_punctuation() {
        let pre = TextPreprocessor::new();
        let out = pre.preprocess("BREAKING: 2024 Markets rally!!! https://t.co/xyz www.example.com");
        assert_eq!(out, "break market rally");
    }

    #[test]
    fn test_drops_stopwords_and_short_tokens() {
        let pre = TextPreprocessor::new();
        assert_eq!(pre.preprocess("It is what it is, ok?"), "");
        assert_eq!(pre.preprocess("The UK and the EU agree"), "agree");
    }

    #[test]
    fn test_empty_input() {
        let pre = TextPreprocessor::new();
        assert_eq!(pre.preprocess(""), "");
        assert_eq!(pre.preprocess("   \n\t "), "");
    }

    #[test]
    fn test_lemmatizes_verbs_then_nouns() {
        let pre = TextPreprocessor::new();
        assert_eq!(
            pre.preprocess("Apple launches new iPhones after stocks tumbled"),
            "apple launch new iphone stock tumble"
        );
        assert_eq!(pre.preprocess("Children running races"), "child run race");
    }

    #[test]
    fn test_verb_rules() {
        assert_eq!(lemmatize_verb("stopped"), "stop");
        assert_eq!(lemmatize_verb("making"), "make");
        assert_eq!(lemmatize_verb("carried"), "carry");
        assert_eq!(lemmatize_verb("created"), "create");
        assert_eq!(lemmatize_verb("thought"), "think");
        assert_eq!(lemmatize_verb("morning"), "morning");
        assert_eq!(lemmatize_verb("thing"), "thing");
        assert_eq!(lemmatize_verb("feed"), "feed");
    }

    #[test]
    fn test_noun_rules() {
        assert_eq!(lemmatize_noun("cities"), "city");
        assert_eq!(lemmatize_noun("taxes"), "tax");
        assert_eq!(lemmatize_noun("churches"), "church");
        assert_eq!(lemmatize_noun("news"), "news");
        assert_eq!(lemmatize_noun("crisis"), "crisis");
        assert_eq!(lemmatize_noun("business"), "business");
        assert_eq!(lemmatize_noun("politics"), "politics");
        assert_eq!(lemmatize_noun("women"), "woman");
    }

    #[test]
    fn test_one_lemma_per_verb() {
        let pre = TextPreprocessor::new();
        assert_eq!(pre.preprocess("agreed"), pre.preprocess("agree"));
        assert_eq!(pre.preprocess("agreeing"), "agree");
        assert_eq!(lemmatize_verb("guaranteed"), "guarantee");
        assert_eq!(lemmatize_verb("freed"), "free");
        assert_eq!(lemmatize_verb("proceed"), "proceed");
        assert_eq!(lemmatize_verb("trying"), "try");
        assert_eq!(lemmatize_verb("exceeded"), "exceed");
    }

    #[test]
    fn test_names_are_not_inflections() {
        let pre = TextPreprocessor::new();
        assert_eq!(
            pre.preprocess("Texas Athens Brussels Beijing Wyoming Boeing"),
            "texas athens brussels beijing wyoming boeing"
        );
        assert!(!is_plausible_stem("beij"));
        assert_eq!(lemmatize_noun("ideas"), "idea");
    }

    #[test]
    fn test_keeps_non_ascii_words() {
        let pre = TextPreprocessor::new();
        assert_eq!(pre.preprocess("Élections régionales"), "élections régionales");
    }
}
