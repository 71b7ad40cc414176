use super::{mean, round2};
use crate::dataset::Column;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const TOP_WORDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub total: usize,
    pub non_empty: usize,
    pub empty_rows: usize,
    pub avg_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub avg_tokens: f64,
    pub top_words: Vec<(String, u64)>,
}

static RE_TOKEN: OnceLock<Regex> = OnceLock::new();

fn re_token() -> &'static Regex {
    RE_TOKEN.get_or_init(|| Regex::new(r"[A-Za-zА-Яа-яЇїІіЄєҐґ0-9]+").unwrap())
}

/// Latin/Cyrillic letter or digit runs, lower-cased.
pub fn tokenize(s: &str) -> Vec<String> {
    re_token().find_iter(s).map(|m| m.as_str().to_lowercase()).collect()
}

pub fn analyze_text(column: &Column) -> TextMetrics {
    let texts = column.normalized_text();
    let lengths: Vec<usize> = texts.iter().map(|t| t.chars().count()).collect();
    let empty_rows = texts.iter().filter(|t| t.trim().is_empty()).count();

    let mut counter = WordCounter::default();
    let mut token_counts = Vec::with_capacity(texts.len());
    for t in &texts {
        let tokens = tokenize(t);
        token_counts.push(tokens.len() as f64);
        for tok in tokens {
            counter.add(tok);
        }
    }
    let length_values: Vec<f64> = lengths.iter().map(|&l| l as f64).collect();

    TextMetrics {
        total: texts.len(),
        non_empty: texts.len() - empty_rows,
        empty_rows,
        avg_length: mean(&length_values).map_or(0.0, round2),
        min_length: lengths.iter().copied().min().unwrap_or(0),
        max_length: lengths.iter().copied().max().unwrap_or(0),
        avg_tokens: mean(&token_counts).map_or(0.0, round2),
        top_words: counter.most_common(TOP_WORDS),
    }
}

/// Frequency counter whose ties keep first-seen order.
#[derive(Default)]
struct WordCounter {
    counts: HashMap<String, (u64, usize)>,
}

impl WordCounter {
    fn add(&mut self, word: String) {
        let next = self.counts.len();
        self.counts.entry(word).or_insert((0, next)).0 += 1;
    }

    fn most_common(self, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, (u64, usize))> = self.counts.into_iter().collect();
        entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        entries.into_iter().take(n).map(|(w, (c, _))| (w, c)).collect()
    }
}
