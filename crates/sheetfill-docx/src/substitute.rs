//! Placeholder substitution over paragraphs of runs.
//!
//! Each paragraph is handled in two phases. Run texts are concatenated with a
//! byte-offset index, then all placeholder matches are found in the
//! concatenation and mapped back onto the runs they touch. Matches are applied
//! right to left so the offsets of earlier matches stay valid.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use sheetfill_common::PlaceholderMap;

use crate::model::{Document, Paragraph};

static ANY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]+\}\}").expect("token regex must compile"));

/// What a substitution pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubstitutionReport {
    /// Replacements per token. Tokens never found are absent.
    pub replacements: BTreeMap<String, usize>,
    /// Matches that straddled two or more runs.
    pub split_runs: usize,
    /// `{{…}}` tokens found in the text with no map entry, first occurrence order.
    pub unmatched: Vec<String>,
}

impl SubstitutionReport {
    pub fn total(&self) -> usize {
        self.replacements.values().sum()
    }

    pub fn is_noop(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: SubstitutionReport) {
        for (token, count) in other.replacements {
            *self.replacements.entry(token).or_default() += count;
        }
        self.split_runs += other.split_runs;
        for token in other.unmatched {
            self.note_unmatched(token);
        }
    }

    fn note_unmatched(&mut self, token: String) {
        if !self.unmatched.contains(&token) {
            self.unmatched.push(token);
        }
    }
}

/// How mapped keys are located in paragraph text.
enum Matcher<'m> {
    None,
    Pattern(Regex),
    /// Keys longest first, tried at each position. Used when the alternation
    /// is too large to compile.
    Scan(Vec<&'m str>),
}

/// Compiled matcher for one placeholder map, reusable across paragraphs and parts.
pub struct Substituter<'m> {
    map: &'m PlaceholderMap,
    matcher: Matcher<'m>,
}

impl<'m> Substituter<'m> {
    pub fn new(map: &'m PlaceholderMap) -> Self {
        let mut keys: Vec<&str> = map.keys().filter(|k| !k.is_empty()).collect();
        // Alternation is leftmost-first: longer keys go first so the longest
        // key wins at any position.
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        if keys.is_empty() {
            return Self {
                map,
                matcher: Matcher::None,
            };
        }

        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = match Regex::new(&alternation) {
            Ok(pattern) => Matcher::Pattern(pattern),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    keys = keys.len(),
                    error = %_err,
                    "placeholder pattern did not compile; scanning keys one by one"
                );
                Matcher::Scan(keys)
            }
        };
        Self { map, matcher }
    }

    fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.matcher {
            Matcher::None => Vec::new(),
            Matcher::Pattern(pattern) => pattern
                .find_iter(text)
                .map(|m| (m.start(), m.end()))
                .collect(),
            Matcher::Scan(keys) => scan_keys(text, keys),
        }
    }

    pub fn document(&self, doc: &mut Document) -> SubstitutionReport {
        let mut report = SubstitutionReport::default();
        for paragraph in &mut doc.paragraphs {
            self.paragraph_into(paragraph, &mut report);
        }
        report
    }

    pub fn paragraph(&self, paragraph: &mut Paragraph) -> SubstitutionReport {
        let mut report = SubstitutionReport::default();
        self.paragraph_into(paragraph, &mut report);
        report
    }

    fn paragraph_into(&self, paragraph: &mut Paragraph, report: &mut SubstitutionReport) {
        let mut text = String::new();
        let mut bounds = Vec::with_capacity(paragraph.runs.len());
        for run in &paragraph.runs {
            let start = text.len();
            text.push_str(&run.text);
            bounds.push((start, text.len()));
        }

        for m in ANY_TOKEN.find_iter(&text) {
            if !self.map.contains(m.as_str()) {
                report.note_unmatched(m.as_str().to_string());
            }
        }

        let matches = self.find_matches(&text);
        for &(start, end) in matches.iter().rev() {
            let token = &text[start..end];
            let Some(value) = self.map.get(token) else {
                continue;
            };
            let (first, last) = spanned_runs(&bounds, start, end);

            if first == last {
                let offset = bounds[first].0;
                paragraph.runs[first]
                    .text
                    .replace_range(start - offset..end - offset, value);
            } else {
                let (first_start, _) = bounds[first];
                paragraph.runs[first]
                    .text
                    .replace_range(start - first_start.., value);
                for run in &mut paragraph.runs[first + 1..last] {
                    run.text.clear();
                }
                let (last_start, _) = bounds[last];
                paragraph.runs[last].text.replace_range(..end - last_start, "");
                report.split_runs += 1;
            }
            *report.replacements.entry(token.to_string()).or_default() += 1;
        }
    }
}

/// Leftmost, non-overlapping matches of `keys`, which are sorted longest first.
fn scan_keys(text: &str, keys: &[&str]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        match keys.iter().find(|k| rest.starts_with(**k)) {
            Some(key) => {
                out.push((pos, pos + key.len()));
                pos += key.len();
            }
            None => pos += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    out
}

/// Indices of the first and last runs covering the non-empty byte range
/// `start..end` of the concatenated text.
fn spanned_runs(bounds: &[(usize, usize)], start: usize, end: usize) -> (usize, usize) {
    let first = bounds.partition_point(|&(_, e)| e <= start);
    let last = first + bounds[first..].partition_point(|&(_, e)| e < end);
    (first, last)
}

/// Replace every mapped placeholder in `doc`.
///
/// Tokens without a map entry stay verbatim. Values are inserted as plain text
/// and never re-scanned.
pub fn substitute(doc: &mut Document, map: &PlaceholderMap) -> SubstitutionReport {
    Substituter::new(map).document(doc)
}

pub fn substitute_paragraph(paragraph: &mut Paragraph, map: &PlaceholderMap) -> SubstitutionReport {
    Substituter::new(map).paragraph(paragraph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Run;

    fn map(pairs: &[(&str, &str)]) -> PlaceholderMap {
        pairs.iter().copied().collect()
    }

    fn runs(p: &Paragraph) -> Vec<&str> {
        p.runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn single_run_tokens() {
        let mut doc = Document::new(vec![Paragraph::from_texts(&[
            "Município: {{Nome}}, população {{Pop}}.",
        ])]);
        let report = substitute(
            &mut doc,
            &map(&[("{{Nome}}", "Tucano"), ("{{Pop}}", "12345")]),
        );
        assert_eq!(doc.texts(), vec!["Município: Tucano, população 12345."]);
        assert_eq!(report.total(), 2);
        assert_eq!(report.split_runs, 0);
    }

    #[test]
    fn token_split_across_two_runs() {
        let mut p = Paragraph::from_texts(&["Município: {{Nom", "e}}"]);
        let report = substitute_paragraph(&mut p, &map(&[("{{Nome}}", "Tucano")]));
        assert_eq!(p.text(), "Município: Tucano");
        assert_eq!(runs(&p), vec!["Município: Tucano", ""]);
        assert_eq!(report.split_runs, 1);
    }

    #[test]
    fn split_keeps_outside_text_in_its_runs() {
        let mut p = Paragraph::new(vec![
            Run::with_format("Pop: {", "<w:rPr><w:b/></w:rPr>"),
            Run::with_format("{Po", "<w:rPr><w:i/></w:rPr>"),
            Run::new("p}"),
            Run::with_format("} hab.", "<w:rPr><w:u/></w:rPr>"),
            Run::new(" Fim"),
        ]);
        substitute_paragraph(&mut p, &map(&[("{{Pop}}", "52418")]));

        assert_eq!(runs(&p), vec!["Pop: 52418", "", "", " hab.", " Fim"]);
        assert_eq!(p.runs.len(), 5);
        assert_eq!(p.runs[0].format.0, "<w:rPr><w:b/></w:rPr>");
        assert_eq!(p.runs[3].format.0, "<w:rPr><w:u/></w:rPr>");
    }

    #[test]
    fn unmapped_tokens_stay_and_are_reported() {
        let mut p = Paragraph::from_texts(&["{{A}} e {{Desconhecido}} e {{A}}"]);
        let report = substitute_paragraph(&mut p, &map(&[("{{A}}", "1")]));
        assert_eq!(p.text(), "1 e {{Desconhecido}} e 1");
        assert_eq!(report.replacements.get("{{A}}"), Some(&2));
        assert_eq!(report.unmatched, vec!["{{Desconhecido}}".to_string()]);
    }

    #[test]
    fn values_are_not_rescanned() {
        let mut p = Paragraph::from_texts(&["{{A}}{{B}}"]);
        let report = substitute_paragraph(&mut p, &map(&[("{{A}}", "{{B}}"), ("{{B}}", "x")]));
        assert_eq!(p.text(), "{{B}}x");
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn longest_key_wins_at_a_position() {
        let mut p = Paragraph::from_texts(&["{{VAB}} {{VAB}}Total}}"]);
        substitute_paragraph(
            &mut p,
            &map(&[("{{VAB}}", "1"), ("{{VAB}}Total}}", "2")]),
        );
        assert_eq!(p.text(), "1 2");
    }

    #[test]
    fn second_pass_is_a_noop() {
        let m = map(&[("{{Nome}}", "Tucano")]);
        let mut doc = Document::new(vec![
            Paragraph::from_texts(&["Município: {{Nom", "e}}"]),
            Paragraph::from_texts(&["{{Nome}} / {{Outro}}"]),
        ]);
        substitute(&mut doc, &m);
        let once = doc.clone();
        let report = substitute(&mut doc, &m);
        assert_eq!(doc, once);
        assert!(report.is_noop());
        assert_eq!(report.unmatched, vec!["{{Outro}}".to_string()]);
    }

    #[test]
    fn empty_map_changes_nothing() {
        let mut p = Paragraph::from_texts(&["{{Nome}}"]);
        let report = substitute_paragraph(&mut p, &PlaceholderMap::new());
        assert_eq!(p.text(), "{{Nome}}");
        assert_eq!(report.unmatched, vec!["{{Nome}}".to_string()]);
    }

    #[test]
    fn empty_runs_inside_a_span_are_skipped() {
        let mut p = Paragraph::from_texts(&["", "{{N", "", "ome}}", ""]);
        substitute_paragraph(&mut p, &map(&[("{{Nome}}", "Tucano")]));
        assert_eq!(runs(&p), vec!["", "Tucano", "", "", ""]);
    }

    #[test]
    fn special_characters_are_literal() {
        let mut p = Paragraph::from_texts(&["% agro: {{% Agro (PIB)}}"]);
        substitute_paragraph(&mut p, &map(&[("{{% Agro (PIB)}}", "12,5 & mais")]));
        assert_eq!(p.text(), "% agro: 12,5 & mais");
    }

    fn scanning(map: &PlaceholderMap) -> Substituter<'_> {
        let mut keys: Vec<&str> = map.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Substituter {
            map,
            matcher: Matcher::Scan(keys),
        }
    }

    #[test]
    fn key_scan_agrees_with_the_pattern() {
        let m = map(&[("{{VAB}}", "1"), ("{{VAB}}Total}}", "2"), ("{{Área}}", "3")]);
        let regex = Substituter::new(&m);
        let scan = scanning(&m);
        for text in [
            "{{VAB}} {{VAB}}Total}}",
            "ÁÁ{{Área}}{{Área}}x",
            "{{{VAB}}}",
            "",
            "sem tokens",
        ] {
            assert_eq!(scan.find_matches(text), regex.find_matches(text), "{text}");
        }
    }

    #[test]
    fn key_scan_substitutes_split_runs() {
        let m = map(&[("{{Nome}}", "Tucano"), ("{{Pop}}", "52418")]);
        let mut p = Paragraph::from_texts(&["Município: {{Nom", "e}}, pop. {{Pop}}"]);
        let report = scanning(&m).paragraph(&mut p);
        assert_eq!(p.text(), "Município: Tucano, pop. 52418");
        assert_eq!(report.split_runs, 1);
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn report_merge_accumulates() {
        let mut a = SubstitutionReport::default();
        a.replacements.insert("{{A}}".into(), 1);
        a.unmatched.push("{{X}}".into());
        let mut b = SubstitutionReport::default();
        b.replacements.insert("{{A}}".into(), 2);
        b.split_runs = 1;
        b.unmatched.push("{{X}}".into());
        b.unmatched.push("{{Y}}".into());
        a.merge(b);
        assert_eq!(a.replacements.get("{{A}}"), Some(&3));
        assert_eq!(a.split_runs, 1);
        assert_eq!(a.unmatched, vec!["{{X}}".to_string(), "{{Y}}".to_string()]);
    }
}
