//! Property tests: records do not depend on how the stream is split

use proptest::prelude::*;
use scrivener_domain::Record;
use scrivener_extractor::{extract_all, ExtractorConfig, RecordExtractor, UnterminatedPolicy};

/// Split `text` at the given (sorted, deduplicated) char-boundary offsets
fn split_at(text: &str, cuts: &[usize]) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        pieces.push(text[start..cut].to_string());
        start = cut;
    }
    pieces.push(text[start..].to_string());
    pieces
}

fn run(config: &ExtractorConfig, fragments: &[String]) -> (Vec<Record>, Vec<String>) {
    let mut extractor = RecordExtractor::new(config.clone());
    let mut records = Vec::new();
    for fragment in fragments {
        records.extend(extractor.observe(fragment));
    }
    records.extend(extractor.finalize());
    (records, extractor.take_unterminated())
}

fn snippet() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,12}",
        "[a-z./]{1,10}".prop_map(|p| format!("<file path=\"{}\">", p)),
        Just("</file>".to_string()),
        Just("<file path=\"".to_string()),
        Just("\"".to_string()),
        Just(">".to_string()),
        Just("<".to_string()),
        "[ \n]{0,3}",
        Just("é€".to_string()),
    ]
}

fn stream_text() -> impl Strategy<Value = String> {
    prop::collection::vec(snippet(), 0..24).prop_map(|parts| parts.concat())
}

fn text_with_cuts() -> impl Strategy<Value = (String, Vec<usize>)> {
    stream_text().prop_flat_map(|text| {
        let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let cuts = if boundaries.is_empty() {
            Just(Vec::new()).boxed()
        } else {
            prop::collection::vec(prop::sample::select(boundaries), 0..8).boxed()
        };
        (Just(text), cuts)
    })
}

proptest! {
    #[test]
    fn prop_split_stream_matches_whole_stream((text, mut cuts) in text_with_cuts()) {
        cuts.sort_unstable();
        cuts.dedup();

        let config = ExtractorConfig {
            unterminated: UnterminatedPolicy::Report,
            ..ExtractorConfig::default()
        };
        let whole = run(&config, &[text.clone()]);
        let split = run(&config, &split_at(&text, &cuts));

        prop_assert_eq!(whole, split);
    }

    #[test]
    fn prop_empty_fragments_change_nothing(text in stream_text()) {
        let config = ExtractorConfig::default();
        let mut padded = Vec::new();
        for ch in text.chars() {
            padded.push(String::new());
            padded.push(ch.to_string());
        }
        padded.push(String::new());

        let (records, _) = run(&config, &padded);
        prop_assert_eq!(records, extract_all(&text));
    }

    #[test]
    fn prop_well_formed_records_round_trip(
        files in prop::collection::vec(("[a-z]{1,8}\\.txt", "[a-z \n]{0,20}"), 0..6)
    ) {
        let text: String = files
            .iter()
            .map(|(path, body)| format!("prose <file path=\"{}\">{}</file>\n", path, body))
            .collect();

        let records = extract_all(&text);
        let expected: Vec<Record> = files
            .iter()
            .map(|(path, body)| Record::new(path.clone(), body.trim()))
            .collect();

        prop_assert_eq!(records, expected);
    }
}
