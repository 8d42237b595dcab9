//! Single-byte charset recognizer.
//!
//! The sample is decoded through the charset's code page and scored by
//! each language model attached to the charset. Bytes without a mapping
//! read as spaces.

use std::sync::Arc;

use super::ngram::{LanguageModel, collect_trigrams};
use crate::tables::CodePage;

/// Best language and its confidence, or `None` without models
pub(crate) fn best_language(
    page: &CodePage,
    models: &[Arc<LanguageModel>],
    bytes: &[u8],
    trigrams: &mut Vec<u64>,
) -> Option<(&'static str, u8)> {
    let text = bytes.iter().map(|&byte| {
        page.decode(byte)
            .and_then(|unit| char::from_u32(u32::from(unit)))
            .unwrap_or(' ')
    });
    collect_trigrams(text, trigrams);

    models
        .iter()
        .map(|model| (model.language(), model.confidence(&trigrams[..])))
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Encoding;
    use crate::tables::code_page;

    fn models(langs: &[&'static str]) -> Vec<Arc<LanguageModel>> {
        langs
            .iter()
            .map(|&lang| {
                let corpus = match lang {
                    "en" => include_str!("../../data/lang/en.txt"),
                    "fr" => include_str!("../../data/lang/fr.txt"),
                    "ru" => include_str!("../../data/lang/ru.txt"),
                    _ => unreachable!(),
                };
                Arc::new(LanguageModel::from_corpus(lang, corpus).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_picks_best_language() {
        let page = code_page(Encoding::ISO_8859_1).unwrap();
        let text = "Le gouvernement a pr\u{e9}sent\u{e9} hier un nouveau projet de loi sur \
                    l'\u{e9}ducation. Les syndicats des enseignants ont d\u{e9}j\u{e0} annonc\u{e9} \
                    qu'ils \u{e9}taient tr\u{e8}s inquiets.";
        let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
        let mut scratch = Vec::new();
        let (language, confidence) =
            best_language(page, &models(&["en", "fr"]), &bytes, &mut scratch).unwrap();
        assert_eq!(language, "fr");
        assert_eq!(confidence, 100);
    }

    #[test]
    fn test_wrong_code_page_scores_low() {
        let ru = "Правительство вчера представило новый законопроект об образовании. \
                  Профсоюзы учителей уже заявили, что они очень обеспокоены этими изменениями.";
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(ru);
        let models = models(&["ru"]);
        let mut scratch = Vec::new();

        let right = best_language(code_page(Encoding::WINDOWS_1251).unwrap(), &models, &bytes, &mut scratch);
        let wrong = best_language(code_page(Encoding::KOI8_R).unwrap(), &models, &bytes, &mut scratch);
        let (_, right) = right.unwrap();
        let (_, wrong) = wrong.unwrap();
        assert!(right > 50, "{right}");
        assert!(wrong < right / 2, "{wrong} vs {right}");
    }

    #[test]
    fn test_no_models() {
        let page = code_page(Encoding::ISO_8859_1).unwrap();
        assert_eq!(best_language(page, &[], b"text", &mut Vec::new()), None);
    }

    #[test]
    fn test_ties_prefer_smaller_language() {
        let page = code_page(Encoding::ISO_8859_1).unwrap();
        let same = |lang| Arc::new(LanguageModel::from_corpus(lang, "the cat").unwrap());
        let models = vec![same("zz"), same("aa")];
        let (language, _) = best_language(page, &models, b"the cat", &mut Vec::new()).unwrap();
        assert_eq!(language, "aa");
    }
}
