//! Signature data for detection: which charsets can be recognized, and the
//! reference data each recognizer needs.
//!
//! The default table covers the Unicode encodings, the common CJK charsets
//! and the ISO-8859/Windows/KOI8/DOS/EBCDIC pages of sixteen languages. It
//! is built on first use and shared for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::input::InputText;
use super::mbcs::{self, Scheme};
use super::ngram::LanguageModel;
use super::{EncodingGuess, iso2022, sbcs, unicode};
use crate::tables::{CodePage, code_page};
use crate::{Encoding, Error, Family, Result};

/// Charsets of the default table, in reporting order
const DEFAULT_CHARSETS: &[Encoding] = &[
    Encoding::UTF8,
    Encoding::UTF16BE,
    Encoding::UTF16LE,
    Encoding::UTF32BE,
    Encoding::UTF32LE,
    Encoding::SHIFT_JIS,
    Encoding::EUC_JP,
    Encoding::ISO_2022_JP,
    Encoding::EUC_KR,
    Encoding::GB18030,
    Encoding::BIG5,
    Encoding::ISO_8859_1,
    Encoding::ISO_8859_2,
    Encoding::ISO_8859_5,
    Encoding::ISO_8859_6,
    Encoding::ISO_8859_7,
    Encoding::ISO_8859_8,
    Encoding::ISO_8859_9,
    Encoding::WINDOWS_1251,
    Encoding::WINDOWS_1256,
    Encoding::KOI8_R,
    Encoding::IBM866,
    Encoding::EBCDIC_037,
];

const WESTERN: &[&str] = &["en", "fr", "de", "es", "it", "pt", "nl", "sv"];
const CENTRAL: &[&str] = &["cs", "hu", "pl"];

/// Frequent Japanese characters: kana, punctuation and common kanji
const COMMON_JA: &str = "のにはをたがでてとしれさあいうえおかきくけこすせそつなねへまみむめもやゆよらりるろわんっゃゅょ\
    アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワンッャュョー、。「」\
    日本人年大中出生会自上子事時行見月分後前間地手思新社学国言同長何者気通合";

/// Frequent simplified Chinese characters
const COMMON_ZH: &str = "的一是不了在人有我他这个们中来上大为和国地到以说时要就出会可也你对生能而子那得于着下自之年过发后作里用道行所然家种事成方多经么去法学如都同现当没动面起看定天分还进好小部其些主样理心她本前开但因只从想实日军者意无力它与长把机十民第公此已工使情明性知全三又关点正业外将两高间由问很最重并物手应战向头文体政美相见被利什二等产或新己制身果加西月话合回特代内信表化老给世位次度门任常先海通教儿原东声提立及比员解水名真论处走义各入几口认条平系气题活尔更别打女变四神总何电数安少报才结反受目太量再感建务做接必场件计管期市直德资命山金指克许统区保至队形社便空决治展马科司五基眼书非则听白却界达光放强即像难且权思王象完设式色路记南品住告类求据程北边死张该交规万取拉格望觉术领共确传师观清今切院让识候带导争运笔，。";

/// Frequent traditional Chinese characters
const COMMON_TW: &str = "的一是不了在人有我他這個們中來上大為和國地到以說時要就出會可也你對生能而子那得於著下自之年過發後作裡用道行所然家種事成方多經麼去法學如都同現當沒動面起看定天分還進好小部其些主樣理心她本前開但因只從想實日軍者意無力它與長把機十民第公此已工使情明性知全三又關點正業外將兩高間由問很最重並物手應戰向頭文體政美相見被利什二等產或新己制身果加西月話合回特代內信表化老給世位次度門任常先海通教兒原東聲提立及比員解水名真論處走義各入幾口認條平系氣題活爾更別打女變四神總何電數安少報才結反受目太量再感建務做接必場件計管期市直德資命山金指克許統區保至隊形社便空決治展馬科司五基眼書非則聽白卻界達光放強即像難且權思王象完設式色路記南品住告類求據程北邊死張該交規萬取拉格望覺術領共確傳師觀清今切院讓識候帶導爭運筆，。";

/// Frequent Hangul syllables
const COMMON_KO: &str = "이다는의에가고을하지로기서한대사자리도수게어인있나일정시니으해아들와과국적전부요상주라만것보그우성원되여면제학장동경구했까내중세저미소위무마말화비신오문를은년람각때모든없더많같";

/// Reference text compiled in for a language code
fn corpus(language: &str) -> Option<&'static str> {
    let text = match language {
        "ar" => include_str!("../../data/lang/ar.txt"),
        "cs" => include_str!("../../data/lang/cs.txt"),
        "de" => include_str!("../../data/lang/de.txt"),
        "el" => include_str!("../../data/lang/el.txt"),
        "en" => include_str!("../../data/lang/en.txt"),
        "es" => include_str!("../../data/lang/es.txt"),
        "fr" => include_str!("../../data/lang/fr.txt"),
        "he" => include_str!("../../data/lang/he.txt"),
        "hu" => include_str!("../../data/lang/hu.txt"),
        "it" => include_str!("../../data/lang/it.txt"),
        "nl" => include_str!("../../data/lang/nl.txt"),
        "pl" => include_str!("../../data/lang/pl.txt"),
        "pt" => include_str!("../../data/lang/pt.txt"),
        "ru" => include_str!("../../data/lang/ru.txt"),
        "sv" => include_str!("../../data/lang/sv.txt"),
        "tr" => include_str!("../../data/lang/tr.txt"),
        _ => return None,
    };
    Some(text)
}

/// Languages scored for a single-byte charset by default
fn default_languages(encoding: Encoding) -> &'static [&'static str] {
    match encoding {
        Encoding::ISO_8859_1 | Encoding::ISO_8859_15 | Encoding::WINDOWS_1252 => WESTERN,
        Encoding::MAC_ROMAN | Encoding::CP_437 | Encoding::CP_850 | Encoding::EBCDIC_500 => WESTERN,
        Encoding::EBCDIC_037 => &["en"],
        Encoding::ISO_8859_2 | Encoding::WINDOWS_1250 => CENTRAL,
        Encoding::ISO_8859_5
        | Encoding::WINDOWS_1251
        | Encoding::KOI8_R
        | Encoding::IBM866
        | Encoding::MAC_CYRILLIC => &["ru"],
        Encoding::ISO_8859_6 | Encoding::WINDOWS_1256 => &["ar"],
        Encoding::ISO_8859_7 | Encoding::WINDOWS_1253 => &["el"],
        Encoding::ISO_8859_8 | Encoding::WINDOWS_1255 => &["he"],
        Encoding::ISO_8859_9 | Encoding::WINDOWS_1254 => &["tr"],
        _ => &[],
    }
}

/// Language reported for a CJK charset
fn cjk_language(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::SHIFT_JIS | Encoding::EUC_JP | Encoding::ISO_2022_JP => "ja",
        Encoding::EUC_KR => "ko",
        Encoding::GBK | Encoding::GB18030 | Encoding::BIG5 => "zh",
        _ => "",
    }
}

fn default_common_chars(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::SHIFT_JIS | Encoding::EUC_JP => COMMON_JA,
        Encoding::EUC_KR => COMMON_KO,
        Encoding::GBK | Encoding::GB18030 => COMMON_ZH,
        Encoding::BIG5 => COMMON_TW,
        _ => "",
    }
}

fn scheme(encoding: Encoding) -> Option<Scheme> {
    match encoding {
        Encoding::SHIFT_JIS => Some(Scheme::ShiftJis),
        Encoding::EUC_JP | Encoding::EUC_KR => Some(Scheme::Euc),
        Encoding::GBK | Encoding::GB18030 => Some(Scheme::Gb18030),
        Encoding::BIG5 => Some(Scheme::Big5),
        _ => None,
    }
}

/// Windows page reported instead of an ISO page when C1 bytes occur
fn c1_variant(encoding: Encoding) -> Option<Encoding> {
    match encoding {
        Encoding::ISO_8859_1 => Some(Encoding::WINDOWS_1252),
        Encoding::ISO_8859_2 => Some(Encoding::WINDOWS_1250),
        Encoding::ISO_8859_7 => Some(Encoding::WINDOWS_1253),
        Encoding::ISO_8859_8 => Some(Encoding::WINDOWS_1255),
        Encoding::ISO_8859_9 => Some(Encoding::WINDOWS_1254),
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum Recognizer {
    Utf8,
    Utf16 {
        big_endian: bool,
    },
    Utf32 {
        big_endian: bool,
    },
    Mbcs {
        scheme: Scheme,
        codec: &'static encoding_rs::Encoding,
        language: &'static str,
        common: Arc<[char]>,
    },
    Iso2022Jp,
    SingleByte {
        page: &'static CodePage,
        models: Vec<Arc<LanguageModel>>,
        c1_variant: Option<(Encoding, &'static CodePage)>,
    },
}

/// One detectable charset and the data to recognize it
#[derive(Debug, Clone)]
pub(crate) struct CharsetSignature {
    encoding: Encoding,
    recognizer: Recognizer,
}

impl CharsetSignature {
    pub(crate) fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Score the prepared input; `None` when nothing can be said
    pub(crate) fn recognize(
        &self,
        input: &InputText,
        trigrams: &mut Vec<u64>,
    ) -> Option<EncodingGuess> {
        let bytes = input.bytes();
        let name = self.encoding.name();
        let (charset, language, confidence) = match &self.recognizer {
            Recognizer::Utf8 => (name, "", unicode::utf8(bytes)),
            Recognizer::Utf16 { big_endian } => (name, "", unicode::utf16(bytes, *big_endian)),
            Recognizer::Utf32 { big_endian } => (name, "", unicode::utf32(bytes, *big_endian)),
            Recognizer::Mbcs {
                scheme,
                codec,
                language,
                common,
            } => (name, *language, mbcs::confidence(*scheme, *codec, common, bytes)),
            Recognizer::Iso2022Jp => (name, "ja", iso2022::confidence(bytes)),
            Recognizer::SingleByte {
                page,
                models,
                c1_variant,
            } => {
                let (encoding, page) = match c1_variant {
                    Some((variant, variant_page)) if input.has_c1() => (*variant, *variant_page),
                    _ => (self.encoding, *page),
                };
                let (language, confidence) = sbcs::best_language(page, models, bytes, trigrams)?;
                (encoding.name(), language, confidence)
            }
        };
        Some(EncodingGuess {
            charset,
            language,
            confidence,
        })
    }
}

/// The detectable charsets with their reference data.
///
/// Immutable once built; detectors share it through `Arc`.
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    signatures: Vec<CharsetSignature>,
}

static SHARED: Lazy<Result<Arc<SignatureTable>>> =
    Lazy::new(|| SignatureTableBuilder::with_defaults().build().map(Arc::new));

impl SignatureTable {
    /// The default table, built on first use
    pub fn shared() -> Result<Arc<SignatureTable>> {
        SHARED.clone()
    }

    /// Charsets in the table, in reporting order
    pub fn charsets(&self) -> impl Iterator<Item = Encoding> + '_ {
        self.signatures.iter().map(CharsetSignature::encoding)
    }

    /// Number of charsets
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the table has no charsets at all
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Copy of the table limited to the named charsets.
    ///
    /// Every name must resolve to a charset already in the table.
    pub fn restricted<S: AsRef<str>>(&self, names: &[S]) -> Result<SignatureTable> {
        let mut keep = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let encoding = Encoding::for_name(name)
                .ok_or_else(|| Error::InvalidConfig(format!("unknown charset '{name}'")))?;
            if !self.signatures.iter().any(|s| s.encoding == encoding) {
                return Err(Error::InvalidConfig(format!(
                    "charset '{name}' is not detectable"
                )));
            }
            keep.push(encoding);
        }
        Ok(SignatureTable {
            signatures: self
                .signatures
                .iter()
                .filter(|s| keep.contains(&s.encoding))
                .cloned()
                .collect(),
        })
    }

    pub(crate) fn signatures(&self) -> &[CharsetSignature] {
        &self.signatures
    }
}

#[derive(Debug, Clone)]
struct Entry {
    encoding: Encoding,
    builtin: bool,
    languages: Vec<(&'static str, String)>,
    common: Option<String>,
}

/// Assembles a [`SignatureTable`].
///
/// Charsets added with [`charset`](Self::charset) or
/// [`with_defaults`](Self::with_defaults) use the reference data compiled
/// into the crate. Custom corpora and common-character sets are added on
/// top of it, or alone for charsets only named through
/// [`language`](Self::language) or [`common_chars`](Self::common_chars).
///
/// ```
/// use charsniff::{CharsetDetector, DetectorConfig, Encoding, SignatureTableBuilder};
/// use std::sync::Arc;
///
/// let table = SignatureTableBuilder::new()
///     .charset(Encoding::UTF8)
///     .language(Encoding::ISO_8859_1, "xx", "lorem ipsum dolor sit amet")
///     .build()
///     .unwrap();
/// assert_eq!(table.len(), 2);
///
/// let mut detector = CharsetDetector::with_table(Arc::new(table), DetectorConfig::default()).unwrap();
/// let guesses = detector.detect_all(b"lorem ipsum dolor", 5).unwrap();
/// assert_eq!(guesses[0].charset, "ISO-8859-1");
/// assert_eq!(guesses[0].language, "xx");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SignatureTableBuilder {
    entries: Vec<Entry>,
    restrict: Option<Vec<String>>,
}

impl SignatureTableBuilder {
    /// Builder with no charsets
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder holding every charset of the default table
    pub fn with_defaults() -> Self {
        DEFAULT_CHARSETS
            .iter()
            .fold(Self::new(), |builder, &encoding| builder.charset(encoding))
    }

    fn entry(&mut self, encoding: Encoding) -> &mut Entry {
        let index = match self.entries.iter().position(|e| e.encoding == encoding) {
            Some(index) => index,
            None => {
                self.entries.push(Entry {
                    encoding,
                    builtin: false,
                    languages: Vec::new(),
                    common: None,
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Add a charset with its compiled-in reference data
    pub fn charset(mut self, encoding: Encoding) -> Self {
        self.entry(encoding).builtin = true;
        self
    }

    /// Score a single-byte charset with a model built from `corpus`
    pub fn language(mut self, encoding: Encoding, language: &'static str, corpus: &str) -> Self {
        self.entry(encoding)
            .languages
            .push((language, corpus.to_string()));
        self
    }

    /// Replace the frequent characters counted for a CJK charset
    pub fn common_chars(mut self, encoding: Encoding, chars: &str) -> Self {
        self.entry(encoding).common = Some(chars.to_string());
        self
    }

    /// Keep only the named charsets when building
    pub fn charsets<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.restrict = Some(names.iter().map(|n| n.as_ref().to_string()).collect());
        self
    }

    /// Build reference data for every charset.
    ///
    /// Fails with [`Error::InvalidConfig`] for a charset no recognizer
    /// handles, a single-byte charset without languages, or a restriction
    /// naming a charset that was not added.
    pub fn build(self) -> Result<SignatureTable> {
        let mut models: HashMap<&'static str, Arc<LanguageModel>> = HashMap::new();
        let mut signatures = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            signatures.push(CharsetSignature {
                encoding: entry.encoding,
                recognizer: recognizer(entry, &mut models)?,
            });
        }

        let table = SignatureTable { signatures };
        let table = match &self.restrict {
            Some(names) => table.restricted(names)?,
            None => table,
        };
        tracing::debug!(
            charsets = table.len(),
            languages = models.len(),
            "built signature table"
        );
        Ok(table)
    }
}

fn recognizer(
    entry: &Entry,
    models: &mut HashMap<&'static str, Arc<LanguageModel>>,
) -> Result<Recognizer> {
    let encoding = entry.encoding;
    let recognizer = match encoding {
        Encoding::UTF8 => Recognizer::Utf8,
        Encoding::UTF16BE => Recognizer::Utf16 { big_endian: true },
        Encoding::UTF16LE => Recognizer::Utf16 { big_endian: false },
        Encoding::UTF32BE => Recognizer::Utf32 { big_endian: true },
        Encoding::UTF32LE => Recognizer::Utf32 { big_endian: false },
        Encoding::ISO_2022_JP => Recognizer::Iso2022Jp,
        _ if encoding.family() == Family::MultiByte => {
            let (Some(scheme), Some(codec)) = (scheme(encoding), encoding.legacy_codec()) else {
                return Err(not_detectable(encoding));
            };
            let chars = match &entry.common {
                Some(chars) => chars.as_str(),
                None if entry.builtin => default_common_chars(encoding),
                None => "",
            };
            let mut common: Vec<char> = chars.chars().collect();
            common.sort_unstable();
            common.dedup();
            Recognizer::Mbcs {
                scheme,
                codec,
                language: cjk_language(encoding),
                common: common.into(),
            }
        }
        _ if encoding.family() == Family::SingleByte => {
            let page = code_page(encoding).ok_or_else(|| not_detectable(encoding))?;

            let mut charset_models = Vec::new();
            if entry.builtin {
                for &language in default_languages(encoding) {
                    let model = match models.get(language) {
                        Some(model) => model.clone(),
                        None => {
                            let text = corpus(language).ok_or_else(|| {
                                Error::InvalidConfig(format!("no corpus for language '{language}'"))
                            })?;
                            let model = Arc::new(LanguageModel::from_corpus(language, text)?);
                            models.insert(language, model.clone());
                            model
                        }
                    };
                    charset_models.push(model);
                }
            }
            for (language, text) in &entry.languages {
                charset_models.push(Arc::new(LanguageModel::from_corpus(*language, text)?));
            }
            if charset_models.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "{encoding} has no language models"
                )));
            }

            Recognizer::SingleByte {
                page,
                models: charset_models,
                c1_variant: c1_variant(encoding)
                    .and_then(|variant| code_page(variant).map(|page| (variant, page))),
            }
        }
        _ => return Err(not_detectable(encoding)),
    };
    Ok(recognizer)
}

fn not_detectable(encoding: Encoding) -> Error {
    Error::InvalidConfig(format!("{encoding} cannot be detected"))
}
