//! Token counting - Model resolution and token estimation for merged files
//!
//! Provides token counts using tiktoken BPE encodings, resolved from a model
//! name the way OpenAI tooling does it, with a fast heuristic fallback.
//!
//! Resolution order:
//! - explicit aliases (`gpt-4`, `gpt-4o`, `cl100k_base`, `claude`, `heuristic`, ...)
//! - any OpenAI model name tiktoken knows (`gpt-4-0613`, `text-davinci-003`, ...)

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::tokenizer::{get_tokenizer, Tokenizer as TiktokenFamily};
use tiktoken_rs::{cl100k_base, o200k_base, p50k_base, r50k_base, CoreBPE};

use crate::core::error::MergeError;

/// Supported encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// cl100k_base encoding (GPT-4, GPT-3.5-turbo, Claude 3 approximation)
    #[default]
    Cl100k,
    /// o200k_base encoding (GPT-4o family)
    O200k,
    /// p50k_base encoding (Codex, text-davinci-002/003)
    P50k,
    /// r50k_base encoding (GPT-3 / GPT-2)
    R50k,
    /// Fast heuristic estimation (no BPE encoding)
    Heuristic,
}

impl TokenModel {
    fn get_bpe(&self) -> Option<&'static CoreBPE> {
        match self {
            TokenModel::Cl100k => CL100K_BPE.as_ref().ok(),
            TokenModel::O200k => O200K_BPE.as_ref().ok(),
            TokenModel::P50k => P50K_BPE.as_ref().ok(),
            TokenModel::R50k => R50K_BPE.as_ref().ok(),
            TokenModel::Heuristic => None,
        }
    }

    /// Accepted model aliases, as listed by `--list-models`
    pub fn available_models() -> &'static [&'static str] {
        &[
            "gpt-4",
            "gpt-4o",
            "gpt-3.5-turbo",
            "cl100k_base",
            "o200k_base",
            "p50k_base",
            "r50k_base",
            "claude",
            "heuristic",
        ]
    }

    /// Resolve a model or encoding name, falling back to tiktoken's model table
    pub fn resolve(name: &str) -> Option<Self> {
        if let Ok(model) = name.parse() {
            return Some(model);
        }
        match get_tokenizer(name)? {
            TiktokenFamily::O200kBase => Some(TokenModel::O200k),
            TiktokenFamily::Cl100kBase => Some(TokenModel::Cl100k),
            TiktokenFamily::P50kBase | TiktokenFamily::P50kEdit => Some(TokenModel::P50k),
            TiktokenFamily::R50kBase | TiktokenFamily::Gpt2 => Some(TokenModel::R50k),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::Cl100k => "cl100k_base",
            TokenModel::O200k => "o200k_base",
            TokenModel::P50k => "p50k_base",
            TokenModel::R50k => "r50k_base",
            TokenModel::Heuristic => "heuristic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" | "gpt4" | "gpt-4" | "gpt-4-turbo" | "gpt35"
            | "gpt-3.5" | "gpt-3.5-turbo" | "claude" | "claude3" | "claude-3"
            | "claude-3.5" => Ok(TokenModel::Cl100k),
            "o200k" | "o200k_base" | "gpt4o" | "gpt-4o" | "gpt-4o-mini" => Ok(TokenModel::O200k),
            "p50k" | "p50k_base" => Ok(TokenModel::P50k),
            "r50k" | "r50k_base" | "gpt2" => Ok(TokenModel::R50k),
            "heuristic" | "fast" | "estimate" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "Unknown model: {}. Available: {}",
                s,
                TokenModel::available_models().join(", ")
            )),
        }
    }
}

// Lazy-initialized BPE encodings (loaded once on first use)
static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("Failed to load cl100k_base: {}", e)));

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("Failed to load o200k_base: {}", e)));

static P50K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| p50k_base().map_err(|e| format!("Failed to load p50k_base: {}", e)));

static R50K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| r50k_base().map_err(|e| format!("Failed to load r50k_base: {}", e)));

/// A resolved tokenizer bound to the model name the user asked for
#[derive(Debug, Clone)]
pub struct Tokenizer {
    model: String,
    encoding: TokenModel,
}

impl Tokenizer {
    /// Resolve `model`; unknown names are a setup error
    pub fn for_model(model: &str) -> Result<Self, MergeError> {
        let encoding = TokenModel::resolve(model).ok_or_else(|| MergeError::UnknownModel {
            model: model.to_string(),
            available: TokenModel::available_models().join(", "),
        })?;

        Ok(Self {
            model: model.to_string(),
            encoding,
        })
    }

    /// The model name as given by the user
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn encoding(&self) -> TokenModel {
        self.encoding
    }

    /// Count tokens of raw file content. Invalid UTF-8 is decoded lossily.
    pub fn count_bytes(&self, content: &[u8]) -> usize {
        count_tokens(&String::from_utf8_lossy(content), self.encoding)
    }
}

/// Count tokens in text using the specified encoding
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    match model.get_bpe() {
        // File text never carries control tokens; `<|endoftext|>` is plain bytes here
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => estimate_tokens_heuristic(text),
    }
}

/// Rough token count for `--model heuristic`, without loading a BPE table.
///
/// Characters are bucketed and each bucket is divided by its typical width:
/// words and whitespace 4 chars per token, punctuation 2, CJK 1.5, any other
/// non-ASCII 2.
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    let mut words = 0usize;
    let mut punct = 0usize;
    let mut cjk = 0usize;
    let mut other = 0usize;

    for c in text.chars() {
        match CharClass::of(c) {
            CharClass::Word => words += 1,
            CharClass::Punct => punct += 1,
            CharClass::Cjk => cjk += 1,
            CharClass::Other => other += 1,
        }
    }

    words.div_ceil(4) + punct.div_ceil(2) + (cjk * 2).div_ceil(3) + other.div_ceil(2)
}

/// Token-width bucket of a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// ASCII letters, digits and whitespace
    Word,
    /// ASCII punctuation, which BPE tends to split finely
    Punct,
    Cjk,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_punctuation() {
            CharClass::Punct
        } else if c.is_ascii() {
            CharClass::Word
        } else if is_cjk(c) {
            CharClass::Cjk
        } else {
            CharClass::Other
        }
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x30FF      // punctuation, hiragana, katakana
        | 0x3400..=0x4DBF    // ideographs ext. A
        | 0x4E00..=0x9FFF    // unified ideographs
        | 0xAC00..=0xD7AF    // hangul
        | 0xFF00..=0xFFEF)   // fullwidth forms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_empty() {
        assert_eq!(count_tokens("", TokenModel::default()), 0);
        assert_eq!(count_tokens("", TokenModel::Heuristic), 0);
    }

    #[test]
    fn test_count_tokens_hello() {
        // "hello" is a single cl100k token
        assert_eq!(count_tokens("hello", TokenModel::Cl100k), 1);
    }

    #[test]
    fn test_count_tokens_code() {
        let text = r#"fn main() { println!("Hello"); }"#;
        let tokens = count_tokens(text, TokenModel::Cl100k);
        assert!(tokens > 0 && tokens < text.len());
    }

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(TokenModel::resolve("gpt-4"), Some(TokenModel::Cl100k));
        assert_eq!(TokenModel::resolve("GPT-4o"), Some(TokenModel::O200k));
        assert_eq!(TokenModel::resolve("claude"), Some(TokenModel::Cl100k));
        assert_eq!(TokenModel::resolve("heuristic"), Some(TokenModel::Heuristic));
    }

    #[test]
    fn test_resolve_through_tiktoken_table() {
        assert_eq!(TokenModel::resolve("gpt-4-0613"), Some(TokenModel::Cl100k));
        assert_eq!(TokenModel::resolve("text-davinci-003"), Some(TokenModel::P50k));
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(TokenModel::resolve("definitely-not-a-model"), None);
    }

    #[test]
    fn test_tokenizer_for_unknown_model_fails() {
        let err = Tokenizer::for_model("definitely-not-a-model").unwrap_err();
        assert!(matches!(err, MergeError::UnknownModel { .. }));
    }

    #[test]
    fn test_tokenizer_keeps_user_model_name() {
        let tokenizer = Tokenizer::for_model("gpt-4").unwrap();
        assert_eq!(tokenizer.model(), "gpt-4");
        assert_eq!(tokenizer.encoding(), TokenModel::Cl100k);
    }

    #[test]
    fn test_count_bytes_tolerates_invalid_utf8() {
        let tokenizer = Tokenizer::for_model("gpt-4").unwrap();
        let tokens = tokenizer.count_bytes(&[0x89, b'P', b'N', b'G', 0xff, 0x00]);
        assert!(tokens > 0);
    }

    #[test]
    fn test_special_token_text_counts_as_plain_bytes() {
        // As a special token this would be exactly 1
        let tokens = count_tokens("<|endoftext|>", TokenModel::Cl100k);
        assert!(tokens > 1);
    }

    #[test]
    fn test_heuristic_buckets() {
        assert_eq!(estimate_tokens_heuristic(""), 0);
        // 8 word chars -> 2, 2 punctuation -> 1
        assert_eq!(estimate_tokens_heuristic("abcd efg()"), 2 + 1);
        // 3 CJK -> 2
        assert_eq!(estimate_tokens_heuristic("中文字"), 2);
    }

    #[test]
    fn test_heuristic_model_used_for_counting() {
        let tokenizer = Tokenizer::for_model("heuristic").unwrap();
        assert_eq!(tokenizer.count_bytes(b"abcdabcd"), 2);
    }

    #[test]
    fn test_model_display() {
        assert_eq!(TokenModel::Cl100k.to_string(), "cl100k_base");
        assert_eq!(TokenModel::O200k.to_string(), "o200k_base");
    }

    #[test]
    fn test_char_class() {
        assert_eq!(CharClass::of('a'), CharClass::Word);
        assert_eq!(CharClass::of(' '), CharClass::Word);
        assert_eq!(CharClass::of('{'), CharClass::Punct);
        assert_eq!(CharClass::of('あ'), CharClass::Cjk);
        assert_eq!(CharClass::of('한'), CharClass::Cjk);
        assert_eq!(CharClass::of('é'), CharClass::Other);
    }
}
