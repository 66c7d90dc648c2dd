use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;

static VOCAB_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/vocab");

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("vocabulary file not found: {0}")]
    NotFound(String),
    #[error("vocabulary file {0} is not valid utf-8")]
    Encoding(String),
    #[error("unable to deserialize vocabulary {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("vocabulary {0} has no tokens")]
    Empty(String),
}

/// Which built-in list stimuli are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyKind {
    Words,
    Letters,
}

impl VocabularyKind {
    pub fn from_letters_only(letters_only: bool) -> Self {
        if letters_only {
            Self::Letters
        } else {
            Self::Words
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Self::Words => "words.json",
            Self::Letters => "letters.json",
        }
    }
}

#[derive(Deserialize)]
struct VocabularyFile {
    name: String,
    tokens: Vec<String>,
}

/// An immutable list of distinct tokens. Two tokens that differ only in case
/// count as the same token; the first spelling wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    name: String,
    tokens: Vec<String>,
}

impl Vocabulary {
    pub fn load(kind: VocabularyKind) -> Result<Self, VocabularyError> {
        read_vocabulary_from_file(kind.file_name())
    }

    pub fn from_tokens<I, S>(name: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| {
                let t: String = t.into();
                t.trim().to_string()
            })
            .filter(|t| !t.is_empty())
            .unique_by(|t| t.to_lowercase())
            .collect();
        Self {
            name: name.into(),
            tokens,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn read_vocabulary_from_file(file_name: &str) -> Result<Vocabulary, VocabularyError> {
    let file = VOCAB_DIR
        .get_file(file_name)
        .ok_or_else(|| VocabularyError::NotFound(file_name.to_string()))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| VocabularyError::Encoding(file_name.to_string()))?;

    let parsed: VocabularyFile =
        serde_json::from_str(contents).map_err(|source| VocabularyError::Parse {
            file: file_name.to_string(),
            source,
        })?;

    let vocab = Vocabulary::from_tokens(parsed.name, parsed.tokens);
    if vocab.is_empty() {
        return Err(VocabularyError::Empty(vocab.name));
    }
    Ok(vocab)
}

/// Both built-in vocabularies, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Vocabularies {
    words: Vocabulary,
    letters: Vocabulary,
}

impl Vocabularies {
    pub fn load() -> Result<Self, VocabularyError> {
        Ok(Self {
            words: Vocabulary::load(VocabularyKind::Words)?,
            letters: Vocabulary::load(VocabularyKind::Letters)?,
        })
    }

    pub fn new(words: Vocabulary, letters: Vocabulary) -> Self {
        Self { words, letters }
    }

    pub fn get(&self, kind: VocabularyKind) -> &Vocabulary {
        match kind {
            VocabularyKind::Words => &self.words,
            VocabularyKind::Letters => &self.letters,
        }
    }
}
