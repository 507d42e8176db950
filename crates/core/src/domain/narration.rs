use std::time::Duration;

use serde::Serialize;

/// 発話の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UtteranceKind {
    Sentence,
    Author,
}

/// 1回分の発話（台本開始からのオフセット付き）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Utterance {
    #[serde(rename = "offset_ms", serialize_with = "serialize_millis")]
    pub offset: Duration,
    pub text: String,
    pub kind: UtteranceKind,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// 読み上げ台本。文ごとに一定間隔で発話し、最後に著者名を読む。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrationScript {
    pub utterances: Vec<Utterance>,
}

impl NarrationScript {
    /// text を delimiter で分割し、i 番目の文を `i * offset` に、
    /// 著者名を `文の数 * offset` に配置する。
    pub fn build(text: &str, author: Option<&str>, delimiter: &str, offset: Duration) -> Self {
        let chunks = split_sentences(text, delimiter);
        let mut utterances: Vec<Utterance> = chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| Utterance {
                offset: offset * i as u32,
                text: chunk,
                kind: UtteranceKind::Sentence,
            })
            .collect();

        if let Some(author) = author.map(str::trim).filter(|a| !a.is_empty()) {
            utterances.push(Utterance {
                offset: offset * utterances.len() as u32,
                text: format!("By {author}"),
                kind: UtteranceKind::Author,
            });
        }

        Self { utterances }
    }

    /// 単発アナウンス（オフセット0の1文）
    pub fn announcement(text: &str) -> Self {
        Self {
            utterances: vec![Utterance {
                offset: Duration::ZERO,
                text: text.trim().to_string(),
                kind: UtteranceKind::Sentence,
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    /// 最後の発話のオフセット
    pub fn span(&self) -> Duration {
        self.utterances
            .last()
            .map(|u| u.offset)
            .unwrap_or(Duration::ZERO)
    }
}

/// 文分割。空の文は捨て、末尾の文の終止符 "." を1つだけ落とす。
pub fn split_sentences(text: &str, delimiter: &str) -> Vec<String> {
    let mut chunks: Vec<String> = text
        .split(delimiter)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(last) = chunks.last_mut() {
        if let Some(stripped) = last.strip_suffix('.') {
            *last = stripped.trim_end().to_string();
        }
    }
    chunks.retain(|c| !c.is_empty());
    chunks
}
