// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use sm2cards_core::CardId;

const CLOZE_PROMPT: &str = "[...]";

#[derive(Clone, Debug)]
pub struct Card {
    /// The name of the deck this card belongs to.
    deck_name: String,
    /// The file this card was parsed from.
    file_path: PathBuf,
    /// The card's content.
    content: CardContent,
    /// The cached hash of the card's content.
    id: CardId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CardContent {
    Basic {
        question: String,
        answer: String,
    },
    Cloze {
        /// The text of the card without brackets.
        text: String,
        /// Byte offset of the start of the deletion.
        start: usize,
        /// Byte offset one past the end of the deletion.
        end: usize,
    },
}

impl Card {
    pub fn new(deck_name: String, file_path: PathBuf, content: CardContent) -> Self {
        let id = content.id();
        Self {
            deck_name,
            file_path,
            content,
            id,
        }
    }

    pub fn deck_name(&self) -> &str {
        &self.deck_name
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    pub fn content(&self) -> &CardContent {
        &self.content
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    /// The prompt shown before the answer is revealed.
    pub fn front(&self) -> String {
        match &self.content {
            CardContent::Basic { question, .. } => question.clone(),
            CardContent::Cloze { text, start, end } => {
                let mut prompt = text.clone();
                prompt.replace_range(*start..*end, CLOZE_PROMPT);
                prompt
            }
        }
    }

    pub fn back(&self) -> String {
        match &self.content {
            CardContent::Basic { answer, .. } => answer.clone(),
            CardContent::Cloze { text, start, end } => {
                let deletion = &text[*start..*end];
                let mut answer = text.clone();
                answer.replace_range(*start..*end, &format!("[{deletion}]"));
                answer
            }
        }
    }
}

impl CardContent {
    pub fn new_basic(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::Basic {
            question: question.into().trim().to_string(),
            answer: answer.into().trim().to_string(),
        }
    }

    pub fn id(&self) -> CardId {
        match &self {
            CardContent::Basic { question, answer } => {
                CardId::from_fields("Basic", &[question.as_bytes(), answer.as_bytes()])
            }
            CardContent::Cloze { text, start, end } => CardId::from_fields(
                "Cloze",
                &[
                    text.as_bytes(),
                    start.to_le_bytes().as_slice(),
                    end.to_le_bytes().as_slice(),
                ],
            ),
        }
    }
}
