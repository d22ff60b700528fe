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

use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;

use sm2cards_core::Fallible;
use walkdir::WalkDir;

use crate::card::Card;
use crate::card::CardContent;

/// Parse every Markdown file under `directory`. Each file is a deck named
/// after its file stem. A card that appears more than once is kept once.
pub fn parse_deck(directory: &Path) -> Fallible<Vec<Card>> {
    let mut cards = Vec::new();
    let mut seen = HashSet::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            let deck_name = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().to_string(),
                None => continue,
            };
            let content = read_to_string(path)?;
            for card in parse_cards(&deck_name, path, &content) {
                if seen.insert(card.id()) {
                    cards.push(card);
                } else {
                    log::debug!("Skipping duplicate card {} in {}", card.id(), path.display());
                }
            }
        }
    }
    Ok(cards)
}

/// Cards are separated by blank lines. `question / answer` is a basic card;
/// text with `[brackets]` yields one cloze card per bracketed deletion.
/// Anything else is ignored.
pub fn parse_cards(deck_name: &str, path: &Path, content: &str) -> Vec<Card> {
    let mut flashcards = Vec::new();

    let blocks = content
        .split("\n\n")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    for block in blocks {
        if let Some((question, answer)) = block.split_once(" / ") {
            let basic = CardContent::new_basic(question, answer);
            if let CardContent::Basic { question, answer } = &basic {
                if question.is_empty() || answer.is_empty() {
                    continue;
                }
            }
            flashcards.push(Card::new(
                deck_name.to_string(),
                path.to_path_buf(),
                basic,
            ));
        } else if block.contains('[') && block.contains(']') {
            for cloze in parse_cloze(block) {
                flashcards.push(Card::new(
                    deck_name.to_string(),
                    path.to_path_buf(),
                    cloze,
                ));
            }
        }
    }

    flashcards
}

fn parse_cloze(text: &str) -> Vec<CardContent> {
    let mut cards = Vec::new();

    // The full text of the card, without square brackets.
    let clean_text = text.replace(['[', ']'], "");

    let mut start = None;
    let mut offset = 0;
    for c in text.chars() {
        match c {
            '[' => start = Some(offset),
            ']' => {
                if let Some(s) = start.take() {
                    if offset > s {
                        cards.push(CardContent::Cloze {
                            text: clean_text.clone(),
                            start: s,
                            end: offset,
                        });
                    }
                }
            }
            _ => offset += c.len_utf8(),
        }
    }

    cards
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::helper::create_tmp_copy_of_test_directory;

    fn parse(content: &str) -> Vec<Card> {
        parse_cards("deck", &PathBuf::from("deck.md"), content)
    }

    #[test]
    fn test_parse_basic() {
        let cards = parse("What is the capital of France? / Paris");
        assert_eq!(cards.len(), 1);
        assert_eq!(
            cards[0].content(),
            &CardContent::new_basic("What is the capital of France?", "Paris")
        );
        assert_eq!(cards[0].deck_name(), "deck");
    }

    #[test]
    fn test_parse_cloze() {
        let cards = parse("[Berlin] is the capital of [Germany].");
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].back(), "[Berlin] is the capital of Germany.");
        assert_eq!(cards[1].back(), "Berlin is the capital of [Germany].");
        match cards[1].content() {
            CardContent::Cloze { text, start, end } => {
                assert_eq!(text, "Berlin is the capital of Germany.");
                assert_eq!(*start, 25);
                assert_eq!(*end, 32);
            }
            _ => panic!("Expected Cloze card"),
        }
    }

    #[test]
    fn test_parse_cloze_non_ascii() {
        let cards = parse("Die Hauptstadt von Österreich ist [Wien].");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front(), "Die Hauptstadt von Österreich ist [...].");
        assert_eq!(cards[0].back(), "Die Hauptstadt von Österreich ist [Wien].");
    }

    #[test]
    fn test_empty_cloze_ignored() {
        assert_eq!(parse("Nothing [] here.").len(), 0);
    }

    #[test]
    fn test_parse_multiple_cards() {
        let cards = parse("What is the capital of France? / Paris\n\n[Berlin] is the capital of [Germany].");
        assert_eq!(cards.len(), 3);
        assert!(matches!(cards[0].content(), CardContent::Basic { .. }));
        assert!(matches!(cards[1].content(), CardContent::Cloze { .. }));
        assert!(matches!(cards[2].content(), CardContent::Cloze { .. }));
    }

    #[test]
    fn test_parse_with_extra_whitespace() {
        let cards = parse("  What is 2+2? / 4  \n\n\n[Python] is a programming language.  ");
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front(), "What is 2+2?");
        assert_eq!(cards[0].back(), "4");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("").len(), 0);
        assert_eq!(parse("\n   \n  \n").len(), 0);
    }

    #[test]
    fn test_empty_basic() {
        assert_eq!(parse(" / ").len(), 0);
    }

    #[test]
    fn test_invalid_cards_ignored() {
        let cards = parse("This is not a valid card\n\nWhat is valid? / Yes\n\nAlso not valid");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front(), "What is valid?");
    }

    #[test]
    fn test_multiline_question_answer() {
        let cards = parse("What is\nthe capital of Russia? / Moscow");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front(), "What is\nthe capital of Russia?");
        assert_eq!(cards[0].back(), "Moscow");
    }

    #[test]
    fn test_parse_deck() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let directory = Path::new(&directory);
        let cards = parse_deck(directory)?;
        assert_eq!(cards.len(), 5);
        let geography = cards.iter().filter(|c| c.deck_name() == "geography").count();
        let math = cards.iter().filter(|c| c.deck_name() == "math").count();
        assert_eq!(geography, 3);
        assert_eq!(math, 2);
        assert!(cards.iter().all(|c| c.file_path().starts_with(directory)));
        Ok(())
    }

    #[test]
    fn test_duplicates_kept_once() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let directory = Path::new(&directory);
        std::fs::write(
            directory.join("repeat.md"),
            "What is 2 + 2? / 4\n\nWhat is 2 + 2? / 4\n",
        )?;
        let cards = parse_deck(directory)?;
        assert_eq!(cards.len(), 5);
        Ok(())
    }
}
