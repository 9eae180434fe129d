//! Interactive question prompts and parsing of typed matching answers.

use std::fmt::Write as _;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use style_core::model::{Answer, PairId, PairLink, Question, QuestionKind};

/// What the learner chose at a question prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(Answer),
    /// Stop for now; progress stays saved.
    Pause,
    /// Throw the attempt away.
    Abandon,
}

const PAUSE_ITEM: &str = "Pause (progress is saved)";
const ABANDON_ITEM: &str = "Abandon this attempt";
const KEEP_GOING_ITEM: &str = "Keep answering";

const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Label of the right-column item at `index`: `a`..`z`, then `aa`, `ab`, ...
pub fn column_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index;
    loop {
        label.push(char::from(ALPHABET[n % 26]));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label.iter().rev().collect()
}

/// Inverse of [`column_label`].
pub fn column_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    label
        .bytes()
        .try_fold(0_usize, |acc, b| {
            let digit = ALPHABET.iter().position(|l| *l == b)? + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })
        .map(|n| n - 1)
}

/// The right column is shown reversed so items never line up with their
/// partners.
fn right_column(question: &Question) -> Vec<(PairId, &str)> {
    match question.kind() {
        QuestionKind::Matching { pairs } => pairs
            .iter()
            .rev()
            .map(|p| (p.id, p.right.as_str()))
            .collect(),
        QuestionKind::MultipleChoice { .. } => Vec::new(),
    }
}

/// Select items for a multiple-choice question: the options, then pause and
/// abandon.
pub fn choice_items(question: &Question) -> Vec<String> {
    let mut items = match question.kind() {
        QuestionKind::MultipleChoice { options, .. } => options.clone(),
        QuestionKind::Matching { .. } => Vec::new(),
    };
    items.push(PAUSE_ITEM.to_owned());
    items.push(ABANDON_ITEM.to_owned());
    items
}

/// Map a selection from [`choice_items`] back to a reply. Escaping the
/// menu pauses.
pub fn choice_reply(question: &Question, selection: Option<usize>) -> Reply {
    let options = match question.kind() {
        QuestionKind::MultipleChoice { options, .. } => options.len(),
        QuestionKind::Matching { .. } => 0,
    };
    match selection {
        Some(i) if i < options => Reply::Answer(Answer::Choice(i)),
        Some(i) if i == options + 1 => Reply::Abandon,
        _ => Reply::Pause,
    }
}

/// Both columns of a matching question, numbered on the left and lettered on
/// the right.
pub fn render_matching(question: &Question, position: usize, total: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n[{position}/{total}] {}", question.prompt());
    if let QuestionKind::Matching { pairs } = question.kind() {
        for (i, (pair, (_, right))) in pairs.iter().zip(right_column(question)).enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}) {:<28} {:>2}) {right}",
                i + 1,
                pair.left,
                column_label(i),
            );
        }
    }
    out
}

/// Parse a line of matches such as `1d 2c 3b 4a` for `question`.
///
/// # Errors
///
/// Returns a message suitable for showing to the learner.
pub fn parse_pairs(question: &Question, line: &str) -> Result<Answer, String> {
    let QuestionKind::Matching { pairs } = question.kind() else {
        return Err("this question is not a matching question".into());
    };
    let rights = right_column(question);
    let line = line.trim().to_lowercase();
    let mut links = Vec::with_capacity(pairs.len());
    for token in line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let token = token.replace(['=', '-'], "");
        let split = token
            .find(|c: char| !c.is_ascii_digit())
            .filter(|at| *at > 0)
            .ok_or_else(|| format!("`{token}` needs a number and a letter"))?;
        let (num, letter) = token.split_at(split);
        let left = num
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=pairs.len()).contains(n))
            .ok_or_else(|| format!("no left item `{num}`"))?;
        let right = column_index(letter)
            .and_then(|i| rights.get(i))
            .ok_or_else(|| format!("no right item `{letter}`"))?;
        links.push(PairLink {
            left: pairs[left - 1].id,
            right: right.0,
        });
    }
    if links.len() != pairs.len() {
        return Err(format!("match all {} items", pairs.len()));
    }
    Ok(Answer::Matching(links))
}

/// Ask `question` on the terminal.
///
/// # Errors
///
/// Returns `dialoguer::Error` if the terminal cannot be read.
pub fn ask(question: &Question, position: usize, total: usize) -> Result<Reply, dialoguer::Error> {
    let theme = ColorfulTheme::default();
    match question.kind() {
        QuestionKind::MultipleChoice { .. } => {
            let selection = Select::with_theme(&theme)
                .with_prompt(format!("[{position}/{total}] {}", question.prompt()))
                .items(&choice_items(question))
                .default(0)
                .interact_opt()?;
            Ok(choice_reply(question, selection))
        }
        QuestionKind::Matching { pairs } => {
            print!("{}", render_matching(question, position, total));
            let example = (0..pairs.len().min(4))
                .map(|i| format!("{}{}", i + 1, column_label(pairs.len().min(4) - 1 - i)))
                .collect::<Vec<_>>()
                .join(" ");
            loop {
                let line: String = Input::with_theme(&theme)
                    .with_prompt(format!("Matches, e.g. {example} (blank for more options)"))
                    .allow_empty(true)
                    .validate_with(|line: &String| -> Result<(), String> {
                        if line.trim().is_empty() {
                            Ok(())
                        } else {
                            parse_pairs(question, line).map(|_| ())
                        }
                    })
                    .interact_text()?;

                if !line.trim().is_empty() {
                    if let Ok(answer) = parse_pairs(question, &line) {
                        return Ok(Reply::Answer(answer));
                    }
                    continue;
                }

                let next = Select::with_theme(&theme)
                    .items(&[KEEP_GOING_ITEM, PAUSE_ITEM, ABANDON_ITEM])
                    .default(0)
                    .interact_opt()?;
                match next {
                    Some(0) => {}
                    Some(2) => return Ok(Reply::Abandon),
                    _ => return Ok(Reply::Pause),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use style_core::bank::QuestionBank;
    use style_core::model::{MatchPair, Modality, QuestionId};

    fn first(bank: &QuestionBank, modality: Modality) -> Question {
        bank.questions()
            .iter()
            .find(|q| q.modality() == modality)
            .cloned()
            .unwrap()
    }

    fn wide_matching(pairs: u32) -> Question {
        Question::new(
            QuestionId::new(900),
            Modality::Kinesthetic,
            "Match each number to its word",
            QuestionKind::Matching {
                pairs: (1..=pairs)
                    .map(|i| MatchPair::new(i, format!("{i}"), format!("word {i}")))
                    .collect(),
            },
        )
        .unwrap()
    }

    #[test]
    fn labels_continue_past_z() {
        assert_eq!(column_label(0), "a");
        assert_eq!(column_label(25), "z");
        assert_eq!(column_label(26), "aa");
        assert_eq!(column_label(27), "ab");
        assert_eq!(column_label(52), "ba");
        for i in [0, 7, 8, 25, 26, 29, 701, 702] {
            assert_eq!(column_index(&column_label(i)), Some(i));
        }
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("a1"), None);
    }

    #[test]
    fn choice_selection_maps_to_replies() {
        let bank = QuestionBank::standard();
        let q = first(&bank, Modality::Visual);
        let items = choice_items(&q);
        let n = items.len() - 2;
        assert_eq!(items[n], PAUSE_ITEM);
        assert_eq!(choice_reply(&q, Some(1)), Reply::Answer(Answer::Choice(1)));
        assert_eq!(choice_reply(&q, Some(n)), Reply::Pause);
        assert_eq!(choice_reply(&q, Some(n + 1)), Reply::Abandon);
        assert_eq!(choice_reply(&q, None), Reply::Pause);
    }

    #[test]
    fn reversed_letters_match_correctly() {
        let bank = QuestionBank::standard();
        let q = first(&bank, Modality::Kinesthetic);
        // four pairs shown reversed: 1 pairs with d, 4 with a
        let answer = parse_pairs(&q, "1d, 2c 3=b 4-A").unwrap();
        assert!(q.evaluate(&answer).unwrap());

        let wrong = parse_pairs(&q, "1a 2b 3c 4d").unwrap();
        assert!(!q.evaluate(&wrong).unwrap());
    }

    #[test]
    fn rejects_partial_or_malformed_matching() {
        let bank = QuestionBank::standard();
        let q = first(&bank, Modality::Kinesthetic);
        assert!(parse_pairs(&q, "1d 2c").is_err());
        assert!(parse_pairs(&q, "1z 2c 3b 4a").is_err());
        assert!(parse_pairs(&q, "9d 2c 3b 4a").is_err());
        assert!(parse_pairs(&q, "d 2c 3b 4a").is_err());
        assert!(parse_pairs(&first(&bank, Modality::Visual), "1a").is_err());
    }

    #[test]
    fn wide_matching_questions_are_answerable() {
        let q = wide_matching(30);
        let text = render_matching(&q, 1, 1);
        assert!(text.contains("aa) word 4"));
        assert!(text.contains("ad) word 1"));
        assert!(!text.contains('?'));

        // right column is reversed: left item i pairs with label 30 - i
        let line = (0..30)
            .map(|i| format!("{}{}", i + 1, column_label(29 - i)))
            .collect::<Vec<_>>()
            .join(" ");
        let answer = parse_pairs(&q, &line).unwrap();
        assert!(q.evaluate(&answer).unwrap());
    }

    #[test]
    fn render_lists_both_columns() {
        let bank = QuestionBank::standard();
        let q = first(&bank, Modality::Kinesthetic);
        let text = render_matching(&q, 31, 40);
        assert!(text.contains("[31/40]"));
        assert!(text.contains("   1) "));
        assert!(text.contains(" a) "));
    }
}
