//! The fixed assessment question bank.
//!
//! The standard bank holds 40 questions in four blocks of ten: visual,
//! auditory, reading/writing, then kinesthetic. Kinesthetic questions are
//! drag-and-drop matching exercises; the rest are multiple choice.

use std::collections::HashSet;
use thiserror::Error;

use crate::model::{MatchPair, Modality, Question, QuestionError, QuestionId, QuestionKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("question bank cannot be empty")]
    Empty,

    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("invalid question bank json: {0}")]
    Parse(String),
}

/// Ordered, immutable list of questions making up one assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

/// Number of questions per modality in the standard bank.
pub const QUESTIONS_PER_MODALITY: usize = 10;

struct ChoiceSpec {
    prompt: &'static str,
    options: [&'static str; 4],
    correct: usize,
}

struct MatchSpec {
    prompt: &'static str,
    pairs: [(&'static str, &'static str); 4],
}

const VISUAL: [ChoiceSpec; QUESTIONS_PER_MODALITY] = [
    ChoiceSpec {
        prompt: "Picture a traffic light. Which color sits at the top?",
        options: ["Red", "Yellow", "Green", "Blue"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Imagine a clock showing exactly 3:00. Where does the minute hand point?",
        options: ["12", "3", "6", "9"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Which of these shapes has the most sides?",
        options: ["Triangle", "Square", "Hexagon", "Pentagon"],
        correct: 2,
    },
    ChoiceSpec {
        prompt: "Mixing blue and yellow paint gives which color?",
        options: ["Purple", "Green", "Orange", "Brown"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "On a standard map, which direction is at the top?",
        options: ["North", "South", "East", "West"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "A pie chart is split into four equal slices. What share is one slice?",
        options: ["10%", "25%", "33%", "50%"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "Which capital letter looks the same in a mirror?",
        options: ["A", "R", "K", "F"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Picture a cube. How many faces does it have?",
        options: ["4", "6", "8", "12"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "In a bar chart, what does a taller bar show?",
        options: [
            "A larger value",
            "A smaller value",
            "A negative value",
            "A missing value",
        ],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Turn the lowercase letter 'b' upside down (half a turn). Which letter do you see?",
        options: ["d", "p", "q", "b"],
        correct: 2,
    },
];

const AUDITORY: [ChoiceSpec; QUESTIONS_PER_MODALITY] = [
    ChoiceSpec {
        prompt: "Which word rhymes with 'light'?",
        options: ["Late", "Kite", "Lift", "Leaf"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "Say 'banana' out loud. How many syllables does it have?",
        options: ["2", "3", "4", "5"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "Which instrument makes its sound by being struck?",
        options: ["Violin", "Flute", "Drum", "Trumpet"],
        correct: 2,
    },
    ChoiceSpec {
        prompt: "Which animal makes a 'moo' sound?",
        options: ["Cow", "Sheep", "Dog", "Duck"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Say 'knight' aloud. Which letter is silent at the start?",
        options: ["K", "N", "I", "T"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Which word sounds exactly like 'there'?",
        options: ["Three", "Their", "Tree", "Tire"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "A doorbell goes 'ding-dong'. How many tones is that?",
        options: ["1", "2", "3", "4"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "Which of these sounds is highest in pitch?",
        options: ["Bass drum", "Tuba", "Whistle", "Thunder"],
        correct: 2,
    },
    ChoiceSpec {
        prompt: "Which word begins with the same sound as 'phone'?",
        options: ["Fish", "Pan", "Hope", "Tone"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Count along: how many beats are in one bar of 4/4 time?",
        options: ["2", "3", "4", "8"],
        correct: 2,
    },
];

const READING_WRITING: [ChoiceSpec; QUESTIONS_PER_MODALITY] = [
    ChoiceSpec {
        prompt: "Which word is a synonym for 'rapid'?",
        options: ["Slow", "Quick", "Heavy", "Quiet"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "Choose the correctly spelled word.",
        options: ["Recieve", "Receive", "Receeve", "Riceive"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "What is the plural of 'mouse'?",
        options: ["Mouses", "Mice", "Meese", "Mouse"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "In 'The cat sat on the mat', which word is the subject?",
        options: ["cat", "sat", "mat", "on"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Which punctuation mark ends a question?",
        options: [".", "!", "?", ","],
        correct: 2,
    },
    ChoiceSpec {
        prompt: "Which word is an antonym of 'ancient'?",
        options: ["Old", "Modern", "Historic", "Aged"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "In 'She quickly ran home', which word is the adverb?",
        options: ["She", "quickly", "ran", "home"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "Which sentence is written in the past tense?",
        options: ["I walk", "I walked", "I will walk", "I am walking"],
        correct: 1,
    },
    ChoiceSpec {
        prompt: "The short summary at the start of a research paper is called the...",
        options: ["Abstract", "Index", "Appendix", "Glossary"],
        correct: 0,
    },
    ChoiceSpec {
        prompt: "Complete the saying: 'An apple a day keeps the ___ away.'",
        options: ["teacher", "doctor", "dentist", "rain"],
        correct: 1,
    },
];

const KINESTHETIC: [MatchSpec; QUESTIONS_PER_MODALITY] = [
    MatchSpec {
        prompt: "Match each tool to what it works on.",
        pairs: [
            ("Hammer", "Nail"),
            ("Screwdriver", "Screw"),
            ("Wrench", "Bolt"),
            ("Saw", "Plank"),
        ],
    },
    MatchSpec {
        prompt: "Match each sport to its equipment.",
        pairs: [
            ("Tennis", "Racket"),
            ("Baseball", "Bat"),
            ("Golf", "Club"),
            ("Hockey", "Stick"),
        ],
    },
    MatchSpec {
        prompt: "Match each body part to its action.",
        pairs: [
            ("Eyes", "See"),
            ("Ears", "Hear"),
            ("Nose", "Smell"),
            ("Tongue", "Taste"),
        ],
    },
    MatchSpec {
        prompt: "Match each kitchen tool to its job.",
        pairs: [
            ("Whisk", "Beat eggs"),
            ("Ladle", "Serve soup"),
            ("Peeler", "Skin potatoes"),
            ("Grater", "Shred cheese"),
        ],
    },
    MatchSpec {
        prompt: "Match each exercise to the muscle group it trains.",
        pairs: [
            ("Squat", "Legs"),
            ("Push-up", "Chest"),
            ("Crunch", "Abdomen"),
            ("Curl", "Biceps"),
        ],
    },
    MatchSpec {
        prompt: "Match each instrument to how it is played.",
        pairs: [
            ("Guitar", "Strum"),
            ("Piano", "Press keys"),
            ("Drum", "Strike"),
            ("Flute", "Blow"),
        ],
    },
    MatchSpec {
        prompt: "Match each garden tool to its task.",
        pairs: [
            ("Rake", "Gather leaves"),
            ("Shovel", "Dig"),
            ("Hose", "Water"),
            ("Shears", "Trim hedges"),
        ],
    },
    MatchSpec {
        prompt: "Match each craft to its material.",
        pairs: [
            ("Knitting", "Yarn"),
            ("Pottery", "Clay"),
            ("Carpentry", "Wood"),
            ("Origami", "Paper"),
        ],
    },
    MatchSpec {
        prompt: "Match each vehicle to where it travels.",
        pairs: [
            ("Boat", "Water"),
            ("Plane", "Air"),
            ("Train", "Rails"),
            ("Car", "Road"),
        ],
    },
    MatchSpec {
        prompt: "Match each dance to its country of origin.",
        pairs: [
            ("Tango", "Argentina"),
            ("Flamenco", "Spain"),
            ("Samba", "Brazil"),
            ("Hula", "Hawaii"),
        ],
    },
];

impl QuestionBank {
    /// Build a bank from already-validated questions.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for no questions or `DuplicateId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for q in &questions {
            if !seen.insert(q.id()) {
                return Err(QuestionBankError::DuplicateId(q.id()));
            }
        }
        Ok(Self { questions })
    }

    /// Load a custom bank from a JSON array of questions, validating every
    /// question and the bank as a whole.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed JSON, `Question` for an invalid question,
    /// or the errors of [`QuestionBank::new`].
    pub fn from_json(json: &str) -> Result<Self, QuestionBankError> {
        let raw: Vec<Question> =
            serde_json::from_str(json).map_err(|e| QuestionBankError::Parse(e.to_string()))?;
        let questions = raw
            .into_iter()
            .map(|q| Question::new(q.id(), q.modality(), q.prompt(), q.kind().clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// The standard 40-question learning-style assessment.
    #[must_use]
    pub fn standard() -> Self {
        let mut questions = Vec::with_capacity(4 * QUESTIONS_PER_MODALITY);
        let mut next_id = 1_u32;

        for (modality, block) in [
            (Modality::Visual, &VISUAL),
            (Modality::Auditory, &AUDITORY),
            (Modality::ReadingWriting, &READING_WRITING),
        ] {
            for spec in block {
                questions.push(Question::from_trusted(
                    QuestionId::new(next_id),
                    modality,
                    spec.prompt,
                    QuestionKind::MultipleChoice {
                        options: spec.options.iter().map(|o| (*o).to_owned()).collect(),
                        correct_index: spec.correct,
                    },
                ));
                next_id += 1;
            }
        }

        for spec in &KINESTHETIC {
            let pairs = (1_u32..)
                .zip(spec.pairs.iter())
                .map(|(id, (left, right))| MatchPair::new(id, *left, *right))
                .collect();
            questions.push(Question::from_trusted(
                QuestionId::new(next_id),
                Modality::Kinesthetic,
                spec.prompt,
                QuestionKind::Matching { pairs },
            ));
            next_id += 1;
        }

        Self { questions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions measuring `modality`; the ceiling for its score.
    #[must_use]
    pub fn count_for(&self, modality: Modality) -> usize {
        self.questions
            .iter()
            .filter(|q| q.modality() == modality)
            .count()
    }
}
