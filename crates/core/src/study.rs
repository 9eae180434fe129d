//! Static study guidance per learning style.

use serde::Serialize;

use crate::model::Modality;

/// Techniques and material formats suited to one learning style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudyPlan {
    pub modality: Modality,
    pub summary: &'static str,
    pub techniques: &'static [&'static str],
    pub material_formats: &'static [&'static str],
}

static VISUAL: StudyPlan = StudyPlan {
    modality: Modality::Visual,
    summary: "You learn best from diagrams, charts and spatial layouts.",
    techniques: &[
        "Turn notes into mind maps with colour-coded branches",
        "Redraw processes as flowcharts before memorising them",
        "Highlight key terms with a consistent colour scheme",
        "Use flashcards with a sketch or icon on each card",
    ],
    material_formats: &["infographics", "diagrams", "video lectures", "timelines"],
};

static AUDITORY: StudyPlan = StudyPlan {
    modality: Modality::Auditory,
    summary: "You learn best by listening, discussing and explaining out loud.",
    techniques: &[
        "Read summaries aloud and record them for replay",
        "Explain each topic to a study partner",
        "Turn lists into rhymes or short songs",
        "Join or run a discussion group after each chapter",
    ],
    material_formats: &["podcasts", "recorded lectures", "audio summaries", "discussions"],
};

static READING_WRITING: StudyPlan = StudyPlan {
    modality: Modality::ReadingWriting,
    summary: "You learn best from written text and by writing things down.",
    techniques: &[
        "Rewrite lecture notes in your own words",
        "Condense each chapter into a one-page summary",
        "Keep a glossary of new terms with definitions",
        "Practise with written quizzes and short essays",
    ],
    material_formats: &["textbooks", "articles", "written summaries", "glossaries"],
};

static KINESTHETIC: StudyPlan = StudyPlan {
    modality: Modality::Kinesthetic,
    summary: "You learn best by doing, building and moving.",
    techniques: &[
        "Work through hands-on examples before reading theory",
        "Study in short sessions with movement breaks",
        "Sort physical flashcards into piles as you review",
        "Act out or build models of the concepts",
    ],
    material_formats: &["labs", "simulations", "interactive exercises", "field work"],
};

impl StudyPlan {
    #[must_use]
    pub fn for_style(modality: Modality) -> &'static StudyPlan {
        match modality {
            Modality::Visual => &VISUAL,
            Modality::Auditory => &AUDITORY,
            Modality::ReadingWriting => &READING_WRITING,
            Modality::Kinesthetic => &KINESTHETIC,
        }
    }
}
