mod ids;
mod level;
mod modality;
mod profile;
mod question;
mod result;
mod scores;
mod session;

pub use ids::{PairId, ParseIdError, QuestionId, UserId};
pub use level::{ParseQuizLevelError, QuizLevel};
pub use modality::{Modality, ParseModalityError};
pub use profile::{ProfileError, UserProfile};
pub use question::{Answer, MatchPair, PairLink, Question, QuestionError, QuestionKind};
pub use result::{QuizResult, QuizResultError};
pub use scores::{ClampedScores, ModalityScores};
pub use session::{AnswerOutcome, QuizSession, QuizSessionError, SessionSnapshot};
