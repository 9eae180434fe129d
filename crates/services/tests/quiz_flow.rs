use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use chrono::{DateTime, Utc};
use services::{
    AppConfig, AppServices, AppServicesError, Clock, ProfileService, ProfileServiceError,
    QuizService, RecommendationError, RecommendationService, RetryPolicy, SubmitError, WritePath,
};
use storage::repository::{
    InMemoryRepository, ProfileRepository, QuizDraftRepository, QuizResultRepository,
    QuizResultRow, StorageError,
};
use style_core::bank::QuestionBank;
use style_core::model::{
    Answer, Modality, ModalityScores, PairLink, ProfileError, Question, QuestionKind, QuizLevel,
    QuizResult, QuizSession, QuizSessionError, UserId, UserProfile,
};
use style_core::time::fixed_now;

const USER: UserId = UserId::new(7);

fn quick_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: StdDuration::ZERO,
        max_backoff: StdDuration::ZERO,
    }
}

fn quiz_service(repo: &InMemoryRepository, clock: Clock) -> QuizService {
    QuizService::new(
        clock,
        Arc::new(QuestionBank::standard()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .with_retry(quick_retry())
}

async fn repo_with_profile(age: u32) -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    ProfileService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .create_profile(USER, "Jordan", age)
    .await
    .unwrap();
    repo
}

fn answer_for(q: &Question, correct: bool) -> Answer {
    match q.kind() {
        QuestionKind::MultipleChoice {
            options,
            correct_index,
        } => {
            if correct {
                Answer::Choice(*correct_index)
            } else {
                Answer::Choice((correct_index + 1) % options.len())
            }
        }
        QuestionKind::Matching { pairs } => {
            let ids: Vec<_> = pairs.iter().map(|p| p.id).collect();
            let shift = usize::from(!correct);
            Answer::Matching(
                ids.iter()
                    .enumerate()
                    .map(|(i, left)| PairLink {
                        left: *left,
                        right: ids[(i + shift) % ids.len()],
                    })
                    .collect(),
            )
        }
    }
}

async fn play(svc: &QuizService, session: &mut QuizSession, targets: ModalityScores) {
    let mut given = ModalityScores::default();
    while let Some(q) = session.current_question().cloned() {
        let correct = given.get(q.modality()) < targets.get(q.modality());
        if correct {
            given.increment(q.modality());
        }
        svc.answer(USER, session, answer_for(&q, correct))
            .await
            .unwrap();
    }
}

/// Result store that fails with a transient error and records what it saw.
#[derive(Default)]
struct DownResultStore {
    attempts: AtomicU32,
    seen: Mutex<Vec<QuizResult>>,
}

#[async_trait]
impl QuizResultRepository for DownResultStore {
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(result.clone());
        Err(StorageError::Connection("database is locked".into()))
    }

    async fn get_result(&self, _id: i64) -> Result<QuizResult, StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }

    async fn list_results(
        &self,
        _user_id: UserId,
        _limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }
}

/// Profile store whose assessment writes fail while `down` is set.
#[derive(Default)]
struct FlakyProfiles {
    inner: InMemoryRepository,
    down: AtomicBool,
}

#[async_trait]
impl ProfileRepository for FlakyProfiles {
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.inner.upsert_profile(profile).await
    }

    async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, StorageError> {
        self.inner.get_profile(id).await
    }

    async fn record_assessment(
        &self,
        id: UserId,
        style: Modality,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("database is locked".into()));
        }
        self.inner.record_assessment(id, style, at).await
    }
}

#[tokio::test]
async fn full_quiz_records_result_and_profile() {
    let repo = repo_with_profile(16).await;
    let start = fixed_now();
    let starter = quiz_service(&repo, Clock::fixed(start));
    let finisher = quiz_service(&repo, Clock::fixed(start + Duration::minutes(14)));

    let mut session = starter.start_or_resume(USER).await.unwrap();
    assert_eq!(session.total_questions(), 40);
    play(&starter, &mut session, ModalityScores::new(8, 6, 4, 9)).await;

    let receipt = finisher.submit(USER, session).await.unwrap();
    assert_eq!(receipt.written_to, WritePath::Primary);
    assert!(receipt.profile_updated);

    let result = &receipt.result;
    assert_eq!(result.scores(), ModalityScores::new(8, 6, 4, 9));
    assert_eq!(result.total_score(), 27);
    assert_eq!(result.quiz_level(), QuizLevel::Intermediate);
    assert_eq!(result.dominant_style(), Modality::Kinesthetic);
    assert_eq!(result.time_taken_seconds(), 14 * 60);

    let stored = repo.get_result(receipt.result_id).await.unwrap();
    assert_eq!(&stored, result);

    let profile = repo.get_profile(USER).await.unwrap().unwrap();
    assert_eq!(profile.learning_style(), Some(Modality::Kinesthetic));
    assert!(profile.quiz_completed());
    assert!(repo.load_draft(USER).await.unwrap().is_none());
}

#[tokio::test]
async fn submitting_unfinished_session_keeps_draft() {
    let repo = repo_with_profile(25).await;
    let svc = quiz_service(&repo, Clock::fixed(fixed_now()));

    let mut session = svc.start_or_resume(USER).await.unwrap();
    let q = session.current_question().cloned().unwrap();
    svc.answer(USER, &mut session, answer_for(&q, true))
        .await
        .unwrap();

    let err = svc.submit(USER, session).await.unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Session(QuizSessionError::Incomplete {
            answered: 1,
            total: 40
        })
    ));
    assert!(repo.load_draft(USER).await.unwrap().is_some());
    assert!(repo.list_results(USER, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn resume_continues_where_the_learner_stopped() {
    let repo = repo_with_profile(12).await;
    let svc = quiz_service(&repo, Clock::fixed(fixed_now()));

    let mut session = svc.start_or_resume(USER).await.unwrap();
    for _ in 0..5 {
        let q = session.current_question().cloned().unwrap();
        svc.answer(USER, &mut session, answer_for(&q, true))
            .await
            .unwrap();
    }
    drop(session);

    let resumed = svc.start_or_resume(USER).await.unwrap();
    assert_eq!(resumed.current_question_index(), 5);
    assert_eq!(resumed.scores().get(Modality::Visual), 5);
}

#[tokio::test]
async fn abandon_writes_nothing() {
    let repo = repo_with_profile(30).await;
    let svc = quiz_service(&repo, Clock::fixed(fixed_now()));

    let mut session = svc.start_or_resume(USER).await.unwrap();
    let q = session.current_question().cloned().unwrap();
    svc.answer(USER, &mut session, answer_for(&q, true))
        .await
        .unwrap();
    svc.abandon(USER).await.unwrap();

    assert!(repo.load_draft(USER).await.unwrap().is_none());
    assert!(repo.list_results(USER, 10).await.unwrap().is_empty());
    let profile = repo.get_profile(USER).await.unwrap().unwrap();
    assert!(!profile.quiz_completed());
    assert_eq!(profile.learning_style(), None);

    let fresh = svc.start_or_resume(USER).await.unwrap();
    assert_eq!(fresh.current_question_index(), 0);
}

#[tokio::test]
async fn unknown_user_cannot_start() {
    let repo = InMemoryRepository::new();
    let svc = quiz_service(&repo, Clock::fixed(fixed_now()));
    assert!(svc.start_or_resume(UserId::new(99)).await.is_err());
}

#[tokio::test]
async fn failing_primary_falls_back_with_the_same_result() {
    let repo = repo_with_profile(21).await;
    let primary = Arc::new(DownResultStore::default());
    let fallback = InMemoryRepository::new();

    let svc = QuizService::new(
        Clock::fixed(fixed_now()),
        Arc::new(QuestionBank::standard()),
        primary.clone(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .with_retry(quick_retry())
    .with_fallback(Arc::new(fallback.clone()));

    let mut session = svc.start_or_resume(USER).await.unwrap();
    play(&svc, &mut session, ModalityScores::new(10, 2, 3, 1)).await;
    let receipt = svc.submit(USER, session).await.unwrap();

    assert_eq!(receipt.written_to, WritePath::Fallback);
    assert_eq!(primary.attempts.load(Ordering::SeqCst), 3);
    let seen = primary.seen.lock().unwrap().clone();
    assert!(seen.iter().all(|r| r == &receipt.result));

    let saved = fallback.get_result(receipt.result_id).await.unwrap();
    assert_eq!(saved, receipt.result);
    assert_eq!(saved.dominant_style(), Modality::Visual);
    assert_eq!(saved.quiz_level(), QuizLevel::Advanced);

    let profile = repo.get_profile(USER).await.unwrap().unwrap();
    assert_eq!(profile.learning_style(), Some(Modality::Visual));
}

#[tokio::test]
async fn every_path_failing_is_a_persistence_error() {
    let repo = repo_with_profile(21).await;
    let svc = QuizService::new(
        Clock::fixed(fixed_now()),
        Arc::new(QuestionBank::standard()),
        Arc::new(DownResultStore::default()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .with_retry(quick_retry())
    .with_fallback(Arc::new(DownResultStore::default()));

    let mut session = svc.start_or_resume(USER).await.unwrap();
    play(&svc, &mut session, ModalityScores::new(1, 1, 1, 1)).await;
    let err = svc.submit(USER, session).await.unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Persistence(StorageError::Connection(_))
    ));
    let profile = repo.get_profile(USER).await.unwrap().unwrap();
    assert!(!profile.quiz_completed());
}

#[tokio::test]
async fn sync_repairs_profile_from_latest_result() {
    let repo = repo_with_profile(18).await;
    let now = fixed_now();
    let result = QuizResult::compute(USER, ModalityScores::new(2, 9, 1, 0), 18, now, now);
    repo.insert_result(&result).await.unwrap();

    let profiles = ProfileService::new(
        Clock::fixed(now),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    );
    let style = profiles.sync_from_latest_result(USER).await.unwrap();
    assert_eq!(style, Modality::Auditory);

    let profile = profiles.get_profile(USER).await.unwrap();
    assert_eq!(profile.learning_style(), Some(Modality::Auditory));
}

#[tokio::test]
async fn recommendations_need_a_completed_quiz() {
    let repo = repo_with_profile(22).await;
    let recommender = RecommendationService::new(Arc::new(repo.clone()));
    let materials = vec![
        "Photosynthesis converts light into chemical energy.".to_owned(),
        "Chlorophyll absorbs light; photosynthesis happens in chloroplasts.".to_owned(),
    ];

    let err = recommender.recommend(USER, &materials, 3).await.unwrap_err();
    assert!(matches!(err, RecommendationError::NoLearningStyle(_)));

    repo.record_assessment(USER, Modality::ReadingWriting, fixed_now())
        .await
        .unwrap();
    let rec = recommender.recommend(USER, &materials, 3).await.unwrap();
    assert_eq!(rec.style, Modality::ReadingWriting);
    assert_eq!(rec.plan.modality, Modality::ReadingWriting);
    assert_eq!(rec.keywords[0].word, "light");
    assert_eq!(rec.keywords[0].count, 2);
    assert_eq!(rec.keywords[1].word, "photosynthesis");
    assert_eq!(rec.keywords.len(), 3);
}

#[tokio::test]
async fn fallback_results_are_visible_to_sync_and_history() {
    let now = fixed_now();
    let profiles = Arc::new(FlakyProfiles::default());
    profiles
        .upsert_profile(&UserProfile::new(USER, "Jordan", 19, now).unwrap())
        .await
        .unwrap();
    profiles.down.store(true, Ordering::SeqCst);

    let drafts = InMemoryRepository::new();
    let primary: Arc<DownResultStore> = Arc::new(DownResultStore::default());
    let fallback = InMemoryRepository::new();

    let svc = QuizService::new(
        Clock::fixed(now),
        Arc::new(QuestionBank::standard()),
        primary.clone(),
        profiles.clone(),
        Arc::new(drafts),
    )
    .with_retry(quick_retry())
    .with_fallback(Arc::new(fallback.clone()));

    let mut session = svc.start_or_resume(USER).await.unwrap();
    play(&svc, &mut session, ModalityScores::new(1, 2, 7, 3)).await;
    let receipt = svc.submit(USER, session).await.unwrap();
    assert_eq!(receipt.written_to, WritePath::Fallback);
    assert!(!receipt.profile_updated);

    let history = svc.history(USER, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].store, WritePath::Fallback);
    assert_eq!(history[0].id, receipt.result_id);
    assert_eq!(history[0].result, receipt.result);

    profiles.down.store(false, Ordering::SeqCst);
    let syncer = ProfileService::new(Clock::fixed(now), profiles.clone(), primary)
        .with_fallback(Arc::new(fallback));
    let style = syncer.sync_from_latest_result(USER).await.unwrap();
    assert_eq!(style, Modality::ReadingWriting);

    let profile = syncer.get_profile(USER).await.unwrap();
    assert_eq!(profile.learning_style(), Some(Modality::ReadingWriting));
    assert!(profile.quiz_completed());
}

#[tokio::test]
async fn history_prefers_the_newest_result_across_stores() {
    let repo = repo_with_profile(30).await;
    let fallback = InMemoryRepository::new();
    let t0 = fixed_now();

    let older = QuizResult::compute(USER, ModalityScores::new(9, 1, 1, 1), 30, t0, t0);
    let newer = QuizResult::compute(
        USER,
        ModalityScores::new(1, 1, 1, 9),
        30,
        t0,
        t0 + Duration::minutes(10),
    );
    repo.insert_result(&older).await.unwrap();
    fallback.insert_result(&newer).await.unwrap();
    // Written to both stores; reported once, from the primary.
    repo.insert_result(&newer).await.unwrap();

    let svc = quiz_service(&repo, Clock::fixed(t0)).with_fallback(Arc::new(fallback.clone()));
    let history = svc.history(USER, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].result, newer);
    assert_eq!(history[0].store, WritePath::Primary);
    assert_eq!(history[1].result, older);

    let profiles = ProfileService::new(
        Clock::fixed(t0),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .with_fallback(Arc::new(fallback));
    assert_eq!(
        profiles.sync_from_latest_result(USER).await.unwrap(),
        Modality::Kinesthetic
    );
}

#[tokio::test]
async fn unreadable_primary_still_shows_fallback_history() {
    let repo = repo_with_profile(30).await;
    let fallback = InMemoryRepository::new();
    let now = fixed_now();
    let result = QuizResult::compute(USER, ModalityScores::new(0, 5, 0, 0), 30, now, now);
    fallback.insert_result(&result).await.unwrap();

    let svc = QuizService::new(
        Clock::fixed(now),
        Arc::new(QuestionBank::standard()),
        Arc::new(DownResultStore::default()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .with_fallback(Arc::new(fallback));
    let history = svc.history(USER, 5).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].store, WritePath::Fallback);

    let alone = QuizService::new(
        Clock::fixed(now),
        Arc::new(QuestionBank::standard()),
        Arc::new(DownResultStore::default()),
        Arc::new(repo.clone()),
        Arc::new(repo),
    );
    assert!(alone.history(USER, 5).await.is_err());
}

#[tokio::test]
async fn rename_updates_the_display_name() {
    let repo = repo_with_profile(40).await;
    let profiles = ProfileService::new(
        Clock::fixed(fixed_now() + Duration::days(1)),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    );

    let renamed = profiles.rename(USER, "Jordan Lee").await.unwrap();
    assert_eq!(renamed.display_name(), "Jordan Lee");
    assert_eq!(
        repo.get_profile(USER).await.unwrap().unwrap().display_name(),
        "Jordan Lee"
    );

    assert!(matches!(
        profiles.rename(USER, "   ").await,
        Err(ProfileServiceError::Profile(ProfileError::EmptyName))
    ));
    assert!(matches!(
        profiles.rename(UserId::new(404), "Nobody").await,
        Err(ProfileServiceError::UnknownUser(_))
    ));
    assert_eq!(
        profiles.get_profile(USER).await.unwrap().display_name(),
        "Jordan Lee"
    );
}

#[tokio::test]
async fn configured_question_bank_replaces_the_standard_one() {
    let path = std::env::temp_dir().join(format!("style-bank-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"[
            {"id": 1, "modality": "visual", "prompt": "Which colour is the sky?",
             "kind": {"type": "multiple_choice", "options": ["blue", "green"], "correct_index": 0}},
            {"id": 2, "modality": "auditory", "prompt": "Which word rhymes with cat?",
             "kind": {"type": "multiple_choice", "options": ["dog", "hat"], "correct_index": 1}}
        ]"#,
    )
    .unwrap();

    let config = AppConfig {
        database_url: "sqlite:file:memdb_custom_bank?mode=memory&cache=shared".to_owned(),
        question_bank_path: Some(path.clone()),
        ..AppConfig::default()
    };
    let app = AppServices::new_sqlite(&config, Clock::fixed(fixed_now()))
        .await
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    app.profiles()
        .create_profile(USER, "Jordan", 15)
        .await
        .unwrap();
    let quiz = app.quiz();
    let mut session = quiz.start_or_resume(USER).await.unwrap();
    assert_eq!(session.total_questions(), 2);
    play(&quiz, &mut session, ModalityScores::new(0, 1, 0, 0)).await;
    let receipt = quiz.submit(USER, session).await.unwrap();
    assert_eq!(receipt.result.dominant_style(), Modality::Auditory);
}

#[tokio::test]
async fn missing_question_bank_file_fails_startup() {
    let config = AppConfig {
        database_url: "sqlite:file:memdb_missing_bank?mode=memory&cache=shared".to_owned(),
        question_bank_path: Some("/nonexistent/style-bank.json".into()),
        ..AppConfig::default()
    };
    let err = AppServices::new_sqlite(&config, Clock::fixed(fixed_now()))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppServicesError::BankFile { .. }));
}
