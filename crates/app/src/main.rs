use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use services::{AppConfig, AppServices, Clock, StoredResult, SubmitError, WritePath};
use style_core::classifier::classify_detailed;
use style_core::model::{ModalityScores, QuizLevel, QuizResult, UserId};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod db;
mod prompt;

use cli::{ClassifyArgs, Cli, Commands, ProfileAction};
use prompt::Reply;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    if let Commands::Classify(args) = &cli.command {
        return classify(args);
    }

    let config = load_config(&cli)?;
    let services = AppServices::new_sqlite(&config, Clock::system())
        .await
        .context("failed to open the database")?;

    match cli.command {
        Commands::Quiz { user } => run_quiz(&services, UserId::new(user)).await,
        Commands::History { user, limit, json } => {
            history(&services, UserId::new(user), limit, json).await
        }
        Commands::Profile { action } => profile(&services, action).await,
        Commands::Recommend {
            user,
            files,
            limit,
            json,
        } => {
            let mut materials = Vec::with_capacity(files.len());
            for path in &files {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                materials.push(text);
            }
            let rec = services
                .recommendations()
                .recommend(UserId::new(user), &materials, limit)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
                return Ok(());
            }
            println!("Learning style: {}", rec.style.label());
            println!("{}\n", rec.plan.summary);
            println!("Techniques:");
            for technique in rec.plan.techniques {
                println!("  - {technique}");
            }
            println!("Look for: {}", rec.plan.material_formats.join(", "));
            if !rec.keywords.is_empty() {
                println!("\nKey topics:");
                for keyword in &rec.keywords {
                    println!("  {:<20} {}", keyword.word, keyword.count);
                }
            }
            Ok(())
        }
        Commands::Classify(_) => Ok(()),
    }
}

/// Environment first, then CLI flags on top.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.database_url.clone_from(db);
    }
    if let Some(fallback) = &cli.fallback_db {
        config.fallback_database_url = Some(fallback.clone());
    }
    if let Some(bank) = &cli.bank {
        config.question_bank_path = Some(bank.clone());
    }

    config.database_url = db::normalize_sqlite_url(&config.database_url);
    db::prepare_sqlite_file(&config.database_url)?;
    if let Some(url) = config.fallback_database_url.take() {
        let url = db::normalize_sqlite_url(&url);
        db::prepare_sqlite_file(&url)?;
        config.fallback_database_url = Some(url);
    }
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn classify(args: &ClassifyArgs) -> Result<()> {
    let clamped = ModalityScores::from_signed(
        args.visual,
        args.auditory,
        args.reading_writing,
        args.kinesthetic,
    );
    if clamped.clamped {
        warn!("negative scores were treated as zero");
    }
    let scores = clamped.scores;
    let classification = classify_detailed(&scores);
    let level = args.age.map(QuizLevel::from_age);

    if args.json {
        let out = serde_json::json!({
            "scores": scores,
            "classification": classification,
            "quiz_level": level,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_scores(scores);
    println!(
        "Dominant style: {} ({:.1}% ahead of the next)",
        classification.dominant.label(),
        classification.dominance_percentage
    );
    if let Some(level) = level {
        println!("Quiz level: {level}");
    }
    Ok(())
}

async fn run_quiz(services: &AppServices, user: UserId) -> Result<()> {
    let quiz = services.quiz();
    let mut session = quiz.start_or_resume(user).await?;
    if session.answered_count() > 0 {
        println!(
            "Resuming: {} of {} answered.",
            session.answered_count(),
            session.total_questions()
        );
    }

    while let Some(question) = session.current_question().cloned() {
        let reply = prompt::ask(
            &question,
            session.current_question_index() + 1,
            session.total_questions(),
        )
        .context("failed to read an answer")?;
        match reply {
            Reply::Answer(answer) => {
                quiz.answer(user, &mut session, answer).await?;
            }
            Reply::Pause => {
                println!("Progress saved. Run `quiz` again to continue.");
                return Ok(());
            }
            Reply::Abandon => {
                quiz.abandon(user).await?;
                println!("Attempt discarded.");
                return Ok(());
            }
        }
    }

    match quiz.submit(user, session).await {
        Ok(receipt) => {
            print_result(&receipt.result);
            if receipt.written_to == WritePath::Fallback {
                println!("(saved to the fallback database)");
            }
            if !receipt.profile_updated {
                println!("Profile not updated yet; run `profile sync` to retry.");
            }
            Ok(())
        }
        Err(err @ SubmitError::Persistence(_)) => {
            warn!(error = %err, "submission failed");
            println!("Could not save your result. Your answers are kept; run `quiz` again to retry.");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

async fn history(services: &AppServices, user: UserId, limit: u32, json: bool) -> Result<()> {
    let entries: Vec<StoredResult> = services.quiz().history(user, limit).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No results yet.");
    }
    for entry in &entries {
        let r = &entry.result;
        let marker = match entry.store {
            WritePath::Primary => "",
            WritePath::Fallback => "  (fallback)",
        };
        println!(
            "#{:<4} {}  {:<16} {:<12} total {:>2}  {}s{marker}",
            entry.id,
            r.completed_at().format("%Y-%m-%d %H:%M"),
            r.dominant_style().label(),
            r.quiz_level().to_string(),
            r.total_score(),
            r.time_taken_seconds(),
        );
    }
    Ok(())
}

async fn profile(services: &AppServices, action: ProfileAction) -> Result<()> {
    let profiles = services.profiles();
    match action {
        ProfileAction::Create { user, name, age } => {
            let profile = profiles.create_profile(UserId::new(user), &name, age).await?;
            println!("Created profile {} for {}.", profile.id(), profile.display_name());
        }
        ProfileAction::Show { user, json } => {
            let profile = profiles.get_profile(UserId::new(user)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
                return Ok(());
            }
            println!("{} (user {})", profile.display_name(), profile.id());
            println!("Age: {}", profile.age());
            match profile.learning_style() {
                Some(style) => println!("Learning style: {}", style.label()),
                None => println!("Learning style: not assessed yet"),
            }
        }
        ProfileAction::Rename { user, name } => {
            let profile = profiles.rename(UserId::new(user), &name).await?;
            println!("Renamed to {}.", profile.display_name());
        }
        ProfileAction::SetAge { user, age } => {
            let profile = profiles.update_age(UserId::new(user), age).await?;
            println!("Age set to {}.", profile.age());
        }
        ProfileAction::Sync { user } => {
            let style = profiles.sync_from_latest_result(UserId::new(user)).await?;
            println!("Profile learning style: {}", style.label());
        }
    }
    Ok(())
}

fn print_scores(scores: ModalityScores) {
    for (modality, score) in scores.iter() {
        println!("  {:<16} {score}", modality.label());
    }
}

fn print_result(result: &QuizResult) {
    println!("\nResults");
    print_scores(result.scores());
    println!("  {:<16} {}", "Total", result.total_score());
    println!(
        "Dominant style: {} ({:.1}% ahead of the next)",
        result.dominant_style().label(),
        result.dominance_percentage()
    );
    println!("Quiz level: {}", result.quiz_level());
    println!("Time taken: {}s", result.time_taken_seconds());
}
