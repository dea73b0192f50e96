//! Line-based terminal front end.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use wordlink_core::highscore::sort_by_rank;
use wordlink_core::{Category, CategoryChoice, Phase, Question, WinTier};

use crate::api::ApiError;
use crate::commands;
use crate::driver::{Command, DriverHandle, QuizEvent};
use crate::editor::{FormStep, QuestionForm};
use crate::prefs::ProfileTab;
use crate::state::AppState;

const HELP: &str = "\
Commands:
  :start [CATEGORY]  start a quiz (RANDOM or a category name)
  :next              next round (same as an empty line)
  :reset             replay the same rounds
  :hard              back to category selection
  :categories        list playable categories
  :scores            show the leaderboard
  :tab <name>        profile, add-question, my-questions or favorites
  :add               write a new question, one field per line
  :edit <id>         change one of your questions
  :toggle <id>       switch one of your questions on or off
  :delete <id>       delete one of your questions
  :fav <id>          add or remove a favorite
  :cancel            abandon the question being written
  :help              show this help
  :quit              exit
Anything else is a guess, or your name when a high score is waiting.
An empty line skips a waiting high score.";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start(Option<CategoryChoice>),
    Next,
    Reset,
    HardReset,
    Categories,
    Scores,
    Tab(ProfileTab),
    Add,
    Edit(String),
    ToggleActive(String),
    Delete(String),
    Favorite(String),
    Cancel,
    Help,
    Quit,
    Text(String),
}

/// Parse one line of input.
pub fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Next);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Text(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("start", None) => Ok(Input::Start(None)),
        ("start", Some(arg)) => arg
            .to_uppercase()
            .parse()
            .map(|choice| Input::Start(Some(choice)))
            .map_err(|e: wordlink_core::CategoryParseError| e.to_string()),
        ("next", None) => Ok(Input::Next),
        ("reset", None) => Ok(Input::Reset),
        ("hard", None) => Ok(Input::HardReset),
        ("categories", None) => Ok(Input::Categories),
        ("scores", None) => Ok(Input::Scores),
        ("tab", Some(arg)) => arg
            .parse()
            .map(Input::Tab)
            .map_err(|_| format!("unknown tab: {arg}")),
        ("add", None) => Ok(Input::Add),
        ("edit", Some(id)) => Ok(Input::Edit(id.to_string())),
        ("toggle", Some(id)) => Ok(Input::ToggleActive(id.to_string())),
        ("delete", Some(id)) => Ok(Input::Delete(id.to_string())),
        ("fav", Some(id)) => Ok(Input::Favorite(id.to_string())),
        ("cancel", None) => Ok(Input::Cancel),
        ("help", None) => Ok(Input::Help),
        ("quit" | "q", None) => Ok(Input::Quit),
        _ => Err(format!("unknown command: {line} (try :help)")),
    }
}

/// Text shown for a driver event.
pub fn render_event(event: &QuizEvent) -> String {
    match event {
        QuizEvent::CatalogLoaded {
            questions,
            categories,
        } => format!(
            "{questions} questions loaded, {} categories playable",
            categories.len()
        ),
        QuizEvent::CategoryChosen(choice) => format!("Category: {}", choice.display_name()),
        QuizEvent::Started {
            category,
            round_count,
        } => format!(
            "Quiz started: {} ({round_count} rounds)",
            category.display_name()
        ),
        QuizEvent::RoundStarted(round) => {
            let mut out = format!(
                "Round {}/{} [{}] {}\n  Clues: {}",
                round.round_index + 1,
                round.round_count,
                round.category.display_name(),
                round.title,
                round.clue_words.join(", ")
            );
            if let Some(url) = &round.image_url {
                out.push_str(&format!("\n  Image: {url}"));
            }
            out
        }
        QuizEvent::Revealed(outcome) => {
            let verdict = if outcome.correct { "Correct!" } else { "Wrong!" };
            let mut out = format!(
                "{verdict} The word was \"{}\". {}",
                outcome.solution, outcome.explanation
            );
            if !outcome.final_round {
                out.push_str("\n  Press enter for the next round.");
            }
            out
        }
        QuizEvent::WinBanner(tier) => match tier {
            WinTier::Perfect => "*** Perfect game! ***".to_string(),
            WinTier::Good => "** Well played! **".to_string(),
            WinTier::Ok => "* Not bad! *".to_string(),
            WinTier::Bad => "Better luck next time.".to_string(),
        },
        QuizEvent::WinBannerHidden => String::new(),
        QuizEvent::Finished(result) => format!(
            "Finished {} rounds with {} mistake(s) in {:.1}s",
            result.rounds,
            result.mistakes,
            result.elapsed_secs()
        ),
        QuizEvent::HighScorePrompt(_) => {
            "New high score! Enter your name to save it.".to_string()
        }
        QuizEvent::NoHighScore(_) => "Not enough for the leaderboard this time.".to_string(),
        QuizEvent::HighScoreSaved(score) => {
            format!("Saved high score for {}", score.player_name)
        }
        QuizEvent::Reset { hard: true } => "Back to category selection.".to_string(),
        QuizEvent::Reset { hard: false } => "Replaying the same rounds.".to_string(),
        QuizEvent::Notice(message) => message.clone(),
    }
}

fn render_categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No playable categories.".to_string();
    }
    let mut lines = vec![format!("  RANDOM  {}", CategoryChoice::Random.display_name())];
    lines.extend(
        categories
            .iter()
            .map(|c| format!("  {}  {}", c.as_str(), c.display_name())),
    );
    lines.join("\n")
}

fn render_questions(questions: &[Question]) -> String {
    if questions.is_empty() {
        return "  (none)".to_string();
    }
    questions
        .iter()
        .map(|q| {
            let status = if q.active { "" } else { " (inactive)" };
            format!("  {}  {} [{}]{status}", q.id, q.title, q.category.display_name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read stdin and print driver events until `:quit` or end of input.
pub async fn run(
    mut state: AppState,
    driver: DriverHandle,
    mut events: mpsc::UnboundedReceiver<QuizEvent>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut categories: Vec<Category> = Vec::new();
    let mut name_pending = false;
    let mut form: Option<QuestionForm> = None;

    let who = state.profiles.display_name(&state.identity).await;
    println!("Welcome, {who}! Type :help for commands.");

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match &event {
                    QuizEvent::CatalogLoaded { categories: loaded, .. } => categories = loaded.clone(),
                    QuizEvent::HighScorePrompt(_) => name_pending = true,
                    QuizEvent::HighScoreSaved(_)
                    | QuizEvent::NoHighScore(_)
                    | QuizEvent::Reset { .. }
                    | QuizEvent::Started { .. } => {
                        name_pending = false
                    }
                    _ => {}
                }
                let text = render_event(&event);
                if !text.is_empty() {
                    println!("{text}");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                if let Some(active) = form.as_mut() {
                    if line.trim() == ":cancel" {
                        form = None;
                        println!("Question discarded.");
                        continue;
                    }
                    match active.accept(&line) {
                        Ok(FormStep::Ask(prompt)) => println!("{prompt}"),
                        Ok(FormStep::Done(draft)) => {
                            let question_id = active.question_id().map(str::to_string);
                            form = None;
                            match commands::save_question(&state, question_id.as_deref(), &draft).await {
                                Ok(saved) => {
                                    println!("Saved question {} ({})", saved.id, saved.title);
                                    driver.send(Command::ReloadCatalog)?;
                                }
                                Err(e) => print_error("Could not save the question", &e),
                            }
                        }
                        Err(message) => println!("{message}\n{}", active.prompt()),
                    }
                    continue;
                }

                let input = match parse_line(&line) {
                    Ok(input) => input,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                debug!(?input, "input");

                match input {
                    Input::Quit => break,
                    Input::Help => println!("{HELP}"),
                    Input::Start(choice) => {
                        if let Some(choice) = choice {
                            if driver.snapshot().await?.phase == Phase::Finished {
                                driver.send(Command::HardReset)?;
                            }
                            driver.send(Command::ChooseCategory(choice))?;
                        }
                        driver.send(Command::Start)?;
                    }
                    Input::Next if name_pending => {
                        name_pending = false;
                        driver.send(Command::DismissHighScore)?;
                        println!("High score skipped.");
                    }
                    Input::Next => driver.send(Command::Confirm)?,
                    Input::Reset => driver.send(Command::SoftReset)?,
                    Input::HardReset => driver.send(Command::HardReset)?,
                    Input::Categories => println!("{}", render_categories(&categories)),
                    Input::Scores => show_scores(&state).await,
                    Input::Tab(tab) => show_tab(&mut state, tab).await,
                    Input::Add if state.identity.is_anonymous() => {
                        println!("Log in to add questions.")
                    }
                    Input::Add => {
                        let new_form = QuestionForm::new(state.identity.clone());
                        println!("{}", new_form.prompt());
                        form = Some(new_form);
                    }
                    Input::Edit(id) => match commands::question_for_edit(&state, &id).await {
                        Ok(question) => {
                            let edit_form = QuestionForm::edit(&question);
                            println!("Editing {id}. An empty line keeps a value.");
                            println!("{}", edit_form.prompt());
                            form = Some(edit_form);
                        }
                        Err(e) => print_error("Could not load the question", &e),
                    },
                    Input::ToggleActive(id) => match commands::toggle_active(&state, &id).await {
                        Ok(question) => {
                            let status = if question.active { "active" } else { "inactive" };
                            println!("{id} is now {status}");
                            driver.send(Command::ReloadCatalog)?;
                        }
                        Err(e) => print_error("Could not change the question", &e),
                    },
                    Input::Delete(id) => match commands::delete_question(&state, &id).await {
                        Ok(()) => {
                            println!("Deleted {id}");
                            driver.send(Command::ReloadCatalog)?;
                        }
                        Err(e) => print_error("Could not delete the question", &e),
                    },
                    Input::Favorite(id) => match commands::toggle_favorite(&mut state, &id).await {
                        Ok(true) => println!("Added {id} to favorites"),
                        Ok(false) => println!("Removed {id} from favorites"),
                        Err(e) => print_error("Could not update favorites", &e),
                    },
                    Input::Cancel => println!("Nothing to cancel."),
                    Input::Text(text) if name_pending => {
                        driver.send(Command::SubmitPlayerName(text))?
                    }
                    Input::Text(text) => driver.send(Command::Guess(text))?,
                }
            }
        }
    }

    Ok(())
}

fn print_error(context: &str, error: &ApiError) {
    warn!(error = %error, "{context}");
    println!("{context}:");
    for line in commands::error_lines(error) {
        println!("  {line}");
    }
}

async fn show_scores(state: &AppState) {
    match state.api.high_scores().await {
        Ok(mut scores) => {
            sort_by_rank(&mut scores);
            if scores.is_empty() {
                println!("No high scores yet.");
            }
            for (rank, score) in scores.iter().enumerate() {
                println!(
                    "{:>2}. {:<16} {:>2} mistake(s) {:>6.1}s  {}",
                    rank + 1,
                    score.player_name,
                    score.mistakes,
                    score.time_secs,
                    score.category.display_name()
                );
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to load high scores");
            println!("Could not load high scores: {e}");
        }
    }
}

async fn show_tab(state: &mut AppState, tab: ProfileTab) {
    if let Err(e) = state.set_profile_tab(tab) {
        warn!(error = %e, "failed to save profile tab");
    }

    match tab {
        ProfileTab::Profile => match state.profiles.profile(&state.identity).await {
            Some(profile) => {
                println!("{} ({})", profile.display_name(), profile.login);
                for value in [&profile.location, &profile.bio, &profile.html_url]
                    .into_iter()
                    .flatten()
                {
                    println!("  {value}");
                }
            }
            None => println!(
                "{}",
                state.profiles.display_name(&state.identity).await
            ),
        },
        ProfileTab::AddQuestion => {
            println!("Type :add to write a question. It needs at least 4 clue words; every text field needs 3 characters or more.")
        }
        ProfileTab::MyQuestions => match state.api.my_questions(&state.identity).await {
            Ok(questions) => {
                println!("{}", render_questions(&questions));
                println!("Use :edit, :toggle or :delete with a question id.");
            }
            Err(e) => print_error("Could not load your questions", &e),
        },
        ProfileTab::Favorites => match state.favorites.refresh().await {
            Ok(questions) => {
                println!("{}", render_questions(&questions));
                println!("Use :fav with a question id to add or remove one.");
            }
            Err(e) => print_error("Could not load favorites", &e),
        },
    }
}
