use std::fmt;

use tokio::io::{AsyncBufReadExt, BufReader};

use quiz_core::model::CourseIndex;
use quiz_core::quiz::{OptionMark, QuizPhase, format_clock};
use services::{QuizService, QuizSnapshot, SessionHandle};

const OPTION_LETTERS: [char; 4] = ['a', 'b', 'c', 'd'];

#[derive(Debug)]
pub enum InputError {
    Unrecognised { input: String, phase: QuizPhase },
    NoSuchCourse(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Unrecognised { input, phase } => {
                write!(f, "`{input}` does nothing on the {phase} screen")
            }
            InputError::NoSuchCourse(raw) => write!(f, "no course matches `{raw}`"),
        }
    }
}

impl std::error::Error for InputError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Drives one session from stdin until the learner quits or input ends.
pub async fn run_quiz(
    service: &QuizService,
    preselect: Option<CourseIndex>,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = match preselect {
        Some(index) => service.start_session(index)?,
        None => service.open_session(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = handle.timer_updates();
    let mut expiry_shown = false;

    render(service, &handle);
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match interpret(service, &handle, line.trim()) {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(err) => println!("! {err}"),
                }
                if handle.summary().is_none() {
                    expiry_shown = false;
                }
                render(service, &handle);
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = *updates.borrow_and_update();
                let expired = handle.summary().is_some_and(|s| s.auto_submitted);
                if status.phase == QuizPhase::Result && expired && !expiry_shown {
                    expiry_shown = true;
                    println!();
                    println!("Time is up! Your answers were submitted automatically.");
                    render(service, &handle);
                }
            }
        }
    }

    tracing::debug!(phase = %handle.snapshot().phase, "leaving quiz runner");
    Ok(())
}

fn interpret(
    service: &QuizService,
    handle: &SessionHandle,
    input: &str,
) -> Result<Flow, Box<dyn std::error::Error>> {
    if matches!(input, "q" | "quit" | "exit") {
        return Ok(Flow::Quit);
    }
    if input.is_empty() {
        return Ok(Flow::Continue);
    }

    let phase = handle.snapshot().phase;
    let unrecognised = || InputError::Unrecognised {
        input: input.to_string(),
        phase,
    };

    match phase {
        QuizPhase::CourseSelect => handle.select_course(parse_course(service, input)?)?,
        QuizPhase::Rules => match input {
            "s" | "start" => handle.begin()?,
            other => handle.select_course(parse_course(service, other)?)?,
        },
        QuizPhase::InProgress => match input {
            "n" | "next" => handle.next()?,
            "p" | "prev" | "previous" => handle.previous()?,
            "submit" => {
                handle.request_submit()?;
            }
            other => {
                if let Some(option) = parse_option(other) {
                    handle.answer(option)?;
                } else if let Some(number) = other
                    .strip_prefix('g')
                    .and_then(|rest| rest.trim().parse::<usize>().ok())
                {
                    handle.go_to(number.saturating_sub(1))?;
                } else {
                    return Err(unrecognised().into());
                }
            }
        },
        QuizPhase::ConfirmPartialSubmit | QuizPhase::ConfirmFullSubmit => match input {
            "y" | "yes" | "submit" => {
                handle.confirm_submit()?;
            }
            "n" | "no" | "back" | "crosscheck" => handle.cancel_submit()?,
            _ => return Err(unrecognised().into()),
        },
        QuizPhase::Result => match input {
            "r" | "review" => handle.open_review()?,
            _ => return Err(unrecognised().into()),
        },
        QuizPhase::Review => match input {
            "a" | "again" => handle.take_another_quiz()?,
            _ => return Err(unrecognised().into()),
        },
    }
    Ok(Flow::Continue)
}

/// Accepts a 1-based list number or a course code.
fn parse_course(service: &QuizService, input: &str) -> Result<CourseIndex, InputError> {
    if let Ok(number) = input.parse::<usize>() {
        if (1..=service.bank().len()).contains(&number) {
            return Ok(CourseIndex::new(number - 1));
        }
    }
    service
        .bank()
        .find_by_code(input)
        .ok_or_else(|| InputError::NoSuchCourse(input.to_string()))
}

fn parse_option(input: &str) -> Option<usize> {
    let mut chars = input.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let c = c.to_ascii_lowercase();
    OPTION_LETTERS
        .iter()
        .position(|letter| *letter == c)
        .or_else(|| c.to_digit(10).and_then(|d| (1..=4).contains(&d).then(|| d as usize - 1)))
}

fn render(service: &QuizService, handle: &SessionHandle) {
    let snapshot = handle.snapshot();
    println!();
    match snapshot.phase {
        QuizPhase::CourseSelect => {
            println!("Select a course:");
            for listing in service.list_courses() {
                println!(
                    "  {:>2}. {}: {} ({} CBT questions)",
                    listing.index.value() + 1,
                    listing.code,
                    listing.title,
                    listing.question_count
                );
            }
            println!("Enter a number or course code (q to quit).");
        }
        QuizPhase::Rules => {
            println!("{}", course_heading(&snapshot));
            println!("Rules:");
            println!("  - There are {} questions.", snapshot.question_total);
            println!("  - You have {} to finish.", format_clock(service.config().time_limit_secs()));
            println!("  - Answers are submitted automatically when time runs out.");
            println!("  - You may move between questions and change answers before submitting.");
            println!("Type `start` to begin, or another course to switch.");
        }
        QuizPhase::InProgress => render_question(&snapshot),
        QuizPhase::ConfirmPartialSubmit => {
            println!(
                "[{}] You have answered {} of {} questions.",
                snapshot.clock, snapshot.answered, snapshot.question_total
            );
            println!("Unanswered: {}", question_numbers(&snapshot.unanswered));
            println!("Submit anyway? (y/n)");
        }
        QuizPhase::ConfirmFullSubmit => {
            println!(
                "[{}] All {} questions answered. Submit now (y) or crosscheck (n)?",
                snapshot.clock, snapshot.question_total
            );
        }
        QuizPhase::Result => {
            println!("{}", course_heading(&snapshot));
            if let Some(report) = snapshot.score {
                println!("Score: {report} ({:.0}%)", report.percent());
            }
            if let Some(summary) = handle.summary() {
                println!("Time used: {}", format_clock(summary.time_used_secs));
            }
            println!("Type `review` to see the answers.");
        }
        QuizPhase::Review => {
            render_review(handle);
            println!("Type `again` to take another quiz.");
        }
    }
}

fn course_heading(snapshot: &QuizSnapshot) -> String {
    match (&snapshot.course_code, &snapshot.course_title) {
        (Some(code), Some(title)) => format!("{code}: {title}"),
        _ => String::new(),
    }
}

/// 1-based, comma separated.
fn question_numbers(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| (i + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_question(snapshot: &QuizSnapshot) {
    println!(
        "[{}] Question {} of {}  ({} answered, {:.0}%)",
        snapshot.clock,
        snapshot.question_number,
        snapshot.question_total,
        snapshot.answered,
        snapshot.progress_percent
    );
    if let Some(prompt) = &snapshot.prompt {
        println!("{prompt}");
    }
    for (i, option) in snapshot.options.iter().enumerate() {
        let marker = if snapshot.selected_option == Some(i) { '*' } else { ' ' };
        println!(" {marker}{}) {option}", OPTION_LETTERS[i]);
    }
    let pad: Vec<String> = snapshot
        .answered_mask
        .iter()
        .enumerate()
        .map(|(i, answered)| {
            if i + 1 == snapshot.question_number {
                format!("[{}]", i + 1)
            } else if *answered {
                format!("{}+", i + 1)
            } else {
                (i + 1).to_string()
            }
        })
        .collect();
    println!("{}", pad.join(" "));
    println!("a-d answer, n/p move, g<N> jump, submit, q quit");
}

fn render_review(handle: &SessionHandle) {
    let items = match handle.get_review() {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(error = %err, "review unavailable");
            return;
        }
    };
    for item in items {
        println!("Q{}. {}", item.number, item.prompt);
        for (i, option) in item.options.iter().enumerate() {
            let mark = match option.mark {
                OptionMark::Correct => "(correct)",
                OptionMark::IncorrectSelected => "(your answer)",
                OptionMark::Neutral => "",
            };
            println!("    {}) {} {mark}", OPTION_LETTERS[i], option.text);
        }
        if item.user_index.is_none() {
            println!("    not answered");
        }
    }
}
