use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::gpa::{Grade, GradedCourse, SemesterResult, cumulative_gpa};
use quiz_core::quiz::SessionConfig;
use services::{QuizService, TokioTickScheduler, default_bank, load_bank_from_path};
use tracing_subscriber::EnvFilter;

mod runner;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTimeLimit { raw: String },
    InvalidSemester { raw: String },
    NoSemesters,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTimeLimit { raw } => {
                write!(f, "invalid --time-limit value: {raw} (expected seconds > 0)")
            }
            ArgsError::InvalidSemester { raw } => {
                write!(f, "invalid --semester entry: {raw} (expected CODE:GRADE:UNITS)")
            }
            ArgsError::NoSemesters => write!(f, "cgpa needs at least one --semester"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz    [--bank <path>] [--time-limit <secs>] [--course <code>]");
    eprintln!("  cargo run -p app -- courses [--bank <path>]");
    eprintln!("  cargo run -p app -- cgpa    --semester <CODE:GRADE:UNITS,...> [--semester ...]");
    eprintln!();
    eprintln!("Defaults for quiz:");
    eprintln!("  --bank <built-in bank>");
    eprintln!("  --time-limit 1200");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK_PATH, QUIZ_TIME_LIMIT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Courses,
    Cgpa,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "courses" => Some(Self::Courses),
            "cgpa" => Some(Self::Cgpa),
            _ => None,
        }
    }
}

struct QuizArgs {
    bank_path: Option<PathBuf>,
    time_limit_secs: u32,
    course: Option<String>,
}

impl QuizArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut bank_path = std::env::var("QUIZ_BANK_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut time_limit_secs = match std::env::var("QUIZ_TIME_LIMIT_SECS") {
            Ok(raw) => parse_time_limit(raw)?,
            Err(_) => SessionConfig::default().time_limit_secs(),
        };
        let mut course = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank" => bank_path = Some(PathBuf::from(require_value(args, "--bank")?)),
                "--time-limit" => {
                    time_limit_secs = parse_time_limit(require_value(args, "--time-limit")?)?;
                }
                "--course" => course = Some(require_value(args, "--course")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            bank_path,
            time_limit_secs,
            course,
        })
    }
}

fn parse_time_limit(raw: String) -> Result<u32, ArgsError> {
    match raw.trim().parse::<u32>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ArgsError::InvalidTimeLimit { raw }),
    }
}

fn parse_semesters(
    args: &mut impl Iterator<Item = String>,
) -> Result<Vec<Vec<GradedCourse>>, Box<dyn std::error::Error>> {
    let mut semesters = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--semester" => {
                let raw = require_value(args, "--semester")?;
                let mut courses = Vec::new();
                for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
                    courses.push(parse_graded_course(entry)?);
                }
                semesters.push(courses);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg).into()),
        }
    }
    if semesters.is_empty() {
        return Err(ArgsError::NoSemesters.into());
    }
    Ok(semesters)
}

fn parse_graded_course(entry: &str) -> Result<GradedCourse, Box<dyn std::error::Error>> {
    let invalid = || ArgsError::InvalidSemester {
        raw: entry.to_string(),
    };
    let mut parts = entry.split(':');
    let (Some(code), Some(grade), Some(units), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid().into());
    };
    let grade: Grade = grade.parse()?;
    let units: u32 = units.trim().parse().map_err(|_| invalid())?;
    Ok(GradedCourse::new(code, grade, units)?)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "app=warn,services=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_service(args: &QuizArgs) -> Result<QuizService, Box<dyn std::error::Error>> {
    let bank = match &args.bank_path {
        Some(path) => load_bank_from_path(path)?,
        None => default_bank()?,
    };
    tracing::info!(courses = bank.len(), "question bank ready");
    let scheduler = TokioTickScheduler::current()?;
    let config = SessionConfig::new(args.time_limit_secs)?;
    Ok(QuizService::new(Arc::new(bank), Arc::new(scheduler)).with_config(config))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means an interactive quiz.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }
    let mut iter = argv.into_iter();

    match cmd {
        Command::Quiz | Command::Courses => {
            let parsed = QuizArgs::parse(&mut iter).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            let service = build_service(&parsed)?;

            if cmd == Command::Courses {
                for listing in service.list_courses() {
                    println!(
                        "{:>2}. {}: {} ({} questions)",
                        listing.index.value() + 1,
                        listing.code,
                        listing.title,
                        listing.question_count
                    );
                }
                return Ok(());
            }

            let preselect = match parsed.course.as_deref() {
                Some(code) => Some(
                    service
                        .bank()
                        .find_by_code(code)
                        .ok_or_else(|| runner::InputError::NoSuchCourse(code.to_string()))?,
                ),
                None => None,
            };
            runner::run_quiz(&service, preselect).await
        }
        Command::Cgpa => {
            let semesters = parse_semesters(&mut iter)?;
            let results: Vec<SemesterResult> = semesters
                .iter()
                .map(|courses| SemesterResult::from_courses(courses))
                .collect();
            for (i, result) in results.iter().enumerate() {
                println!(
                    "Semester {}: TQP {} / TCU {} = GPA {:.2}",
                    i + 1,
                    result.tqp,
                    result.tcu,
                    result.gpa
                );
            }
            println!("CGPA: {:.2}", cumulative_gpa(&results));
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> std::vec::IntoIter<String> {
        items
            .iter()
            .map(|s| (*s).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn graded_course_entry_parses() {
        let course = parse_graded_course("CSC204:a:3").unwrap();
        assert_eq!(course.code(), "CSC204");
        assert_eq!(course.grade(), Grade::A);
        assert_eq!(course.credit_units(), 3);
        assert!(parse_graded_course("CSC204:A").is_err());
        assert!(parse_graded_course("CSC204:Z:3").is_err());
        assert!(parse_graded_course("CSC204:A:3:extra").is_err());
    }

    #[test]
    fn semesters_require_at_least_one() {
        let mut none = args(&[]);
        assert!(parse_semesters(&mut none).is_err());

        let mut two = args(&["--semester", "A1:A:4", "--semester", "B1:E:2,B2:F:2"]);
        let semesters = parse_semesters(&mut two).unwrap();
        assert_eq!(semesters.len(), 2);
        assert_eq!(semesters[1].len(), 2);
    }

    #[test]
    fn huge_credit_units_from_the_command_line_are_totalled() {
        let mut big = args(&["--semester", "X:A:1000000000,Y:A:4000000000"]);
        let semesters = parse_semesters(&mut big).unwrap();
        let result = SemesterResult::from_courses(&semesters[0]);
        assert_eq!(result.tcu, 5_000_000_000);
        assert_eq!(result.tqp, 25_000_000_000);
        assert!((cumulative_gpa(&[result]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn time_limit_must_be_positive() {
        assert_eq!(parse_time_limit("90".into()).unwrap(), 90);
        assert!(parse_time_limit("0".into()).is_err());
        assert!(parse_time_limit("soon".into()).is_err());
    }
}
