use chrono::Utc;
use clap::{Parser, Subcommand};
use protocol_core::activation::{looks_like_protocol, nutrition_summary};
use protocol_core::progress::default_selected_day;
use protocol_core::store::{clear_protocol, load_protocol, save_protocol};
use protocol_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dayplan")]
#[command(about = "30-day training protocol tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Activate a protocol from a text file, replacing the current one
    Activate {
        file: PathBuf,

        /// Protocol title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = "")]
        objective: String,

        /// Activate even if the text does not look like a 30-day plan
        #[arg(long)]
        force: bool,
    },

    /// Show a day (defaults to the first unfinished one)
    Show {
        #[arg(long)]
        day: Option<usize>,
    },

    /// Record weight, sets or duration for an exercise
    Log {
        #[arg(long)]
        day: usize,

        #[arg(long)]
        exercise: usize,

        #[arg(long)]
        weight: Option<String>,

        #[arg(long)]
        sets: Option<String>,

        /// Duration in seconds
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Toggle an exercise as done
    Done {
        #[arg(long)]
        day: usize,

        #[arg(long)]
        exercise: usize,
    },

    /// Finish a day with feedback
    Finish {
        #[arg(long)]
        day: usize,

        /// 1 (easy) to 5 (brutal)
        #[arg(long)]
        difficulty: Option<u8>,

        /// 1 (drained) to 5 (great)
        #[arg(long)]
        energy: Option<u8>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Show overall progress
    Progress {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export finished days to CSV
    Export { path: PathBuf },

    /// Remove the active protocol
    Reset,
}

fn main() -> Result<()> {
    protocol_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let mut store = FileStore::new(data_dir);

    let result = match cli.command {
        Commands::Activate {
            file,
            title,
            objective,
            force,
        } => cmd_activate(&mut store, &file, title, objective, force),
        Commands::Show { day } => cmd_show(&store, day, &config),
        Commands::Log {
            day,
            exercise,
            weight,
            sets,
            duration,
        } => cmd_log(&mut store, day, exercise, weight, sets, duration),
        Commands::Done { day, exercise } => cmd_done(&mut store, day, exercise),
        Commands::Finish {
            day,
            difficulty,
            energy,
            notes,
        } => {
            let feedback = FeedbackInput::new(
                difficulty.unwrap_or(config.feedback.default_difficulty),
                energy.unwrap_or(config.feedback.default_energy),
                notes,
            );
            cmd_finish(&mut store, day, feedback)
        }
        Commands::Progress { json } => cmd_progress(&store, json),
        Commands::Export { path } => cmd_export(&store, &path),
        Commands::Reset => cmd_reset(&mut store),
    };

    match result {
        Err(e) if e.is_user_recoverable() => {
            eprintln!("✗ {}", e);
            std::process::exit(2);
        }
        other => other,
    }
}

fn cmd_activate(
    store: &mut FileStore,
    file: &Path,
    title: Option<String>,
    objective: String,
    force: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    if !force && !looks_like_protocol(&content) {
        return Err(Error::Other(format!(
            "{} does not look like a 30-day protocol (use --force to activate anyway)",
            file.display()
        )));
    }

    let title = title.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Protocol".into())
    });

    let previous = load_protocol(&*store)?;
    let protocol = Protocol::replace(previous.as_ref(), title, objective, content, Utc::now());
    save_protocol(store, &protocol)?;

    println!("✓ Activated '{}'", protocol.title);
    if let Some(summary) = nutrition_summary(&protocol.content) {
        println!("\nNutrition:\n{}", summary);
    }
    Ok(())
}

fn cmd_show(store: &FileStore, day: Option<usize>, config: &Config) -> Result<()> {
    let protocol = require_protocol(store)?;
    let day = match day {
        Some(d) => day_index(d)?,
        None => default_selected_day(&protocol),
    };

    let catalog = config.catalog();
    let view = day_view(&protocol, day, &MarkerParser, &catalog);

    println!("{}", protocol.title);
    print!("Day {}/{}", day + 1, PROGRAM_DAYS);
    if let Some(title) = &view.header.title {
        print!(": {}", title);
    }
    if let Some(category) = &view.header.category {
        print!(" [{}]", category_label(category));
    }
    println!(" ({})", status_label(view.status));

    if view.is_rest_day() {
        println!("  Rest day");
    }

    for exercise in &view.exercises {
        let mark = if exercise.log.completed { "x" } else { " " };
        print!("  [{}] {}. {}", mark, exercise.index + 1, exercise.display_name());
        if let Some(note) = &exercise.descriptor.note {
            print!(": {}", note);
        }
        let (weight, sets) = (exercise.log.weight_value(), exercise.log.sets_value());
        if !weight.is_unset() || !sets.is_unset() {
            print!("  ({} x {})", measurement_label(&weight), measurement_label(&sets));
        }
        println!();
        if exercise.log.has_invalid_input() {
            println!("        warning: weight and sets should be numbers");
        }

        if let Some(tip) = exercise.entry.and_then(|e| e.tips.first()) {
            println!("        tip: {}", tip);
        }
    }

    if let Some(feedback) = protocol.feedback_for(day) {
        println!(
            "\nFeedback: difficulty {}/5, energy {}/5",
            feedback.difficulty, feedback.energy
        );
        if !feedback.notes.is_empty() {
            println!("  {}", feedback.notes);
        }
    }

    let preview = next_day_preview(&protocol, day, &MarkerParser);
    if !preview.is_empty() {
        let names: Vec<&str> = preview.iter().map(|d| d.name.as_str()).collect();
        println!("\nNext: {}", names.join(", "));
    }

    Ok(())
}

fn cmd_log(
    store: &mut FileStore,
    day: usize,
    exercise: usize,
    weight: Option<String>,
    sets: Option<String>,
    duration: Option<u32>,
) -> Result<()> {
    let day = day_index(day)?;
    let protocol = require_protocol(store)?;
    let index = exercise_index(&protocol, day, exercise)?;

    let fields: Vec<LogField> = [
        weight.map(LogField::Weight),
        sets.map(LogField::Sets),
        duration.map(|d| LogField::Duration(Some(d))),
    ]
    .into_iter()
    .flatten()
    .collect();

    if fields.is_empty() {
        return Err(Error::Other(
            "Nothing to log: pass --weight, --sets or --duration".into(),
        ));
    }

    let commands: Vec<ProtocolCommand> = fields
        .into_iter()
        .map(|field| ProtocolCommand::SetField { day, index, field })
        .collect();
    let updated = run_commands(store, &protocol, &commands)?;

    let log = protocol_core::logbook::get_log(&updated, day, index);
    println!(
        "✓ Day {} exercise {}: weight '{}', sets '{}'",
        day + 1,
        index + 1,
        log.weight,
        log.sets
    );
    Ok(())
}

fn cmd_done(store: &mut FileStore, day: usize, exercise: usize) -> Result<()> {
    let day = day_index(day)?;
    let protocol = require_protocol(store)?;
    let index = exercise_index(&protocol, day, exercise)?;

    let updated = run_commands(
        store,
        &protocol,
        &[ProtocolCommand::ToggleCompleted { day, index }],
    )?;

    let log = protocol_core::logbook::get_log(&updated, day, index);
    if log.completed {
        println!("✓ Day {} exercise {} done", day + 1, index + 1);
    } else {
        println!("✓ Day {} exercise {} reopened", day + 1, index + 1);
    }

    if protocol_core::gate::all_exercises_done(&updated, day, &MarkerParser) {
        println!("  All exercises done. Run `dayplan finish --day {}`", day + 1);
    }
    Ok(())
}

fn cmd_finish(store: &mut FileStore, day: usize, feedback: FeedbackInput) -> Result<()> {
    let day = day_index(day)?;
    let protocol = require_protocol(store)?;

    let updated = run_commands(
        store,
        &protocol,
        &[ProtocolCommand::FinalizeDay { day, feedback }],
    )?;

    let summary = summarize(&updated);
    println!("✓ Day {} finished!", day + 1);
    println!(
        "  Progress: {}/{} days ({}%)",
        summary.completed_days, summary.total_days, summary.percent
    );
    Ok(())
}

fn cmd_progress(store: &FileStore, json: bool) -> Result<()> {
    let protocol = require_protocol(store)?;
    let summary = summarize(&protocol);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let activity = ActivityLog::load(store)?;
    let today = Utc::now().date_naive();

    println!("{}", protocol.title);
    println!(
        "Completed: {}/{} days ({}%)",
        summary.completed_days, summary.total_days, summary.percent
    );
    println!("Next day: {}", summary.default_day + 1);
    if !summary.in_progress_days.is_empty() {
        let days: Vec<String> = summary
            .in_progress_days
            .iter()
            .map(|d| (d + 1).to_string())
            .collect();
        println!("In progress: day {}", days.join(", "));
    }
    println!(
        "Streak: {} day(s), best {}",
        activity.current_streak(today),
        activity.longest_streak()
    );
    Ok(())
}

fn cmd_export(store: &FileStore, path: &Path) -> Result<()> {
    let protocol = require_protocol(store)?;
    let rows = export_feedback_csv(&protocol, path)?;
    println!("✓ Exported {} row(s) to {}", rows, path.display());
    Ok(())
}

fn cmd_reset(store: &mut FileStore) -> Result<()> {
    clear_protocol(store)?;
    println!("✓ Active protocol removed");
    Ok(())
}

/// Apply commands in order and persist the result along with any new activity
fn run_commands(
    store: &mut FileStore,
    protocol: &Protocol,
    commands: &[ProtocolCommand],
) -> Result<Protocol> {
    let mut activity = ActivityLog::load(&*store)?;
    let active_before = activity.len();

    let mut ctx = CommandContext {
        now: Utc::now(),
        parser: &MarkerParser,
        sink: &mut activity,
    };
    let mut updated = protocol.clone();
    for command in commands {
        updated = apply(&updated, command, &mut ctx)?;
    }

    save_protocol(store, &updated)?;
    if activity.len() != active_before {
        tracing::info!("Recording activity ({} active day(s))", activity.len());
        activity.save(store)?;
    }
    Ok(updated)
}

fn require_protocol(store: &FileStore) -> Result<Protocol> {
    load_protocol(store)?.ok_or_else(|| {
        Error::State("No active protocol. Run `dayplan activate <file>` first.".into())
    })
}

/// 1-based day from the command line to a day index
fn day_index(day: usize) -> Result<usize> {
    if day == 0 || day > PROGRAM_DAYS {
        return Err(Error::Other(format!(
            "Day {} is outside the program (1-{})",
            day, PROGRAM_DAYS
        )));
    }
    Ok(day - 1)
}

/// 1-based exercise number to an index, checked against the day's exercises
fn exercise_index(protocol: &Protocol, day: usize, exercise: usize) -> Result<usize> {
    let count = MarkerParser
        .exercises_for_day(&protocol.content, day)
        .len();
    if exercise == 0 || exercise > count {
        return Err(Error::Other(format!(
            "Day {} has {} exercise(s), no exercise {}",
            day + 1,
            count,
            exercise
        )));
    }
    Ok(exercise - 1)
}

fn measurement_label(measurement: &Measurement) -> String {
    if measurement.is_unset() {
        "-".to_string()
    } else {
        measurement.to_string()
    }
}

fn category_label(category: &DayCategory) -> &str {
    match category {
        DayCategory::Upper => "upper",
        DayCategory::Lower => "lower",
        DayCategory::FullBody => "full body",
        DayCategory::Other(tag) => tag.as_str(),
    }
}

fn status_label(status: DayStatus) -> &'static str {
    match status {
        DayStatus::NotStarted => "not started",
        DayStatus::InProgress => "in progress",
        DayStatus::ReadyToFinalize => "ready to finish",
        DayStatus::Completed => "completed",
    }
}
