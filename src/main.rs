//! ironlog - Personal workout log with cached per-exercise statistics

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};

use ironlog::catalog::{self, CATALOG};
use ironlog::config::Settings;
use ironlog::db::{Category, Exercise};
use ironlog::ops::{NewOption, OptionUpdate, SetInput};
use ironlog::stats::ProgressTrend;
use ironlog::units::{LoadingMode, WeightEntry};
use ironlog::{Database, Tracker};

#[derive(Parser)]
#[command(name = "ironlog")]
#[command(author, version, about = "Personal workout log with cached per-exercise statistics")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage workout options
    #[command(subcommand, name = "option")]
    Options(OptionCommand),

    /// Log an exercise, optionally with sets
    Log {
        /// Option id or name
        option: String,

        /// Day of the session (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Set as REPSxWEIGHT, repeatable (e.g. 5x225)
        #[arg(short, long = "set")]
        sets: Vec<String>,

        /// Weights are plates on one side of the bar
        #[arg(long)]
        per_side: bool,
    },

    /// Edit the sets of an exercise
    #[command(subcommand)]
    Set(SetCommand),

    /// Inspect or change a logged exercise
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// Exercises on a day (defaults to today)
    Day {
        date: Option<NaiveDate>,
    },

    /// Summary of one month
    Month {
        year: i32,
        month: u32,
    },

    /// All month buckets, newest first
    Months,

    /// Cached statistics for one option or all of them
    Stats {
        /// Option id or name
        option: Option<String>,
    },

    /// Training frequency
    Cadence {
        /// Option id or name
        option: Option<String>,
    },

    /// Manage and start routines
    #[command(subcommand)]
    Routine(RoutineCommand),

    /// Assign month buckets to exercises that lack one
    Backfill,
}

#[derive(Subcommand)]
enum OptionCommand {
    /// Create a workout option
    Add {
        name: String,
        /// chest, back, legs, shoulders, arms, core, cardio
        category: String,
        #[arg(long)]
        barbell: bool,
        /// Rest timer in seconds
        #[arg(long)]
        timer: Option<f64>,
        #[arg(long)]
        hide_timer: bool,
        /// Icon image file
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// List options with their categories
    List,

    /// Change fields of an option
    Edit {
        option: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        barbell: Option<bool>,
        #[arg(long)]
        timer: Option<f64>,
        #[arg(long)]
        show_timer: Option<bool>,
        #[arg(long, conflicts_with = "clear_image")]
        image: Option<PathBuf>,
        #[arg(long)]
        clear_image: bool,
    },

    /// Delete an option; its exercises stay in the log
    Delete {
        option: String,
    },

    /// Show the built-in catalog
    Catalog {
        /// Only this category
        category: Option<String>,
    },

    /// Create an option from a catalog entry
    Adopt {
        entry: String,
    },
}

#[derive(Subcommand)]
enum SetCommand {
    /// Append a set to an exercise
    Add {
        exercise: i64,
        reps: String,
        weight: String,
        #[arg(long)]
        per_side: bool,
    },

    /// Change reps and weight of a set
    Edit {
        set: i64,
        reps: String,
        weight: String,
        #[arg(long)]
        per_side: bool,
    },

    /// Remove the set at a position (0-based)
    Delete {
        exercise: i64,
        index: usize,
    },

    /// Move a set between positions (0-based)
    Move {
        exercise: i64,
        from: usize,
        to: usize,
    },
}

#[derive(Subcommand)]
enum ExerciseCommand {
    Show {
        exercise: i64,
    },
    Delete {
        exercise: i64,
    },
    /// Point the exercise at another option
    Retype {
        exercise: i64,
        option: String,
    },
    /// Copy the exercise and its sets to now
    Duplicate {
        exercise: i64,
    },
    /// Change the name shown when the option is gone
    Rename {
        exercise: i64,
        name: String,
    },
}

#[derive(Subcommand)]
enum RoutineCommand {
    Create {
        name: String,
        /// Options in order, by id or name
        options: Vec<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Routines, most used first
    List,
    /// Append an option
    Add {
        routine: i64,
        option: String,
    },
    /// Remove the item at a position (0-based)
    Remove {
        routine: i64,
        index: usize,
    },
    /// Move an item between positions (0-based)
    Move {
        routine: i64,
        from: usize,
        to: usize,
    },
    /// Log one exercise per item, now
    Start {
        routine: i64,
    },
    Delete {
        routine: i64,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let tz = cli.settings.timezone()?;
    let db = Database::open(&cli.settings.db_path)
        .with_context(|| format!("opening {}", cli.settings.db_path.display()))?;
    let tracker = Tracker::new(db, tz);
    tracker.backfill_missing_months()?;

    let now = Utc::now();
    let unit = cli.settings.unit;
    let entry = |per_side: bool| {
        let loading = if per_side { LoadingMode::PerSide } else { LoadingMode::Total };
        WeightEntry::new(unit, loading)
    };
    let display = entry(false);

    match cli.command {
        Commands::Options(command) => run_option(&tracker, command, now)?,

        Commands::Log { option, date, sets, per_side } => {
            let option = tracker.find_option(&option)?;
            let date = match date {
                Some(day) => midday(day, &tz)?,
                None => now,
            };
            let entry = entry(per_side);
            let sets = sets
                .iter()
                .map(|raw| SetInput::parse_pair(raw, &entry))
                .collect::<ironlog::Result<Vec<_>>>()?;
            let exercise = tracker.log_exercise(option.id, date, &sets, now)?;
            println!("Logged: {} (id: {})", exercise.display_name(), exercise.id);
            print_sets(&exercise, &display);
        }

        Commands::Set(command) => match command {
            SetCommand::Add { exercise, reps, weight, per_side } => {
                let input = SetInput::parse(&reps, &weight, &entry(per_side))?;
                let set = tracker.add_set(exercise, input, now)?;
                println!("Added set {}: {} x {}", set.id, set.reps, display.format(set.weight));
            }
            SetCommand::Edit { set, reps, weight, per_side } => {
                let input = SetInput::parse(&reps, &weight, &entry(per_side))?;
                let set = tracker.update_set(set, input, now)?;
                println!("Updated set {}: {} x {}", set.id, set.reps, display.format(set.weight));
            }
            SetCommand::Delete { exercise, index } => {
                let remaining = tracker.delete_set(exercise, index, now)?;
                println!("Deleted set; {} remaining", remaining.len());
            }
            SetCommand::Move { exercise, from, to } => {
                tracker.reorder_sets(exercise, from, to, now)?;
                print_sets(&tracker.exercise(exercise)?, &display);
            }
        },

        Commands::Exercise(command) => match command {
            ExerciseCommand::Show { exercise } => {
                let exercise = tracker.exercise(exercise)?;
                print_exercise(&exercise, &tz, &display);
                print_sets(&exercise, &display);
            }
            ExerciseCommand::Delete { exercise } => {
                tracker.delete_exercise(exercise, now)?;
                println!("Deleted exercise {}", exercise);
            }
            ExerciseCommand::Retype { exercise, option } => {
                let option = tracker.find_option(&option)?;
                let exercise = tracker.retype_exercise(exercise, option.id, now)?;
                println!("Exercise {} is now {}", exercise.id, exercise.display_name());
            }
            ExerciseCommand::Duplicate { exercise } => {
                let copy = tracker.duplicate_exercise(exercise, now)?;
                println!("Duplicated as exercise {}", copy.id);
                print_sets(&copy, &display);
            }
            ExerciseCommand::Rename { exercise, name } => {
                let exercise = tracker.rename_exercise(exercise, &name)?;
                println!("Renamed exercise {} to {}", exercise.id, exercise.name);
            }
        },

        Commands::Day { date } => {
            let exercises = match date {
                Some(day) => tracker.exercises_on_day(day)?,
                None => tracker.exercises_today(now)?,
            };
            if exercises.is_empty() {
                println!("Nothing logged.");
            }
            for exercise in &exercises {
                print_exercise(exercise, &tz, &display);
            }
        }

        Commands::Month { year, month } => match tracker.monthly_bucket(year, month)? {
            Some(bucket) => {
                println!("{}", bucket.display_name());
                println!("{:-<60}", "");
                println!("Exercises: {}", bucket.total_exercises());
                println!("Training days: {}", bucket.total_days(&tz));
                println!("Volume: {}", display.format(bucket.total_volume()));
                for exercise in &bucket.exercises {
                    print_exercise(exercise, &tz, &display);
                }
            }
            None => println!("Nothing logged in {}-{}.", year, month),
        },

        Commands::Months => {
            for bucket in tracker.months()? {
                println!(
                    "{:15} | {:3} exercises | {:2} days",
                    bucket.display_name(),
                    bucket.total_exercises(),
                    bucket.total_days(&tz)
                );
            }
        }

        Commands::Stats { option } => {
            let stats = match option {
                Some(name) => {
                    let option = tracker.find_option(&name)?;
                    vec![tracker.refresh_stat(option.id)?]
                }
                None => tracker.refresh_all_stats()?,
            };

            println!("Workout Statistics");
            println!("{:-<60}", "");
            for stat in &stats {
                println!("{}", stat.workout_name);
                println!("  Sessions: {} on {} days", stat.total_exercises, stat.total_days);
                println!("  Volume: {}", display.format(stat.total_volume));
                if let Some(pr) = &stat.best_one_rep_max {
                    println!(
                        "  Best 1RM: {} ({})",
                        display.format(pr.value),
                        pr.date.with_timezone(&tz).format("%Y-%m-%d")
                    );
                }
                if let Some(pr) = &stat.best_weight {
                    println!(
                        "  Heaviest: {} ({})",
                        display.format(pr.value),
                        pr.date.with_timezone(&tz).format("%Y-%m-%d")
                    );
                }
                if let Some(trend) = ProgressTrend::fit(&stat.one_rep_max_history) {
                    println!(
                        "  Trend: {:+.2}/day, 1RM in 30 days ~{} (R² {:.2}, {} points)",
                        display.from_canonical(trend.daily_progress()),
                        display.format(trend.predict(now, 30)),
                        trend.r2_score(),
                        trend.data_points()
                    );
                }
            }
        }

        Commands::Cadence { option } => {
            let option_id = match option {
                Some(name) => Some(tracker.find_option(&name)?.id),
                None => None,
            };
            let cadence = tracker.cadence(option_id)?;
            println!("Sessions: {} on {} days", cadence.sessions, cadence.training_days);
            println!("Weekly frequency: {:.1} sessions/week", cadence.sessions_per_week());
            if let Some(days) = cadence.days_since_last(now, &tz) {
                println!("Last trained: {} days ago", days);
            }
        }

        Commands::Routine(command) => run_routine(&tracker, command, now)?,

        Commands::Backfill => {
            // Already ran at startup; report what a second pass finds
            let report = tracker.backfill_missing_months()?;
            println!(
                "Assigned {} exercises, created {} month buckets",
                report.assigned, report.buckets_created
            );
        }
    }

    Ok(())
}

fn run_option(tracker: &Tracker, command: OptionCommand, now: DateTime<Utc>) -> Result<()> {
    match command {
        OptionCommand::Add { name, category, barbell, timer, hide_timer, image } => {
            let mut draft = NewOption::new(name, category.parse::<Category>()?).barbell(barbell);
            if let Some(seconds) = timer {
                draft = draft.timer(seconds);
            }
            draft.show_timer = !hide_timer;
            draft.image_data = image.map(std::fs::read).transpose()?;
            let option = tracker.create_option(draft, now)?;
            println!("Created option {} (id: {})", option.name, option.id);
        }

        OptionCommand::List => {
            for option in tracker.list_options()? {
                println!(
                    "{:4} | {:25} | {:10} | {}{}",
                    option.id,
                    option.name,
                    option.category,
                    if option.is_barbell { "barbell, " } else { "" },
                    if option.show_timer {
                        format!("{}s rest", option.timer_seconds)
                    } else {
                        "no timer".to_string()
                    }
                );
            }
        }

        OptionCommand::Edit {
            option,
            name,
            category,
            barbell,
            timer,
            show_timer,
            image,
            clear_image,
        } => {
            let option = tracker.find_option(&option)?;
            let image_data = if clear_image {
                Some(None)
            } else {
                image.map(std::fs::read).transpose()?.map(Some)
            };
            let update = OptionUpdate {
                name,
                category: category.map(|c| c.parse::<Category>()).transpose()?,
                is_barbell: barbell,
                timer_seconds: timer,
                show_timer,
                image_data,
            };
            let option = tracker.update_option(option.id, update, now)?;
            println!("Updated option {} (id: {})", option.name, option.id);
        }

        OptionCommand::Delete { option } => {
            let option = tracker.find_option(&option)?;
            tracker.delete_option(option.id)?;
            println!("Deleted option {}", option.name);
        }

        OptionCommand::Catalog { category } => {
            let entries: Vec<_> = match category {
                Some(c) => catalog::entries_in(c.parse::<Category>()?),
                None => CATALOG.iter().collect(),
            };
            for entry in entries {
                println!(
                    "{:20} | {:22} | {}{}",
                    entry.id,
                    entry.name,
                    entry.category,
                    if entry.is_barbell { " (barbell)" } else { "" }
                );
            }
        }

        OptionCommand::Adopt { entry } => {
            let option = tracker.option_from_catalog(&entry, now)?;
            println!("Option {} (id: {})", option.name, option.id);
        }
    }
    Ok(())
}

fn run_routine(tracker: &Tracker, command: RoutineCommand, now: DateTime<Utc>) -> Result<()> {
    match command {
        RoutineCommand::Create { name, options, color } => {
            let ids = options
                .iter()
                .map(|o| tracker.find_option(o).map(|opt| opt.id))
                .collect::<ironlog::Result<Vec<_>>>()?;
            let routine = tracker.create_routine(&name, color.as_deref(), &ids)?;
            println!("Created routine {} (id: {})", routine.name, routine.id);
        }

        RoutineCommand::List => {
            let names = tracker.list_options()?;
            for routine in tracker.routines_ranked()? {
                let items: Vec<&str> = routine
                    .items
                    .iter()
                    .map(|i| {
                        i.option_id
                            .and_then(|id| names.iter().find(|o| o.id == id))
                            .map_or("(deleted)", |o| o.name.as_str())
                    })
                    .collect();
                println!(
                    "{:4} | {:15} | {} | used {}x | {}",
                    routine.id,
                    routine.name,
                    routine.color_hex,
                    routine.click_frequency,
                    items.join(", ")
                );
            }
        }

        RoutineCommand::Add { routine, option } => {
            let option = tracker.find_option(&option)?;
            let routine = tracker.add_routine_item(routine, option.id)?;
            println!("{} now has {} items", routine.name, routine.items.len());
        }

        RoutineCommand::Remove { routine, index } => {
            let routine = tracker.remove_routine_item(routine, index)?;
            println!("{} now has {} items", routine.name, routine.items.len());
        }

        RoutineCommand::Move { routine, from, to } => {
            let routine = tracker.move_routine_item(routine, from, to)?;
            println!("Reordered {}", routine.name);
        }

        RoutineCommand::Start { routine } => {
            let report = tracker.expand_routine(routine, now)?;
            for exercise in &report.created {
                println!("Logged: {} (id: {})", exercise.display_name(), exercise.id);
            }
            for skipped in &report.skipped {
                println!("Skipped item {}: {}", skipped.item_id, skipped.reason);
            }
        }

        RoutineCommand::Delete { routine } => {
            tracker.delete_routine(routine)?;
            println!("Deleted routine {}", routine);
        }
    }
    Ok(())
}

/// Noon local time keeps a typed-in day on that day
fn midday(day: NaiveDate, tz: &FixedOffset) -> Result<DateTime<Utc>> {
    let Some(noon) = day.and_hms_opt(12, 0, 0) else {
        bail!("invalid date {}", day);
    };
    let local = tz
        .from_local_datetime(&noon)
        .single()
        .ok_or_else(|| anyhow!("ambiguous local time on {}", day))?;
    Ok(local.with_timezone(&Utc))
}

fn print_exercise(exercise: &Exercise, tz: &FixedOffset, display: &WeightEntry) {
    println!(
        "{} | {:4} | {:25} | {} sets | {}",
        exercise.date.with_timezone(tz).format("%Y-%m-%d %H:%M"),
        exercise.id,
        exercise.display_name(),
        exercise.total_sets(),
        display.format(exercise.volume())
    );
}

fn print_sets(exercise: &Exercise, display: &WeightEntry) {
    for (position, set) in exercise.sets.iter().enumerate() {
        println!(
            "  {:2}. {:3} x {:>10}  (set {})",
            position,
            set.reps,
            display.format(set.weight),
            set.id
        );
    }
}
