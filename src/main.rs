mod cli;
mod logging;

use clap::Parser;
use rankboard::board::Board;
use rankboard::config;
use rankboard::error::{RankboardError, Result};
use rankboard::notify::{BoardState, StateShape};
use rankboard::report::{self, OutputFormat};
use rankboard::snapshot;
use rankboard::starter;
use rankboard::types::config::Grouping;
use rankboard::types::record::{RestoreReport, ResultRecord};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 3;
}

const PLACEHOLDER: &str = "# Rank Board\n\n_Nothing to rank: configure at least one item and one question._\n";

/// A board opened from a directory, with its change feed captured for saving.
struct Session {
    board: Board,
    latest: Rc<RefCell<Option<Vec<ResultRecord>>>>,
    state_path: PathBuf,
    grouping: Grouping,
    restore: Option<RestoreReport>,
}

impl Session {
    fn open(root: &Path) -> Result<Self> {
        if !root.exists() {
            return Err(RankboardError::PathNotFound(root.display().to_string()));
        }
        let cfg = config::require_config(root)?;
        let state_path = snapshot::state_path(root, &cfg.board.state_file)?;
        let saved = snapshot::load_entries(&state_path)?;

        let latest = Rc::new(RefCell::new(None));
        let feed = Rc::clone(&latest);
        let mut board = cfg
            .builder()?
            .state_shape(StateShape::Results)
            .on_change(move |state| {
                if let BoardState::Results(records) = state {
                    *feed.borrow_mut() = Some(records.clone());
                }
                Ok(())
            })
            .build()?;

        let restore = saved.map(|entries| board.restore_entries(entries));
        Ok(Self {
            board,
            latest,
            state_path,
            grouping: cfg.board.grouping,
            restore,
        })
    }

    fn save(&mut self) -> Result<bool> {
        self.board.flush_notifications();
        let pending = self.latest.borrow_mut().take();
        match pending {
            Some(records) => snapshot::persist(&self.state_path, &records),
            None => Ok(false),
        }
    }

    fn render(&self, format: &cli::ReportFormat) -> Result<String> {
        let output_format = match format {
            cli::ReportFormat::Json => OutputFormat::Json,
            cli::ReportFormat::Md => OutputFormat::Md,
            cli::ReportFormat::Compact => OutputFormat::Compact,
        };
        report::render(&self.board, output_format, self.grouping)
    }

    fn restore_is_clean(&self) -> bool {
        self.restore.as_ref().map_or(true, RestoreReport::is_clean)
    }
}

fn print_restore_summary(report: &RestoreReport) {
    eprintln!(
        "restore: applied={} relabeled={} skipped={}",
        report.applied,
        report.relabeled,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        eprintln!("  - record #{}: {}", skipped.index, skipped.reason);
    }
}

fn run() -> Result<i32> {
    let cli = cli::Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Init(cmd) => {
            let (action, path) = starter::write_starter(&cmd.path, cmd.dry_run, cmd.no_overwrite)?;
            println!("{}: {}", action.as_str(), path.display());
            if cmd.dry_run {
                println!("dry run: no files were written");
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Show(cmd) => {
            let mut session = match Session::open(&cmd.path) {
                Ok(session) => session,
                Err(RankboardError::Config(message)) => {
                    eprintln!("warning: {message}");
                    println!("{PLACEHOLDER}");
                    return Ok(exit_code::WARNINGS);
                }
                Err(error) => return Err(error),
            };
            if let Some(report) = &session.restore {
                if !report.is_clean() {
                    print_restore_summary(report);
                }
            }
            // Only seed an empty sink; a saved state is left as written.
            if session.restore.is_none() {
                session.save()?;
            }
            println!("{}", session.render(&cmd.format)?);

            if session.restore_is_clean() {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::WARNINGS)
            }
        }
        cli::Commands::Move(cmd) => {
            let mut session = Session::open(&cmd.path)?;
            let outcome = session.board.move_item_by_label(
                &cmd.question,
                &cmd.item,
                &cmd.bucket,
                cmd.position,
            )?;
            let saved = session.save()?;

            let rank = outcome
                .rank
                .map(|rank| format!("rank {rank}"))
                .unwrap_or_else(|| "unranked".to_string());
            eprintln!(
                "moved {} to '{}' at position {} ({rank})",
                cmd.item,
                session.board.scale().label(outcome.to),
                outcome.position
            );
            if saved {
                eprintln!("saved: {}", session.state_path.display());
            }
            println!("{}", session.render(&cmd.format)?);
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Restore(cmd) => {
            if !cmd.from.exists() {
                return Err(RankboardError::PathNotFound(cmd.from.display().to_string()));
            }
            let raw = std::fs::read_to_string(&cmd.from)?;
            let entries = snapshot::parse_entries(&raw)?;

            let mut session = Session::open(&cmd.path)?;
            let report = session.board.restore_entries(entries);
            session.save()?;
            print_restore_summary(&report);
            println!("saved: {}", session.state_path.display());

            if report.is_clean() {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::WARNINGS)
            }
        }
        cli::Commands::Validate(cmd) => {
            if !cmd.path.exists() {
                return Err(RankboardError::PathNotFound(cmd.path.display().to_string()));
            }
            let cfg = config::require_config(&cmd.path)?;
            cfg.validate()?;
            let scale = cfg.scale()?;
            println!(
                "config ok: {} items, {} questions, {} scale buckets",
                cfg.items.len(),
                cfg.questions.len(),
                scale.len()
            );

            let session = Session::open(&cmd.path)?;
            match &session.restore {
                Some(report) if !report.is_clean() => {
                    print_restore_summary(report);
                    Ok(exit_code::WARNINGS)
                }
                Some(report) => {
                    println!("saved state ok: {} entries", report.applied);
                    Ok(exit_code::SUCCESS)
                }
                None => {
                    println!("saved state: none");
                    Ok(exit_code::SUCCESS)
                }
            }
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
