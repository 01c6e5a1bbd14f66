// boardtrace CLI - batch reconciliation of speech-board selection logs

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use boardtrace_recon::board::format_board;
use boardtrace_recon::config::BoardSourceConfig;
use boardtrace_recon::engine::RunInput;
use boardtrace_recon::model::BoardNode;
use boardtrace_recon::{DatasetConfig, ReconError};
use boardtrace_viz::{
    board_to_dot, category_breakdown, menu_grid, menu_titles, overall_grid, word_summary, Grid,
};

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_USAGE};

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
        }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        CliError::new(recon_exit_code(&err), err.to_string())
    }
}

#[derive(Parser)]
#[command(name = "btrace")]
#[command(about = "Reconcile AAC speech-board selection logs against board definitions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline for one dataset config
    #[command(after_help = "\
Examples:
  btrace run iteration_2.toml
  btrace run iteration_2.toml --json
  btrace run iteration_2.toml --output result.json")]
    Run {
        /// Path to the dataset .toml config file
        config: PathBuf,

        /// Output run JSON to stdout instead of only the human summary
        #[arg(long)]
        json: bool,

        /// Write run JSON to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a dataset config without running
    #[command(after_help = "\
Examples:
  btrace validate iteration_2.toml")]
    Validate {
        /// Path to the dataset .toml config file
        config: PathBuf,
    },

    /// Export a formatted board as a Graphviz .gv tree diagram
    #[command(after_help = "\
Examples:
  btrace tree figures/iteration_2/formatted_board.csv board.gv
  dot -Tsvg board.gv -o board.svg")]
    Tree {
        /// Path to a formatted_board.csv
        board: PathBuf,
        /// Path for the output .gv file (.gv appended if missing)
        output: PathBuf,
    },

    /// Summarize board vocabulary across datasets
    #[command(after_help = "\
Examples:
  btrace words figures/iteration_1/formatted_board.csv figures/iteration_2/formatted_board.csv
  btrace words */formatted_board.csv --output-dir figures")]
    Words {
        /// Formatted board tables, one per dataset
        boards: Vec<PathBuf>,

        /// Iteration label per board, in order (defaults to the parent
        /// directory name)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Directory for word_summary.csv and unique_word_counts.csv
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Count a categorical column in a matched-selection or board table
    #[command(after_help = "\
Examples:
  btrace breakdown figures/iteration_2/full_selections.csv --column Category
  btrace breakdown figures/iteration_2/full_selections.csv --column Category --iteration iteration_2")]
    Breakdown {
        /// Table to count (full_selections.csv or formatted_board.csv)
        table: PathBuf,

        /// Categorical column to group by
        #[arg(long)]
        column: String,

        /// Iteration label attached to every output row
        #[arg(long, default_value = "dataset")]
        iteration: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { config, json, output } => cmd_run(config, json, output),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Tree { board, output } => cmd_tree(board, output),
        Commands::Words { boards, labels, output_dir } => cmd_words(boards, labels, output_dir),
        Commands::Breakdown { table, column, iteration } => cmd_breakdown(table, column, iteration),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot read config: {e}")))?;
    let config = DatasetConfig::from_toml(&config_str)?;

    // Input and output paths resolve relative to the config file's directory.
    let base_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let board_table = boardtrace_io::read_table(&base_dir.join(&config.board.file), "board")?;
    let selections_table =
        boardtrace_io::read_table(&base_dir.join(&config.selections.file), "selections")?;

    let result = boardtrace_recon::run(
        &config,
        &RunInput {
            board: board_table,
            selections: selections_table,
        },
    )?;

    let out_dir = match &config.output.dir {
        Some(dir) => base_dir.join(dir),
        None => base_dir.clone(),
    };
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot create {}: {e}", out_dir.display())))?;

    boardtrace_io::write_board(&out_dir.join("formatted_board.csv"), &result.board)?;
    boardtrace_io::write_selections(
        &out_dir.join("formatted_selections.csv"),
        &result.selections,
    )?;
    boardtrace_io::write_matched(&out_dir.join("full_selections.csv"), &result.matched)?;
    boardtrace_io::write_missing(&out_dir.join("missing_selections.csv"), &result.missing)?;

    write_grid(&out_dir.join("heatmap_all.csv"), &overall_grid(&result.matched))?;
    for menu in menu_titles(&result.board) {
        let file = format!("heatmap_{}.csv", sanitize_filename(&menu));
        write_grid(&out_dir.join(file), &menu_grid(&result.matched, &menu))?;
    }

    if let Some(ref path) = output_file {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if json_output {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{}: {} event(s) — {} matched ({} code, {} unique, {} forward-fill), {} unmatched, {} ambiguous tie(s)",
        result.meta.iteration,
        s.total_events,
        s.matched,
        s.code_matches,
        s.unique_matches,
        s.forward_fills,
        s.unmatched,
        s.ambiguous,
    );
    if s.count_mismatch {
        eprintln!("warning: reconciliation output diverged from its input in count or order");
    }
    if s.board_rows_dropped > 0 || s.selection_rows_dropped > 0 {
        eprintln!(
            "dropped during formatting: {} board row(s), {} selection row(s)",
            s.board_rows_dropped, s.selection_rows_dropped,
        );
    }
    eprintln!("wrote tables to {}", out_dir.display());

    Ok(())
}

fn write_grid(path: &Path, grid: &Grid) -> Result<(), CliError> {
    let mut w = csv::Writer::from_path(path)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("{}: {e}", path.display())))?;
    for row in &grid.cells {
        let record: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
        w.write_record(&record)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("{}: {e}", path.display())))?;
    }
    w.flush()
        .map_err(|e| CliError::new(EXIT_ERROR, format!("{}: {e}", path.display())))
}

/// Menu titles become file names; keep only filesystem-safe characters.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot read config: {e}")))?;
    let config = DatasetConfig::from_toml(&config_str)?;
    eprintln!(
        "valid: dataset '{}' (iteration '{}'), board '{}', selections '{}'",
        config.name, config.iteration, config.board.file, config.selections.file,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// tree
// ---------------------------------------------------------------------------

fn cmd_tree(board_path: PathBuf, output: PathBuf) -> Result<(), CliError> {
    let nodes = read_formatted_board(&board_path)?;
    let dot = board_to_dot(&nodes);

    let mut gv_path = output;
    if gv_path.extension().and_then(|e| e.to_str()) != Some("gv") {
        let mut name = gv_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".gv");
        gv_path.set_file_name(name);
    }
    std::fs::write(&gv_path, dot)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write {}: {e}", gv_path.display())))?;
    eprintln!("wrote {}", gv_path.display());
    eprintln!("render with: dot -Tsvg {} -o board.svg", gv_path.display());
    Ok(())
}

fn read_formatted_board(path: &Path) -> Result<Vec<BoardNode>, CliError> {
    let table = boardtrace_io::read_table(path, "board")?;
    let out = format_board(&table, &BoardSourceConfig::formatted(), &[])?;
    Ok(out.nodes)
}

// ---------------------------------------------------------------------------
// words
// ---------------------------------------------------------------------------

fn cmd_words(
    boards: Vec<PathBuf>,
    labels: Vec<String>,
    output_dir: PathBuf,
) -> Result<(), CliError> {
    if boards.is_empty() {
        return Err(CliError::new(EXIT_USAGE, "at least one board table is required"));
    }
    if !labels.is_empty() && labels.len() != boards.len() {
        return Err(CliError::new(
            EXIT_USAGE,
            format!("{} label(s) given for {} board(s)", labels.len(), boards.len()),
        ));
    }

    let mut tagged = Vec::with_capacity(boards.len());
    for (i, path) in boards.iter().enumerate() {
        let label = labels
            .get(i)
            .cloned()
            .unwrap_or_else(|| default_label(path, i));
        tagged.push((label, read_formatted_board(path)?));
    }

    let summary = word_summary(&tagged);

    std::fs::create_dir_all(&output_dir)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot create {}: {e}", output_dir.display())))?;

    let words_path = output_dir.join("word_summary.csv");
    let mut w = csv::Writer::from_path(&words_path)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("{}: {e}", words_path.display())))?;
    w.write_record(["selection", "iteration", "is_menu", "len"])
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    for word in &summary.words {
        w.write_record([
            word.selection.as_str(),
            word.iteration.as_str(),
            if word.is_menu { "true" } else { "false" },
            &word.count.to_string(),
        ])
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    }
    w.flush().map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;

    let totals_path = output_dir.join("unique_word_counts.csv");
    let mut w = csv::Writer::from_path(&totals_path)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("{}: {e}", totals_path.display())))?;
    w.write_record(["iteration", "total_count", "n_unique_words"])
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    for t in &summary.totals {
        w.write_record([
            t.iteration.as_str(),
            &t.total_count.to_string(),
            &t.n_unique_words.to_string(),
        ])
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    }
    w.flush().map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;

    eprintln!(
        "summarized {} board(s) into {} and {}",
        tagged.len(),
        words_path.display(),
        totals_path.display(),
    );
    Ok(())
}

/// Default iteration label: the parent directory name (the pipeline writes
/// one directory per dataset), falling back to the file stem.
fn default_label(path: &Path, index: usize) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .or_else(|| path.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty() && s != ".")
        .unwrap_or_else(|| format!("dataset_{index}"))
}

// ---------------------------------------------------------------------------
// breakdown
// ---------------------------------------------------------------------------

fn cmd_breakdown(table_path: PathBuf, column: String, iteration: String) -> Result<(), CliError> {
    let table = boardtrace_io::read_table(&table_path, "table")?;
    let breakdown = category_breakdown(&table, &iteration, &column)?;

    let mut w = csv::Writer::from_writer(std::io::stdout());
    w.write_record(["iteration", "category", "count", "percent"])
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    for row in &breakdown {
        w.write_record([
            row.iteration.as_str(),
            row.category.as_str(),
            &row.count.to_string(),
            &format!("{:.4}", row.percent),
        ])
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    }
    w.flush().map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_filenames() {
        assert_eq!(sanitize_filename("MAIN MENU"), "MAIN_MENU");
        assert_eq!(sanitize_filename("A/B:C"), "A_B_C");
        assert_eq!(sanitize_filename("JAZZ"), "JAZZ");
    }

    #[test]
    fn default_labels_prefer_parent_dir() {
        assert_eq!(
            default_label(Path::new("figures/iteration_2/formatted_board.csv"), 0),
            "iteration_2"
        );
        assert_eq!(default_label(Path::new("formatted_board.csv"), 1), "formatted_board");
    }

    #[test]
    fn run_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("board.csv"),
            "L1,L2\nA Music,\n,AB Jazz\n,AC Classical\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("selections.csv"),
            "Word/Phrase,Menu\n,Music\nJazz,\nNothing,\n",
        )
        .unwrap();
        let config_path = dir.path().join("dataset.toml");
        std::fs::write(
            &config_path,
            r#"
name = "Test"
iteration = "iteration_t"

[board]
file = "board.csv"

[selections]
file = "selections.csv"

[output]
dir = "out"
"#,
        )
        .unwrap();

        cmd_run(config_path, false, None).map_err(|e| e.message).unwrap();

        let out = dir.path().join("out");
        for file in [
            "formatted_board.csv",
            "formatted_selections.csv",
            "full_selections.csv",
            "missing_selections.csv",
            "heatmap_all.csv",
        ] {
            assert!(out.join(file).exists(), "missing {file}");
        }
        // One per-menu heatmap per distinct menu title.
        assert!(out.join("heatmap_MAIN_MENU.csv").exists());
        assert!(out.join("heatmap_MUSIC.csv").exists());

        let missing = std::fs::read_to_string(out.join("missing_selections.csv")).unwrap();
        assert!(missing.contains("NOTHING,1"));
    }

    #[test]
    fn tree_appends_gv_extension() {
        let dir = tempfile::tempdir().unwrap();
        let board_path = dir.path().join("formatted_board.csv");
        std::fs::write(
            &board_path,
            "full_pattern,menu_pattern,button,selection,menu_title,is_menu,menu_multiplicity,multiplicity\n\
             A,,A,MUSIC,MAIN MENU,true,1,1\n\
             AB,A,B,JAZZ,MUSIC,false,1,1\n",
        )
        .unwrap();

        cmd_tree(board_path, dir.path().join("tree")).map_err(|e| e.message).unwrap();
        let dot = std::fs::read_to_string(dir.path().join("tree.gv")).unwrap();
        assert!(dot.starts_with("digraph \"Speech Board Menu Tree\""));
        assert!(dot.contains("A -> AB;"));
    }
}
