//! Ratesheet CLI - check, correct and upload rate sheets
//!
//! ```bash
//! ratesheet preview rates.xlsx                         # Columns, missing columns, first rows
//! ratesheet validate rates.csv                         # Every row error, exit 1 if blocked
//! ratesheet export rates.csv -o fixed.csv \
//!     --set "2:Origin Port=Shanghai" --move 6:1        # Correct and write locally
//! ratesheet submit rates.csv --set "2:Effective Date=2024-01-01"
//! ```
//!
//! Rows and column positions are 1-based on the command line.

use clap::{Parser, Subcommand};
use ratesheet::config::DEFAULT_PREVIEW_ROWS;
use ratesheet::{serialize, Config, Session, UploadClient};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ratesheet")]
#[command(about = "Validate, correct and upload ocean freight rate sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show columns, missing required columns and the first rows
    Preview {
        /// Input file (.csv, .xlsx, .xls, .ods)
        input: PathBuf,

        /// Number of rows to show
        #[arg(short, long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },

    /// Report every problem; exits with 1 when the file cannot be submitted
    Validate {
        /// Input file
        input: PathBuf,
    },

    /// Apply corrections and write the corrected file locally
    Export {
        /// Input file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        edits: Edits,
    },

    /// Apply corrections and upload the corrected file
    Submit {
        /// Input file
        input: PathBuf,

        /// Upload service base URL (overrides RATESHEET_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,

        #[command(flatten)]
        edits: Edits,
    },
}

#[derive(clap::Args)]
struct Edits {
    /// Cell correction as ROW:COLUMN=VALUE (repeatable)
    #[arg(long = "set", value_name = "ROW:COLUMN=VALUE", value_parser = parse_cell_edit)]
    cells: Vec<CellEdit>,

    /// Column move as FROM:TO positions (repeatable, applied in order)
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_column_move)]
    moves: Vec<ColumnMove>,
}

#[derive(Debug, Clone, PartialEq)]
struct CellEdit {
    row: usize,
    column: String,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnMove {
    from: usize,
    to: usize,
}

fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("'{}' is not a position (positions start at 1)", raw)),
    }
}

fn parse_cell_edit(raw: &str) -> Result<CellEdit, String> {
    let (row, rest) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected ROW:COLUMN=VALUE, got '{}'", raw))?;
    let (column, value) = rest
        .split_once('=')
        .ok_or_else(|| format!("expected ROW:COLUMN=VALUE, got '{}'", raw))?;

    Ok(CellEdit {
        row: parse_position(row)?,
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn parse_column_move(raw: &str) -> Result<ColumnMove, String> {
    let (from, to) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", raw))?;

    Ok(ColumnMove {
        from: parse_position(from)?,
        to: parse_position(to)?,
    })
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Preview { input, rows } => cmd_preview(&input, rows),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Export { input, output, edits } => cmd_export(&input, &output, &edits),
        Commands::Submit { input, base_url, edits } => {
            cmd_submit(&input, base_url.as_deref(), &edits).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load(input: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = Session::new();
    let file = session.load_path(input)?;

    if let Some(ref encoding) = file.encoding {
        eprintln!("   Encoding: {}", encoding);
    }
    if let Some(delimiter) = file.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(delimiter));
    }
    eprintln!("   Columns: {}", file.table().columns().join(", "));

    Ok(session)
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn apply_edits(session: &mut Session, edits: &Edits) -> Result<(), Box<dyn std::error::Error>> {
    for edit in &edits.cells {
        match session.set_cell(edit.row, &edit.column, edit.value.as_str())? {
            Some(error) => eprintln!("   Row {} still invalid: {}", edit.row + 1, error),
            None => eprintln!("   Row {}: '{}' set", edit.row + 1, edit.column),
        }
    }

    for mv in &edits.moves {
        session.move_column(mv.from, mv.to)?;
    }
    if !edits.moves.is_empty() {
        if let Some(table) = session.table() {
            eprintln!("   Column order: {}", table.columns().join(", "));
        }
    }

    Ok(())
}

fn print_rows(session: &Session, limit: usize) {
    let Some(table) = session.table() else {
        return;
    };

    println!("#\t{}\tError", table.columns().join("\t"));
    for (i, row) in session.preview(limit).iter().enumerate() {
        let values: Vec<&str> = row.values_in(table.columns()).collect();
        println!("{}\t{}\t{}", i + 1, values.join("\t"), row.error().unwrap_or(""));
    }
    if table.row_count() > limit {
        println!("... {} more rows", table.row_count() - limit);
    }
}

fn cmd_preview(input: &Path, rows: usize) -> Result<(), Box<dyn std::error::Error>> {
    let session = load(input)?;
    print_rows(&session, rows);

    if let Err(blocked) = session.check_submittable() {
        eprintln!("\nSubmission disabled: {}", blocked);
    }
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let session = load(input)?;

    let missing = session.missing_columns();
    if !missing.is_empty() {
        eprintln!("Missing required columns: {}", missing.join(", "));
    }

    if let Some(table) = session.table() {
        for index in session.invalid_rows() {
            if let Some(error) = table.row(index).and_then(|r| r.error()) {
                eprintln!("Row {}: {}", index + 1, error);
            }
        }
    }

    match session.check_submittable() {
        Ok(()) => {
            eprintln!("All rows valid, ready to submit");
            Ok(())
        }
        Err(blocked) => Err(blocked.into()),
    }
}

fn cmd_export(input: &Path, output: &Path, edits: &Edits) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = load(input)?;
    apply_edits(&mut session, edits)?;

    let file = session.loaded().ok_or("No file loaded")?;
    let payload = serialize(file.table(), file.format)?;
    fs::write(output, &payload.bytes)?;
    eprintln!("Written {} bytes to {}", payload.bytes.len(), output.display());

    if let Err(blocked) = session.check_submittable() {
        eprintln!("Note: file is not submittable yet: {}", blocked);
    }
    Ok(())
}

async fn cmd_submit(
    input: &Path,
    base_url: Option<&str>,
    edits: &Edits,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env_with_base_url(base_url)?;
    let client = UploadClient::new(&config)?;

    let mut session = load(input)?;
    apply_edits(&mut session, edits)?;

    match session.submit(&client).await {
        Ok(outcome) => {
            println!("{}", outcome.message);
            Ok(())
        }
        Err(e) => Err(e.user_message().into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_edit() {
        let edit = parse_cell_edit("2:Origin Port=New York").unwrap();
        assert_eq!(
            edit,
            CellEdit { row: 1, column: "Origin Port".into(), value: "New York".into() }
        );

        let empty = parse_cell_edit("1:Carrier=").unwrap();
        assert_eq!(empty.value, "");

        assert!(parse_cell_edit("0:Carrier=MSC").is_err());
        assert!(parse_cell_edit("Carrier=MSC").is_err());
        assert!(parse_cell_edit("1:Carrier").is_err());
    }

    #[test]
    fn test_parse_column_move() {
        assert_eq!(parse_column_move("6:1").unwrap(), ColumnMove { from: 5, to: 0 });
        assert!(parse_column_move("6").is_err());
        assert!(parse_column_move("a:1").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
