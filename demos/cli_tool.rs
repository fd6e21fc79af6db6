//! CLI Tool Example
//!
//! This example demonstrates how to build a command-line tool
//! using mdxlsx for converting Markdown files to Excel.

use std::process;

use mdxlsx::{ConverterBuilder, LinkStyle, MdToXlsxError};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <input.md> <output.xlsx> [options]", args[0]);
        eprintln!("\nOptions:");
        eprintln!("  --sheet-name <name>   Worksheet name (default: Sheet1)");
        eprintln!("  --visual-links        Style link text but drop link targets");
        eprintln!("  --no-heading-scale    Keep all headings at body font size");
        eprintln!("  --warnings-json       Print warnings as JSON instead of text");
        eprintln!("\nExamples:");
        eprintln!("  {} notes.md notes.xlsx", args[0]);
        eprintln!("  {} notes.md notes.xlsx --sheet-name \"Notes\"", args[0]);
        eprintln!("  {} notes.md notes.xlsx --visual-links --warnings-json", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    // Parse options
    let mut sheet_name: Option<String> = None;
    let mut link_style = LinkStyle::CellHyperlink;
    let mut heading_scale = true;
    let mut warnings_json = false;
    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--sheet-name" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --sheet-name requires a value");
                    process::exit(1);
                }
                sheet_name = Some(args[i + 1].clone());
                i += 2;
            }
            "--visual-links" => {
                link_style = LinkStyle::VisualOnly;
                i += 1;
            }
            "--no-heading-scale" => {
                heading_scale = false;
                i += 1;
            }
            "--warnings-json" => {
                warnings_json = true;
                i += 1;
            }
            _ => {
                eprintln!("Error: Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
    }

    // Convert Markdown file
    match convert_markdown(input_path, output_path, sheet_name, link_style, heading_scale) {
        Ok(warnings) => {
            report_warnings(&warnings, warnings_json);
            println!("Conversion completed: {} -> {}", input_path, output_path);
        }
        Err(e) => {
            handle_error(e);
            process::exit(1);
        }
    }
}

fn convert_markdown(
    input_path: &str,
    output_path: &str,
    sheet_name: Option<String>,
    link_style: LinkStyle,
    heading_scale: bool,
) -> Result<Vec<mdxlsx::Warning>, MdToXlsxError> {
    // Build converter with the requested settings
    let mut builder = ConverterBuilder::new()
        .with_link_style(link_style)
        .with_heading_scale(heading_scale);
    if let Some(name) = sheet_name {
        builder = builder.with_sheet_name(&name);
    }
    let converter = builder.build()?;

    // Convert with atomic output (temp file + rename)
    let result = converter.convert_file(input_path, output_path)?;
    Ok(result.warnings)
}

fn report_warnings(warnings: &[mdxlsx::Warning], as_json: bool) {
    if warnings.is_empty() {
        return;
    }
    if as_json {
        match serde_json::to_string_pretty(warnings) {
            Ok(json) => eprintln!("{}", json),
            Err(e) => eprintln!("Error: failed to serialize warnings: {}", e),
        }
    } else {
        for warning in warnings {
            eprintln!(
                "Warning: {} at block {}: {}",
                warning.kind, warning.block_index, warning.detail
            );
        }
    }
}

fn handle_error(error: MdToXlsxError) {
    match error {
        MdToXlsxError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        MdToXlsxError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
            eprintln!("Please check your sheet name or output path.");
        }
        MdToXlsxError::Zip(msg) => {
            eprintln!("ZIP Archive Error: {}", msg);
            eprintln!("Writing the XLSX container failed.");
        }
        MdToXlsxError::Xml(msg) => {
            eprintln!("XML Write Error: {}", msg);
            eprintln!("Generating a worksheet part failed.");
        }
        MdToXlsxError::CapacityExceeded { detail, limit } => {
            eprintln!("Capacity Exceeded:");
            eprintln!("  Details: {}", detail);
            eprintln!("  Limit: {}", limit);
            eprintln!("The document does not fit the XLSX format limits.");
        }
        MdToXlsxError::InputTooLarge { size, max } => {
            eprintln!("Input Too Large: {} bytes (max: {} bytes)", size, max);
        }
    }
}
