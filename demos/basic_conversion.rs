//! Basic Conversion Example
//!
//! Converts an in-memory Markdown string to an XLSX file with default
//! settings and prints the produced rows.

use std::fs::File;

use mdxlsx::ConverterBuilder;

const SAMPLE: &str = "\
# Release Notes

First release of the *rich text* converter.

- supports **bold** and *italic*
- supports `code spans`
  - and nested lists
- [project page](https://example.com)

> Feedback is welcome.

```
cargo run --example basic_conversion
```
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let converter = ConverterBuilder::new().build()?;

    // Inspect the conversion result before serializing
    let result = converter.convert(SAMPLE)?;
    for (index, row) in result.rows.iter().enumerate() {
        println!(
            "row {:>2}  indent {}  {:?}  {:?}",
            index + 1,
            row.indent_level,
            row.kind,
            row.cell.flatten()
        );
    }

    // Write the workbook
    let output = File::create("basic_conversion.xlsx")?;
    converter.write_workbook(&result, output)?;
    println!("Wrote basic_conversion.xlsx");

    Ok(())
}
