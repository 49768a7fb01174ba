//! CSV template output

use console::style;
use std::io::Write;

use crate::core::source::REQUIRED_COLUMNS;

/// Example row matching [`REQUIRED_COLUMNS`]
const EXAMPLE_ROW: [&str; 2] = [
    "\"Login button unresponsive\"",
    "\"Clicking 'Sign in' on Safari 17 does nothing.\nSteps: open /login, click Sign in.\"",
];

/// Write the template to `out`
pub fn write_template(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", REQUIRED_COLUMNS.join(","))?;
    writeln!(out, "{}", EXAMPLE_ROW.join(","))?;
    out.flush()
}

/// Print the template to stdout with a usage hint on stderr
pub fn generate_template() -> std::io::Result<()> {
    write_template(&mut std::io::stdout().lock())?;

    // Hint goes to stderr so it doesn't interfere with redirected output
    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: issue-importer --template > issues.csv",
        style("→").blue()
    );
    Ok(())
}
