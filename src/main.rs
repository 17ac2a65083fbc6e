use anyhow::bail;
use clap::Parser;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use eomgen::model::{ModelDefinition, ModelError};
use eomgen::parser::ParseError;

#[derive(Parser, Debug)]
#[command(version, about = "Symbolic matrix to C code generator", long_about = None)]
struct Args {
    /// File-name prefix for the emitted <prefix>.h / <prefix>.c pair
    #[arg(short, long, default_value = "")]
    prefix: String,

    /// The model definition *.json file to generate from
    #[arg(name = "MODEL_FILE")]
    model_file: String,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    eomgen::init_logger();
    let args = Args::parse();
    let bar = "=".repeat(40);

    let text = std::fs::read_to_string(&args.model_file)?;
    let model = ModelDefinition::from_json(&text)?;

    let generator = match model.into_generator() {
        Ok(generator) => generator,
        Err(ModelError::Expression {
            location,
            text,
            source,
        }) => {
            report_expression_error(&location, &text, &source);
            bail!("failed to parse expression at {location}");
        }
        Err(other) => return Err(other.into()),
    };

    if args.verbose {
        println!("\n\n{}", bar);
        println!("SUBEXPRESSIONS");
        println!("{}", bar);
        for sub in generator.subexpressions() {
            println!("{} = {}", sub.symbol, sub.expr);
        }
    }

    if args.prefix.is_empty() {
        let (header, source) = generator.render(None)?;
        println!("{header}");
        println!("{source}");
    } else {
        generator.write(&args.prefix)?;
        if args.verbose {
            println!("\n\n{}", bar);
            println!("WROTE {0}.h, {0}.c", args.prefix);
            println!("{}", bar);
        }
    }

    Ok(())
}

/// Render a parse failure inside a model expression with its source
/// span, then let the caller abort.
fn report_expression_error(location: &str, text: &str, err: &ParseError) {
    let file = SimpleFile::new(location.to_string(), text.to_string());
    let mut diagnostic = Diagnostic::error().with_message(err.to_string());
    if let Some(span) = err.span() {
        diagnostic = diagnostic.with_labels(vec![Label::primary((), span)]);
    }
    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = term::Config::default();
    let _ = term::emit(&mut writer.lock(), &config, &file, &diagnostic);
}
