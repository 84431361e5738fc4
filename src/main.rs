//! Drydock demo entry point.
//!
//! A small application declared with the library, used by the CLI
//! integration tests.

use std::process::ExitCode;

use drydock::{Application, Command, Handler, OptionSpec, OptionValue, StdinPayload, ValueType};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Upper bound applied to `show-options --max`.
const MAX_LIMIT: i64 = 100;

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `DRYDOCK_DEBUG` sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("drydock=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drydock=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn build() -> Application {
    let mut app = Application::from_env();

    app.global_option(OptionSpec::new('v', "verbose").help("Print more detail"));
    app.global_option(
        OptionSpec::long("greeting")
            .value(ValueType::String)
            .help("Greeting word"),
    );

    app.command(
        Command::new(
            "welcome",
            Handler::context(|ctx| {
                let greeting = ctx.globals().str("greeting").unwrap_or("Hello").to_string();
                let name = ctx.options().str("name").unwrap_or("sailor").to_string();
                writeln!(ctx.out(), "{}, {}! Welcome to drydock.", greeting, name)?;
                if ctx.globals().flag("verbose") {
                    let invoked = ctx.invoked_as().to_string();
                    writeln!(ctx.out(), "(invoked as {})", invoked)?;
                }
                Ok(())
            }),
        )
        .description("Print a greeting")
        .option(
            OptionSpec::new('n', "name")
                .value(ValueType::String)
                .help("Who to greet"),
        ),
    );
    app.default_command("welcome");

    app.command(
        Command::new(
            "echo",
            Handler::with_args(|ctx, args| {
                writeln!(ctx.out(), "{}", args.join(" "))?;
                Ok(())
            }),
        )
        .description("Print arguments unchanged")
        .ignore_options(),
    );

    app.command(
        Command::new(
            "count",
            Handler::full(|ctx, _, stdin: StdinPayload| {
                let lines = stdin.lines()?;
                writeln!(ctx.out(), "{} lines", lines.len())?;
                Ok(())
            }),
        )
        .description("Count lines on stdin"),
    );

    app.command(
        Command::new(
            "show-options",
            Handler::with_args(|ctx, args| {
                let mut dump = ctx.to_json();
                dump["args"] = serde_json::json!(args);
                writeln!(ctx.out(), "{}", serde_json::to_string_pretty(&dump)?)?;
                Ok(())
            }),
        )
        .description("Print parsed options as JSON")
        .option(
            OptionSpec::long("max")
                .value(ValueType::Integer)
                .help("Result limit (at most 100)")
                .transform(|value| match value {
                    OptionValue::Int(n) => Ok(OptionValue::Int(n.min(MAX_LIMIT))),
                    other => Ok(other),
                }),
        )
        .option(
            OptionSpec::new('l', "lang")
                .value(ValueType::List)
                .help("Languages"),
        ),
    );

    app.command(
        Command::new("fail", Handler::bare(|| anyhow::bail!("deliberate failure")))
            .description("Exit with an error"),
    );

    app.alias_command("hi", "welcome");
    app.alias_command("show", "show-options");

    app.before(|| {
        tracing::debug!("before hook");
        Ok(())
    });
    app.after(|| {
        tracing::debug!("after hook");
        Ok(())
    });

    app
}

fn main() -> ExitCode {
    let app = build();
    init_tracing(app.is_debug());

    tracing::debug!("drydock demo starting: {:?}", app);
    app.main()
}
