mod error_formatter;
mod formatter;
mod interactive;

use anyhow::Result;
use calculo::{
    check_continuity, derivative_by_definition, limit_at, sign_study, solve_inequality,
    AnalysisResult, CalcError, Engine, Expr, Point, ResourceLimits, Variable,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use formatter::{Formatter, OutputMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calculo")]
#[command(about = "Exact single-variable calculus in the terminal.")]
#[command(
    long_about = "Calculo studies real functions of one variable: sign studies, inequalities, limits, derivatives by definition and continuity checks.\nEvery answer is exact. Without a subcommand it opens the interactive menu."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    options: GlobalOptions,
}

#[derive(Args)]
struct GlobalOptions {
    /// Variable of the function
    #[arg(long = "var", global = true, default_value = "x", value_name = "LETTER")]
    variable: String,
    /// Increment symbol of the difference quotient
    #[arg(long, global = true, default_value = "h", value_name = "LETTER")]
    increment: String,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Print results as text lines instead of tables
    #[arg(long, global = true)]
    plain: bool,
    /// Log to stderr (-v warnings, -vv debug, -vvv trace); RUST_LOG also works
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Highest polynomial degree the engine expands
    #[arg(long, global = true, value_name = "N")]
    max_degree: Option<u32>,
    /// Deepest expression nesting accepted
    #[arg(long, global = true, value_name = "N")]
    max_depth: Option<usize>,
}

impl GlobalOptions {
    fn limits(&self) -> ResourceLimits {
        let mut limits = ResourceLimits::default();
        if let Some(degree) = self.max_degree {
            limits.max_polynomial_degree = degree;
        }
        if let Some(depth) = self.max_depth {
            limits.max_expression_depth = depth;
        }
        limits
    }

    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.plain {
            OutputMode::Plain
        } else {
            OutputMode::Table
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (the default)
    ///
    /// Offers sign study, limit, derivative by definition and continuity check
    /// until you choose exit. A failed analysis is printed and the menu
    /// continues. When stdin is not a terminal the menu reads numbered
    /// choices and answers line by line.
    Menu,
    /// Where an expression is positive, negative, zero and undefined
    ///
    /// Example: calculo sign "(2-x)/(3-x)"
    Sign {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Solve EXPRESSION RELATION 0 over the reals
    ///
    /// RELATION is one of <, >, <=, >=, ≤, ≥.
    ///
    /// Example: calculo solve "x**2 - 4" "<="
    Solve {
        #[arg(allow_hyphen_values = true)]
        expression: String,
        relation: String,
    },
    /// Two-sided limit at a point, or the limit at oo / -oo
    ///
    /// Example: calculo limit "(x**2 - 4)/(x - 2)" 2
    Limit {
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Number, fraction such as 1/2, oo or -oo
        #[arg(allow_hyphen_values = true)]
        point: String,
    },
    /// Derivative from the limit of the difference quotient
    ///
    /// Example: calculo derivative "x**3"
    Derivative {
        #[arg(allow_hyphen_values = true)]
        function: String,
    },
    /// Compare the one-sided limits with the value at a point
    ///
    /// Example: calculo continuity "piecewise((2x, x <= 1), 1)" 1
    Continuity {
        #[arg(allow_hyphen_values = true)]
        function: String,
        /// Number or fraction such as 1/2
        #[arg(allow_hyphen_values = true)]
        point: String,
    },
}

/// One analysis and the heading it is printed under
pub(crate) struct Outcome {
    pub title: String,
    pub result: AnalysisResult,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            if let Some(calc_err) = e.downcast_ref::<CalcError>() {
                eprintln!("{}", error_formatter::format_error(calc_err));
            } else {
                eprintln!("Error: {}", e);
            }
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        1 => EnvFilter::new("warn"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether the analysis succeeded
fn run(cli: &Cli) -> Result<bool> {
    let options = &cli.options;
    let engine = Engine::with_limits(options.limits());
    let variable = calculo::parse_variable(&options.variable)?;
    let increment = calculo::parse_variable(&options.increment)?;
    let formatter = Formatter::new(options.output_mode());

    let outcome = match &cli.command {
        None | Some(Commands::Menu) => {
            interactive::run_menu(&engine, &variable, &increment, &formatter)?;
            return Ok(true);
        }
        Some(Commands::Sign { expression }) => {
            let expr = engine.parse_expression(expression)?;
            sign(&engine, &expr, &variable)
        }
        Some(Commands::Solve {
            expression,
            relation,
        }) => {
            let expr = engine.parse_expression(expression)?;
            solve(&engine, &expr, &variable, relation)
        }
        Some(Commands::Limit { expression, point }) => {
            let expr = engine.parse_expression(expression)?;
            let point = calculo::parse_point(point)?;
            limit(&engine, &expr, &variable, &point)
        }
        Some(Commands::Derivative { function }) => {
            let expr = engine.parse_expression(function)?;
            derivative(&engine, &expr, &variable, &increment)
        }
        Some(Commands::Continuity { function, point }) => {
            let expr = engine.parse_expression(function)?;
            let point = calculo::parse_point(point)?;
            continuity(&engine, &expr, &variable, &point)
        }
    };

    let text = formatter.format_outcome(&outcome)?;
    let succeeded = !outcome.result.is_failure();
    if succeeded || formatter.mode() == OutputMode::Json {
        println!("{}", text);
    } else {
        eprintln!("{}", text);
    }
    Ok(succeeded)
}

pub(crate) fn sign(engine: &Engine, expr: &Expr, variable: &Variable) -> Outcome {
    Outcome {
        title: format!("sign of {}", expr),
        result: AnalysisResult::from(sign_study(engine, expr, variable)),
    }
}

pub(crate) fn solve(engine: &Engine, expr: &Expr, variable: &Variable, relation: &str) -> Outcome {
    let result = match calculo::parse_relation(relation) {
        Ok(relation) => AnalysisResult::from(solve_inequality(engine, expr, variable, relation)),
        Err(failure) => AnalysisResult::Failure(failure),
    };
    Outcome {
        title: format!("{} {} 0", expr, relation.trim()),
        result,
    }
}

pub(crate) fn limit(engine: &Engine, expr: &Expr, variable: &Variable, point: &Point) -> Outcome {
    Outcome {
        title: format!("lim {}→{} {}", variable, point, expr),
        result: AnalysisResult::from(limit_at(engine, expr, variable, point)),
    }
}

pub(crate) fn derivative(
    engine: &Engine,
    function: &Expr,
    variable: &Variable,
    increment: &Variable,
) -> Outcome {
    Outcome {
        title: format!("d/d{} {}", variable, function),
        result: AnalysisResult::from(derivative_by_definition(
            engine, function, variable, increment,
        )),
    }
}

pub(crate) fn continuity(
    engine: &Engine,
    function: &Expr,
    variable: &Variable,
    point: &Point,
) -> Outcome {
    Outcome {
        title: format!("continuity of {} at {} = {}", function, variable, point),
        result: AnalysisResult::from(check_continuity(engine, function, variable, point)),
    }
}
