use crate::error_formatter::format_error;
use crate::formatter::Formatter;
use crate::{continuity, derivative, limit, sign};
use anyhow::{Context, Result};
use calculo::{Engine, Expr, Point, Variable};
use inquire::{InquireError, Select, Text};
use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    SignStudy,
    Limit,
    Derivative,
    Continuity,
    Exit,
}

impl MenuChoice {
    const ALL: [MenuChoice; 5] = [
        MenuChoice::SignStudy,
        MenuChoice::Limit,
        MenuChoice::Derivative,
        MenuChoice::Continuity,
        MenuChoice::Exit,
    ];

    /// `1` to `5`, in menu order
    fn from_number(input: &str) -> Option<Self> {
        let index: usize = input.trim().parse().ok()?;
        Self::ALL.get(index.checked_sub(1)?).copied()
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuChoice::SignStudy => "Sign study",
            MenuChoice::Limit => "Limit",
            MenuChoice::Derivative => "Derivative by definition",
            MenuChoice::Continuity => "Continuity check",
            MenuChoice::Exit => "Exit",
        };
        write!(f, "{}", label)
    }
}

/// Where menu selections and answers come from
trait Prompter {
    /// `None` ends the session
    fn choose(&mut self) -> Result<Option<MenuChoice>>;

    /// `None` abandons the current selection
    fn ask(&mut self, label: &str, example: &str) -> Result<Option<String>>;
}

struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn choose(&mut self) -> Result<Option<MenuChoice>> {
        let choice = Select::new("What would you like to compute?", MenuChoice::ALL.to_vec())
            .with_help_message("Use arrow keys to navigate, Enter to select")
            .prompt();
        cancelled_as_none(choice).context("Failed to get menu selection")
    }

    fn ask(&mut self, label: &str, example: &str) -> Result<Option<String>> {
        let answer = Text::new(label)
            .with_help_message(&format!("Example: {}", example))
            .prompt();
        cancelled_as_none(answer).with_context(|| format!("Failed to read {}", label))
    }
}

fn cancelled_as_none<T>(answer: Result<T, InquireError>) -> Result<Option<T>, InquireError> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Numbered menu over plain lines, for piped input
struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn choose(&mut self) -> Result<Option<MenuChoice>> {
        loop {
            writeln!(self.output, "\n--- Calculo ---")?;
            for (index, choice) in MenuChoice::ALL.iter().enumerate() {
                writeln!(self.output, "{}. {}", index + 1, choice)?;
            }
            write!(self.output, "Option: ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match MenuChoice::from_number(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(
                    self.output,
                    "Invalid option '{}': enter a number from 1 to {}",
                    line,
                    MenuChoice::ALL.len()
                )?,
            }
        }
    }

    fn ask(&mut self, label: &str, example: &str) -> Result<Option<String>> {
        write!(self.output, "{} (e.g. {}): ", label, example)?;
        self.output.flush()?;
        self.read_line()
    }
}

/// Run the menu until the user exits; failed analyses never end the session
pub fn run_menu(
    engine: &Engine,
    variable: &Variable,
    increment: &Variable,
    formatter: &Formatter,
) -> Result<()> {
    let session = Session {
        engine,
        variable,
        increment,
        formatter,
    };
    if io::stdin().is_terminal() {
        session.run(&mut TerminalPrompter)
    } else {
        let mut prompter = LinePrompter {
            input: io::stdin().lock(),
            output: io::stdout(),
        };
        session.run(&mut prompter)
    }
}

struct Session<'a> {
    engine: &'a Engine,
    variable: &'a Variable,
    increment: &'a Variable,
    formatter: &'a Formatter,
}

impl Session<'_> {
    fn run(&self, prompter: &mut dyn Prompter) -> Result<()> {
        while let Some(choice) = prompter.choose()? {
            debug!(%choice, "menu selection");
            let function_label = format!("f({})", self.variable);
            let outcome = match choice {
                MenuChoice::Exit => break,
                MenuChoice::SignStudy => {
                    let Some(expr) = self.ask_expression(prompter, "Expression", "(x-1)/(x-2)")?
                    else {
                        continue;
                    };
                    sign(self.engine, &expr, self.variable)
                }
                MenuChoice::Limit => {
                    let Some(expr) =
                        self.ask_expression(prompter, "Expression", "(x**2 - 4)/(x - 2)")?
                    else {
                        continue;
                    };
                    let Some(point) = self.ask_point(prompter, "Limit point", "2, 1/2 or oo")?
                    else {
                        continue;
                    };
                    limit(self.engine, &expr, self.variable, &point)
                }
                MenuChoice::Derivative => {
                    let Some(expr) = self.ask_expression(prompter, &function_label, "x**2")?
                    else {
                        continue;
                    };
                    derivative(self.engine, &expr, self.variable, self.increment)
                }
                MenuChoice::Continuity => {
                    let Some(expr) = self.ask_expression(
                        prompter,
                        &function_label,
                        "piecewise((2*x, x <= 1), 1)",
                    )?
                    else {
                        continue;
                    };
                    let Some(point) = self.ask_point(prompter, "Point", "1")? else {
                        continue;
                    };
                    continuity(self.engine, &expr, self.variable, &point)
                }
            };
            println!("{}", self.formatter.format_outcome(&outcome)?);
        }
        println!("Goodbye!");
        Ok(())
    }

    fn ask_expression(
        &self,
        prompter: &mut dyn Prompter,
        label: &str,
        example: &str,
    ) -> Result<Option<Expr>> {
        let Some(text) = prompter.ask(label, example)? else {
            return Ok(None);
        };
        match self.engine.parse_expression(&text) {
            Ok(expr) => Ok(Some(expr)),
            Err(err) => {
                eprintln!("{}", format_error(&err));
                Ok(None)
            }
        }
    }

    fn ask_point(
        &self,
        prompter: &mut dyn Prompter,
        label: &str,
        example: &str,
    ) -> Result<Option<Point>> {
        let Some(text) = prompter.ask(label, example)? else {
            return Ok(None);
        };
        match calculo::parse_point(&text) {
            Ok(point) => Ok(Some(point)),
            Err(err) => {
                eprintln!("{}", format_error(&err));
                Ok(None)
            }
        }
    }
}
