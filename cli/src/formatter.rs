use crate::Outcome;
use anyhow::Result;
use calculo::{AnalysisResult, ContinuityReport, Quantity, SignReport};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Plain,
    Json,
}

pub struct Formatter {
    mode: OutputMode,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputMode::Table)
    }
}

impl Formatter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Render one outcome without a trailing newline
    pub fn format_outcome(&self, outcome: &Outcome) -> Result<String> {
        match self.mode {
            OutputMode::Json => Ok(serde_json::to_string_pretty(&outcome.result)?),
            OutputMode::Plain => Ok(self.format_plain(outcome)),
            OutputMode::Table => Ok(self.format_table(outcome)),
        }
    }

    fn format_plain(&self, outcome: &Outcome) -> String {
        match &outcome.result {
            AnalysisResult::Value { value } => format!("{} = {}", outcome.title, value),
            AnalysisResult::Solution { solution } => format!("{}: {}", outcome.title, solution),
            other => other.to_string(),
        }
    }

    fn format_table(&self, outcome: &Outcome) -> String {
        match &outcome.result {
            AnalysisResult::Value { value } => {
                single_cell(&format!("{} = {}", outcome.title, value))
            }
            AnalysisResult::Solution { solution } => {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.add_row(Row::from(vec![Cell::new(&outcome.title)]));
                table.add_row(Row::from(vec![Cell::new(solution)]));
                table.to_string()
            }
            AnalysisResult::SignReport(report) => {
                format!("{}\n{}", outcome.title, self.format_sign_table(report))
            }
            AnalysisResult::Continuity(report) => {
                format!("{}\n{}", outcome.title, self.format_continuity_table(report))
            }
            AnalysisResult::Failure(failure) => failure.to_string(),
        }
    }

    fn format_sign_table(&self, report: &SignReport) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Sign").set_alignment(CellAlignment::Left),
            Cell::new(format!("Values of {}", report.variable)).set_alignment(CellAlignment::Left),
        ]));

        table.add_row(Row::from(vec!["positive".to_string(), report.positive.to_string()]));
        table.add_row(Row::from(vec!["negative".to_string(), report.negative.to_string()]));
        table.add_row(Row::from(vec!["zero".to_string(), report.zero.to_string()]));
        table.add_row(Row::from(vec![
            "undefined".to_string(),
            report.undefined.to_string(),
        ]));

        table.to_string()
    }

    fn format_continuity_table(&self, report: &ContinuityReport) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Quantity").set_alignment(CellAlignment::Left),
            Cell::new("Value").set_alignment(CellAlignment::Left),
        ]));

        let value_label = format!("f({})", report.point);
        let rows = [
            ("right limit", &report.right_limit),
            ("left limit", &report.left_limit),
            (value_label.as_str(), &report.value),
        ];
        for (label, quantity) in rows {
            table.add_row(Row::from(vec![label.to_string(), quantity_text(quantity)]));
        }
        table.add_row(Row::from(vec![
            "verdict".to_string(),
            report.verdict.to_string(),
        ]));

        table.to_string()
    }
}

fn quantity_text(quantity: &Quantity) -> String {
    match quantity {
        Quantity::Known(value) => value.to_string(),
        Quantity::Unavailable(reason) => format!("unavailable: {}", reason),
    }
}

fn single_cell(content: &str) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.add_row(Row::from(vec![Cell::new(content)]));
    table.to_string()
}
