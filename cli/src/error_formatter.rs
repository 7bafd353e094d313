use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use calculo::CalcError;
use std::io::IsTerminal;

/// Format a CalcError with a source snippet using Ariadne
pub fn format_error(error: &CalcError) -> String {
    match error {
        CalcError::Parse(details) => {
            let mut output = Vec::new();
            let source = details.source_text.as_ref();

            // Ariadne counts characters, spans count bytes
            let start = char_offset(source, details.span.start);
            let end = char_offset(source, details.span.end).max(start + 1);

            let mut report = Report::build(ReportKind::Error, &details.source_id, start)
                .with_config(Config::default().with_color(std::io::stderr().is_terminal()))
                .with_message(format!("Parse error: {}", details.message))
                .with_label(
                    Label::new((&details.source_id, start..end))
                        .with_message("here")
                        .with_color(Color::Red),
                );

            if let Some(suggestion) = &details.suggestion {
                report = report.with_help(suggestion);
            }

            match report
                .finish()
                .write((&details.source_id, Source::from(source)), &mut output)
            {
                Ok(_) => String::from_utf8_lossy(&output).to_string(),
                Err(_) => {
                    // Fallback to simple format
                    format!("{}", error)
                }
            }
        }
        CalcError::Engine(msg) => format!("Error: {}", msg),
        CalcError::ResourceLimitExceeded {
            limit_name,
            limit_value,
            actual_value,
            suggestion,
        } => {
            format!(
                "Resource limit exceeded: {}\n  Limit: {}\n  Actual: {}\n  {}",
                limit_name, limit_value, actual_value, suggestion
            )
        }
    }
}

fn char_offset(source: &str, byte_offset: usize) -> usize {
    let clamped = byte_offset.min(source.len());
    source
        .char_indices()
        .take_while(|(index, _)| *index < clamped)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calculo::{parse_expression, ResourceLimits};

    #[test]
    fn test_unknown_function_report() {
        let err = parse_expression("sin(x)", &ResourceLimits::default()).unwrap_err();
        let output = format_error(&err);
        assert!(output.contains("Unknown function 'sin'"));
        assert!(output.contains("supported functions: abs, sqrt, piecewise"));
    }

    #[test]
    fn test_resource_limit_report() {
        let err = CalcError::ResourceLimitExceeded {
            limit_name: "max_input_bytes".to_string(),
            limit_value: "4096 bytes".to_string(),
            actual_value: "5000 bytes".to_string(),
            suggestion: "Enter a shorter expression".to_string(),
        };
        let output = format_error(&err);
        assert!(output.starts_with("Resource limit exceeded: max_input_bytes"));
        assert!(output.contains("Actual: 5000 bytes"));
    }

    #[test]
    fn test_char_offsets() {
        assert_eq!(char_offset("x ≤ 1", 0), 0);
        assert_eq!(char_offset("x ≤ 1", 2), 2);
        assert_eq!(char_offset("x ≤ 1", 5), 3);
        assert_eq!(char_offset("x", 10), 1);
    }
}
