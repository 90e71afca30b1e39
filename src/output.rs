// ABOUTME: Output sink abstraction for `print` — decouples script output from its destination
// Mirrors the DiagnosticSink split: default writes to stdout, tests install a capturing sink

/// Pluggable destination for the text a `print` statement emits.
///
/// Kept separate from `DiagnosticSink` because script output and diagnostics
/// are different streams conceptually even though the default diagnostic sink
/// also happens to write to stdout (see `src/diagnostics.rs`).
pub trait OutputSink {
    fn print_line(&mut self, line: &str);
}

/// The default sink: writes each `print` line to stdout, matching the
/// language's documented behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutOutput;

impl OutputSink for StdoutOutput {
    fn print_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// A sink that collects printed lines in memory instead of writing them, for
/// tests that need to assert on a script's literal output.
///
/// Cloning shares the same backing list, so a caller can clone a handle
/// before handing the sink's `Box<dyn OutputSink>` off to an `Interpreter`
/// and still inspect what was printed afterward.
#[derive(Debug, Default, Clone)]
pub struct CollectingOutput {
    lines: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
}

impl OutputSink for CollectingOutput {
    fn print_line(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

impl CollectingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_output_records_printed_lines() {
        let mut output = CollectingOutput::new();
        output.print_line("7");
        output.print_line("a1");
        assert_eq!(output.lines(), vec!["7".to_string(), "a1".to_string()]);
    }
}
