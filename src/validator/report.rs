use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Passed, with something worth looking at
    Warning(String),
    /// Check failed
    Failed(String),
}

impl CheckStatus {
    fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "✓",
            CheckStatus::Warning(_) => "⚠",
            CheckStatus::Failed(_) => "✗",
        }
    }

    fn detail(&self) -> Option<(&'static str, &str)> {
        match self {
            CheckStatus::Ok => None,
            CheckStatus::Warning(msg) => Some(("WARNING", msg)),
            CheckStatus::Failed(msg) => Some(("FAILED", msg)),
        }
    }
}

/// Which pass produced a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Archive layout and entry formats
    Structure,
    /// Group tree and required attributes
    Hierarchy,
    /// Dataset contents
    Data,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Structure => "Structure",
            Stage::Hierarchy => "Hierarchy",
            Stage::Data => "Data",
        })
    }
}

/// One named check and its outcome
#[derive(Debug, Clone)]
pub struct ValidationCheck {
    /// Pass the check belongs to
    pub stage: Stage,
    /// What was checked
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
}

impl ValidationCheck {
    pub(crate) fn ok(stage: Stage, name: impl Into<String>) -> Self {
        Self {
            stage,
            name: name.into(),
            status: CheckStatus::Ok,
        }
    }

    pub(crate) fn warning(stage: Stage, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage,
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
        }
    }

    pub(crate) fn failed(stage: Stage, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage,
            name: name.into(),
            status: CheckStatus::Failed(message.into()),
        }
    }

    /// Ok when `problems` is empty, otherwise a failure quoting the first one
    pub(crate) fn from_problems(stage: Stage, name: impl Into<String>, problems: &[String]) -> Self {
        match problems {
            [] => Self::ok(stage, name),
            [only] => Self::failed(stage, name, only.clone()),
            [first, rest @ ..] => {
                Self::failed(stage, name, format!("{} (and {} more)", first, rest.len()))
            }
        }
    }
}

/// Every check run against one container
#[derive(Debug)]
pub struct ValidationReport {
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// Container that was validated
    pub file_path: String,
}

impl ValidationReport {
    /// Empty report for `file_path`
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            file_path: file_path.into(),
        }
    }

    /// Append a check
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    fn count(&self, pred: impl Fn(&CheckStatus) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.status)).count()
    }

    /// Number of passed checks
    pub fn success_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Ok))
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Warning(_)))
    }

    /// Number of failures
    pub fn failure_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Failed(_)))
    }

    /// Whether any check failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Whether any check warned
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    fn verdict(&self) -> &'static str {
        if self.has_failures() {
            "Validation FAILED"
        } else if self.has_warnings() {
            "Validation PASSED with warnings"
        } else {
            "Validation PASSED"
        }
    }

    fn summary(&self) -> String {
        format!(
            "{} passed, {} warnings, {} failed",
            self.success_count(),
            self.warning_count(),
            self.failure_count()
        )
    }

    /// Render for a terminal
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = format!(
                "{}\n{}: {}\n",
                style("Container Validation Report").bold().cyan(),
                style("File").bold(),
                self.file_path
            );

            let mut stage = None;
            for check in &self.checks {
                if stage != Some(check.stage) {
                    stage = Some(check.stage);
                    output.push_str(&format!("\n{}\n", style(check.stage).bold().underlined()));
                }
                let name = match check.status {
                    CheckStatus::Ok => style(check.name.as_str()).green(),
                    CheckStatus::Warning(_) => style(check.name.as_str()).yellow(),
                    CheckStatus::Failed(_) => style(check.name.as_str()).red(),
                };
                output.push_str(&format!("  [{}] {}", check.status.symbol(), name));
                match check.status.detail() {
                    Some((label, msg)) => output.push_str(&format!(" - {}: {}\n", style(label).bold(), msg)),
                    None => output.push('\n'),
                }
            }

            let verdict = if self.has_failures() {
                style(self.verdict()).red().bold()
            } else if self.has_warnings() {
                style(self.verdict()).yellow().bold()
            } else {
                style(self.verdict()).green().bold()
            };
            output.push_str(&format!("\n{}: {}\n{}\n", style("Summary").bold(), self.summary(), verdict));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container Validation Report")?;
        writeln!(f, "File: {}", self.file_path)?;

        let mut stage = None;
        for check in &self.checks {
            if stage != Some(check.stage) {
                stage = Some(check.stage);
                writeln!(f)?;
                writeln!(f, "{}", check.stage)?;
            }
            write!(f, "  [{}] {}", check.status.symbol(), check.name)?;
            match check.status.detail() {
                Some((label, msg)) => writeln!(f, " - {}: {}", label, msg)?,
                None => writeln!(f)?,
            }
        }

        writeln!(f)?;
        writeln!(f, "Summary: {}", self.summary())?;
        writeln!(f, "{}", self.verdict())
    }
}
