// Copyright (c) The zftool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use tracing::debug;
use zftool_diagnostics::{
    config::{DiagnosticsConfig, TestResolver},
    reporter::{BasicReporter, VerboseReporter},
    runner::DiagnosticsRunner,
};
use zftool_metadata::ZfToolExitCode;

type Result<T, E = ExpectedError> = std::result::Result<T, E>;

const DEFAULT_WIDTH: usize = 80;

/// Command-line tool for framework projects.
#[derive(Debug, Parser)]
#[command(
    name = "zftool",
    version,
    max_term_width = 100,
    styles = clap_styles::style()
)]
pub struct ZfToolApp {
    #[command(flatten)]
    output: OutputOpts,

    #[command(subcommand)]
    command: Command,
}

impl ZfToolApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code on success.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Diag(opts) => opts.exec(output, output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run diagnostics for the project
    ///
    /// Diagnostic tests are read from `.config/zftool.toml` under the project directory (or the
    /// file passed in with `--config-file`), plus any module config files. The built-in `ZF`
    /// group checks the PHP version unless a config file replaces it.
    #[command(alias = "diagnostics")]
    Diag(DiagOpts),
}

#[derive(Debug, Args)]
struct DiagOpts {
    /// Only run tests in this group
    #[arg(value_name = "GROUP")]
    group: Option<String>,

    /// Print a status line for every test
    #[arg(short, long)]
    verbose: bool,

    /// Print a status line and any attached data for every test
    #[arg(short, long)]
    debug: bool,

    /// Do not print anything; only set the exit code
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Stop after the first failure
    #[arg(short = 'b', long = "break")]
    break_on_failure: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t, value_name = "FORMAT")]
    message_format: MessageFormat,

    /// Config file [default: .config/zftool.toml in the project directory]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Additional module config files, read in order
    #[arg(long = "module-config", value_name = "PATH")]
    module_configs: Vec<Utf8PathBuf>,

    /// Project directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    project_dir: Utf8PathBuf,

    /// Output width in columns [default: terminal width]
    #[arg(long, value_name = "COLUMNS")]
    width: Option<usize>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum MessageFormat {
    /// Human-readable output
    #[default]
    Human,
    /// A JSON summary on a single line
    Json,
    /// A pretty-printed JSON summary
    JsonPretty,
}

impl DiagOpts {
    fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let human = self.message_format == MessageFormat::Human;
        let show_header = human && !self.quiet;
        let styles = output.stdout_styles();

        if show_header {
            write_stdout(
                output_writer,
                &format!(
                    "\n{} Starting diagnostics ...\n\n",
                    "  Go  ".style(styles.go_badge)
                ),
            )?;
            write_step(output_writer, "Read diagnostics configuration")?;
            if !self.module_configs.is_empty() {
                write_step(output_writer, "Collect diagnostics from modules")?;
            }
        }
        let config = DiagnosticsConfig::from_sources(
            &self.project_dir,
            self.config_file.as_deref(),
            &self.module_configs,
        )?;

        if show_header {
            write_step(
                output_writer,
                "Analyze test definitions and construct test instances",
            )?;
        }
        let tests = TestResolver::default().resolve(&config, self.group.as_deref())?;
        debug!("running {} diagnostic tests", tests.len());

        if show_header {
            write_stdout(
                output_writer,
                &format!("\n{} ", " Diag ".style(styles.diag_badge)),
            )?;
        }

        let width = self
            .width
            .or(config.settings().width)
            .unwrap_or_else(terminal_width);

        let mut runner = DiagnosticsRunner::new();
        runner.add_tests(tests);
        runner.set_break_on_failure(self.break_on_failure || config.settings().break_on_failure);
        if show_header {
            let reporter_output = output_writer.reporter_output();
            if self.verbose || self.debug {
                let mut reporter = VerboseReporter::new(reporter_output, width);
                reporter.set_display_data(self.debug);
                if styles.colorize_reporters {
                    reporter.colorize();
                }
                runner.add_reporter(reporter);
            } else {
                let mut reporter = BasicReporter::new(reporter_output, width);
                if styles.colorize_reporters {
                    reporter.colorize();
                }
                runner.add_reporter(reporter);
            }
        }
        let results = runner.run()?;
        drop(runner);

        let summary = results.to_summary();
        let json = match self.message_format {
            MessageFormat::Human => None,
            MessageFormat::Json => Some(serde_json::to_string(&summary)),
            MessageFormat::JsonPretty => Some(serde_json::to_string_pretty(&summary)),
        };
        if let Some(json) = json {
            let mut json = json.map_err(|err| ExpectedError::SerializeSummaryError { err })?;
            json.push('\n');
            write_stdout(output_writer, &json)?;
        }

        if summary.has_failures() {
            return Err(ExpectedError::DiagnosticsFailed {
                failures: summary.counts.failure,
            });
        }
        Ok(ZfToolExitCode::OK)
    }
}

fn write_step(output_writer: &mut OutputWriter, message: &str) -> Result<()> {
    write_stdout(output_writer, &format!("       => {message}\n"))
}

fn write_stdout(output_writer: &mut OutputWriter, s: &str) -> Result<()> {
    let mut writer = output_writer.stdout_writer();
    writer
        .write_str(s)
        .and_then(|()| writer.flush())
        .map_err(ExpectedError::write_output)
}

fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map_or(DEFAULT_WIDTH, |(_rows, cols)| usize::from(cols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use zftool_metadata::DiagnosticsSummary;

    // The default `ZF` group runs `php`, so it's replaced here.
    const CONFIG: &str = indoc! {r#"
        [diagnostics.core]
        path = ["env-var", "PATH"]
        project = ["dir-readable", "."]

        [diagnostics]
        ZF = [["dir-readable", "."]]
        legacy = [["env-var", "ZFTOOL_UNSET_VARIABLE"]]
    "#};

    struct Fixture {
        dir: Utf8TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let fixture = Self::empty();
            let config_path = fixture.dir.path().join(DiagnosticsConfig::CONFIG_PATH);
            fs_err::create_dir_all(config_path.parent().unwrap()).unwrap();
            fs_err::write(&config_path, CONFIG).unwrap();
            fixture
        }

        fn empty() -> Self {
            Self {
                dir: Utf8TempDir::new().unwrap(),
            }
        }

        fn run(&self, args: &[&str]) -> (Result<i32>, String) {
            self.run_command("diag", args)
        }

        fn run_command(&self, command: &str, args: &[&str]) -> (Result<i32>, String) {
            let mut cli_args = vec![
                "zftool",
                "--color",
                "never",
                command,
                "--project-dir",
                self.dir.path().as_str(),
            ];
            cli_args.extend_from_slice(args);
            let app = ZfToolApp::try_parse_from(cli_args).expect("arguments are valid");
            let output = app.init_output();
            let mut writer = OutputWriter::Test {
                stdout: String::new(),
            };
            let result = app.exec(output, &mut writer);
            let OutputWriter::Test { stdout } = writer else {
                unreachable!("writer is a test writer");
            };
            (result, stdout)
        }
    }

    fn header() -> String {
        "\n  Go   Starting diagnostics ...\n\n       \
         => Read diagnostics configuration\n       \
         => Analyze test definitions and construct test instances\n\n Diag  "
            .to_owned()
    }

    #[test]
    fn basic_output() {
        let fixture = Fixture::new();
        let (result, stdout) = fixture.run(&["core", "--width", "40"]);
        assert_eq!(result.expect("core diagnostics pass"), 0);
        assert_eq!(
            stdout,
            format!(
                "{}{:<27} 2 / 2 (100%)\n\nOK (2 diagnostic tests)\n",
                header(),
                ".."
            )
        );
    }

    #[test]
    fn verbose_output() {
        let fixture = Fixture::new();
        let (result, stdout) = fixture.run(&["legacy", "-v", "--width", "80"]);
        let err = result.expect_err("legacy diagnostics fail");
        assert_eq!(err.process_exit_code(), ZfToolExitCode::DIAGNOSTICS_FAILED);
        assert_eq!(
            stdout,
            format!(
                "{}{}",
                header(),
                indoc! {"
                    Running diagnostics:

                            FAIL  env: ZFTOOL_UNSET_VARIABLE: not set: ZFTOOL_UNSET_VARIABLE

                     FAIL   (1 failure, 0 warnings, 0 successful tests)

                "}
            )
        );
    }

    #[test]
    fn json_summary() {
        let fixture = Fixture::new();
        let (result, stdout) = fixture.run(&["--message-format", "json", "--break"]);
        assert!(matches!(
            result,
            Err(ExpectedError::DiagnosticsFailed { failures: 1 })
        ));

        let summary: DiagnosticsSummary =
            serde_json::from_str(&stdout).expect("stdout is a JSON summary");
        assert_eq!(summary.planned, 4);
        assert_eq!(summary.run, 4);
        assert_eq!(summary.skipped, 0);
        assert!(summary.stopped);
        assert_eq!(summary.counts.success, 3);
        assert_eq!(summary.counts.failure, 1);
        let labels: Vec<_> = summary.results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "readable: .",
                "core: path",
                "core: project",
                "env: ZFTOOL_UNSET_VARIABLE"
            ]
        );
    }

    #[test]
    fn default_group_runs_without_config() {
        let fixture = Fixture::empty();
        let (result, stdout) = fixture.run(&["--message-format", "json"]);
        // Whether the check passes depends on the PHP install, if any.
        assert!(
            matches!(
                result,
                Ok(0) | Err(ExpectedError::DiagnosticsFailed { failures: 1 })
            ),
            "unexpected result: {result:?}"
        );

        let summary: DiagnosticsSummary =
            serde_json::from_str(&stdout).expect("stdout is a JSON summary");
        assert_eq!(summary.planned, 1);
        assert_eq!(summary.run, 1);
        let labels: Vec<_> = summary.results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["ZF: PHP Version"]);
    }

    #[test]
    fn debug_output_shows_data() {
        let fixture = Fixture::new();
        let module = fixture.dir.path().join("module.toml");
        fs_err::write(
            &module,
            "[diagnostics]\nbroken = [[\"command-version\", \"zftool-missing\", \">=1.0\"]]\n",
        )
        .unwrap();
        let (result, stdout) = fixture.run(&[
            "broken",
            "-d",
            "--width",
            "80",
            "--module-config",
            module.as_str(),
        ]);
        assert!(matches!(
            result,
            Err(ExpectedError::DiagnosticsFailed { failures: 1 })
        ));

        let rule = format!("{:14}{}\n", "", "-".repeat(65));
        assert_eq!(stdout.matches(&rule).count(), 2, "data is between rules: {stdout}");
        assert!(
            stdout.contains("command-exec: failed to execute `zftool-missing --version`\n"),
            "error data is printed: {stdout}"
        );
        assert!(stdout.contains("  caused by: "), "causes are printed: {stdout}");
    }

    #[test]
    fn break_reports_abort() {
        let fixture = Fixture::new();
        let module = fixture.dir.path().join("module.toml");
        fs_err::write(&module, "[diagnostics]\nlater = [[\"env-var\", \"PATH\"]]\n").unwrap();
        let (result, stdout) = fixture.run(&[
            "--break",
            "--width",
            "80",
            "--module-config",
            module.as_str(),
        ]);
        assert!(matches!(
            result,
            Err(ExpectedError::DiagnosticsFailed { failures: 1 })
        ));
        assert!(
            stdout.ends_with(
                "Diagnostics aborted because of a failure.\n\
                 FAIL (1 failure, 0 warnings, 3 successful tests, 1 skipped)\n"
            ),
            "unexpected output: {stdout}"
        );
    }

    #[test]
    fn diagnostics_alias() {
        let fixture = Fixture::new();
        let (result, stdout) = fixture.run_command("diagnostics", &["core", "--quiet"]);
        assert_eq!(result.expect("core diagnostics pass"), 0);
        assert_eq!(stdout, "");
    }

    #[test]
    fn quiet_prints_nothing() {
        let fixture = Fixture::new();
        let (result, stdout) = fixture.run(&["core", "--quiet"]);
        assert_eq!(result.expect("core diagnostics pass"), 0);
        assert_eq!(stdout, "");
    }

    #[test]
    fn unknown_group_runs_nothing() {
        let fixture = Fixture::new();
        let (result, stdout) = fixture.run(&["nonexistent", "--message-format", "json"]);
        assert_eq!(result.expect("nothing fails"), 0);
        let summary: DiagnosticsSummary = serde_json::from_str(&stdout).unwrap();
        assert_eq!(summary.planned, 0);
    }

    #[test]
    fn setup_errors() {
        let fixture = Fixture::new();
        let missing = fixture.dir.path().join("missing.toml");
        let (result, _) = fixture.run(&["--config-file", missing.as_str()]);
        let err = result.expect_err("config file is missing");
        assert!(matches!(err, ExpectedError::ConfigParseError { .. }));
        assert_eq!(err.process_exit_code(), ZfToolExitCode::SETUP_ERROR);

        let module = fixture.dir.path().join("module.toml");
        fs_err::write(&module, "[diagnostics.module]\nbroken = \"no-such-test\"\n").unwrap();
        let (result, stdout) = fixture.run(&["--module-config", module.as_str()]);
        let err = result.expect_err("test name is unknown");
        assert!(matches!(err, ExpectedError::TestDefinitionError { .. }));
        assert_eq!(err.process_exit_code(), ZfToolExitCode::SETUP_ERROR);
        assert!(
            stdout.contains("=> Collect diagnostics from modules\n"),
            "module step is printed: {stdout}"
        );
    }
}
