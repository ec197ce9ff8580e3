//! End-to-end tests of the interpreter against an in-memory filesystem.

use std::sync::Arc;

use anyhow::Result;
use lash_core::fs::{Filesystem, MemoryFs};
use lash_core::{
    Command, CreateOptions, ExecutionContext, ExecutionParameters, ExecutionResult, JobState,
    Shell,
};
use pretty_assertions::assert_eq;

struct Output {
    result: ExecutionResult,
    stdout: String,
    stderr: String,
}

async fn run(shell: &Shell, text: &str) -> Result<Output> {
    let params = ExecutionParameters::capturing();
    let result = shell.run_string(text, &params).await?;
    Ok(Output {
        result,
        stdout: params.stdout_text(),
        stderr: params.stderr_text(),
    })
}

fn new_shell() -> (Arc<MemoryFs>, Shell) {
    let fs = Arc::new(MemoryFs::new());
    let shell = Shell::new(fs.clone(), CreateOptions::default());
    (fs, shell)
}

#[tokio::test]
async fn quoting_is_preserved() -> Result<()> {
    let (_, shell) = new_shell();
    shell.set_env_var("X", "$HOME");

    let output = run(&shell, r#"echo "a  b" 'c $X' "$X" \$X"#).await?;
    assert_eq!(output.stdout, "a  b c $X $HOME $X\n");
    Ok(())
}

#[tokio::test]
async fn globs_match_or_stay_literal() -> Result<()> {
    let (fs, shell) = new_shell();
    fs.write("/b.txt", b"").await?;
    fs.write("/a.txt", b"").await?;

    assert_eq!(run(&shell, "echo *.txt").await?.stdout, "a.txt b.txt\n");
    assert_eq!(run(&shell, "echo *.zzz").await?.stdout, "*.zzz\n");
    assert_eq!(run(&shell, "echo '*.txt'").await?.stdout, "*.txt\n");
    Ok(())
}

#[tokio::test]
async fn redirect_round_trip() -> Result<()> {
    let (fs, shell) = new_shell();

    run(&shell, "echo hello > f").await?;
    assert_eq!(fs.read_to_string("/f").await?, "hello\n");

    run(&shell, "echo world >> f").await?;
    assert_eq!(fs.read_to_string("/f").await?, "hello\nworld\n");

    run(&shell, "echo x > f").await?;
    assert_eq!(fs.read_to_string("/f").await?, "x\n");

    assert_eq!(run(&shell, "cat < f").await?.stdout, "x\n");
    Ok(())
}

#[tokio::test]
async fn stderr_redirects() -> Result<()> {
    let (fs, shell) = new_shell();

    let output = run(&shell, "cat missing 2> err").await?;
    assert_eq!(output.result.code(), 1);
    assert_eq!(output.stderr, "");
    assert!(fs.read_to_string("/err").await?.contains("missing"));

    let output = run(&shell, "cat missing 2>&1").await?;
    assert!(output.stdout.contains("No such file or directory"));
    assert_eq!(output.stderr, "");

    let output = run(&shell, "echo gone > /dev/null").await?;
    assert_eq!(output.stdout, "");
    Ok(())
}

#[tokio::test]
async fn arithmetic_expansion() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(
        &shell,
        "echo $((2 + 3 * 4)) $((2 ** 3 ** 2)) $((7 / 2)) $((-3 % 2))",
    )
    .await?;
    assert_eq!(output.stdout, "14 512 3 -1\n");

    let output = run(&shell, "echo $((1 / 0)); echo next").await?;
    assert_eq!(output.stdout, "next\n");
    assert!(output.stderr.contains("division by 0"));
    Ok(())
}

#[tokio::test]
async fn control_flow() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(&shell, r#"if [ -z "" ]; then echo yes; else echo no; fi"#).await?;
    assert_eq!(output.stdout, "yes\n");
    assert!(output.result.is_success());

    let output = run(&shell, "for i in 1 2 3; do echo $i; done").await?;
    assert_eq!(output.stdout, "1\n2\n3\n");

    let output = run(
        &shell,
        "for i in 1 2 3; do if [ $i = 2 ]; then break; fi; echo $i; done",
    )
    .await?;
    assert_eq!(output.stdout, "1\n");

    let output = run(
        &shell,
        "N=0\nwhile [ $N -lt 3 ]\ndo\n  N=$((N + 1))\n  echo $N\ndone",
    )
    .await?;
    assert_eq!(output.stdout, "1\n2\n3\n");

    let output = run(
        &shell,
        "case notes.txt in *.md) echo md;; *.txt|*.text) echo text;; *) echo other;; esac",
    )
    .await?;
    assert_eq!(output.stdout, "text\n");
    Ok(())
}

#[tokio::test]
async fn short_circuit() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(&shell, "false && echo A; echo B").await?;
    assert_eq!(output.stdout, "B\n");

    let output = run(&shell, "false || echo A && echo B").await?;
    assert_eq!(output.stdout, "A\nB\n");
    Ok(())
}

#[tokio::test]
async fn functions_scope_positional_parameters() -> Result<()> {
    let (_, shell) = new_shell();

    let source = "greet() {\n  echo \"hi $1 ($#)\"\n  return 3\n  echo never\n}\ngreet bob x\necho $?\necho \"[$1]\"";
    let output = run(&shell, source).await?;
    assert_eq!(output.stdout, "hi bob x (2)\n3\n[]\n");
    assert_eq!(shell.env_var("1"), None);
    Ok(())
}

#[tokio::test]
async fn runaway_recursion_is_stopped() -> Result<()> {
    let shell = Shell::new(
        Arc::new(MemoryFs::new()),
        CreateOptions::builder().max_function_call_depth(5).build(),
    );

    let output = run(&shell, "f() { f; }\nf").await?;
    assert_eq!(output.result.code(), 1);
    assert!(output.stderr.contains("maximum function nesting level exceeded"));
    Ok(())
}

#[tokio::test]
async fn runaway_loops_are_stopped() -> Result<()> {
    let shell = Shell::new(
        Arc::new(MemoryFs::new()),
        CreateOptions::builder().max_loop_iterations(5).build(),
    );

    let output = run(&shell, "while true; do :; done; echo after").await?;
    assert!(output.stderr.contains("loop exceeded 5 iterations"));
    assert_eq!(output.stdout, "after\n");
    Ok(())
}

#[tokio::test]
async fn command_substitution() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(&shell, "X=$(echo hi); echo \"$X!\" `echo there`").await?;
    assert_eq!(output.stdout, "hi! there\n");
    Ok(())
}

#[tokio::test]
async fn unknown_commands_halt_the_pipeline() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(&shell, "nosuch | echo piped").await?;
    assert_eq!(output.result.code(), 127);
    assert_eq!(output.stdout, "");
    assert!(output.stderr.contains("nosuch: command not found"));

    let output = run(&shell, "nosuch; echo after").await?;
    assert_eq!(output.stdout, "after\n");
    Ok(())
}

#[tokio::test]
async fn here_documents() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(&shell, "cat <<EOF\nline one\nline two\nEOF\necho done").await?;
    assert_eq!(output.stdout, "line one\nline two\ndone\n");
    Ok(())
}

#[tokio::test]
async fn here_documents_reusing_a_tag() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(&shell, "cat <<EOF\nfirst\nEOF\ncat <<EOF\nsecond\nEOF\n").await?;
    assert_eq!(output.stdout, "first\nsecond\n");

    let source = "show() {\n  cat <<EOF\nin function\nEOF\n  echo after\n}\nshow\ncat <<EOF\noutside\nEOF\n";
    let output = run(&shell, source).await?;
    assert_eq!(output.stdout, "in function\nafter\noutside\n");
    Ok(())
}

#[tokio::test]
async fn bracket_globs() -> Result<()> {
    let (fs, shell) = new_shell();
    fs.write("/a.txt", b"").await?;
    fs.write("/c.txt", b"").await?;

    assert_eq!(run(&shell, "echo [ab].txt").await?.stdout, "a.txt\n");
    assert_eq!(run(&shell, "echo [!a].txt").await?.stdout, "c.txt\n");
    assert_eq!(run(&shell, "echo '[ab].txt'").await?.stdout, "[ab].txt\n");

    let output = run(
        &shell,
        "case b in [abc]) echo class;; *) echo nomatch;; esac",
    )
    .await?;
    assert_eq!(output.stdout, "class\n");

    let output = run(&shell, "case '[x]' in '[x]') echo literal;; esac").await?;
    assert_eq!(output.stdout, "literal\n");
    Ok(())
}

#[tokio::test]
async fn functions_defined_inside_constructs() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(&shell, "if true; then f() { echo inner; }; fi; f").await?;
    assert_eq!(output.stdout, "inner\n");
    assert!(output.result.is_success());
    Ok(())
}

#[tokio::test]
async fn background_jobs() -> Result<()> {
    let (_, shell) = new_shell();

    let output = run(&shell, "sleep 0.01 &").await?;
    assert!(output.result.is_success());
    assert!(output.stdout.starts_with("[1] "));

    run(&shell, "false &").await?;

    let jobs = shell.wait_for_jobs().await?;
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].state, JobState::Done);
    assert_eq!(jobs[1].state, JobState::Failed);
    assert_eq!(jobs[1].exit_code, Some(1));
    Ok(())
}

#[tokio::test]
async fn scripts_on_the_search_path() -> Result<()> {
    let (fs, shell) = new_shell();
    fs.mkdir("/usr/bin", true).await?;
    fs.write(
        "/usr/bin/greet",
        b"#!/bin/sh\necho \"hello $1\"\nexit 4\necho never\n",
    )
    .await?;
    fs.mkdir("/work", false).await?;

    let output = run(&shell, "greet world; echo $?").await?;
    assert_eq!(output.stdout, "hello world\n4\n");

    let output = run(&shell, "./work").await?;
    assert_eq!(output.result.code(), 126);
    Ok(())
}

#[tokio::test]
async fn source_and_eval() -> Result<()> {
    let (fs, shell) = new_shell();
    fs.write("/lib.sh", b"LIB=loaded\n").await?;

    let output = run(&shell, ". /lib.sh; echo $LIB").await?;
    assert_eq!(output.stdout, "loaded\n");

    let output = run(&shell, "eval 'echo $((1 + 1))'").await?;
    assert_eq!(output.stdout, "2\n");
    Ok(())
}

#[tokio::test]
async fn working_directory() -> Result<()> {
    let (fs, shell) = new_shell();
    fs.mkdir("/work", false).await?;

    let output = run(&shell, "cd work; pwd; cd -").await?;
    assert_eq!(output.stdout, "/work\n/\n");
    assert_eq!(shell.working_dir(), "/");

    let output = run(&shell, "cd /missing").await?;
    assert_eq!(output.result.code(), 1);
    Ok(())
}

#[tokio::test]
async fn history_is_recorded() -> Result<()> {
    let (_, shell) = new_shell();
    run(&shell, "echo one").await?;
    run(&shell, "echo two").await?;

    assert_eq!(shell.history(), vec!["echo one", "echo two"]);
    assert_eq!(
        run(&shell, "history").await?.stdout,
        "    1  echo one\n    2  echo two\n    3  history\n"
    );
    Ok(())
}

struct Upper;

#[async_trait::async_trait]
impl Command for Upper {
    fn name(&self) -> &str {
        "upper"
    }

    fn description(&self) -> &str {
        "Uppercase standard input."
    }

    async fn execute(
        &self,
        context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, lash_core::Error> {
        context.stdout.push_str(&context.stdin.to_uppercase());
        Ok(ExecutionResult::success())
    }
}

struct Boom;

#[async_trait::async_trait]
impl Command for Boom {
    fn name(&self) -> &str {
        "boom"
    }

    fn description(&self) -> &str {
        "Always panics."
    }

    #[allow(clippy::panic)]
    async fn execute(
        &self,
        _context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, lash_core::Error> {
        panic!("boom");
    }
}

struct PanickingInterpreter;

#[async_trait::async_trait]
impl Command for PanickingInterpreter {
    fn name(&self) -> &str {
        "python3"
    }

    fn description(&self) -> &str {
        "Panics on every script."
    }

    #[allow(clippy::panic)]
    async fn execute(
        &self,
        _context: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, lash_core::Error> {
        panic!("interpreter crashed");
    }
}

#[tokio::test]
async fn interpreter_panics_are_contained() -> Result<()> {
    let (fs, shell) = new_shell();
    shell.register_command(Arc::new(PanickingInterpreter));
    fs.mkdir("/usr/bin", true).await?;
    fs.write("/usr/bin/tool.py", b"print('hi')\n").await?;

    let output = run(&shell, "tool.py; echo survived").await?;
    assert_eq!(output.stdout, "survived\n");
    assert!(output.stderr.contains("python3: command panicked"));

    let output = run(&shell, "tool.py").await?;
    assert_eq!(output.result.code(), 128);
    Ok(())
}

#[tokio::test]
async fn command_plugins() -> Result<()> {
    let (_, shell) = new_shell();
    shell.register_command(Arc::new(Upper));
    shell.register_command(Arc::new(Boom));

    assert_eq!(run(&shell, "echo hi | upper").await?.stdout, "HI\n");

    let output = run(&shell, "boom; echo survived").await?;
    assert_eq!(output.stdout, "survived\n");
    assert!(output.stderr.contains("boom: command panicked"));

    let output = run(&shell, "boom").await?;
    assert_eq!(output.result.code(), 128);
    Ok(())
}
