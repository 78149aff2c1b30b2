mod common;

use common::{FixedEnvironment, RecordingCallbacks, RecordingRunner, TestHome, cwd};
use repo_sync::config::Config;
use repo_sync::manifest;
use repo_sync::output::NoOpCallbacks;
use repo_sync::repo::{self, Repository, Variant};
use serial_test::serial;

const ENV: FixedEnvironment = FixedEnvironment {
    hostname: "workstation",
};

fn load(home: &TestHome, text: &str) -> anyhow::Result<Vec<Repository>> {
    let config = home.write_config(text)?;
    let manifest = manifest::load(&config, home.path(), &ENV)?;
    Ok(manifest.repositories)
}

#[test]
#[serial]
fn test_plain_repo_fetches_then_pulls_in_its_directory() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["proj-a"])?;
    let repos = load(&home, "git = [\"proj-a\"]\ngit_svn = []\nsvn = []\n")?;
    let before = cwd();

    let runner = RecordingRunner::default();
    let report = repo::sync_all(&repos, &Config::default(), &runner, &NoOpCallbacks);

    let proj = home.path().join("proj-a");
    assert_eq!(
        *runner.calls.borrow(),
        vec![
            (proj.clone(), "git remote update".to_string()),
            (proj, "git pull --rebase origin master".to_string()),
        ]
    );
    assert_eq!(report.repositories, 1);
    assert_eq!(report.commands_run, 2);
    assert_eq!(cwd(), before);
    Ok(())
}

#[test]
#[serial]
fn test_dry_run_announces_both_phases_and_runs_nothing() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["a", "m", "s"])?;
    let repos = load(&home, "git = [\"a\"]\ngit_svn = [\"m\"]\nsvn = [\"s\"]\n")?;
    let config = Config {
        dry_run: true,
        ..Config::default()
    };

    let runner = RecordingRunner::default();
    let callbacks = RecordingCallbacks::default();
    let report = repo::sync_all(&repos, &config, &runner, &callbacks);

    assert!(runner.calls.borrow().is_empty());
    assert_eq!(report.commands_run, 0);
    let lines = callbacks.lines.borrow();
    assert_eq!(lines.len(), 6);
    assert!(lines.iter().all(|l| l.starts_with("[dry-run] ")));
    Ok(())
}

#[test]
#[serial]
fn test_fetch_only_never_enters_update_phase() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["a", "m", "s"])?;
    let repos = load(&home, "git = [\"a\"]\ngit_svn = [\"m\"]\nsvn = [\"s\"]\n")?;
    let config = Config {
        fetch_only: true,
        ..Config::default()
    };

    let runner = RecordingRunner::default();
    let callbacks = RecordingCallbacks::default();
    repo::sync_all(&repos, &config, &runner, &callbacks);

    assert_eq!(runner.commands(), ["git remote update", "git svn fetch"]);
    let lines = callbacks.lines.borrow();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.starts_with("Fetching ")));
    Ok(())
}

#[test]
#[serial]
fn test_variants_run_in_list_order_with_fetch_before_update() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["a", "b", "m", "s"])?;
    let repos = load(
        &home,
        r#"
svn = ["s"]
git = ["a", ["host:workstation", "b"], ["host:laptop", "a"]]
git_svn = [{ path = "m", when = "command:git" }]
"#,
    )?;

    let runner = RecordingRunner::default();
    repo::sync_all(&repos, &Config::default(), &runner, &NoOpCallbacks);

    let dir = |name: &str| home.path().join(name);
    let calls = runner.calls.borrow();
    let seen: Vec<_> = calls.iter().map(|(d, c)| (d.clone(), c.as_str())).collect();
    assert_eq!(
        seen,
        vec![
            (dir("a"), "git remote update"),
            (dir("a"), "git pull --rebase origin master"),
            (dir("b"), "git remote update"),
            (dir("b"), "git pull --rebase origin master"),
            (dir("m"), "git svn fetch"),
            (dir("m"), "git svn rebase"),
            (dir("s"), "svn update"),
        ]
    );
    Ok(())
}

#[test]
#[serial]
fn test_svn_fetch_is_announced_but_runs_nothing() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["s"])?;
    let repo = Repository::new(home.path(), "s", Variant::Svn)?;

    let runner = RecordingRunner::default();
    let callbacks = RecordingCallbacks::default();
    let ran = repo::fetch_changes(&repo, &Config::default(), &runner, &callbacks)?;

    assert!(!ran);
    assert!(runner.calls.borrow().is_empty());
    assert_eq!(callbacks.lines.borrow().len(), 1);
    Ok(())
}

#[test]
#[serial]
fn test_falsy_predicate_produces_no_repositories() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["proj-b"])?;
    let repos = load(&home, r#"git = [["never", "proj-b"]]"#)?;
    assert!(repos.is_empty());

    let runner = RecordingRunner::default();
    let report = repo::sync_all(&repos, &Config::default(), &runner, &NoOpCallbacks);
    assert_eq!(report.repositories, 0);
    assert!(runner.calls.borrow().is_empty());
    Ok(())
}

#[test]
#[serial]
fn test_vanished_directory_is_reported_and_batch_continues() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["gone", "kept"])?;
    let repos = load(&home, "git = [\"gone\", \"kept\"]")?;
    std::fs::remove_dir(home.path().join("gone"))?;
    let before = cwd();

    let runner = RecordingRunner::default();
    let callbacks = RecordingCallbacks::default();
    let report = repo::sync_all(&repos, &Config::default(), &runner, &callbacks);

    assert_eq!(report.repositories, 2);
    assert_eq!(report.phase_errors, 2);
    assert_eq!(callbacks.errors.borrow().len(), 2);
    assert_eq!(runner.commands().len(), 2);
    assert!(runner.calls.borrow().iter().all(|(d, _)| d == &home.path().join("kept")));
    assert_eq!(cwd(), before);
    Ok(())
}

#[test]
#[serial]
fn test_dry_run_output_is_identical_across_runs() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["a", "s"])?;
    let config = Config {
        dry_run: true,
        ..Config::default()
    };

    let run_once = || -> anyhow::Result<Vec<String>> {
        let repos = load(&home, "git = [\"a\"]\nsvn = [\"s\"]")?;
        let callbacks = RecordingCallbacks::default();
        repo::sync_all(&repos, &config, &RecordingRunner::default(), &callbacks);
        Ok(callbacks.lines.into_inner())
    };

    assert_eq!(run_once()?, run_once()?);
    Ok(())
}

#[test]
#[serial]
fn test_pull_changes_respects_fetch_only_without_announcing() -> anyhow::Result<()> {
    let home = TestHome::with_dirs(&["a"])?;
    let repo = Repository::new(home.path(), "a", Variant::Git)?;
    let config = Config {
        fetch_only: true,
        ..Config::default()
    };

    let callbacks = RecordingCallbacks::default();
    let ran = repo::pull_changes(&repo, &config, &RecordingRunner::default(), &callbacks)?;
    assert!(!ran);
    assert!(callbacks.lines.borrow().is_empty());
    Ok(())
}
